//! Error types for artefact names, versions, and digests.
//!
//! Each variant identifies the rejected input and the constraint it
//! violated, so build logs point straight at the offending value.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// A version string is empty or not in a shape the build tool emits.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A wheel distribution name contains characters outside the
    /// normalised set.
    #[error("invalid distribution name \"{value}\": {reason}")]
    InvalidDistributionName {
        /// The rejected name.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A Debian package name violates the archive naming rules.
    #[error("invalid plugin identifier \"{value}\": {reason}")]
    InvalidPluginId {
        /// The rejected identifier.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A filename does not follow the wheel naming convention.
    #[error("invalid wheel filename \"{value}\": {reason}")]
    InvalidWheelFilename {
        /// The rejected filename.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A wheel carries platform or interpreter specific tags.
    #[error("wheel \"{value}\" is not platform-independent; expected tags py3-none-any")]
    UnsupportedWheelTags {
        /// The rejected filename.
        value: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_names_value_and_reason() {
        let err = ArtefactError::InvalidVersion {
            value: "1.2-3".to_owned(),
            reason: "'-' is not allowed".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1.2-3"));
        assert!(msg.contains("not allowed"));
    }

    #[test]
    fn unsupported_tags_mentions_expected_tags() {
        let err = ArtefactError::UnsupportedWheelTags {
            value: "x-1.0-cp312-cp312-linux_x86_64.whl".to_owned(),
        };
        assert!(err.to_string().contains("py3-none-any"));
    }
}
