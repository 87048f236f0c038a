//! Error types for the Kalinka packager.
//!
//! Every variant is fatal: the build aborts, nothing is retried, and no
//! partial package is left behind. Variants for ambiguous output directories
//! enumerate what was actually found so the operator can clean up.

use crate::artefact::error::ArtefactError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building the wheel or the Debian package.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// An external tool could not be started at all.
    #[error("failed to run {tool}: {source}")]
    ToolSpawn {
        /// Program that failed to start.
        tool: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        /// Program that failed.
        tool: String,
        /// Exit status description.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The build tool did not leave a version-declaration file behind.
    #[error("version file {path} not found after the wheel build; is the checkout tagged and setuptools-scm configured?")]
    VersionFileMissing {
        /// Where the version file was expected.
        path: Utf8PathBuf,
    },

    /// The version-declaration file exists but holds no usable version.
    #[error("invalid version file {path}: {reason}")]
    InvalidVersionFile {
        /// Path to the offending file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// No wheel was produced in the dist directory.
    #[error("no wheel found in {dir}")]
    NoWheelFound {
        /// Directory that was searched.
        dir: Utf8PathBuf,
    },

    /// More than one wheel is present, so the right one cannot be chosen.
    #[error("expected exactly one wheel in {dir}, found: {}", format_candidates(.candidates))]
    AmbiguousWheels {
        /// Directory that was searched.
        dir: Utf8PathBuf,
        /// Wheel filenames found.
        candidates: Vec<String>,
    },

    /// The wheel reconstructed from the derived version does not exist.
    #[error("expected wheel {expected} not found; candidates: {}", format_candidates(.candidates))]
    ExpectedWheelMissing {
        /// Filename reconstructed from the derived version.
        expected: String,
        /// Wheel filenames found instead.
        candidates: Vec<String>,
    },

    /// Two sources of the same version disagree.
    #[error("version mismatch: {expected_source} says {expected}, {found_source} says {found}")]
    VersionMismatch {
        /// Where the reference version came from.
        expected_source: &'static str,
        /// The reference version.
        expected: String,
        /// Where the conflicting version came from.
        found_source: &'static str,
        /// The conflicting version.
        found: String,
    },

    /// The wheel changed after its manifest was written.
    #[error("digest mismatch for {path}: manifest records {expected}, file hashes to {found}")]
    DigestMismatch {
        /// The wheel that was hashed.
        path: Utf8PathBuf,
        /// Digest recorded in the manifest.
        expected: String,
        /// Digest of the file on disk.
        found: String,
    },

    /// The wheel manifest is absent.
    #[error("wheel manifest {path} not found; run the wheel build first")]
    ManifestMissing {
        /// Where the manifest was expected.
        path: Utf8PathBuf,
    },

    /// The wheel manifest could not be understood.
    #[error("invalid wheel manifest {path}: {reason}")]
    InvalidManifest {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A template or script consumed by the packager is missing.
    #[error("template {path} not found")]
    TemplateMissing {
        /// Where the template was expected.
        path: Utf8PathBuf,
    },

    /// A placeholder survived rendering.
    #[error("placeholder {placeholder} remains in rendered {path}")]
    UnresolvedPlaceholder {
        /// File being rendered.
        path: Utf8PathBuf,
        /// The placeholder token.
        placeholder: String,
    },

    /// The configured placeholder is unusable.
    #[error("invalid placeholder: {reason}")]
    InvalidPlaceholder {
        /// Description of the problem.
        reason: String,
    },

    /// A required control field is absent from the rendered control file.
    #[error("control file {path} has no {field} field")]
    ControlFieldMissing {
        /// Rendered control file.
        path: Utf8PathBuf,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A control field disagrees with the package being built.
    #[error("control field {field} is {found}, expected {expected}")]
    ControlMismatch {
        /// Name of the field.
        field: &'static str,
        /// Value the packager expected.
        expected: String,
        /// Value found in the rendered file.
        found: String,
    },

    /// A scratch directory could not be recreated.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The checkout root does not exist or cannot be resolved.
    #[error("invalid source directory {path}: {reason}")]
    InvalidSourceDir {
        /// Directory given on the command line.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// A value failed domain validation.
    #[error(transparent)]
    Artefact(#[from] ArtefactError),

    /// Manifest serialization failed.
    #[error("manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;

fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        "(none)".to_owned()
    } else {
        candidates.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_wheels_lists_every_candidate() {
        let err = PackagerError::AmbiguousWheels {
            dir: Utf8PathBuf::from("dist"),
            candidates: vec![
                "kalinka_plugin_qobuz-1.2.3-py3-none-any.whl".to_owned(),
                "kalinka_plugin_qobuz-1.2.2-py3-none-any.whl".to_owned(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("1.2.3-py3"));
        assert!(msg.contains("1.2.2-py3"));
    }

    #[test]
    fn expected_wheel_missing_reports_empty_candidates() {
        let err = PackagerError::ExpectedWheelMissing {
            expected: "kalinka_plugin_qobuz-1.2.3-py3-none-any.whl".to_owned(),
            candidates: Vec::new(),
        };
        let msg = err.to_string();
        assert!(msg.contains("kalinka_plugin_qobuz-1.2.3"));
        assert!(msg.contains("(none)"));
    }

    #[test]
    fn tool_failed_includes_tool_and_stderr() {
        let err = PackagerError::ToolFailed {
            tool: "dpkg-deb".to_owned(),
            status: "exit status: 2".to_owned(),
            stderr: "control file missing".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("dpkg-deb"));
        assert!(msg.contains("control file missing"));
    }

    #[test]
    fn version_mismatch_names_both_sources() {
        let err = PackagerError::VersionMismatch {
            expected_source: "version file",
            expected: "1.2.3".to_owned(),
            found_source: "wheel filename",
            found: "1.2.4".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("version file says 1.2.3"));
        assert!(msg.contains("wheel filename says 1.2.4"));
    }

    #[test]
    fn tool_spawn_preserves_source() {
        let err = PackagerError::ToolSpawn {
            tool: "python3".to_owned(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
