//! Artefact naming policy for wheels and Debian packages.
//!
//! Both filenames are reconstructed from the derived version rather than
//! discovered, so the packager can tell the expected artefact apart from
//! anything else lying in the output directory:
//!
//! - wheel: `<distribution>-<version>-py3-none-any.whl`
//! - package: `<plugin-id>_<version>_all.deb`

use super::error::{ArtefactError, Result};
use super::names::{DistributionName, PluginId};
use super::version::PluginVersion;
use std::fmt;

/// File extension of wheel archives.
pub const WHEEL_EXTENSION: &str = ".whl";

/// Compatibility tags of a pure-Python wheel.
const WHEEL_TAGS: [&str; 3] = ["py3", "none", "any"];

/// File extension of Debian binary packages.
pub const DEB_EXTENSION: &str = ".deb";

/// Debian architecture for architecture-independent packages.
const DEB_ARCHITECTURE: &str = "all";

/// The filename of a platform-independent wheel.
///
/// # Examples
///
/// ```
/// use kalinka_packager::artefact::names::DistributionName;
/// use kalinka_packager::artefact::naming::WheelName;
/// use kalinka_packager::artefact::version::PluginVersion;
///
/// let name = WheelName::new(
///     DistributionName::try_from("kalinka_plugin_qobuz").expect("valid name"),
///     PluginVersion::try_from("1.2.3").expect("valid version"),
/// );
/// assert_eq!(name.filename(), "kalinka_plugin_qobuz-1.2.3-py3-none-any.whl");
///
/// let parsed = WheelName::parse(&name.filename()).expect("round trips");
/// assert_eq!(parsed, name);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    distribution: DistributionName,
    version: PluginVersion,
}

impl WheelName {
    /// Create a wheel name from validated components.
    #[must_use]
    pub fn new(distribution: DistributionName, version: PluginVersion) -> Self {
        Self {
            distribution,
            version,
        }
    }

    /// Parse a wheel filename back into its components.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidWheelFilename`] when the extension or
    /// component count is wrong, [`ArtefactError::UnsupportedWheelTags`]
    /// when the wheel is not `py3-none-any`, and propagates name and version
    /// validation errors.
    pub fn parse(filename: &str) -> Result<Self> {
        let fail = |reason: &str| ArtefactError::InvalidWheelFilename {
            value: filename.to_owned(),
            reason: reason.to_owned(),
        };
        let stem = filename
            .strip_suffix(WHEEL_EXTENSION)
            .ok_or_else(|| fail("missing .whl extension"))?;
        let components: Vec<&str> = stem.split('-').collect();
        match components.as_slice() {
            [distribution, version, python, abi, platform] => {
                if [*python, *abi, *platform] != WHEEL_TAGS {
                    return Err(ArtefactError::UnsupportedWheelTags {
                        value: filename.to_owned(),
                    });
                }
                Ok(Self::new(
                    DistributionName::try_from(*distribution)?,
                    PluginVersion::try_from(*version)?,
                ))
            }
            [_, _, _, _, _, _] => Err(fail("build tags are not supported")),
            _ => Err(fail("expected five '-' separated components")),
        }
    }

    /// Return the distribution component.
    #[must_use]
    pub fn distribution(&self) -> &DistributionName {
        &self.distribution
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &PluginVersion {
        &self.version
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [python, abi, platform] = WHEEL_TAGS;
        write!(
            f,
            "{}-{}-{python}-{abi}-{platform}{WHEEL_EXTENSION}",
            self.distribution, self.version
        )
    }
}

/// The filename of the emitted Debian package.
///
/// # Examples
///
/// ```
/// use kalinka_packager::artefact::names::PluginId;
/// use kalinka_packager::artefact::naming::DebName;
/// use kalinka_packager::artefact::version::PluginVersion;
///
/// let name = DebName::new(
///     PluginId::try_from("kalinka-plugin-qobuz").expect("valid identifier"),
///     PluginVersion::try_from("1.2.3").expect("valid version"),
/// );
/// assert_eq!(name.filename(), "kalinka-plugin-qobuz_1.2.3_all.deb");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebName {
    plugin_id: PluginId,
    version: PluginVersion,
}

impl DebName {
    /// Create a package name from validated components.
    #[must_use]
    pub fn new(plugin_id: PluginId, version: PluginVersion) -> Self {
        Self { plugin_id, version }
    }

    /// Return the plugin identifier component.
    #[must_use]
    pub fn plugin_id(&self) -> &PluginId {
        &self.plugin_id
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &PluginVersion {
        &self.version
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DebName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{DEB_ARCHITECTURE}{DEB_EXTENSION}",
            self.plugin_id, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn distribution() -> DistributionName {
        DistributionName::try_from("kalinka_plugin_qobuz").expect("valid name")
    }

    #[rstest]
    #[case::tagged("1.2.3", "kalinka_plugin_qobuz-1.2.3-py3-none-any.whl")]
    #[case::ahead(
        "1.2.4.dev3+g1a2b3c4",
        "kalinka_plugin_qobuz-1.2.4.dev3+g1a2b3c4-py3-none-any.whl"
    )]
    fn wheel_filename_embeds_version(
        distribution: DistributionName,
        #[case] version: &str,
        #[case] expected: &str,
    ) {
        let name = WheelName::new(
            distribution,
            PluginVersion::try_from(version).expect("valid version"),
        );
        assert_eq!(name.filename(), expected);
    }

    #[test]
    fn parse_recovers_version_from_filename() {
        let parsed = WheelName::parse("kalinka_plugin_qobuz-0.1.dev1+g0badf00-py3-none-any.whl")
            .expect("valid wheel filename");
        assert_eq!(parsed.distribution().as_str(), "kalinka_plugin_qobuz");
        assert_eq!(parsed.version().as_str(), "0.1.dev1+g0badf00");
    }

    #[rstest]
    #[case::wrong_extension("kalinka_plugin_qobuz-1.2.3-py3-none-any.zip")]
    #[case::too_few("kalinka_plugin_qobuz-1.2.3.whl")]
    #[case::build_tag("kalinka_plugin_qobuz-1.2.3-1-py3-none-any.whl")]
    fn parse_rejects_malformed_filenames(#[case] filename: &str) {
        let err = WheelName::parse(filename).expect_err("filename should be rejected");
        assert!(matches!(err, ArtefactError::InvalidWheelFilename { .. }));
    }

    #[test]
    fn parse_rejects_platform_specific_wheels() {
        let err = WheelName::parse("kalinka_plugin_qobuz-1.2.3-cp312-cp312-linux_x86_64.whl")
            .expect_err("platform wheel should be rejected");
        assert!(matches!(err, ArtefactError::UnsupportedWheelTags { .. }));
    }

    #[test]
    fn deb_filename_uses_plugin_id_and_all_architecture() {
        let name = DebName::new(
            PluginId::try_from("kalinka-plugin-qobuz").expect("valid identifier"),
            PluginVersion::try_from("1.2.4.dev3+g1a2b3c4").expect("valid version"),
        );
        assert_eq!(
            name.filename(),
            "kalinka-plugin-qobuz_1.2.4.dev3+g1a2b3c4_all.deb"
        );
    }
}
