//! Checks on the rendered Debian control file.
//!
//! `dpkg-deb` would happily build a package whose control file names some
//! other package or version, so the rendered file is read back and compared
//! against what is being built before assembly starts.

use crate::artefact::names::PluginId;
use crate::artefact::version::PluginVersion;
use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use std::fs;

/// Return the value of `field` in control file `contents`.
///
/// Field names compare case-insensitively. Continuation lines (those
/// starting with whitespace) are never treated as fields.
///
/// # Examples
///
/// ```
/// use kalinka_packager::control::field_value;
///
/// let control = "Package: kalinka-plugin-qobuz\nversion: 1.2.3\n";
/// assert_eq!(field_value(control, "Version"), Some("1.2.3"));
/// assert_eq!(field_value(control, "Depends"), None);
/// ```
#[must_use]
pub fn field_value<'a>(contents: &'a str, field: &str) -> Option<&'a str> {
    contents
        .lines()
        .filter(|line| !line.starts_with([' ', '\t', '#']))
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(field))
        .map(|(_, value)| value.trim())
}

/// Verify the rendered control file at `path`.
///
/// # Errors
///
/// Returns [`PackagerError::ControlFieldMissing`] when there is no `Version`
/// field and [`PackagerError::ControlMismatch`] when `Version`, or `Package`
/// if present, disagrees with the package being built.
pub fn verify_control(path: &Utf8Path, plugin_id: &PluginId, version: &PluginVersion) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    verify_contents(&contents, path, plugin_id, version)
}

fn verify_contents(
    contents: &str,
    path: &Utf8Path,
    plugin_id: &PluginId,
    version: &PluginVersion,
) -> Result<()> {
    if let Some(package) =
        field_value(contents, "Package").filter(|package| *package != plugin_id.as_str())
    {
        return Err(PackagerError::ControlMismatch {
            field: "Package",
            expected: plugin_id.to_string(),
            found: package.to_owned(),
        });
    }
    let found = field_value(contents, "Version").ok_or_else(|| {
        PackagerError::ControlFieldMissing {
            path: path.to_owned(),
            field: "Version",
        }
    })?;
    if found != version.as_str() {
        return Err(PackagerError::ControlMismatch {
            field: "Version",
            expected: version.to_string(),
            found: found.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const CONTROL: &str = "\
Package: kalinka-plugin-qobuz
Version: 1.2.3
Architecture: all
Depends: kalinka, python3 (>= 3.11)
Description: Qobuz input plugin for Kalinka
 Streams from Qobuz.
 Version: 9.9.9
";

    #[fixture]
    fn plugin_id() -> PluginId {
        PluginId::default()
    }

    #[fixture]
    fn version() -> PluginVersion {
        PluginVersion::try_from("1.2.3").expect("valid version")
    }

    #[test]
    fn continuation_lines_are_not_fields() {
        assert_eq!(field_value(CONTROL, "Version"), Some("1.2.3"));
    }

    #[rstest]
    fn matching_control_file_passes(plugin_id: PluginId, version: PluginVersion) {
        assert!(verify_contents(CONTROL, Utf8Path::new("control"), &plugin_id, &version).is_ok());
    }

    #[rstest]
    fn package_field_is_optional(plugin_id: PluginId, version: PluginVersion) {
        let contents = "Version: 1.2.3\nArchitecture: all\n";
        assert!(verify_contents(contents, Utf8Path::new("control"), &plugin_id, &version).is_ok());
    }

    #[rstest]
    fn missing_version_is_reported(plugin_id: PluginId, version: PluginVersion) {
        let err = verify_contents(
            "Package: kalinka-plugin-qobuz\n",
            Utf8Path::new("control"),
            &plugin_id,
            &version,
        )
        .expect_err("version is required");
        assert!(matches!(
            err,
            PackagerError::ControlFieldMissing {
                field: "Version",
                ..
            }
        ));
    }

    #[rstest]
    #[case::package("Package: kalinka-plugin-tidal\nVersion: 1.2.3\n", "Package")]
    #[case::version("Package: kalinka-plugin-qobuz\nVersion: 1.2.2\n", "Version")]
    fn disagreeing_fields_are_reported(
        plugin_id: PluginId,
        version: PluginVersion,
        #[case] contents: &str,
        #[case] expected_field: &str,
    ) {
        let err = verify_contents(contents, Utf8Path::new("control"), &plugin_id, &version)
            .expect_err("field disagrees");
        match err {
            PackagerError::ControlMismatch { field, .. } => assert_eq!(field, expected_field),
            other => panic!("unexpected error: {other}"),
        }
    }
}
