//! Plugin version newtype.
//!
//! The build tool derives versions from the checkout's tag history. A tagged
//! commit yields a clean release (`1.2.3`); commits past the last tag yield a
//! development version carrying the commit distance, the abbreviated commit
//! hash and, for dirty trees, the build date (`1.2.4.dev3+g1a2b3c4.d20261016`).
//! Checkouts without any tags fall back to `0.1.devN+g<hash>`.
//!
//! The accepted alphabet is deliberately narrow: ASCII alphanumerics, `.` and
//! `+`. Hyphens and underscores would make the wheel and Debian filenames
//! impossible to split back into their components.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated version string as emitted by the build tool.
///
/// # Examples
///
/// ```
/// use kalinka_packager::artefact::version::PluginVersion;
///
/// let tagged = PluginVersion::try_from("1.2.3").expect("valid version");
/// assert!(tagged.is_release());
///
/// let ahead = PluginVersion::try_from("1.2.4.dev3+g1a2b3c4").expect("valid version");
/// assert_eq!(ahead.distance(), Some(3));
/// assert_eq!(ahead.commit(), Some("1a2b3c4"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginVersion {
    raw: String,
    release: Vec<u64>,
    pre_release: Option<String>,
    dev: Option<u64>,
    local: Option<String>,
}

impl PluginVersion {
    /// Return the version exactly as the build tool wrote it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Return `true` for a clean tagged release with no development or
    /// local segment.
    #[must_use]
    pub fn is_release(&self) -> bool {
        self.dev.is_none() && self.local.is_none()
    }

    /// Return the numeric release segments (`[1, 2, 3]` for `1.2.3`).
    #[must_use]
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Return the pre-release marker (`rc1`, `b2`, ...), if any.
    #[must_use]
    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    /// Return the number of commits since the last tag for development
    /// versions.
    #[must_use]
    pub fn distance(&self) -> Option<u64> {
        self.dev
    }

    /// Return the abbreviated commit hash recorded in the local segment.
    #[must_use]
    pub fn commit(&self) -> Option<&str> {
        self.local_segments().find_map(|segment| {
            segment
                .strip_prefix('g')
                .filter(|hash| !hash.is_empty() && hash.chars().all(|c| c.is_ascii_hexdigit()))
        })
    }

    /// Return the dirty-tree build date (`YYYYMMDD`) recorded in the local
    /// segment.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.local_segments().find_map(|segment| {
            segment
                .strip_prefix('d')
                .filter(|date| date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()))
        })
    }

    fn local_segments(&self) -> impl Iterator<Item = &str> {
        self.local.as_deref().into_iter().flat_map(|l| l.split('.'))
    }
}

impl TryFrom<&str> for PluginVersion {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        parse_version(value)
    }
}

impl TryFrom<String> for PluginVersion {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        parse_version(&value)
    }
}

impl From<PluginVersion> for String {
    fn from(version: PluginVersion) -> Self {
        version.raw
    }
}

impl AsRef<str> for PluginVersion {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn invalid(value: &str, reason: impl Into<String>) -> ArtefactError {
    ArtefactError::InvalidVersion {
        value: value.to_owned(),
        reason: reason.into(),
    }
}

fn parse_version(value: &str) -> Result<PluginVersion> {
    if value.is_empty() {
        return Err(invalid(value, "version must not be empty"));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '+'))
    {
        return Err(invalid(value, format!("character '{bad}' is not allowed")));
    }
    if !value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid(value, "version must start with a digit"));
    }

    let (public, local) = match value.split_once('+') {
        Some((public, local)) => (public, Some(parse_local(value, local)?)),
        None => (value, None),
    };

    let (release_part, dev) = match public.split_once(".dev") {
        Some((release_part, number)) => (release_part, Some(parse_number(value, number, "dev")?)),
        None => (public, None),
    };

    let (release, pre_release) = parse_release(value, release_part)?;

    Ok(PluginVersion {
        raw: value.to_owned(),
        release,
        pre_release,
        dev,
        local,
    })
}

fn parse_local(value: &str, local: &str) -> Result<String> {
    if local.is_empty() {
        return Err(invalid(value, "local segment after '+' must not be empty"));
    }
    if local.contains('+') {
        return Err(invalid(value, "only one '+' is allowed"));
    }
    if local.split('.').any(str::is_empty) {
        return Err(invalid(value, "local segment contains an empty component"));
    }
    Ok(local.to_owned())
}

fn parse_number(value: &str, digits: &str, label: &str) -> Result<u64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(
            value,
            format!("{label} segment must be numeric, got \"{digits}\""),
        ));
    }
    digits
        .parse()
        .map_err(|_| invalid(value, format!("{label} segment \"{digits}\" is out of range")))
}

/// Parse `X.Y.Z` with an optional `a|b|rc` marker on the last segment.
fn parse_release(value: &str, release_part: &str) -> Result<(Vec<u64>, Option<String>)> {
    let segments: Vec<&str> = release_part.split('.').collect();
    let mut release = Vec::with_capacity(segments.len());
    let mut pre_release = None;

    let last = segments.len().saturating_sub(1);
    for (position, segment) in segments.into_iter().enumerate() {
        match segment.find(|c: char| !c.is_ascii_digit()) {
            None => release.push(parse_number(value, segment, "release")?),
            Some(split) if position == last => {
                let (digits, marker) = segment.split_at(split);
                release.push(parse_number(value, digits, "release")?);
                pre_release = Some(parse_pre_release(value, marker)?);
            }
            Some(_) => {
                return Err(invalid(
                    value,
                    format!("release segment \"{segment}\" must be numeric"),
                ));
            }
        }
    }

    Ok((release, pre_release))
}

fn parse_pre_release(value: &str, marker: &str) -> Result<String> {
    let number = ["rc", "a", "b"]
        .iter()
        .find_map(|prefix| marker.strip_prefix(prefix))
        .ok_or_else(|| invalid(value, format!("unknown pre-release marker \"{marker}\"")))?;
    parse_number(value, number, "pre-release")?;
    Ok(marker.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::clean_tag("1.2.3", &[1, 2, 3])]
    #[case::two_segments("2.0", &[2, 0])]
    #[case::single_segment("7", &[7])]
    fn clean_tags_are_releases(#[case] raw: &str, #[case] segments: &[u64]) {
        let version = PluginVersion::try_from(raw).expect("valid version");
        assert!(version.is_release());
        assert_eq!(version.release(), segments);
        assert_eq!(version.distance(), None);
        assert_eq!(version.commit(), None);
    }

    #[test]
    fn commits_ahead_of_tag_record_distance_and_hash() {
        let version = PluginVersion::try_from("1.2.4.dev3+g1a2b3c4").expect("valid version");
        assert!(!version.is_release());
        assert_eq!(version.release(), &[1, 2, 4]);
        assert_eq!(version.distance(), Some(3));
        assert_eq!(version.commit(), Some("1a2b3c4"));
        assert_eq!(version.date(), None);
    }

    #[test]
    fn dirty_development_version_records_date() {
        let version =
            PluginVersion::try_from("1.2.4.dev3+g1a2b3c4.d20261016").expect("valid version");
        assert_eq!(version.commit(), Some("1a2b3c4"));
        assert_eq!(version.date(), Some("20261016"));
    }

    #[test]
    fn dirty_tagged_tree_is_not_a_release() {
        let version = PluginVersion::try_from("1.2.3+d20261016").expect("valid version");
        assert!(!version.is_release());
        assert_eq!(version.distance(), None);
        assert_eq!(version.date(), Some("20261016"));
    }

    #[test]
    fn untagged_checkout_default_is_development() {
        let version = PluginVersion::try_from("0.1.dev1+g0badf00").expect("valid version");
        assert_eq!(version.release(), &[0, 1]);
        assert_eq!(version.distance(), Some(1));
    }

    #[test]
    fn pre_release_marker_is_kept() {
        let version = PluginVersion::try_from("2.0.0rc1").expect("valid version");
        assert!(version.is_release());
        assert_eq!(version.pre_release(), Some("rc1"));
        assert_eq!(version.release(), &[2, 0, 0]);
    }

    #[rstest]
    #[case::empty("")]
    #[case::tag_prefix("v1.2.3")]
    #[case::hyphen("1.2-3")]
    #[case::underscore("1_2")]
    #[case::whitespace("1.2.3 ")]
    #[case::empty_dev("1.2.3.dev")]
    #[case::empty_local("1.2.3+")]
    #[case::double_plus("1.2.3+g1+d2")]
    #[case::empty_segment("1..2")]
    #[case::bad_marker("1.2.3x1")]
    #[case::marker_mid_release("1rc1.2")]
    fn rejects_malformed_versions(#[case] raw: &str) {
        let err = PluginVersion::try_from(raw).expect_err("version should be rejected");
        assert!(matches!(err, ArtefactError::InvalidVersion { .. }));
    }

    #[test]
    fn display_round_trips_raw_text() {
        let raw = "1.2.4.dev3+g1a2b3c4.d20261016";
        let version = PluginVersion::try_from(raw).expect("valid version");
        assert_eq!(version.to_string(), raw);
        assert_eq!(String::from(version), raw);
    }

    #[test]
    fn serde_rejects_invalid_versions() {
        let result: std::result::Result<PluginVersion, _> = serde_json::from_str("\"1-2\"");
        assert!(result.is_err());
    }
}
