//! Distribution and Debian package name newtypes.
//!
//! The same plugin goes by two names: the wheel distribution name
//! (`kalinka_plugin_qobuz`) and the Debian package name
//! (`kalinka-plugin-qobuz`). Keeping them as distinct types stops one from
//! being interpolated where the other belongs.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalised wheel distribution name.
///
/// Runs of `-`, `_` and `.` collapse to a single `_` and the result is
/// lowercased, matching how the wheel filename convention escapes project
/// names.
///
/// # Examples
///
/// ```
/// use kalinka_packager::artefact::names::DistributionName;
///
/// let name = DistributionName::try_from("Kalinka-Plugin.Qobuz").expect("valid name");
/// assert_eq!(name.as_str(), "kalinka_plugin_qobuz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistributionName(String);

impl DistributionName {
    /// Return the normalised name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Distribution name of the Qobuz plugin.
pub const DEFAULT_DISTRIBUTION: &str = "kalinka_plugin_qobuz";

impl Default for DistributionName {
    fn default() -> Self {
        Self(DEFAULT_DISTRIBUTION.to_owned())
    }
}

impl TryFrom<&str> for DistributionName {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        let normalised = normalise_distribution(value);
        validate_distribution(value, &normalised)?;
        Ok(Self(normalised))
    }
}

impl TryFrom<String> for DistributionName {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl From<DistributionName> for String {
    fn from(name: DistributionName) -> Self {
        name.0
    }
}

impl AsRef<str> for DistributionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistributionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalise_distribution(value: &str) -> String {
    let mut normalised = String::with_capacity(value.len());
    let mut in_separator_run = false;
    for c in value.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator_run {
                normalised.push('_');
            }
            in_separator_run = true;
        } else {
            normalised.push(c.to_ascii_lowercase());
            in_separator_run = false;
        }
    }
    normalised
}

fn validate_distribution(original: &str, normalised: &str) -> Result<()> {
    let fail = |reason: String| ArtefactError::InvalidDistributionName {
        value: original.to_owned(),
        reason,
    };
    if normalised.is_empty() {
        return Err(fail("name must not be empty".to_owned()));
    }
    if let Some(bad) = normalised
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(fail(format!("character '{bad}' is not allowed")));
    }
    if normalised.starts_with('_') || normalised.ends_with('_') {
        return Err(fail("name must start and end with a letter or digit".to_owned()));
    }
    Ok(())
}

/// Minimum length of a Debian package name.
const MIN_PLUGIN_ID_LEN: usize = 2;

/// A Debian package name identifying the plugin in the archive.
///
/// Debian policy allows lowercase letters, digits, `+`, `-` and `.`, with at
/// least two characters and an alphanumeric first character.
///
/// # Examples
///
/// ```
/// use kalinka_packager::artefact::names::PluginId;
///
/// let id = PluginId::try_from("kalinka-plugin-qobuz").expect("valid identifier");
/// assert_eq!(id.as_str(), "kalinka-plugin-qobuz");
/// assert!(PluginId::try_from("Kalinka").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

impl PluginId {
    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Debian package name of the Qobuz plugin.
pub const DEFAULT_PLUGIN_ID: &str = "kalinka-plugin-qobuz";

impl Default for PluginId {
    fn default() -> Self {
        Self(DEFAULT_PLUGIN_ID.to_owned())
    }
}

impl TryFrom<&str> for PluginId {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_plugin_id(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for PluginId {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        validate_plugin_id(&value)?;
        Ok(Self(value))
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_plugin_id(value: &str) -> Result<()> {
    let fail = |reason: String| ArtefactError::InvalidPluginId {
        value: value.to_owned(),
        reason,
    };
    if value.len() < MIN_PLUGIN_ID_LEN {
        return Err(fail(format!(
            "identifier must be at least {MIN_PLUGIN_ID_LEN} characters"
        )));
    }
    if let Some(bad) = value.chars().find(|c| {
        !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
    }) {
        return Err(fail(format!("character '{bad}' is not allowed")));
    }
    if !value.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(fail("identifier must start with a letter or digit".to_owned()));
    }
    Ok(())
}
