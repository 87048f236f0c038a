//! Version placeholder substitution.
//!
//! Templates are plain text with a literal token (by default `@VERSION@`)
//! standing in for the derived version. There is no escaping and no other
//! syntax: every occurrence is replaced, and a rendered file that still
//! contains the token is rejected.

use crate::artefact::version::PluginVersion;
use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use log::warn;
use std::fs;

/// Output of a substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered text.
    pub text: String,
    /// Number of placeholders replaced.
    pub replacements: usize,
}

/// Replace every occurrence of `placeholder` in `template` with `version`.
///
/// # Errors
///
/// Returns [`PackagerError::InvalidPlaceholder`] when `placeholder` is empty
/// or occurs inside the version itself, since either would make the
/// leftover check meaningless.
///
/// # Examples
///
/// ```
/// use kalinka_packager::artefact::version::PluginVersion;
/// use kalinka_packager::template::render;
///
/// let version = PluginVersion::try_from("1.2.3").expect("valid version");
/// let rendered = render("Version: @VERSION@\n", "@VERSION@", &version).expect("renders");
/// assert_eq!(rendered.text, "Version: 1.2.3\n");
/// assert_eq!(rendered.replacements, 1);
/// ```
pub fn render(template: &str, placeholder: &str, version: &PluginVersion) -> Result<Rendered> {
    if placeholder.is_empty() {
        return Err(PackagerError::InvalidPlaceholder {
            reason: "placeholder must not be empty".to_owned(),
        });
    }
    if version.as_str().contains(placeholder) {
        return Err(PackagerError::InvalidPlaceholder {
            reason: format!("placeholder {placeholder} occurs in version {version}"),
        });
    }
    Ok(Rendered {
        text: template.replace(placeholder, version.as_str()),
        replacements: template.matches(placeholder).count(),
    })
}

/// Render the template at `src` into `dest`.
///
/// A template without any placeholder is copied through unchanged with a
/// warning.
///
/// # Errors
///
/// Returns [`PackagerError::TemplateMissing`] when `src` does not exist,
/// [`PackagerError::UnresolvedPlaceholder`] when the output still contains
/// the placeholder, and the errors of [`render`].
pub fn render_file(
    src: &Utf8Path,
    dest: &Utf8Path,
    placeholder: &str,
    version: &PluginVersion,
) -> Result<usize> {
    if !src.is_file() {
        return Err(PackagerError::TemplateMissing {
            path: src.to_owned(),
        });
    }
    let template = fs::read_to_string(src)?;
    let rendered = render(&template, placeholder, version)?;
    if rendered.text.contains(placeholder) {
        return Err(PackagerError::UnresolvedPlaceholder {
            path: dest.to_owned(),
            placeholder: placeholder.to_owned(),
        });
    }
    if rendered.replacements == 0 {
        warn!("{src} contains no {placeholder}; copied unchanged");
    }
    fs::write(dest, rendered.text)?;
    Ok(rendered.replacements)
}
