//! Parser for the in-tree version-declaration file.
//!
//! setuptools-scm writes a small Python module next to the package sources
//! on every build. Depending on its version the file looks like either
//!
//! ```text
//! __version__ = version = '1.2.3'
//! __version_tuple__ = version_tuple = (1, 2, 3)
//! ```
//!
//! or, with type annotations,
//!
//! ```text
//! __version__: str
//! __version__ = version = '1.2.3'
//! ```
//!
//! Only the string literal on the first `__version__`/`version` assignment
//! is read; nothing is evaluated.

use super::version::PluginVersion;
use crate::error::{PackagerError, Result};
use camino::Utf8Path;
use std::fs;

/// Read the version recorded in the declaration file at `path`.
///
/// # Errors
///
/// Returns [`PackagerError::VersionFileMissing`] when the file does not
/// exist, [`PackagerError::InvalidVersionFile`] when it holds no version
/// assignment, and [`PackagerError::Artefact`] when the recorded version is
/// malformed.
pub fn read_version_file(path: &Utf8Path) -> Result<PluginVersion> {
    if !path.is_file() {
        return Err(PackagerError::VersionFileMissing {
            path: path.to_owned(),
        });
    }
    let contents = fs::read_to_string(path)?;
    let raw = parse_declaration(&contents).ok_or_else(|| PackagerError::InvalidVersionFile {
        path: path.to_owned(),
        reason: "no __version__ assignment found".to_owned(),
    })?;
    Ok(PluginVersion::try_from(raw)?)
}

/// Extract the version literal from declaration file contents.
#[must_use]
pub fn parse_declaration(contents: &str) -> Option<&str> {
    contents.lines().map(str::trim).find_map(version_literal)
}

fn version_literal(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("__version__")
        .or_else(|| line.strip_prefix("version"))?;
    // Annotation-only lines (`__version__: str`) carry no value.
    if !rest.trim_start().starts_with(['=', ':']) {
        return None;
    }
    let (_, value) = rest.rsplit_once('=')?;
    unquote(value.trim())
}

fn unquote(value: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|quote| {
        value
            .strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
    })
}
