//! Scratch directory handling.
//!
//! The dist and staging directories are owned exclusively by one build and
//! are wiped before anything is written to them, so files from an earlier
//! build can never leak into the next one. Because clearing is destructive,
//! a scratch directory must never hold the checkout, the templates or any
//! other scratch directory it does not own.

use crate::error::{PackagerError, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Delete `dir` if it exists and create it again, empty.
///
/// # Errors
///
/// Returns [`PackagerError::StagingFailed`] when `dir` is empty or a
/// filesystem root, or when it exists but is not a directory, and
/// [`PackagerError::Io`] when removal or creation fails.
pub fn recreate_dir(dir: &Utf8Path) -> Result<()> {
    let normal = normalise(dir);
    if normal.as_str().is_empty() || normal.parent().is_none() {
        return Err(PackagerError::StagingFailed {
            reason: format!("refusing to recreate \"{dir}\""),
        });
    }
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PackagerError::StagingFailed {
                reason: format!("{dir} exists and is not a directory"),
            });
        }
        debug!("clearing {dir}");
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Resolve `path` against `base` unless it is already absolute, folding
/// `.` and `..` components.
#[must_use]
pub fn resolve(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        normalise(path)
    } else {
        normalise(&base.join(path))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root; leading `..` of a relative path is
/// kept.
#[must_use]
pub fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match out.components().next_back() {
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_str()),
        }
    }
    out
}

/// Refuse `path` when it lies at or below `dir`.
///
/// Both sides are compared after normalisation, with the longest existing
/// ancestor canonicalised so symlinks cannot hide an overlap.
///
/// # Errors
///
/// Returns [`PackagerError::StagingFailed`] naming both roles when `path`
/// equals `dir` or is inside it.
pub fn ensure_not_inside(
    path: &Utf8Path,
    path_role: &str,
    dir: &Utf8Path,
    dir_role: &str,
) -> Result<()> {
    if effective(path).starts_with(effective(dir)) {
        return Err(PackagerError::StagingFailed {
            reason: format!("{path_role} {path} lies inside {dir_role} {dir}, which is cleared"),
        });
    }
    Ok(())
}

fn effective(path: &Utf8Path) -> Utf8PathBuf {
    let normal = normalise(path);
    for ancestor in normal.ancestors() {
        let Ok(canonical) = ancestor.canonicalize_utf8() else {
            continue;
        };
        return match normal.strip_prefix(ancestor) {
            Ok(rest) if !rest.as_str().is_empty() => canonical.join(rest),
            _ => canonical,
        };
    }
    normal
}

/// Return `dir` relative to the root of an installed filesystem.
///
/// A leading `/` is dropped. `None` when any remaining component is not a
/// plain name, since `..` or `.` would escape or alias the staged tree.
#[must_use]
pub fn install_relative(dir: &Utf8Path) -> Option<&Utf8Path> {
    let relative = dir.strip_prefix("/").unwrap_or(dir);
    relative
        .components()
        .all(|component| matches!(component, Utf8Component::Normal(_)))
        .then_some(relative)
}

/// List the names of regular files in `dir` ending with `extension`, sorted.
///
/// # Errors
///
/// Returns [`PackagerError::Io`] when the directory cannot be read and
/// [`PackagerError::NonUtf8Path`] for entries whose names are not UTF-8.
pub fn files_with_extension(dir: &Utf8Path, extension: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry
            .file_name()
            .into_string()
            .map_err(|raw| PackagerError::NonUtf8Path(raw.to_string_lossy().into_owned()))?;
        if name.ends_with(extension) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
