//! Debian package assembly.
//!
//! Packaging consumes the output of a wheel build: the manifest names the
//! wheel and its version, the version file is re-read as an independent
//! witness, and the wheel filename is parsed as a third. All three must
//! agree before anything is staged.
//!
//! `dpkg-deb` writes to a `.partial` path next to the final package and the
//! result is renamed into place only once the tool has succeeded, so the
//! final path only ever holds a complete package.

use crate::artefact::declaration::read_version_file;
use crate::artefact::manifest::WheelManifest;
use crate::artefact::names::PluginId;
use crate::artefact::naming::{DebName, WHEEL_EXTENSION, WheelName};
use crate::artefact::sha256_digest::{Sha256Digest, compute_sha256};
use crate::artefact::version::PluginVersion;
use crate::control::verify_control;
use crate::error::{PackagerError, Result};
use crate::executor::{CommandExecutor, Invocation, ensure_success};
use crate::stager::{DebStager, StagedTree, TemplatePaths};
use crate::workdir::{ensure_not_inside, files_with_extension};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::fs;

/// Suffix of the in-progress package file.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Resolved settings for one package build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebConfig {
    /// Root of the plugin checkout.
    pub source_dir: Utf8PathBuf,
    /// Debian package name.
    pub plugin_id: PluginId,
    /// Staging tree root; wiped before staging.
    pub staging_dir: Utf8PathBuf,
    /// Directory receiving the package.
    pub output_dir: Utf8PathBuf,
    /// Wheel location inside the installed filesystem.
    pub wheel_install_dir: Utf8PathBuf,
    /// Version placeholder used by the templates.
    pub placeholder: String,
    /// Packaging templates.
    pub templates: TemplatePaths,
    /// Package assembly tool.
    pub deb_tool: String,
}

impl DebConfig {
    /// Check that clearing the staging tree cannot destroy anything else.
    ///
    /// The staging directory must not hold the checkout, a template, the
    /// output directory or `dist_dir`, and must not sit inside `dist_dir`,
    /// which the wheel build clears.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingFailed`] naming the overlapping
    /// directories.
    pub fn check_layout(&self, dist_dir: &Utf8Path) -> Result<()> {
        let staging = self.staging_dir.as_path();
        let role = "staging directory";
        ensure_not_inside(&self.source_dir, "checkout", staging, role)?;
        for template in [
            &self.templates.control,
            &self.templates.postinst,
            &self.templates.prerm,
        ] {
            ensure_not_inside(template, "template", staging, role)?;
        }
        ensure_not_inside(dist_dir, "dist directory", staging, role)?;
        ensure_not_inside(staging, role, dist_dir, "dist directory")?;
        ensure_not_inside(&self.output_dir, "output directory", staging, role)
    }
}

/// A wheel whose version has been confirmed by every available source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWheel {
    /// Path to the wheel.
    pub path: Utf8PathBuf,
    /// Agreed version.
    pub version: PluginVersion,
    /// Manifest the wheel was resolved from.
    pub manifest: WheelManifest,
}

/// Result of a successful package build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebOutput {
    /// Path to the package.
    pub path: Utf8PathBuf,
    /// Package filename components.
    pub name: DebName,
    /// SHA-256 digest of the package.
    pub sha256: Sha256Digest,
}

/// Resolve the wheel recorded in `dist_dir` against the version file.
///
/// # Errors
///
/// Returns [`PackagerError::VersionFileMissing`] when the version file is
/// absent, the manifest errors of [`WheelManifest::read_from`],
/// [`PackagerError::VersionMismatch`] when the version file, manifest and
/// wheel filename disagree, [`PackagerError::ExpectedWheelMissing`] when the
/// recorded wheel is absent and [`PackagerError::DigestMismatch`] when it
/// changed after the manifest was written.
pub fn resolve_wheel(dist_dir: &Utf8Path, version_file: &Utf8Path) -> Result<ResolvedWheel> {
    let declared = read_version_file(version_file)?;
    let manifest = WheelManifest::read_from(dist_dir)?;
    ensure_same_version("version file", &declared, "wheel manifest", &manifest.version)?;
    let parsed = WheelName::parse(&manifest.filename)?;
    ensure_same_version("version file", &declared, "wheel filename", parsed.version())?;

    let path = manifest.wheel_path(dist_dir);
    if !path.is_file() {
        return Err(PackagerError::ExpectedWheelMissing {
            expected: manifest.filename.clone(),
            candidates: files_with_extension(dist_dir, WHEEL_EXTENSION)?,
        });
    }
    let found = compute_sha256(&path)?;
    if found != manifest.sha256 {
        return Err(PackagerError::DigestMismatch {
            path,
            expected: manifest.sha256.to_string(),
            found: found.to_string(),
        });
    }

    Ok(ResolvedWheel {
        path,
        version: declared,
        manifest,
    })
}

fn ensure_same_version(
    expected_source: &'static str,
    expected: &PluginVersion,
    found_source: &'static str,
    found: &PluginVersion,
) -> Result<()> {
    if expected == found {
        return Ok(());
    }
    Err(PackagerError::VersionMismatch {
        expected_source,
        expected: expected.to_string(),
        found_source,
        found: found.to_string(),
    })
}

/// Assembles the Debian package through a [`CommandExecutor`].
pub struct DebPackager<'a> {
    config: &'a DebConfig,
    executor: &'a dyn CommandExecutor,
}

impl<'a> DebPackager<'a> {
    /// Create a packager for `config`.
    #[must_use]
    pub fn new(config: &'a DebConfig, executor: &'a dyn CommandExecutor) -> Self {
        Self { config, executor }
    }

    /// Stage `wheel` and assemble the package.
    ///
    /// # Errors
    ///
    /// Returns the layout, staging and control check errors, the tool errors of
    /// [`ensure_success`] and I/O errors while moving the package into
    /// place. No package is left at the final path on failure.
    pub fn package(&self, wheel: &ResolvedWheel) -> Result<DebOutput> {
        let config = self.config;
        let version = &wheel.version;
        let name = DebName::new(config.plugin_id.clone(), version.clone());
        if let Some(dist_dir) = wheel.path.parent() {
            config.check_layout(dist_dir)?;
        }

        info!("staging {} {version}", config.plugin_id);
        let tree = DebStager::new(
            &config.staging_dir,
            &config.wheel_install_dir,
            &config.templates,
            &config.placeholder,
        )
        .stage(&wheel.path, version)?;
        verify_control(&tree.control, &config.plugin_id, version)?;

        fs::create_dir_all(&config.output_dir)?;
        let path = config.output_dir.join(name.filename());
        let partial = Utf8PathBuf::from(format!("{path}{PARTIAL_SUFFIX}"));
        remove_if_present(&path)?;
        remove_if_present(&partial)?;

        if let Err(err) = self.assemble(&tree, &partial, &path) {
            if let Err(cleanup) = remove_if_present(&partial) {
                warn!("failed to remove {partial}: {cleanup}");
            }
            return Err(err);
        }

        let sha256 = compute_sha256(&path)?;
        info!("built {path}");
        Ok(DebOutput { path, name, sha256 })
    }

    /// Describe the assembly invocation writing `tree` to `dest`.
    #[must_use]
    pub fn invocation(&self, tree: &Utf8Path, dest: &Utf8Path) -> Invocation {
        Invocation::new(self.config.deb_tool.as_str())
            .args(["--root-owner-group", "--build"])
            .arg(tree.as_str())
            .arg(dest.as_str())
    }

    fn assemble(&self, tree: &StagedTree, partial: &Utf8Path, path: &Utf8Path) -> Result<()> {
        let invocation = self.invocation(&tree.root, partial);
        debug!("running {invocation}");
        let output = self.executor.run(&invocation)?;
        ensure_success(&self.config.deb_tool, &output)?;
        if !partial.is_file() {
            return Err(PackagerError::StagingFailed {
                reason: format!("{} reported success but wrote no {partial}", self.config.deb_tool),
            });
        }
        fs::rename(partial, path)?;
        Ok(())
    }
}

fn remove_if_present(path: &Utf8Path) -> Result<()> {
    if path.is_file() {
        debug!("removing {path}");
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "deb_tests.rs"]
mod tests;
