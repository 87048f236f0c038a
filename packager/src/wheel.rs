//! Wheel build orchestration.
//!
//! Runs the Python build frontend against the plugin checkout and checks
//! that it left behind exactly the wheel its own version file describes.
//! The version itself is never computed here: setuptools-scm derives it from
//! the tag history while the frontend runs and records it in the version
//! file, and that file is the single source every later step reads.

use crate::artefact::declaration::read_version_file;
use crate::artefact::manifest::WheelManifest;
use crate::artefact::names::DistributionName;
use crate::artefact::naming::{WHEEL_EXTENSION, WheelName};
use crate::artefact::sha256_digest::compute_sha256;
use crate::artefact::version::PluginVersion;
use crate::error::{PackagerError, Result};
use crate::executor::{CommandExecutor, Invocation, ensure_success};
use crate::workdir::{ensure_not_inside, files_with_extension, recreate_dir};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;

/// Environment variable through which setuptools-scm accepts an override.
pub const PRETEND_VERSION_ENV: &str = "SETUPTOOLS_SCM_PRETEND_VERSION";

/// Resolved settings for one wheel build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelBuildConfig {
    /// Root of the plugin checkout.
    pub source_dir: Utf8PathBuf,
    /// Directory receiving the wheel and manifest; wiped before the build.
    pub dist_dir: Utf8PathBuf,
    /// Version file written by setuptools-scm.
    pub version_file: Utf8PathBuf,
    /// Expected distribution name.
    pub distribution: DistributionName,
    /// Python interpreter running the build frontend.
    pub python: String,
    /// Version forced on setuptools-scm, if any.
    pub pretend_version: Option<String>,
}

/// Artefacts of a successful wheel build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelBuildOutput {
    /// Manifest describing the wheel.
    pub manifest: WheelManifest,
    /// Path to the wheel.
    pub wheel_path: Utf8PathBuf,
    /// Path to the written manifest.
    pub manifest_path: Utf8PathBuf,
}

impl WheelBuildOutput {
    /// Return the version the wheel was built at.
    #[must_use]
    pub fn version(&self) -> &PluginVersion {
        &self.manifest.version
    }
}

/// Builds the plugin wheel through a [`CommandExecutor`].
pub struct WheelBuilder<'a> {
    config: &'a WheelBuildConfig,
    executor: &'a dyn CommandExecutor,
}

impl<'a> WheelBuilder<'a> {
    /// Create a builder for `config`.
    #[must_use]
    pub fn new(config: &'a WheelBuildConfig, executor: &'a dyn CommandExecutor) -> Self {
        Self { config, executor }
    }

    /// Build the wheel and write its manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingFailed`] when clearing the dist
    /// directory would remove the checkout or the version file,
    /// [`PackagerError::ToolFailed`] or [`PackagerError::ToolSpawn`]
    /// when the frontend fails, [`PackagerError::VersionFileMissing`] when it
    /// wrote no version file, the wheel location errors of [`locate_wheel`],
    /// and I/O or serialization errors while writing the manifest.
    pub fn build(&self) -> Result<WheelBuildOutput> {
        let config = self.config;
        if let Some(pretend) = &config.pretend_version {
            PluginVersion::try_from(pretend.as_str())?;
        }

        ensure_not_inside(&config.source_dir, "checkout", &config.dist_dir, "dist directory")?;
        ensure_not_inside(
            &config.version_file,
            "version file",
            &config.dist_dir,
            "dist directory",
        )?;
        recreate_dir(&config.dist_dir)?;
        if config.version_file.is_file() {
            debug!("removing stale {}", config.version_file);
            fs::remove_file(&config.version_file)?;
        }

        let invocation = self.invocation();
        info!("building wheel in {}", config.source_dir);
        debug!("running {invocation}");
        let output = self.executor.run(&invocation)?;
        ensure_success(&config.python, &output)?;

        let version = read_version_file(&config.version_file)?;
        debug!("build tool declared version {version}");
        let expected = WheelName::new(config.distribution.clone(), version);
        let wheel_path = locate_wheel(&config.dist_dir, &expected)?;

        let sha256 = compute_sha256(&wheel_path)?;
        let manifest = WheelManifest::new(&expected, sha256);
        let manifest_path = manifest.write_to(&config.dist_dir)?;
        info!("built {wheel_path}");

        Ok(WheelBuildOutput {
            manifest,
            wheel_path,
            manifest_path,
        })
    }

    /// Describe the frontend invocation for this build.
    #[must_use]
    pub fn invocation(&self) -> Invocation {
        let config = self.config;
        let invocation = Invocation::new(config.python.as_str())
            .args(["-m", "build", "--wheel", "--outdir"])
            .arg(config.dist_dir.as_str())
            .arg(config.source_dir.as_str())
            .current_dir(&config.source_dir);
        match &config.pretend_version {
            Some(version) => invocation.env(PRETEND_VERSION_ENV, version.as_str()),
            None => invocation,
        }
    }
}

/// Find the wheel named `expected` in `dist_dir`.
///
/// The directory must hold exactly one wheel and it must be the expected
/// one. A lone wheel of the same distribution at another version is reported
/// as a version mismatch.
///
/// # Errors
///
/// Returns [`PackagerError::NoWheelFound`], [`PackagerError::AmbiguousWheels`],
/// [`PackagerError::VersionMismatch`] or
/// [`PackagerError::ExpectedWheelMissing`].
pub fn locate_wheel(dist_dir: &Utf8Path, expected: &WheelName) -> Result<Utf8PathBuf> {
    let candidates = files_with_extension(dist_dir, WHEEL_EXTENSION)?;
    match candidates.as_slice() {
        [] => Err(PackagerError::NoWheelFound {
            dir: dist_dir.to_owned(),
        }),
        [only] if *only == expected.filename() => Ok(dist_dir.join(only)),
        [only] => Err(mismatch_for(only, expected).unwrap_or_else(|| {
            PackagerError::ExpectedWheelMissing {
                expected: expected.filename(),
                candidates: candidates.clone(),
            }
        })),
        _ => Err(PackagerError::AmbiguousWheels {
            dir: dist_dir.to_owned(),
            candidates,
        }),
    }
}

fn mismatch_for(candidate: &str, expected: &WheelName) -> Option<PackagerError> {
    let found = WheelName::parse(candidate).ok()?;
    (found.distribution() == expected.distribution() && found.version() != expected.version())
        .then(|| PackagerError::VersionMismatch {
            expected_source: "version file",
            expected: expected.version().to_string(),
            found_source: "wheel filename",
            found: found.version().to_string(),
        })
}

#[cfg(test)]
#[path = "wheel_tests.rs"]
mod tests;
