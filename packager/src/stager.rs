//! Staging of the Debian installation tree.
//!
//! The staged tree mirrors the installed filesystem plus the `DEBIAN`
//! metadata directory:
//!
//! ```text
//! <staging>/
//! ├── DEBIAN/
//! │   ├── control    (rendered, 0644)
//! │   ├── postinst   (rendered, 0755)
//! │   └── prerm      (verbatim, 0755)
//! └── usr/share/kalinka/plugins/
//!     └── kalinka_plugin_qobuz-<version>-py3-none-any.whl
//! ```

use crate::artefact::version::PluginVersion;
use crate::error::{PackagerError, Result};
use crate::template::render_file;
use crate::workdir::{install_relative, recreate_dir};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Name of the metadata directory inside the staged tree.
pub const DEBIAN_DIR: &str = "DEBIAN";

/// Mode of the control file.
pub const CONTROL_MODE: u32 = 0o644;

/// Mode of the maintainer scripts.
pub const SCRIPT_MODE: u32 = 0o755;

/// Locations of the packaging templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePaths {
    /// Control file template.
    pub control: Utf8PathBuf,
    /// Post-install script template.
    pub postinst: Utf8PathBuf,
    /// Pre-removal script, copied verbatim.
    pub prerm: Utf8PathBuf,
}

impl TemplatePaths {
    fn ensure_present(&self) -> Result<()> {
        for path in [&self.control, &self.postinst, &self.prerm] {
            if !path.is_file() {
                return Err(PackagerError::TemplateMissing { path: path.clone() });
            }
        }
        Ok(())
    }
}

/// Paths of a fully staged tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTree {
    /// Root of the tree handed to `dpkg-deb`.
    pub root: Utf8PathBuf,
    /// The wheel inside the tree.
    pub wheel: Utf8PathBuf,
    /// Rendered control file.
    pub control: Utf8PathBuf,
    /// Rendered post-install script.
    pub postinst: Utf8PathBuf,
    /// Copied pre-removal script.
    pub prerm: Utf8PathBuf,
}

/// Lays out the staging tree for one package build.
pub struct DebStager<'a> {
    staging_dir: &'a Utf8Path,
    wheel_install_dir: &'a Utf8Path,
    templates: &'a TemplatePaths,
    placeholder: &'a str,
}

impl<'a> DebStager<'a> {
    /// Create a stager writing under `staging_dir`.
    #[must_use]
    pub fn new(
        staging_dir: &'a Utf8Path,
        wheel_install_dir: &'a Utf8Path,
        templates: &'a TemplatePaths,
        placeholder: &'a str,
    ) -> Self {
        Self {
            staging_dir,
            wheel_install_dir,
            templates,
            placeholder,
        }
    }

    /// Stage `wheel` and the rendered metadata for `version`.
    ///
    /// Templates and the install dir are checked before the staging
    /// directory is touched, so a bad layout leaves any previous tree in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::TemplateMissing`] for an absent template,
    /// [`PackagerError::StagingFailed`] when the wheel install dir is not a
    /// plain relative path or the wheel cannot be copied, and
    /// the rendering and I/O errors of the individual steps.
    pub fn stage(&self, wheel: &Utf8Path, version: &PluginVersion) -> Result<StagedTree> {
        self.templates.ensure_present()?;
        let relative_install_dir = self.relative_install_dir()?;
        recreate_dir(self.staging_dir)?;

        let install_dir = self.staging_dir.join(relative_install_dir);
        fs::create_dir_all(&install_dir)?;
        let wheel_name = wheel.file_name().ok_or_else(|| PackagerError::StagingFailed {
            reason: format!("{wheel} has no file name"),
        })?;
        let staged_wheel = install_dir.join(wheel_name);
        fs::copy(wheel, &staged_wheel).map_err(|e| PackagerError::StagingFailed {
            reason: format!("failed to copy {wheel} to {staged_wheel}: {e}"),
        })?;
        debug!("staged {staged_wheel}");

        let debian = self.staging_dir.join(DEBIAN_DIR);
        fs::create_dir_all(&debian)?;
        let control = debian.join("control");
        let postinst = debian.join("postinst");
        let prerm = debian.join("prerm");

        render_file(&self.templates.control, &control, self.placeholder, version)?;
        render_file(&self.templates.postinst, &postinst, self.placeholder, version)?;
        fs::copy(&self.templates.prerm, &prerm)?;

        set_mode(&control, CONTROL_MODE)?;
        set_mode(&postinst, SCRIPT_MODE)?;
        set_mode(&prerm, SCRIPT_MODE)?;

        Ok(StagedTree {
            root: self.staging_dir.to_owned(),
            wheel: staged_wheel,
            control,
            postinst,
            prerm,
        })
    }

    fn relative_install_dir(&self) -> Result<&Utf8Path> {
        install_relative(self.wheel_install_dir).ok_or_else(|| PackagerError::StagingFailed {
            reason: format!(
                "wheel install dir {} leaves the staged tree",
                self.wheel_install_dir
            ),
        })
    }
}

#[cfg(unix)]
fn set_mode(path: &Utf8Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Utf8Path, _mode: u32) -> Result<()> {
    Ok(())
}
