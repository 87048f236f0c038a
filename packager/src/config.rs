//! Packager configuration loaded from `kalinka-packager.toml`.
//!
//! Settings live at the root of the plugin checkout, split into a `[wheel]`
//! and a `[deb]` table. Every field has a default matching the Qobuz plugin
//! layout, so the file is optional; command-line flags override whatever it
//! provides. Relative paths resolve against the checkout root.

use crate::artefact::names::{DistributionName, PluginId};
use crate::deb::DebConfig;
use crate::error::{PackagerError, Result};
use crate::stager::TemplatePaths;
use crate::wheel::WheelBuildConfig;
use crate::workdir::{install_relative, resolve};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

/// Filename looked up in the checkout root when no `--config` is given.
pub const CONFIG_FILENAME: &str = "kalinka-packager.toml";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Wheel build settings.
    pub wheel: WheelSettings,
    /// Debian packaging settings.
    pub deb: DebSettings,
}

/// Settings for the wheel build step.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WheelSettings {
    /// Distribution name used in the wheel filename.
    pub distribution: DistributionName,
    /// Version-declaration file written by setuptools-scm.
    pub version_file: Utf8PathBuf,
    /// Python interpreter that runs `-m build`.
    pub python: String,
    /// Output directory for the wheel and its manifest.
    pub dist_dir: Utf8PathBuf,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            distribution: DistributionName::default(),
            version_file: Utf8PathBuf::from("src/kalinka_plugin_qobuz/_version.py"),
            python: "python3".to_owned(),
            dist_dir: Utf8PathBuf::from("dist"),
        }
    }
}

/// Settings for the Debian packaging step.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DebSettings {
    /// Debian package name.
    pub plugin_id: PluginId,
    /// Scratch directory holding the staged installation tree.
    pub staging_dir: Utf8PathBuf,
    /// Directory receiving the `.deb`.
    pub output_dir: Utf8PathBuf,
    /// Where the wheel lands inside the installed filesystem.
    pub wheel_install_dir: Utf8PathBuf,
    /// Token replaced by the version in the templates.
    pub placeholder: String,
    /// Control file template.
    pub control_template: Utf8PathBuf,
    /// Post-install script template.
    pub postinst_template: Utf8PathBuf,
    /// Pre-removal script, copied verbatim.
    pub prerm_script: Utf8PathBuf,
    /// Package assembly tool.
    pub deb_tool: String,
}

impl Default for DebSettings {
    fn default() -> Self {
        Self {
            plugin_id: PluginId::default(),
            staging_dir: Utf8PathBuf::from("build/deb"),
            output_dir: Utf8PathBuf::from("dist"),
            wheel_install_dir: Utf8PathBuf::from("usr/share/kalinka/plugins"),
            placeholder: "@VERSION@".to_owned(),
            control_template: Utf8PathBuf::from("debian/control.in"),
            postinst_template: Utf8PathBuf::from("debian/postinst.in"),
            prerm_script: Utf8PathBuf::from("debian/prerm"),
            deb_tool: "dpkg-deb".to_owned(),
        }
    }
}

impl PackagerConfig {
    /// Load configuration for the checkout at `source_dir`.
    ///
    /// With `explicit` set, that file must exist. Otherwise
    /// `<source_dir>/kalinka-packager.toml` is read when present and
    /// defaults are used when it is not.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] when an explicit file is missing or
    /// when a file cannot be read or parsed.
    pub fn load(source_dir: &Utf8Path, explicit: Option<&Utf8Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                let path = resolve(source_dir, path);
                if !path.is_file() {
                    return Err(PackagerError::Config {
                        path,
                        reason: "file not found".to_owned(),
                    });
                }
                path
            }
            None => {
                let path = source_dir.join(CONFIG_FILENAME);
                if !path.is_file() {
                    log::debug!("no {CONFIG_FILENAME} in {source_dir}; using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::from_file(&path)
    }

    /// Parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] on read or parse failure, and when
    /// `wheel_install_dir` would leave the staged tree.
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| PackagerError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| PackagerError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        if install_relative(&config.deb.wheel_install_dir).is_none() {
            return Err(PackagerError::Config {
                path: path.to_owned(),
                reason: format!(
                    "wheel_install_dir \"{}\" must name a directory inside the package",
                    config.deb.wheel_install_dir
                ),
            });
        }
        Ok(config)
    }

    /// Resolve the wheel build configuration for the checkout at
    /// `source_dir`.
    #[must_use]
    pub fn wheel_build(
        &self,
        source_dir: &Utf8Path,
        pretend_version: Option<String>,
    ) -> WheelBuildConfig {
        WheelBuildConfig {
            source_dir: source_dir.to_owned(),
            dist_dir: resolve(source_dir, &self.wheel.dist_dir),
            version_file: resolve(source_dir, &self.wheel.version_file),
            distribution: self.wheel.distribution.clone(),
            python: self.wheel.python.clone(),
            pretend_version,
        }
    }

    /// Resolve the Debian packaging configuration for the checkout at
    /// `source_dir`.
    #[must_use]
    pub fn deb_package(&self, source_dir: &Utf8Path) -> DebConfig {
        let deb = &self.deb;
        DebConfig {
            source_dir: source_dir.to_owned(),
            plugin_id: deb.plugin_id.clone(),
            staging_dir: resolve(source_dir, &deb.staging_dir),
            output_dir: resolve(source_dir, &deb.output_dir),
            wheel_install_dir: deb.wheel_install_dir.clone(),
            placeholder: deb.placeholder.clone(),
            templates: TemplatePaths {
                control: resolve(source_dir, &deb.control_template),
                postinst: resolve(source_dir, &deb.postinst_template),
                prerm: resolve(source_dir, &deb.prerm_script),
            },
            deb_tool: deb.deb_tool.clone(),
        }
    }
}
