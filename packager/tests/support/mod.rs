//! Test support for packager behaviour tests.
//!
//! Provides a scratch plugin checkout with packaging templates and scripted
//! build-tool invocations that write what setuptools-scm and the build
//! frontend would.

use camino::Utf8PathBuf;
use kalinka_packager::config::PackagerConfig;
use kalinka_packager::error::PackagerError;
use kalinka_packager::test_utils::ExpectedCall;
use kalinka_packager::wheel::WheelBuildConfig;
use std::fs;
use tempfile::TempDir;

/// Control file template used by every scratch checkout.
pub const CONTROL_TEMPLATE: &str = "\
Package: kalinka-plugin-qobuz
Version: @VERSION@
Architecture: all
Maintainer: Kalinka Developers <dev@kalinka.invalid>
Depends: kalinka, python3 (>= 3.11), python3-pip
Description: Qobuz input plugin for Kalinka
 Streams albums and playlists from Qobuz.
";

/// Post-install template used by every scratch checkout.
pub const POSTINST_TEMPLATE: &str = "\
#!/bin/sh
set -e
pip3 install --no-deps /usr/share/kalinka/plugins/kalinka_plugin_qobuz-@VERSION@-py3-none-any.whl
echo \"kalinka-plugin-qobuz @VERSION@ installed\"
";

/// Pre-removal script used by every scratch checkout.
pub const PRERM_SCRIPT: &str = "\
#!/bin/sh
set -e
pip3 uninstall -y kalinka_plugin_qobuz || true
";

/// A plugin checkout in a temporary directory.
pub struct Checkout {
    _temp: TempDir,
    /// Canonical checkout root.
    pub root: Utf8PathBuf,
}

impl Checkout {
    /// Create a checkout holding the packaging templates.
    pub fn scratch() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .expect("utf8 path")
            .canonicalize_utf8()
            .expect("canonical path");
        let debian = root.join("debian");
        fs::create_dir_all(&debian).expect("mkdir debian");
        fs::create_dir_all(root.join("src/kalinka_plugin_qobuz")).expect("mkdir package");
        fs::write(debian.join("control.in"), CONTROL_TEMPLATE).expect("write control template");
        fs::write(debian.join("postinst.in"), POSTINST_TEMPLATE).expect("write postinst template");
        fs::write(debian.join("prerm"), PRERM_SCRIPT).expect("write prerm");
        Self { _temp: temp, root }
    }

    /// Resolve the default wheel build configuration for this checkout.
    pub fn wheel_config(&self) -> WheelBuildConfig {
        PackagerConfig::default().wheel_build(&self.root, None)
    }

    /// Expect a build that declares `version` and writes its wheel.
    pub fn build_call(&self, version: &str) -> ExpectedCall {
        self.build_call_writing(Some(version), vec![wheel_filename(version)])
    }

    /// Expect a build that writes the given version file and wheels.
    pub fn build_call_writing(&self, version: Option<&str>, wheels: Vec<String>) -> ExpectedCall {
        let config = self.wheel_config();
        let declaration = version.map(|v| format!("__version__ = version = '{v}'\n"));
        let version_file = config.version_file.clone();
        let dist = config.dist_dir.clone();
        ExpectedCall::succeeding("python3", build_args(&config)).with_effect(move |_| {
            if let Some(declaration) = &declaration {
                fs::write(&version_file, declaration)?;
            }
            for wheel in &wheels {
                fs::write(dist.join(wheel), format!("wheel {wheel}"))?;
            }
            Ok(())
        })
    }
}

/// Arguments of the build frontend invocation for `config`.
pub fn build_args(config: &WheelBuildConfig) -> Vec<String> {
    vec![
        "-m".to_owned(),
        "build".to_owned(),
        "--wheel".to_owned(),
        "--outdir".to_owned(),
        config.dist_dir.to_string(),
        config.source_dir.to_string(),
    ]
}

/// Wheel filename of the plugin at `version`.
pub fn wheel_filename(version: &str) -> String {
    format!("kalinka_plugin_qobuz-{version}-py3-none-any.whl")
}

/// Name of the error variant, for matching against feature file text.
pub fn error_kind(err: &PackagerError) -> &'static str {
    match err {
        PackagerError::ToolSpawn { .. } => "ToolSpawn",
        PackagerError::ToolFailed { .. } => "ToolFailed",
        PackagerError::VersionFileMissing { .. } => "VersionFileMissing",
        PackagerError::InvalidVersionFile { .. } => "InvalidVersionFile",
        PackagerError::NoWheelFound { .. } => "NoWheelFound",
        PackagerError::AmbiguousWheels { .. } => "AmbiguousWheels",
        PackagerError::ExpectedWheelMissing { .. } => "ExpectedWheelMissing",
        PackagerError::VersionMismatch { .. } => "VersionMismatch",
        PackagerError::DigestMismatch { .. } => "DigestMismatch",
        PackagerError::ManifestMissing { .. } => "ManifestMissing",
        PackagerError::InvalidManifest { .. } => "InvalidManifest",
        PackagerError::TemplateMissing { .. } => "TemplateMissing",
        PackagerError::UnresolvedPlaceholder { .. } => "UnresolvedPlaceholder",
        PackagerError::InvalidPlaceholder { .. } => "InvalidPlaceholder",
        PackagerError::ControlFieldMissing { .. } => "ControlFieldMissing",
        PackagerError::ControlMismatch { .. } => "ControlMismatch",
        PackagerError::StagingFailed { .. } => "StagingFailed",
        PackagerError::InvalidSourceDir { .. } => "InvalidSourceDir",
        PackagerError::Config { .. } => "Config",
        PackagerError::NonUtf8Path(_) => "NonUtf8Path",
        PackagerError::Artefact(_) => "Artefact",
        PackagerError::Serialization(_) => "Serialization",
        PackagerError::Io(_) => "Io",
        PackagerError::StubMismatch { .. } => "StubMismatch",
    }
}
