//! Wheel-then-package orchestration.
//!
//! Packaging always starts from a fresh wheel build; there is no way to
//! package a wheel left over from an earlier run.

use crate::deb::{DebConfig, DebOutput, DebPackager, resolve_wheel};
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::wheel::{WheelBuildConfig, WheelBuildOutput, WheelBuilder};

/// Artefacts of a full build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// The wheel build.
    pub wheel: WheelBuildOutput,
    /// The package build.
    pub deb: DebOutput,
}

/// Build the wheel, then package it.
///
/// # Errors
///
/// Returns [`crate::error::PackagerError::StagingFailed`] before anything
/// is built when the scratch directories overlap, then the first error
/// raised by either step. When the wheel build fails, packaging is not
/// attempted.
pub fn build_and_package(
    executor: &dyn CommandExecutor,
    wheel_config: &WheelBuildConfig,
    deb_config: &DebConfig,
) -> Result<PipelineOutput> {
    deb_config.check_layout(&wheel_config.dist_dir)?;
    let wheel = WheelBuilder::new(wheel_config, executor).build()?;
    let resolved = resolve_wheel(&wheel_config.dist_dir, &wheel_config.version_file)?;
    let deb = DebPackager::new(deb_config, executor).package(&resolved)?;
    Ok(PipelineOutput { wheel, deb })
}
