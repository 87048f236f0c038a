//! Kalinka plugin packager library.
//!
//! Builds the `kalinka-plugin-qobuz` wheel with the Python build frontend and
//! wraps it in an architecture-independent Debian package. The version is
//! never typed in by hand: setuptools-scm derives it from the checkout's tags
//! during the wheel build and every later step reads it back from what that
//! build left behind.
//!
//! # Modules
//!
//! - [`artefact`] - Versions, names, filenames and the wheel manifest
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `kalinka-packager.toml` loading and path resolution
//! - [`control`] - Checks on the rendered Debian control file
//! - [`deb`] - Debian package assembly
//! - [`error`] - Error taxonomy shared by every step
//! - [`executor`] - External tool invocation seam
//! - [`logging`] - Diagnostic output initialisation
//! - [`pipeline`] - Wheel-then-package orchestration
//! - [`stager`] - Staged installation tree layout
//! - [`template`] - Version placeholder substitution
//! - [`wheel`] - Wheel build and manifest emission
//! - [`workdir`] - Scratch directory handling

pub mod artefact;
pub mod cli;
pub mod config;
pub mod control;
pub mod deb;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod stager;
pub mod template;
pub mod wheel;
pub mod workdir;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
