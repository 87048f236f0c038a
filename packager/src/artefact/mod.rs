//! Plugin artefact domain model.
//!
//! Everything here is pure data plus validation: the derived version, the
//! two names the plugin goes by, the filenames built from them, and the
//! manifest the wheel build hands to the packaging step.
//!
//! # Sub-modules
//!
//! - [`declaration`] - Reader for the setuptools-scm version file.
//! - [`error`] - Validation errors for artefact values.
//! - [`manifest`] - Wheel manifest schema (`WheelManifest`).
//! - [`names`] - Distribution and package name newtypes.
//! - [`naming`] - Wheel and `.deb` filename policy.
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`version`] - Derived version newtype (`PluginVersion`).

pub mod declaration;
pub mod error;
pub mod manifest;
pub mod names;
pub mod naming;
pub mod sha256_digest;
pub mod version;
