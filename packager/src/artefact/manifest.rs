//! Wheel manifest written by the wheel build and consumed by packaging.
//!
//! The manifest records which wheel the build produced and at what version,
//! so the packaging step does not have to rediscover the version by pattern
//! matching on filenames:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "distribution": "kalinka_plugin_qobuz",
//!   "version": "1.2.3",
//!   "filename": "kalinka_plugin_qobuz-1.2.3-py3-none-any.whl",
//!   "sha256": "..."
//! }
//! ```

use super::names::DistributionName;
use super::naming::WheelName;
use super::sha256_digest::Sha256Digest;
use super::version::PluginVersion;
use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;

/// Filename of the manifest inside the dist directory.
pub const MANIFEST_FILENAME: &str = "wheel-manifest.json";

/// Schema version written by this build of the packager.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Description of the wheel produced by a wheel build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WheelManifest {
    /// Manifest schema version.
    pub schema_version: u32,
    /// Normalised distribution name.
    pub distribution: DistributionName,
    /// Version declared by the build tool.
    pub version: PluginVersion,
    /// Wheel filename, relative to the dist directory.
    pub filename: String,
    /// SHA-256 digest of the wheel.
    pub sha256: Sha256Digest,
}

impl WheelManifest {
    /// Describe a wheel with the current schema version.
    #[must_use]
    pub fn new(name: &WheelName, sha256: Sha256Digest) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            distribution: name.distribution().clone(),
            version: name.version().clone(),
            filename: name.filename(),
            sha256,
        }
    }

    /// Return the manifest path inside `dist_dir`.
    #[must_use]
    pub fn path_in(dist_dir: &Utf8Path) -> Utf8PathBuf {
        dist_dir.join(MANIFEST_FILENAME)
    }

    /// Return the wheel path inside `dist_dir`.
    #[must_use]
    pub fn wheel_path(&self, dist_dir: &Utf8Path) -> Utf8PathBuf {
        dist_dir.join(&self.filename)
    }

    /// Write the manifest into `dist_dir`.
    ///
    /// The JSON is written to a temporary file in the same directory and
    /// renamed into place, so readers never observe a half-written manifest.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Serialization`] or [`PackagerError::Io`].
    pub fn write_to(&self, dist_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let path = Self::path_in(dist_dir);
        let json = serde_json::to_string_pretty(self)?;
        let mut temp = tempfile::NamedTempFile::new_in(dist_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.persist(&path).map_err(|e| PackagerError::Io(e.error))?;
        Ok(path)
    }

    /// Read and validate the manifest from `dist_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ManifestMissing`] when absent and
    /// [`PackagerError::InvalidManifest`] when the JSON is malformed, carries
    /// an unsupported schema version or names a file that is not the wheel
    /// for the recorded distribution and version.
    pub fn read_from(dist_dir: &Utf8Path) -> Result<Self> {
        let path = Self::path_in(dist_dir);
        if !path.is_file() {
            return Err(PackagerError::ManifestMissing { path });
        }
        let contents = fs::read_to_string(&path)?;
        let manifest: Self =
            serde_json::from_str(&contents).map_err(|e| PackagerError::InvalidManifest {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        manifest.validate(&path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Utf8Path) -> Result<()> {
        if self.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(PackagerError::InvalidManifest {
                path: path.to_owned(),
                reason: format!(
                    "unsupported schema version {}; expected {CURRENT_SCHEMA_VERSION}",
                    self.schema_version
                ),
            });
        }
        let expected = WheelName::new(self.distribution.clone(), self.version.clone());
        if expected.filename() != self.filename {
            return Err(PackagerError::InvalidManifest {
                path: path.to_owned(),
                reason: format!(
                    "filename {} does not match {}",
                    self.filename,
                    expected.filename()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct DistDir {
        _temp: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn dist() -> DistDir {
        let temp = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
        DistDir { _temp: temp, path }
    }

    fn sample_manifest() -> WheelManifest {
        let name = WheelName::new(
            DistributionName::try_from("kalinka_plugin_qobuz").expect("valid name"),
            PluginVersion::try_from("1.2.3").expect("valid version"),
        );
        WheelManifest::new(
            &name,
            Sha256Digest::try_from("a".repeat(64)).expect("valid digest"),
        )
    }

    #[rstest]
    fn write_then_read_preserves_fields(dist: DistDir) {
        let manifest = sample_manifest();
        let path = manifest.write_to(&dist.path).expect("write manifest");
        assert!(path.ends_with(MANIFEST_FILENAME));

        let loaded = WheelManifest::read_from(&dist.path).expect("read manifest");
        assert_eq!(loaded, manifest);
        assert_eq!(
            loaded.wheel_path(&dist.path),
            dist.path.join("kalinka_plugin_qobuz-1.2.3-py3-none-any.whl")
        );
    }

    #[rstest]
    fn read_reports_missing_manifest(dist: DistDir) {
        let err = WheelManifest::read_from(&dist.path).expect_err("manifest is absent");
        assert!(matches!(err, PackagerError::ManifestMissing { .. }));
    }

    #[rstest]
    fn read_rejects_malformed_json(dist: DistDir) {
        fs::write(WheelManifest::path_in(&dist.path), "{ not json").expect("write");
        let err = WheelManifest::read_from(&dist.path).expect_err("manifest is malformed");
        assert!(matches!(err, PackagerError::InvalidManifest { .. }));
    }

    #[rstest]
    fn read_rejects_future_schema(dist: DistDir) {
        let manifest = WheelManifest {
            schema_version: 2,
            ..sample_manifest()
        };
        manifest.write_to(&dist.path).expect("write manifest");
        let err = WheelManifest::read_from(&dist.path).expect_err("schema is unsupported");
        assert!(err.to_string().contains("schema version 2"));
    }

    #[rstest]
    fn read_rejects_filename_that_disagrees_with_version(dist: DistDir) {
        let manifest = WheelManifest {
            filename: "kalinka_plugin_qobuz-1.2.2-py3-none-any.whl".to_owned(),
            ..sample_manifest()
        };
        manifest.write_to(&dist.path).expect("write manifest");
        let err = WheelManifest::read_from(&dist.path).expect_err("filename disagrees");
        assert!(matches!(err, PackagerError::InvalidManifest { .. }));
    }
}
