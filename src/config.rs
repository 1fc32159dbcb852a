//! Gallery configuration module.
//!
//! Handles loading, validating, and merging the optional `--config` TOML file,
//! and resolving which storage medium a run targets from the CLI options.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Photo gallery"   # Homepage title
//!
//! [thumbnail]
//! width = 360               # Cover-fit box; also names pics/resized/<w>x<h>/
//! height = 225
//!
//! [large]
//! width = 1200              # Nominal: only used in the directory label
//! height = 750              # Enforced; width follows the aspect ratio
//!
//! [images]
//! quality = 90              # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 1         # Parallel resize workers (1 = sequential)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! title = "Summer 2024"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, VariantSpec};
use crate::storage::S3Settings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storj DCS S3-compatible gateway.
pub const DEFAULT_ENDPOINT: &str = "https://gateway.storjshare.io";
pub const DEFAULT_REGION: &str = "global";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Missing required option: {0}")]
    MissingOption(String),
    #[error("Invalid access credential: {0}")]
    InvalidCredential(String),
}

/// Gallery configuration loaded from `--config`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Homepage title.
    pub title: String,
    /// Thumbnail box (cover-fit crop).
    pub thumbnail: SizeConfig,
    /// Large variant box (height enforced).
    pub large: SizeConfig,
    /// Encoding settings.
    pub images: ImagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Photo gallery".to_string(),
            thumbnail: SizeConfig {
                width: 360,
                height: 225,
            },
            large: SizeConfig {
                width: 1200,
                height: 750,
            },
            images: ImagesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, size) in [("thumbnail", &self.thumbnail), ("large", &self.large)] {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.width and {name}.height must be non-zero"
                )));
            }
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_processes == 0 {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn thumbnail_spec(&self) -> VariantSpec {
        VariantSpec::thumbnail(self.thumbnail.width, self.thumbnail.height)
    }

    pub fn large_spec(&self) -> VariantSpec {
        VariantSpec::large(self.large.width, self.large.height)
    }

    /// Variants rendered for every picture, in write order.
    pub fn variant_specs(&self) -> [VariantSpec; 2] {
        [self.thumbnail_spec(), self.large_spec()]
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.images.quality)
    }
}

/// A target box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG encoding quality (1 = worst, 100 = best). Lossless formats ignore it.
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of pictures resized at once within an album.
    /// Values larger than the core count are clamped down.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { max_processes: 1 }
    }
}

/// Resolve the effective thread count from config.
///
/// `min(max_processes, cores)`, never below 1. The user can constrain down, not up.
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.clamp(1, cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the gallery config.
///
/// `None` yields the stock defaults. A given path must exist; its values are
/// merged on top of the defaults, unknown keys are rejected and the result is
/// validated.
pub fn load_config(path: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# picsite Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass this file with `picsite --config <FILE> generate ...`.
# Unknown keys will cause an error.

# Title shown on the homepage.
title = "Photo gallery"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Every picture is scaled to cover this box and center-cropped to it.
# Written to pics/resized/<width>x<height>/<album>/<picture>.
width = 360
height = 225

# ---------------------------------------------------------------------------
# Large variant
# ---------------------------------------------------------------------------
[large]
# Only the height is enforced; the width follows the picture's aspect ratio.
# The width still appears in the directory name: pics/resized/1200x750/...
width = 1200
height = 750

# ---------------------------------------------------------------------------
# Encoding
# ---------------------------------------------------------------------------
[images]
# JPEG encoding quality (1 = worst, 100 = best).
# Other formats are re-encoded losslessly in their own format.
quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum pictures resized at once within an album.
# 1 keeps the run strictly sequential. Clamped to the number of CPU cores.
max_processes = 1
"##
}

// =============================================================================
// Storage target
// =============================================================================

/// Where a run reads originals from and writes the site to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    Local { root: PathBuf },
    Remote(S3Settings),
}

/// Raw storage options as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    pub root: Option<PathBuf>,
    pub access: Option<String>,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

impl StorageOptions {
    /// Pick exactly one backend.
    ///
    /// `root` selects the local backend. `access` + `bucket` select the remote
    /// one. Mixing the two, or giving only half of the remote pair, is an error.
    pub fn resolve(self) -> Result<StorageTarget, ConfigError> {
        let remote_given = self.access.is_some()
            || self.bucket.is_some()
            || self.endpoint.is_some()
            || self.region.is_some();

        match (self.root, remote_given) {
            (Some(_), true) => Err(ConfigError::Validation(
                "--root cannot be combined with remote storage options".into(),
            )),
            (Some(root), false) => Ok(StorageTarget::Local { root }),
            (None, false) => Err(ConfigError::MissingOption(
                "--root, or --access and --bucket".into(),
            )),
            (None, true) => {
                let access = self
                    .access
                    .ok_or_else(|| ConfigError::MissingOption("--access".into()))?;
                let bucket = self
                    .bucket
                    .ok_or_else(|| ConfigError::MissingOption("--bucket".into()))?;
                if bucket.is_empty() {
                    return Err(ConfigError::MissingOption("--bucket".into()));
                }
                let credential = AccessCredential::parse(&access)?;
                Ok(StorageTarget::Remote(S3Settings {
                    access_key_id: credential.access_key_id,
                    secret_access_key: credential.secret_access_key,
                    bucket,
                    endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                    region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
                }))
            }
        }
    }
}

/// S3 credential pair given as `ACCESS_KEY_ID:SECRET_ACCESS_KEY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCredential {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AccessCredential {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (id, secret) = raw.split_once(':').ok_or_else(|| {
            ConfigError::InvalidCredential("expected ACCESS_KEY_ID:SECRET_ACCESS_KEY".into())
        })?;
        if id.is_empty() || secret.is_empty() {
            return Err(ConfigError::InvalidCredential(
                "access key id and secret must both be non-empty".into(),
            ));
        }
        Ok(Self {
            access_key_id: id.to_string(),
            secret_access_key: secret.to_string(),
        })
    }
}
