//! Application configuration.
//!
//! Handles loading, validating, and merging `spotpin.toml`. A user file is
//! sparse: it is merged key-by-key on top of the stock defaults, so it only
//! needs the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [compression]
//! target_size_kb = 1000     # Files at or below this size are kept as-is
//! max_width = 1920          # Longest allowed output width
//! max_height = 1920         # Longest allowed output height
//! quality = 80              # JPEG quality (1-100)
//!
//! [gestures]
//! double_tap_ms = 300       # Window between two taps
//! double_tap_slop = 40.0    # Max distance between the two taps
//! tap_slop = 10.0           # Movement tolerated within a single tap
//! zoom_scale = 2.0          # Scale applied by a double-tap
//! max_scale = 4.0           # Upper pinch bound
//! swipe_threshold = 50.0    # Horizontal px needed to change image
//! long_press_ms = 500       # Hold duration on the map
//! long_press_jitter = 10.0  # Movement tolerated during a hold
//!
//! [carousel]
//! settle_ms = 150           # Quiet period before snapping a scrolled strip
//!
//! [upload]
//! key_prefix = "spots"
//! public_base_url = ""
//! max_file_size_mb = 10     # Larger picks are refused before compression
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILENAME: &str = "spotpin.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub compression: CompressionConfig,
    pub gestures: GestureConfig,
    pub carousel: CarouselConfig,
    pub upload: UploadConfig,
    pub processing: ProcessingConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.compression;
        if c.quality == 0 || c.quality > 100 {
            return Err(ConfigError::Validation(
                "compression.quality must be 1-100".into(),
            ));
        }
        if c.max_width == 0 || c.max_height == 0 {
            return Err(ConfigError::Validation(
                "compression.max_width and max_height must be non-zero".into(),
            ));
        }

        let g = &self.gestures;
        if !(g.max_scale > 1.0) {
            return Err(ConfigError::Validation(
                "gestures.max_scale must be greater than 1".into(),
            ));
        }
        if !(g.zoom_scale > 1.0 && g.zoom_scale <= g.max_scale) {
            return Err(ConfigError::Validation(
                "gestures.zoom_scale must be in (1, max_scale]".into(),
            ));
        }
        if g.swipe_threshold < 0.0
            || g.long_press_jitter < 0.0
            || g.tap_slop < 0.0
            || g.double_tap_slop < 0.0
        {
            return Err(ConfigError::Validation(
                "gestures thresholds must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Client-side image compression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Files at or below this many KiB skip re-encoding entirely.
    pub target_size_kb: u64,
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality in percent.
    pub quality: u32,
}

impl CompressionConfig {
    pub fn target_size_bytes(&self) -> u64 {
        self.target_size_kb * 1024
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_size_kb: 1000,
            max_width: 1920,
            max_height: 1920,
            quality: 80,
        }
    }
}

/// Touch gesture thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub double_tap_ms: u64,
    /// Largest distance between two taps that still pair into a double-tap.
    pub double_tap_slop: f64,
    /// Movement a contact may make and still count as a tap.
    pub tap_slop: f64,
    pub zoom_scale: f64,
    pub max_scale: f64,
    pub swipe_threshold: f64,
    pub long_press_ms: u64,
    pub long_press_jitter: f64,
}

impl GestureConfig {
    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }

    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_ms: 300,
            double_tap_slop: 40.0,
            tap_slop: 10.0,
            zoom_scale: 2.0,
            max_scale: 4.0,
            swipe_threshold: 50.0,
            long_press_ms: 500,
            long_press_jitter: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    pub settle_ms: u64,
}

impl CarouselConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self { settle_ms: 150 }
    }
}

/// Object storage naming and intake limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Key prefix for every stored object (`<prefix>/<millis>-<name>`).
    pub key_prefix: String,
    /// Base URL the stored keys are published under.
    pub public_base_url: String,
    pub max_file_size_mb: u64,
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            key_prefix: "spots".to_string(),
            public_base_url: String::new(),
            max_file_size_mb: 10,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never below one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Merge an optional overlay onto the defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return resolve_config(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `spotpin.toml` from the given directory.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILENAME))
}

/// Returns a fully-commented stock `spotpin.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# spotpin configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Image compression (runs before anything is uploaded)
# ---------------------------------------------------------------------------
[compression]
# Files at or below this size (KiB) are uploaded untouched.
target_size_kb = 1000

# Larger images are scaled down to fit inside max_width x max_height.
max_width = 1920
max_height = 1920

# JPEG quality used when re-encoding (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Touch gestures (lightbox and map)
# ---------------------------------------------------------------------------
[gestures]
# Two taps closer together than this (ms) count as a double-tap.
double_tap_ms = 300

# ...and no further apart than this (px).
double_tap_slop = 40.0

# A contact that moves further than this (px) is not a tap.
tap_slop = 10.0

# Scale a double-tap zooms to.
zoom_scale = 2.0

# Pinch zoom never goes beyond this scale.
max_scale = 4.0

# Horizontal travel (px) a swipe needs before it changes the image.
swipe_threshold = 50.0

# Holding one finger still on the map this long (ms) starts a new spot.
long_press_ms = 500

# Movement (px) allowed while holding before the long-press is cancelled.
long_press_jitter = 10.0

# ---------------------------------------------------------------------------
# Carousel
# ---------------------------------------------------------------------------
[carousel]
# Quiet period (ms) after the last scroll event before snapping to an image.
settle_ms = 150

# ---------------------------------------------------------------------------
# Upload
# ---------------------------------------------------------------------------
[upload]
# Objects are stored under <key_prefix>/<millis>-<filename>.
key_prefix = "spots"

# Public URL the stored keys are served from.
public_base_url = ""

# Picked files larger than this (MiB) are refused.
max_file_size_mb = 10

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compression workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
