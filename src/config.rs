//! Gallery configuration module.
//!
//! Handles loading and validating `photoroll.toml` files. Every value has a
//! stock default, so a config file only needs the keys it wants to override.
//! Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [grid]
//! min_columns = 1           # Fewest grid columns a pinch can reach
//! max_columns = 3           # Most grid columns a pinch can reach
//! default_columns = 3       # Columns before any gesture
//!
//! [thumbnails]
//! width = 200               # Thumbnail cell width in pixels
//! height = 160              # Thumbnail cell height in pixels
//! wide_aspect_threshold = 1.25  # Source aspect above this anchors the crop to height
//!
//! [cache]
//! memory_fraction = 8       # Cache budget = available memory / this
//! fallback_budget_bytes = 67108864  # Budget when available memory is unknown (64 MiB)
//!
//! [decoding]
//! max_workers = 4           # Max parallel decode workers (omit for auto = CPU cores)
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `photoroll.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Grid column bounds for the pinch gesture.
    pub grid: GridConfig,
    /// Thumbnail cell geometry.
    pub thumbnails: ThumbnailsConfig,
    /// In-memory bitmap cache sizing.
    pub cache: CacheConfig,
    /// Parallel decode settings.
    pub decoding: DecodingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.min_columns == 0 {
            return Err(ConfigError::Validation(
                "grid.min_columns must be non-zero".into(),
            ));
        }
        if self.grid.min_columns > self.grid.max_columns {
            return Err(ConfigError::Validation(
                "grid.min_columns must not exceed grid.max_columns".into(),
            ));
        }
        if self.grid.default_columns < self.grid.min_columns
            || self.grid.default_columns > self.grid.max_columns
        {
            return Err(ConfigError::Validation(
                "grid.default_columns must lie within [min_columns, max_columns]".into(),
            ));
        }
        if self.thumbnails.width == 0 || self.thumbnails.height == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width and thumbnails.height must be non-zero".into(),
            ));
        }
        if self.thumbnails.wide_aspect_threshold <= 0.0 {
            return Err(ConfigError::Validation(
                "thumbnails.wide_aspect_threshold must be positive".into(),
            ));
        }
        if self.cache.memory_fraction == 0 {
            return Err(ConfigError::Validation(
                "cache.memory_fraction must be non-zero".into(),
            ));
        }
        if self.cache.fallback_budget_bytes == 0 {
            return Err(ConfigError::Validation(
                "cache.fallback_budget_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Grid column bounds for the pinch gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Fewest columns a pinch-out can reach.
    pub min_columns: u32,
    /// Most columns a pinch-in can reach.
    pub max_columns: u32,
    /// Column count before any gesture.
    pub default_columns: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_columns: 1,
            max_columns: 3,
            default_columns: 3,
        }
    }
}

/// Thumbnail cell geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Cell width in pixels.
    pub width: u32,
    /// Cell height in pixels.
    pub height: u32,
    /// Source aspect ratio (w/h) above which the fill scale anchors to the
    /// requested height instead of the requested width.
    pub wide_aspect_threshold: f64,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 160,
            wide_aspect_threshold: 1.25,
        }
    }
}

/// In-memory bitmap cache sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// The cache budget is this fraction of available process memory
    /// (budget = memory / memory_fraction).
    pub memory_fraction: u64,
    /// Absolute budget used when available memory cannot be determined.
    pub fallback_budget_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_fraction: 8,
            fallback_budget_bytes: 64 * 1024 * 1024,
        }
    }
}

impl CacheConfig {
    /// Resolve the byte budget from an optional available-memory figure.
    pub fn budget_bytes(&self, available_memory: Option<u64>) -> usize {
        let budget = match available_memory {
            Some(bytes) => bytes / self.memory_fraction,
            None => self.fallback_budget_bytes,
        };
        budget.max(1) as usize
    }
}

/// Parallel decode settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodingConfig {
    /// Maximum number of parallel decode workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &DecodingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Load config from `photoroll.toml` in the given directory.
///
/// Returns stock defaults when no file exists; rejects unknown keys and
/// validates the result otherwise.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let config_path = root.join("photoroll.toml");
    if !config_path.exists() {
        return Ok(GalleryConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: GalleryConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults and validation
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        let config = GalleryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.min_columns, 1);
        assert_eq!(config.grid.max_columns, 3);
        assert_eq!(config.grid.default_columns, 3);
        assert_eq!(config.thumbnails.width, 200);
        assert_eq!(config.thumbnails.height, 160);
    }

    #[test]
    fn validate_rejects_zero_min_columns() {
        let mut config = GalleryConfig::default();
        config.grid.min_columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_column_bounds() {
        let mut config = GalleryConfig::default();
        config.grid.min_columns = 4;
        config.grid.max_columns = 2;
        config.grid.default_columns = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_default_columns_out_of_bounds() {
        let mut config = GalleryConfig::default();
        config.grid.default_columns = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_thumbnail_dims() {
        let mut config = GalleryConfig::default();
        config.thumbnails.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_memory_fraction() {
        let mut config = GalleryConfig::default();
        config.cache.memory_fraction = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Budget resolution
    // =========================================================================

    #[test]
    fn budget_is_fraction_of_available_memory() {
        let cache = CacheConfig::default();
        assert_eq!(cache.budget_bytes(Some(800)), 100);
    }

    #[test]
    fn budget_falls_back_when_memory_unknown() {
        let cache = CacheConfig::default();
        assert_eq!(cache.budget_bytes(None), 64 * 1024 * 1024);
    }

    #[test]
    fn budget_never_zero() {
        let cache = CacheConfig::default();
        assert_eq!(cache.budget_bytes(Some(3)), 1);
    }

    // =========================================================================
    // Worker resolution
    // =========================================================================

    #[test]
    fn effective_workers_auto() {
        let config = DecodingConfig { max_workers: None };
        assert!(effective_workers(&config) >= 1);
    }

    #[test]
    fn effective_workers_user_constrains_down() {
        let config = DecodingConfig {
            max_workers: Some(1),
        };
        assert_eq!(effective_workers(&config), 1);
    }

    #[test]
    fn effective_workers_clamped_to_cores() {
        let config = DecodingConfig {
            max_workers: Some(10_000),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_workers(&config), cores);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.grid.max_columns, 3);
    }

    #[test]
    fn load_config_reads_sparse_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("photoroll.toml"),
            "[grid]\nmax_columns = 5\ndefault_columns = 4\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.grid.max_columns, 5);
        assert_eq!(config.grid.default_columns, 4);
        // Untouched sections keep defaults
        assert_eq!(config.grid.min_columns, 1);
        assert_eq!(config.thumbnails.width, 200);
    }

    #[test]
    fn load_config_rejects_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("photoroll.toml"),
            "[grid]\nmax_colums = 5\n", // typo
        )
        .unwrap();

        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("photoroll.toml"),
            "[grid]\nmin_columns = 0\n",
        )
        .unwrap();

        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("photoroll.toml"), "not = [valid").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }
}
