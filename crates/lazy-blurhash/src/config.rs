//! Service and cache configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! components_x = 4
//! components_y = 3
//! thumbnail_format = "jpeg"
//!
//! [cache]
//! default_expires_after_secs = 3600
//! payload = "signature"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::encoder::check_components;
use crate::error::{BlurHashError, Result};
use crate::sampler::ResizeFilter;
use crate::service::{DEFAULT_ENCODING_HEIGHT, DEFAULT_ENCODING_WIDTH};
use crate::thumbnail::ThumbnailFormat;

/// Settings for [`BlurHash`](crate::BlurHash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurHashConfig {
    /// Horizontal basis components (1..=9).
    pub components_x: u32,
    /// Vertical basis components (1..=9).
    pub components_y: u32,
    /// Default sampling grid width.
    pub encoding_width: u32,
    /// Default sampling grid height.
    pub encoding_height: u32,
    pub resize_filter: ResizeFilter,
    pub thumbnail_format: ThumbnailFormat,
    /// JPEG quality (1..=100); ignored for PNG.
    pub jpeg_quality: u8,
    /// Contrast factor for rendered thumbnails.
    pub punch: f64,
    pub cache: CacheConfig,
}

impl Default for BlurHashConfig {
    fn default() -> Self {
        Self {
            components_x: 4,
            components_y: 3,
            encoding_width: DEFAULT_ENCODING_WIDTH,
            encoding_height: DEFAULT_ENCODING_HEIGHT,
            resize_filter: ResizeFilter::default(),
            thumbnail_format: ThumbnailFormat::default(),
            jpeg_quality: 80,
            punch: 1.0,
            cache: CacheConfig::default(),
        }
    }
}

/// What the caching decorator stores for `encode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedPayload {
    /// Cache the signature the wrapped service's `encode` returns.
    #[default]
    Signature,
    /// Cache a data URI thumbnail rendered at the encoding size.
    DataUri,
}

/// Settings for [`CachedBlurHash`](crate::CachedBlurHash).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached result; `None` keeps entries until the store evicts them.
    pub default_expires_after_secs: Option<u64>,
    pub payload: CachedPayload,
}

impl CacheConfig {
    pub fn default_expires_after(&self) -> Option<Duration> {
        self.default_expires_after_secs.map(Duration::from_secs)
    }
}

impl BlurHashConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| BlurHashError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| BlurHashError::Resource {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BlurHashError::Config(e.to_string()))
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        check_components(self.components_x, self.components_y)
            .map_err(|e| BlurHashError::Config(e.to_string()))?;
        if self.encoding_width == 0 || self.encoding_height == 0 {
            return Err(BlurHashError::Config(format!(
                "encoding size must be > 0, got {}x{}",
                self.encoding_width, self.encoding_height
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BlurHashError::Config(format!(
                "jpeg_quality must be 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if !self.punch.is_finite() || self.punch <= 0.0 {
            return Err(BlurHashError::Config(format!(
                "punch must be a positive number, got {}",
                self.punch
            )));
        }
        Ok(())
    }
}
