//! The two-operation BlurHash service and its file-backed implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::BlurHashConfig;
use crate::encoder::encode;
use crate::error::Result;
use crate::sampler::ImageSampler;
use crate::thumbnail::ThumbnailRenderer;

/// Default sampling grid width.
pub const DEFAULT_ENCODING_WIDTH: u32 = 75;
/// Default sampling grid height.
pub const DEFAULT_ENCODING_HEIGHT: u32 = 75;

/// Produces BlurHashes and placeholder thumbnails for image files.
///
/// `encoding_width x encoding_height` is the internal grid the image is
/// downsampled to before encoding: smaller grids are faster but less precise.
/// Thumbnail `width x height` only affects the final render.
pub trait BlurHashService: Send + Sync {
    /// Encode the image at `filename` into a BlurHash.
    fn encode(&self, filename: &str, encoding_width: u32, encoding_height: u32) -> Result<String>;

    /// Render a blurred `width x height` placeholder of the image at
    /// `filename`, returned as a `data:image/...;base64,...` URI.
    fn create_data_uri_thumbnail(
        &self,
        filename: &str,
        width: u32,
        height: u32,
        encoding_width: u32,
        encoding_height: u32,
    ) -> Result<String>;

    /// Grid used when the caller does not pick one. 75x75 unless configured.
    fn default_encoding_size(&self) -> (u32, u32) {
        (DEFAULT_ENCODING_WIDTH, DEFAULT_ENCODING_HEIGHT)
    }

    /// [`encode`](Self::encode) on the [default grid](Self::default_encoding_size).
    fn encode_default(&self, filename: &str) -> Result<String> {
        let (encoding_width, encoding_height) = self.default_encoding_size();
        self.encode(filename, encoding_width, encoding_height)
    }

    /// [`create_data_uri_thumbnail`](Self::create_data_uri_thumbnail) on the
    /// [default grid](Self::default_encoding_size).
    fn create_data_uri_thumbnail_default(
        &self,
        filename: &str,
        width: u32,
        height: u32,
    ) -> Result<String> {
        let (encoding_width, encoding_height) = self.default_encoding_size();
        self.create_data_uri_thumbnail(filename, width, height, encoding_width, encoding_height)
    }
}

impl<T: BlurHashService + ?Sized> BlurHashService for Arc<T> {
    fn encode(&self, filename: &str, encoding_width: u32, encoding_height: u32) -> Result<String> {
        (**self).encode(filename, encoding_width, encoding_height)
    }

    fn create_data_uri_thumbnail(
        &self,
        filename: &str,
        width: u32,
        height: u32,
        encoding_width: u32,
        encoding_height: u32,
    ) -> Result<String> {
        (**self).create_data_uri_thumbnail(filename, width, height, encoding_width, encoding_height)
    }

    fn default_encoding_size(&self) -> (u32, u32) {
        (**self).default_encoding_size()
    }
}

impl<T: BlurHashService + ?Sized> BlurHashService for Box<T> {
    fn encode(&self, filename: &str, encoding_width: u32, encoding_height: u32) -> Result<String> {
        (**self).encode(filename, encoding_width, encoding_height)
    }

    fn create_data_uri_thumbnail(
        &self,
        filename: &str,
        width: u32,
        height: u32,
        encoding_width: u32,
        encoding_height: u32,
    ) -> Result<String> {
        (**self).create_data_uri_thumbnail(filename, width, height, encoding_width, encoding_height)
    }

    fn default_encoding_size(&self) -> (u32, u32) {
        (**self).default_encoding_size()
    }
}

/// Samples images from disk, encodes them and renders placeholders.
#[derive(Debug, Clone)]
pub struct BlurHash {
    sampler: ImageSampler,
    renderer: ThumbnailRenderer,
    components_x: u32,
    components_y: u32,
    encoding_width: u32,
    encoding_height: u32,
}

impl Default for BlurHash {
    fn default() -> Self {
        Self::from_config(&BlurHashConfig::default())
    }
}

impl BlurHash {
    /// Build a service from validated settings.
    pub fn new(config: &BlurHashConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &BlurHashConfig) -> Self {
        Self {
            sampler: ImageSampler::new(config.resize_filter),
            renderer: ThumbnailRenderer::new(config.thumbnail_format, config.jpeg_quality)
                .with_punch(config.punch),
            components_x: config.components_x,
            components_y: config.components_y,
            encoding_width: config.encoding_width,
            encoding_height: config.encoding_height,
        }
    }

    pub fn components(&self) -> (u32, u32) {
        (self.components_x, self.components_y)
    }
}

impl BlurHashService for BlurHash {
    fn encode(&self, filename: &str, encoding_width: u32, encoding_height: u32) -> Result<String> {
        let grid = self
            .sampler
            .sample(Path::new(filename), encoding_width, encoding_height)?;
        let started = Instant::now();
        let signature = encode(&grid, self.components_x, self.components_y)?;
        tracing::debug!(
            filename,
            encoding_width,
            encoding_height,
            blurhash = %signature,
            elapsed = ?started.elapsed(),
            "encoded image"
        );
        Ok(signature.into_string())
    }

    fn create_data_uri_thumbnail(
        &self,
        filename: &str,
        width: u32,
        height: u32,
        encoding_width: u32,
        encoding_height: u32,
    ) -> Result<String> {
        let grid = self
            .sampler
            .sample(Path::new(filename), encoding_width, encoding_height)?;
        let started = Instant::now();
        let thumbnail =
            self.renderer
                .render_grid(&grid, self.components_x, self.components_y, width, height)?;
        tracing::debug!(
            filename,
            width,
            height,
            bytes = thumbnail.bytes().len(),
            elapsed = ?started.elapsed(),
            "rendered thumbnail"
        );
        Ok(thumbnail.to_data_uri())
    }

    fn default_encoding_size(&self) -> (u32, u32) {
        (self.encoding_width, self.encoding_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlurHashError;
    use crate::signature::EncodedSignature;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> String {
        let path = dir.join(name);
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        })
        .save(&path)
        .unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_encode_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_png(dir.path(), "gradient.png", 64, 48);
        let service = BlurHash::default();
        let first = service.encode_default(&file).unwrap();
        let second = service.encode_default(&file).unwrap();
        assert_eq!(first, second);
        assert_eq!(EncodedSignature::parse(&first).unwrap().components(), (4, 3));
    }

    #[test]
    fn test_configured_components() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_png(dir.path(), "gradient.png", 32, 32);
        let config = BlurHashConfig {
            components_x: 9,
            components_y: 2,
            ..Default::default()
        };
        let hash = BlurHash::new(&config).unwrap().encode(&file, 20, 20).unwrap();
        assert_eq!(EncodedSignature::parse(&hash).unwrap().components(), (9, 2));
    }

    #[test]
    fn test_configured_encoding_size_is_the_default_grid() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_png(dir.path(), "gradient.png", 64, 48);
        let config = BlurHashConfig::from_toml_str("encoding_width = 32\nencoding_height = 16\n")
            .unwrap();
        let service = BlurHash::new(&config).unwrap();
        assert_eq!(service.default_encoding_size(), (32, 16));
        assert_eq!(
            service.encode_default(&file).unwrap(),
            service.encode(&file, 32, 16).unwrap()
        );
        assert_eq!(BlurHash::default().default_encoding_size(), (75, 75));
    }

    #[test]
    fn test_thumbnail_is_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_png(dir.path(), "gradient.png", 32, 32);
        let uri = BlurHash::default()
            .create_data_uri_thumbnail_default(&file, 16, 9)
            .unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = BlurHashConfig {
            components_x: 0,
            ..Default::default()
        };
        assert!(matches!(BlurHash::new(&config), Err(BlurHashError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = BlurHash::default().encode("/nonexistent/image.png", 75, 75).unwrap_err();
        assert!(matches!(err, BlurHashError::Resource { .. }));
    }
}
