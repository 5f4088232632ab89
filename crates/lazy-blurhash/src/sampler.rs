//! Image loading and downsampling into the fixed grid the encoder works on.

use std::path::Path;
use std::time::Instant;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use serde::{Deserialize, Serialize};

use crate::error::{BlurHashError, Result};

/// An immutable RGB pixel grid in row-major order (3 bytes per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a flat RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BlurHashError::InvalidParameter`] if either dimension is zero
    /// or the buffer length is not `width * height * 3`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| BlurHashError::invalid(format!("{width}x{height} grid overflows")))?;
        if pixels.len() != expected {
            return Err(BlurHashError::invalid(format!(
                "pixel buffer length {} does not match {width}x{height}x3 = {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid filled with a single color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        check_dimensions(width, height)?;
        let pixels = rgb.repeat(width as usize * height as usize);
        Self::new(width, height, pixels)
    }

    /// Resize `image` to exactly `width x height` and drop its alpha channel.
    pub fn from_image(
        image: &DynamicImage,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> Result<Self> {
        check_dimensions(width, height)?;
        let resized = if image.dimensions() == (width, height) {
            image.to_rgb8()
        } else {
            image.resize_exact(width, height, filter).to_rgb8()
        };
        Self::new(width, height, resized.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGB bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// The RGB triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }
}

/// Resampling filter used when shrinking an image onto the encoding grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Loads images from disk and downsamples them to a [`PixelGrid`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSampler {
    filter: ResizeFilter,
}

impl ImageSampler {
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    /// Read `path` and downsample it to `width x height`.
    ///
    /// # Errors
    ///
    /// * [`BlurHashError::Resource`] if the file is missing or unreadable.
    /// * [`BlurHashError::Decode`] if the contents are not a supported image.
    /// * [`BlurHashError::InvalidParameter`] if either dimension is zero.
    pub fn sample(&self, path: impl AsRef<Path>, width: u32, height: u32) -> Result<PixelGrid> {
        let path = path.as_ref();
        check_dimensions(width, height)?;

        let started = Instant::now();
        let image = load(path)?;
        let grid = PixelGrid::from_image(&image, width, height, self.filter.into())?;
        tracing::debug!(
            path = %path.display(),
            source_dims = ?image.dimensions(),
            width,
            height,
            elapsed = ?started.elapsed(),
            "sampled image"
        );
        Ok(grid)
    }
}

/// Open and decode an image, guessing its format from the content.
fn load(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| BlurHashError::Resource {
            path: path.to_path_buf(),
            source,
        })?;
    if reader.format().is_none() {
        return Err(BlurHashError::Decode {
            path: path.to_path_buf(),
            message: "unrecognized image format".to_string(),
        });
    }
    reader
        .decode()
        .map_err(|e| BlurHashError::from_image(path, e))
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(BlurHashError::invalid(format!(
            "dimensions must be > 0, got {width}x{height}"
        )));
    }
    Ok(())
}
