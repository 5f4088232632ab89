//! Rendering a signature into a small raster and wrapping it as a data URI.

use std::fmt;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::decoder::decode;
use crate::encoder::encode;
use crate::error::{BlurHashError, Result};
use crate::sampler::PixelGrid;
use crate::signature::EncodedSignature;

/// Raster format of the rendered thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    #[default]
    Jpeg,
    Png,
}

impl ThumbnailFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for ThumbnailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        })
    }
}

/// An encoded raster at the requested size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailImage {
    width: u32,
    height: u32,
    format: ThumbnailFormat,
    bytes: Vec<u8>,
}

impl ThumbnailImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ThumbnailFormat {
        self.format
    }

    /// The compressed image file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:image/<format>;base64,<payload>`, usable directly as an `src`.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            BASE64.encode(&self.bytes)
        )
    }
}

/// Renders blurred placeholders from signatures.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailRenderer {
    format: ThumbnailFormat,
    jpeg_quality: u8,
    punch: f64,
}

impl Default for ThumbnailRenderer {
    fn default() -> Self {
        Self::new(ThumbnailFormat::default(), 80)
    }
}

impl ThumbnailRenderer {
    pub fn new(format: ThumbnailFormat, jpeg_quality: u8) -> Self {
        Self {
            format,
            jpeg_quality: jpeg_quality.clamp(1, 100),
            punch: 1.0,
        }
    }

    /// Override the contrast factor applied to AC components.
    pub fn with_punch(mut self, punch: f64) -> Self {
        self.punch = punch;
        self
    }

    /// Render `signature` at `width x height`.
    ///
    /// # Errors
    ///
    /// Returns [`BlurHashError::InvalidParameter`] on zero or oversized
    /// dimensions, and [`BlurHashError::Encoding`] if the raster encoder fails.
    pub fn render_signature(
        &self,
        signature: &EncodedSignature,
        width: u32,
        height: u32,
    ) -> Result<ThumbnailImage> {
        let grid = decode(signature, width, height, self.punch)?;
        self.rasterize(&grid)
    }

    /// Encode `grid` with `components_x x components_y` basis terms, then
    /// render the result at `width x height`.
    pub fn render_grid(
        &self,
        grid: &PixelGrid,
        components_x: u32,
        components_y: u32,
        width: u32,
        height: u32,
    ) -> Result<ThumbnailImage> {
        let signature = encode(grid, components_x, components_y)?;
        self.render_signature(&signature, width, height)
    }

    fn rasterize(&self, grid: &PixelGrid) -> Result<ThumbnailImage> {
        let mut buffer = Cursor::new(Vec::new());
        let (width, height) = (grid.width(), grid.height());
        let written = match self.format {
            ThumbnailFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality)
                .write_image(grid.as_bytes(), width, height, ExtendedColorType::Rgb8),
            ThumbnailFormat::Png => PngEncoder::new(&mut buffer).write_image(
                grid.as_bytes(),
                width,
                height,
                ExtendedColorType::Rgb8,
            ),
        };
        written.map_err(|e| BlurHashError::Encoding(format!("{} thumbnail: {e}", self.format)))?;

        Ok(ThumbnailImage {
            width,
            height,
            format: self.format,
            bytes: buffer.into_inner(),
        })
    }
}
