//! Error types for sampling, encoding, rendering and caching BlurHashes.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = BlurHashError> = std::result::Result<T, E>;

/// Errors that can occur while producing or caching a BlurHash.
#[derive(Debug, Error)]
pub enum BlurHashError {
    /// The image file is missing or could not be read.
    #[error("cannot read image {path}: {source}")]
    Resource {
        /// The path that was requested.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The image data is in an unsupported format or is corrupt.
    #[error("cannot decode image {path}: {message}")]
    Decode {
        /// The path that was requested.
        path: PathBuf,
        /// What the image decoder reported.
        message: String,
    },

    /// A dimension or other argument is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The component count is out of the valid range (1..=9).
    #[error("component count out of range: {component} = {value} (must be 1..=9)")]
    InvalidComponentCount {
        /// Which component axis ("x" or "y").
        component: &'static str,
        /// The invalid value.
        value: u32,
    },

    /// The BlurHash string has an invalid length.
    #[error("invalid BlurHash length: expected {expected}, got {actual}")]
    InvalidLength {
        /// The expected length.
        expected: usize,
        /// The actual length.
        actual: usize,
    },

    /// An invalid character was encountered during base83 decoding.
    #[error("invalid base83 character: {0:?}")]
    InvalidBase83Character(char),

    /// A value could not be packed into the signature or thumbnail.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The cache collaborator failed.
    #[error("cache backend error: {0}")]
    CacheBackend(String),

    /// Configuration could not be read or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl BlurHashError {
    /// Shorthand for an [`InvalidParameter`](Self::InvalidParameter) error.
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Wrap a failure reported by the image decoder for `path`.
    ///
    /// Truncated files surface from the decoders as I/O errors; they are
    /// still bad image data, not an unreadable file.
    pub(crate) fn from_image(path: impl Into<PathBuf>, err: image::ImageError) -> Self {
        Self::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
