//! # lazy-blurhash
//!
//! BlurHash placeholders for lazily loaded images.
//!
//! [BlurHash](https://blurha.sh/) packs a low-frequency approximation of an
//! image into a short string that can be rendered back into a blurred
//! placeholder. This crate samples image files, encodes them, renders
//! thumbnails as `data:` URIs, and memoizes the expensive encode step behind
//! a compute-if-absent cache.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use lazy_blurhash::{BlurHash, BlurHashService, CachedBlurHash, MemoryCache};
//!
//! let service = CachedBlurHash::new(
//!     BlurHash::default(),
//!     MemoryCache::new(),
//!     Some(Duration::from_secs(3600)),
//! );
//! let hash = service.encode_default("photo.jpg")?;
//! let placeholder = service.create_data_uri_thumbnail_default("photo.jpg", 32, 24)?;
//! assert!(placeholder.starts_with("data:image/"));
//! # Ok::<(), lazy_blurhash::BlurHashError>(())
//! ```
//!
//! The codec also works on in-memory pixels:
//!
//! ```
//! use lazy_blurhash::{decode, encode, PixelGrid};
//!
//! let grid = PixelGrid::solid(4, 4, [128, 128, 128]).unwrap();
//! let hash = encode(&grid, 4, 3).unwrap();
//! let pixels = decode(&hash, 32, 32, 1.0).unwrap();
//! assert_eq!(pixels.as_bytes().len(), 32 * 32 * 3);
//! ```

pub mod base83;
pub mod cache;
pub mod color;
pub mod config;
pub mod error;
pub mod signature;

mod cached;
mod decoder;
mod encoder;
mod sampler;
mod service;
mod thumbnail;

pub use cache::{Cache, CacheItem, MemoryCache};
pub use cached::{cache_key, parse_key, CachedBlurHash};
pub use config::{BlurHashConfig, CacheConfig, CachedPayload};
pub use decoder::{decode, decode_str, MAX_DIMENSION};
pub use encoder::{check_components, encode};
pub use error::{BlurHashError, Result};
pub use sampler::{ImageSampler, PixelGrid, ResizeFilter};
pub use service::{BlurHash, BlurHashService, DEFAULT_ENCODING_HEIGHT, DEFAULT_ENCODING_WIDTH};
pub use signature::{components, EncodedSignature};
pub use thumbnail::{ThumbnailFormat, ThumbnailImage, ThumbnailRenderer};
