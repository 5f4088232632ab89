//! Memoizing decorator around any [`BlurHashService`].

use std::time::Duration;

use crate::cache::{Cache, CacheItem};
use crate::config::{CacheConfig, CachedPayload};
use crate::error::{BlurHashError, Result};
use crate::service::BlurHashService;

/// Caches `encode` results in a [`Cache`]; thumbnails pass straight through.
///
/// The cache key is the JSON array `[filename, encoding_width, encoding_height]`,
/// so distinct argument tuples never share an entry, and the miss path reads
/// its arguments back from the key.
#[derive(Debug)]
pub struct CachedBlurHash<S, C> {
    inner: S,
    cache: C,
    default_expires_after: Option<Duration>,
    payload: CachedPayload,
}

impl<S: BlurHashService, C: Cache> CachedBlurHash<S, C> {
    /// Wrap `inner`. `default_expires_after` of `None` never expires entries.
    pub fn new(inner: S, cache: C, default_expires_after: Option<Duration>) -> Self {
        Self {
            inner,
            cache,
            default_expires_after,
            payload: CachedPayload::default(),
        }
    }

    pub fn from_config(inner: S, cache: C, config: &CacheConfig) -> Self {
        Self::new(inner, cache, config.default_expires_after()).with_payload(config.payload)
    }

    /// Choose what a miss computes and stores.
    pub fn with_payload(mut self, payload: CachedPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Drop the cached result for these `encode` arguments.
    pub fn invalidate(&self, filename: &str, encoding_width: u32, encoding_height: u32) -> Result<bool> {
        self.cache
            .delete(&cache_key(filename, encoding_width, encoding_height)?)
    }

    fn compute(&self, item: &mut CacheItem) -> Result<String> {
        if self.default_expires_after.is_some() {
            item.expires_after(self.default_expires_after);
        }

        let (filename, encoding_width, encoding_height) = parse_key(item.key())?;
        tracing::debug!(key = item.key(), payload = ?self.payload, "blurhash cache miss");

        match self.payload {
            CachedPayload::Signature => self.inner.encode(&filename, encoding_width, encoding_height),
            // The requested size is the thumbnail size; sampling stays on the
            // wrapped service's default grid.
            CachedPayload::DataUri => {
                self.inner
                    .create_data_uri_thumbnail_default(&filename, encoding_width, encoding_height)
            }
        }
    }
}

impl<S: BlurHashService, C: Cache> BlurHashService for CachedBlurHash<S, C> {
    fn encode(&self, filename: &str, encoding_width: u32, encoding_height: u32) -> Result<String> {
        let key = cache_key(filename, encoding_width, encoding_height)?;
        tracing::trace!(%key, "blurhash cache lookup");
        self.cache.get_or_compute(&key, &mut |item| self.compute(item))
    }

    fn create_data_uri_thumbnail(
        &self,
        filename: &str,
        width: u32,
        height: u32,
        encoding_width: u32,
        encoding_height: u32,
    ) -> Result<String> {
        self.inner
            .create_data_uri_thumbnail(filename, width, height, encoding_width, encoding_height)
    }

    fn default_encoding_size(&self) -> (u32, u32) {
        self.inner.default_encoding_size()
    }
}

/// Serialize the `encode` arguments into a cache key.
pub fn cache_key(filename: &str, encoding_width: u32, encoding_height: u32) -> Result<String> {
    serde_json::to_string(&(filename, encoding_width, encoding_height))
        .map_err(|e| BlurHashError::CacheBackend(format!("cannot build cache key: {e}")))
}

/// Recover the `encode` arguments from a key built by [`cache_key`].
pub fn parse_key(key: &str) -> Result<(String, u32, u32)> {
    serde_json::from_str(key)
        .map_err(|e| BlurHashError::CacheBackend(format!("malformed cache key {key:?}: {e}")))
}
