//! Purpose: Image fetching backed by an explicit in-memory byte cache.
//! Exports: `Image`, `ImageFormat`, `ImageCache`, `Client::fetch_image`.
//! Role: Peripheral glue over the fetch client; the cache is an injected
//! Role: component instance, never ambient global state.
//! Invariants: Cache entries are keyed by canonical URL string and hold raw
//! Invariants: response bytes, not decoded images.
//! Invariants: Entries may disappear at any time (`purge`); callers only ever
//! Invariants: observe a refetch, never an error, from eviction.

use crate::client::{Client, canonical_url};
use crate::error::{Error, ErrorKind};
use crate::pipeline::validate_status;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

/// A fetched image: sniffed format plus the raw encoded bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl Image {
    /// Attempts construction from raw bytes by magic-number sniffing. This is
    /// the image analogue of the JSON decode capability: `None` means the
    /// bytes are not a supported image.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let format = sniff_format(bytes)?;
        Some(Self {
            format,
            bytes: bytes.to_vec(),
        })
    }
}

fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    None
}

/// In-memory raw-byte cache keyed by canonical URL string. Interior mutability
/// makes a shared instance safe across threads; there is no eviction policy
/// beyond explicit `purge`.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: Mutex<HashMap<String, Arc<[u8]>>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.lock().insert(key.into(), bytes.into());
    }

    /// Drops every entry. Stands in for host-driven eviction under memory
    /// pressure; safe to call at any time.
    pub fn purge(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<[u8]>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl Client {
    /// Fetches an image through `cache`. A cache hit decodes the stored bytes
    /// without touching the network; a miss fetches, validates the status,
    /// decodes, and stores the raw bytes under the canonical URL.
    pub fn fetch_image(&self, cache: &ImageCache, url: &str) -> Result<Image, Error> {
        let url = canonical_url(url)?;
        let key = url.as_str();

        if let Some(bytes) = cache.get(key) {
            tracing::trace!(url = key, "image cache hit");
            return decode_image(&bytes, key);
        }

        tracing::trace!(url = key, "image cache miss");
        let response = self.get_canonical(&url)?;
        validate_status(&response).map_err(|err| err.with_url(key))?;
        let image = decode_image(&response.body, key)?;
        cache.put(key, response.body);
        Ok(image)
    }
}

fn decode_image(bytes: &[u8], url: &str) -> Result<Image, Error> {
    Image::from_bytes(bytes).ok_or_else(|| {
        Error::new(ErrorKind::Decode)
            .with_message("bytes do not decode as a supported image")
            .with_url(url)
    })
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageCache, ImageFormat};
    use std::sync::Arc;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00";

    #[test]
    fn sniffing_recognizes_supported_formats() {
        let jpeg = [0xff, 0xd8, 0xff, 0xe0, 0x00];
        let gif = b"GIF89a trailing";
        assert_eq!(
            Image::from_bytes(PNG_HEADER).map(|image| image.format),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            Image::from_bytes(&jpeg).map(|image| image.format),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            Image::from_bytes(gif).map(|image| image.format),
            Some(ImageFormat::Gif)
        );
    }

    #[test]
    fn sniffing_rejects_unknown_bytes() {
        assert_eq!(Image::from_bytes(b"plain text"), None);
        assert_eq!(Image::from_bytes(b""), None);
    }

    #[test]
    fn cache_round_trips_and_purges() {
        let cache = ImageCache::new();
        assert!(cache.is_empty());

        cache.put("http://example.com/a.png", PNG_HEADER.to_vec());
        let stored = cache.get("http://example.com/a.png").expect("entry");
        assert_eq!(stored.as_ref(), PNG_HEADER);
        assert_eq!(cache.len(), 1);

        cache.purge();
        assert!(cache.get("http://example.com/a.png").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_instances_are_independent() {
        let first = ImageCache::new();
        let second = ImageCache::new();
        first.put("k", Arc::<[u8]>::from(PNG_HEADER));
        assert!(second.get("k").is_none());
    }
}
