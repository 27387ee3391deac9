//! Image metadata: format sniffing and intrinsic dimensions.
//!
//! Image layers are laid out at their configured width with a height that
//! follows the image's intrinsic aspect ratio. Inline payloads are measured
//! by reading only the image header; URL sources are measured by the host and
//! registered with [`IntrinsicSizeCache::insert`].

use std::collections::HashMap;
use std::time::Instant;

use adcanvas_core::ImageSource;
use serde::Serialize;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF.
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntrinsicSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl IntrinsicSize {
    /// Height divided by width.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect(&self) -> f32 {
        if self.width == 0 {
            return 1.0;
        }
        self.height as f32 / self.width as f32
    }
}

/// Read the dimensions of an encoded image without decoding its pixels.
///
/// # Errors
///
/// Returns an error if the format is unrecognised or the header is invalid.
#[cfg(feature = "images")]
pub fn read_dimensions(bytes: &[u8]) -> RenderResult<IntrinsicSize> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenderError::Resource(format!("Failed to sniff image format: {e}")))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| RenderError::Resource(format!("Failed to read image header: {e}")))?;
    if width == 0 || height == 0 {
        return Err(RenderError::Resource("Image has zero size".to_string()));
    }
    Ok(IntrinsicSize { width, height })
}

/// Read the dimensions of an encoded image.
///
/// # Errors
///
/// Always fails: image decoding is compiled out.
#[cfg(not(feature = "images"))]
pub fn read_dimensions(_bytes: &[u8]) -> RenderResult<IntrinsicSize> {
    Err(RenderError::NoBackend(
        "image decoding requires the `images` feature".to_string(),
    ))
}

/// Measure an image layer's content. URLs yield `None`.
///
/// # Errors
///
/// Returns an error if an inline payload cannot be decoded or measured.
pub fn measure_source(content: &str) -> RenderResult<Option<IntrinsicSize>> {
    let Some(bytes) = ImageSource::parse(content)?.decode()? else {
        return Ok(None);
    };
    tracing::trace!(
        "Measuring {:?} payload of {} bytes",
        ImageFormat::from_magic_bytes(&bytes),
        bytes.len()
    );
    read_dimensions(&bytes).map(Some)
}

/// Entry in the intrinsic size cache.
#[derive(Debug)]
struct CacheEntry {
    /// Measured size, `None` when the source could not be measured.
    size: Option<IntrinsicSize>,
    /// Last access time.
    last_accessed: Instant,
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
}

/// Default maximum number of cached sources.
pub const DEFAULT_MAX_ENTRIES: usize = 256;

/// Caches intrinsic sizes keyed by image content so payloads are measured once.
#[derive(Debug)]
pub struct IntrinsicSizeCache {
    entries: HashMap<String, CacheEntry>,
    max_entries: usize,
    stats: CacheStats,
}

impl Default for IntrinsicSizeCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl IntrinsicSizeCache {
    /// Create a cache holding at most `max_entries` sources.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            stats: CacheStats::default(),
        }
    }

    /// Size for `content`, measuring and caching it on first use.
    pub fn lookup(&mut self, content: &str) -> Option<IntrinsicSize> {
        if let Some(entry) = self.entries.get_mut(content) {
            entry.last_accessed = Instant::now();
            self.stats.hits += 1;
            return entry.size;
        }
        self.stats.misses += 1;
        let size = match measure_source(content) {
            Ok(size) => size,
            Err(e) => {
                tracing::debug!("Cannot measure image: {e}");
                None
            }
        };
        self.store(content.to_string(), size);
        size
    }

    /// Register a size measured elsewhere (for example a fetched URL).
    pub fn insert(&mut self, content: impl Into<String>, size: IntrinsicSize) {
        self.store(content.into(), Some(size));
    }

    /// Forget a source.
    pub fn remove(&mut self, content: &str) -> bool {
        self.entries.remove(content).is_some()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache statistics.
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn store(&mut self, key: String, size: Option<IntrinsicSize>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            CacheEntry {
                size,
                last_accessed: Instant::now(),
            },
        );
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }
}
