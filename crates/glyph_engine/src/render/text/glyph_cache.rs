//! Lazily populated code point to glyph texture cache
//!
//! A miss rasterizes the whole [`batch_window`] around the requested code
//! point, so runs of text in one script pay the fill cost once. Entries are
//! never evicted or regenerated; their textures live as long as the cache.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::rc::Rc;

use thiserror::Error;

use super::glyph::GlyphEntry;
use super::rasterizer::{GlyphRasterizer, RasterError, RasterizedGlyph};
use crate::render::gl::{GlDevice, GlyphTexture, TextureFilter};

/// Number of neighbouring code points rasterized per cache miss
pub const BATCH_SIZE: u32 = 32;

/// The aligned block of [`BATCH_SIZE`] code points containing `code_point`
pub fn batch_window(code_point: u32) -> RangeInclusive<u32> {
    let low = code_point - code_point % BATCH_SIZE;
    low..=low + (BATCH_SIZE - 1)
}

/// Why one code point of a fill produced no entry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FillError {
    /// Rasterization failed
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The texture could not be created
    #[error("Glyph texture upload failed: {0}")]
    Upload(String),
}

/// A character that has no cache entry after its batch was filled
#[derive(Error, Debug, Clone, PartialEq)]
#[error("No glyph available for {code_point:?}")]
pub struct GlyphUnavailable {
    /// The requested character
    pub code_point: char,
    /// Failure from this call's fill; `None` when the failure was remembered
    #[source]
    pub cause: Option<FillError>,
}

/// Outcome of one fill
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Code points covered
    pub range: RangeInclusive<u32>,
    /// New entries
    pub inserted: usize,
    /// Code points already cached or known missing
    pub skipped: usize,
    /// Code points that failed, with the reason
    pub failures: Vec<(u32, FillError)>,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that found no entry
    pub misses: u64,
    /// Fills performed, warm-up included
    pub batches: u64,
    /// Glyphs rasterized and uploaded
    pub rasterized: u64,
    /// Code points that failed during fills
    pub failures: u64,
}

/// Sparse map from character to uploaded glyph
pub struct GlyphCache<D: GlDevice> {
    device: Rc<D>,
    rasterizer: GlyphRasterizer,
    filter: TextureFilter,
    entries: HashMap<char, GlyphEntry<D::Texture>>,
    missing: HashSet<u32>,
    remember_missing: bool,
    stats: CacheStats,
}

impl<D: GlDevice> GlyphCache<D> {
    /// Create an empty cache
    ///
    /// All textures are created with `filter`. Code points that fail are
    /// remembered and not rasterized again; see [`Self::with_remember_missing`].
    pub fn new(device: &Rc<D>, rasterizer: GlyphRasterizer, filter: TextureFilter) -> Self {
        Self {
            device: Rc::clone(device),
            rasterizer,
            filter,
            entries: HashMap::new(),
            missing: HashSet::new(),
            remember_missing: true,
            stats: CacheStats::default(),
        }
    }

    /// Choose whether failed code points are retried on every reference
    pub fn with_remember_missing(mut self, remember: bool) -> Self {
        self.remember_missing = remember;
        if !remember {
            self.missing.clear();
        }
        self
    }

    /// Look up `ch`, filling its batch window on a miss
    ///
    /// Resolving the same character again returns the same entry and
    /// texture without rasterizing.
    pub fn resolve(&mut self, ch: char) -> Result<GlyphEntry<D::Texture>, GlyphUnavailable> {
        if let Some(entry) = self.entries.get(&ch) {
            self.stats.hits += 1;
            return Ok(*entry);
        }
        self.stats.misses += 1;

        let code_point = u32::from(ch);
        if self.remember_missing && self.missing.contains(&code_point) {
            return Err(GlyphUnavailable { code_point: ch, cause: None });
        }

        let report = self.fill(batch_window(code_point));
        self.entries.get(&ch).copied().ok_or_else(|| GlyphUnavailable {
            code_point: ch,
            cause: report
                .failures
                .into_iter()
                .find_map(|(cp, err)| (cp == code_point).then_some(err)),
        })
    }

    /// Rasterize every code point in `range` up front
    pub fn warm_up(&mut self, range: RangeInclusive<u32>) -> BatchReport {
        let report = self.fill(range);
        log::info!(
            "Glyph cache warmed up: {} glyphs, {} unavailable",
            report.inserted,
            report.failures.len()
        );
        report
    }

    fn fill(&mut self, range: RangeInclusive<u32>) -> BatchReport {
        self.stats.batches += 1;
        let mut report = BatchReport { range: range.clone(), inserted: 0, skipped: 0, failures: Vec::new() };

        for code_point in range {
            let cached = char::from_u32(code_point).is_some_and(|ch| self.entries.contains_key(&ch));
            if cached || (self.remember_missing && self.missing.contains(&code_point)) {
                report.skipped += 1;
                continue;
            }

            let result = self
                .rasterizer
                .rasterize(code_point)
                .map_err(FillError::from)
                .and_then(|glyph| self.upload(&glyph));
            match result {
                Ok(entry) => {
                    self.entries.insert(entry.code_point, entry);
                    self.stats.rasterized += 1;
                    report.inserted += 1;
                }
                Err(err) => {
                    log::trace!("U+{:04X} unavailable: {}", code_point, err);
                    self.stats.failures += 1;
                    if self.remember_missing {
                        self.missing.insert(code_point);
                    }
                    report.failures.push((code_point, err));
                }
            }
        }

        log::debug!(
            "Filled glyph batch U+{:04X}..=U+{:04X}: {} new, {} skipped, {} failed",
            report.range.start(),
            report.range.end(),
            report.inserted,
            report.skipped,
            report.failures.len()
        );
        report
    }

    fn upload(&self, glyph: &RasterizedGlyph) -> Result<GlyphEntry<D::Texture>, FillError> {
        let metrics = glyph.metrics;
        let texture = GlyphTexture::upload(&*self.device, metrics.width, metrics.height, &glyph.to_rgba(), self.filter)
            .map_err(|e| FillError::Upload(e.to_string()))?;
        Ok(GlyphEntry { code_point: glyph.code_point, texture, metrics })
    }

    /// Cached entry for `ch`, without filling
    pub fn get(&self, ch: char) -> Option<&GlyphEntry<D::Texture>> {
        self.entries.get(&ch)
    }

    /// Whether `ch` is cached
    pub fn contains(&self, ch: char) -> bool {
        self.entries.contains_key(&ch)
    }

    /// Whether `code_point` is remembered as unavailable
    pub fn is_known_missing(&self, code_point: u32) -> bool {
        self.missing.contains(&code_point)
    }

    /// Number of cached glyphs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters since creation
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Rasterizer feeding this cache
    pub fn rasterizer(&self) -> &GlyphRasterizer {
        &self.rasterizer
    }

    /// Filter used for every glyph texture
    pub fn filter(&self) -> TextureFilter {
        self.filter
    }
}

impl<D: GlDevice> Drop for GlyphCache<D> {
    fn drop(&mut self) {
        for entry in self.entries.values() {
            self.device.delete_texture(entry.texture);
        }
        log::debug!("Released {} glyph textures", self.entries.len());
    }
}
