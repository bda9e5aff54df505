//! Glyph metrics and cache entries

/// Pixel metrics of one rasterized glyph
///
/// `width` and `height` are never zero. `bearing_vertical` is the distance
/// from the baseline down to the bitmap's bottom edge, so the bitmap top sits
/// `height - bearing_vertical` pixels above the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphMetrics {
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Horizontal distance to the next glyph origin
    pub advance: i32,
    /// Pen position to bitmap left edge
    pub bearing_horizontal: i32,
    /// Bitmap bottom edge to baseline
    pub bearing_vertical: i32,
}

/// A cached glyph: metrics plus the texture holding its bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphEntry<T> {
    /// Character this glyph renders
    pub code_point: char,
    /// GPU texture owned by the cache
    pub texture: T,
    /// Pixel metrics
    pub metrics: GlyphMetrics,
}
