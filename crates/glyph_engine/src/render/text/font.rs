//! Font data and the glyph source abstraction
//!
//! A [`GlyphSource`] is the read-only font the rasterizer draws from. The
//! production source is [`FontData`], a parsed TrueType/OpenType font backed
//! by `fontdue`. It is reference counted so any number of font contexts can
//! share one parse.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings};

use super::{TextError, TextResult};

/// Outline placement of one rasterized glyph, in pixels
///
/// Coordinates follow the font convention: `ymin` is the offset of the
/// bitmap's bottom edge from the baseline, positive upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineMetrics {
    /// Left edge of the bitmap relative to the pen position
    pub xmin: i32,
    /// Bottom edge of the bitmap relative to the baseline
    pub ymin: i32,
    /// Bitmap width
    pub width: usize,
    /// Bitmap height
    pub height: usize,
    /// Horizontal advance to the next pen position
    pub advance_width: f32,
}

/// Font-wide vertical metrics at one pixel size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the baseline to the top of the tallest glyphs
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the lowest glyphs, negative
    pub descent: f32,
    /// Extra spacing between lines
    pub line_gap: f32,
}

impl LineMetrics {
    /// Baseline to baseline distance
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.line_gap
    }
}

/// Read-only font the rasterizer draws glyphs from
pub trait GlyphSource: Send + Sync {
    /// Whether the font maps `ch` to a real glyph
    fn has_glyph(&self, ch: char) -> bool;

    /// Rasterize `ch` at `px` pixels per em
    ///
    /// Returns the glyph placement and a row-major, top-to-bottom coverage
    /// bitmap of `width * height` bytes.
    fn rasterize(&self, ch: char, px: f32) -> (OutlineMetrics, Vec<u8>);

    /// Ascent, descent and line gap at `px` pixels per em
    fn line_metrics(&self, px: f32) -> Option<LineMetrics>;
}

/// Parsed TrueType/OpenType font
#[derive(Clone)]
pub struct FontData {
    font: Arc<Font>,
}

impl FontData {
    /// Parse font bytes
    pub fn from_bytes(bytes: &[u8]) -> TextResult<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| TextError::FontParse(e.to_string()))?;
        log::debug!("Parsed font with {} glyphs", font.glyph_count());
        Ok(Self { font: Arc::new(font) })
    }

    /// Read and parse a font file
    pub fn from_file(path: impl AsRef<Path>) -> TextResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        log::info!("Loading font {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(&bytes)
    }

    /// Number of glyphs in the font
    pub fn glyph_count(&self) -> u16 {
        self.font.glyph_count()
    }
}

impl fmt::Debug for FontData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontData")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphSource for FontData {
    fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    fn rasterize(&self, ch: char, px: f32) -> (OutlineMetrics, Vec<u8>) {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        let outline = OutlineMetrics {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance_width: metrics.advance_width,
        };
        (outline, coverage)
    }

    fn line_metrics(&self, px: f32) -> Option<LineMetrics> {
        self.font.horizontal_line_metrics(px).map(|m| LineMetrics {
            ascent: m.ascent,
            descent: m.descent,
            line_gap: m.line_gap,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    #[test]
    fn test_invalid_font_bytes() {
        let result = FontData::from_bytes(b"definitely not a font");
        assert!(matches!(result, Err(TextError::FontParse(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = FontData::from_file("/nonexistent/font.ttf");
        assert!(matches!(result, Err(TextError::Io(_))));
    }

    #[test]
    fn test_line_height() {
        let metrics = LineMetrics { ascent: 24.0, descent: -8.0, line_gap: 2.0 };
        assert_eq!(metrics.line_height(), 34.0);
    }

    #[test]
    fn test_system_font_smoke() {
        if !Path::new(SYSTEM_FONT).exists() {
            return;
        }
        let font = FontData::from_file(SYSTEM_FONT).unwrap();
        assert!(font.has_glyph('A'));

        let (outline, coverage) = font.rasterize('A', 32.0);
        assert!(outline.width > 0 && outline.height > 0);
        assert_eq!(coverage.len(), outline.width * outline.height);

        let line = font.line_metrics(32.0).unwrap();
        assert!(line.ascent > 0.0 && line.descent < 0.0);
    }
}
