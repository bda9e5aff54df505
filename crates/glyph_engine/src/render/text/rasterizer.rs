//! Glyph rasterization
//!
//! Turns one code point into a coverage bitmap plus whole-pixel metrics.
//! Glyphs with an empty outline (space, combining marks) never produce an
//! empty bitmap: their bounds fall back to the font's line box and, failing
//! that, to a 1x1 placeholder.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::font::{GlyphSource, LineMetrics};
use super::glyph::GlyphMetrics;
use super::TextResult;

/// Size at which glyphs are rasterized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterSettings {
    /// Nominal size in pixels per em
    pub pixel_size: f32,
    /// Upscale factor for high-DPI framebuffers (content scale)
    pub dpi_scale: f32,
}

impl RasterSettings {
    /// Create settings
    pub const fn new(pixel_size: f32, dpi_scale: f32) -> Self {
        Self { pixel_size, dpi_scale }
    }

    /// Pixels per em actually rasterized
    pub fn effective_size(&self) -> f32 {
        self.pixel_size * self.dpi_scale
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self::new(32.0, 1.0)
    }
}

/// Per-glyph rasterization failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    /// The value is not a Unicode scalar, so no bounds exist for it
    #[error("U+{0:04X} is not a Unicode scalar value")]
    InvalidCodePoint(u32),

    /// The font has no glyph for the character
    #[error("Font has no glyph for {0:?}")]
    NotInFont(char),

    /// The font returned a bitmap that disagrees with its own metrics
    #[error("Coverage bitmap for {ch:?} has {actual} bytes, expected {expected}")]
    BitmapSize {
        /// Character being rasterized
        ch: char,
        /// `width * height`
        expected: usize,
        /// Bytes returned
        actual: usize,
    },

    /// Pixel size or DPI scale is not a positive finite number
    #[error("Invalid raster size {pixel_size}px at scale {dpi_scale}")]
    InvalidSize {
        /// Requested pixel size
        pixel_size: f32,
        /// Requested DPI scale
        dpi_scale: f32,
    },
}

/// Where a glyph's bitmap bounds came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphBounds {
    /// The glyph's own outline
    Outline,
    /// Advance width by the font's ascent-to-descent height
    LineBox,
    /// Forced 1x1 placeholder
    Placeholder,
}

/// A rasterized glyph ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    /// Character this bitmap renders
    pub code_point: char,
    /// Whole-pixel metrics
    pub metrics: GlyphMetrics,
    /// Origin of the bitmap bounds
    pub bounds: GlyphBounds,
    coverage: Vec<u8>,
}

impl RasterizedGlyph {
    /// Row-major coverage, `width * height` bytes, top row first
    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Expand coverage to RGBA8: white color, coverage in alpha
    pub fn to_rgba(&self) -> Vec<u8> {
        self.coverage.iter().flat_map(|&c| [255, 255, 255, c]).collect()
    }

    /// Write the coverage bitmap as a grayscale PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> TextResult<()> {
        let GlyphMetrics { width, height, .. } = self.metrics;
        let image = image::GrayImage::from_raw(width, height, self.coverage.clone()).ok_or(
            RasterError::BitmapSize {
                ch: self.code_point,
                expected: width as usize * height as usize,
                actual: self.coverage.len(),
            },
        )?;
        image.save(path)?;
        Ok(())
    }
}

/// Rasterizes code points from a shared font at a fixed size
#[derive(Clone)]
pub struct GlyphRasterizer {
    source: Arc<dyn GlyphSource>,
    settings: RasterSettings,
}

impl GlyphRasterizer {
    /// Create a rasterizer for `source` at `settings`
    pub fn new(source: Arc<dyn GlyphSource>, settings: RasterSettings) -> Result<Self, RasterError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(settings.pixel_size) || !valid(settings.dpi_scale) {
            return Err(RasterError::InvalidSize {
                pixel_size: settings.pixel_size,
                dpi_scale: settings.dpi_scale,
            });
        }
        Ok(Self { source, settings })
    }

    /// Raster settings
    pub fn settings(&self) -> RasterSettings {
        self.settings
    }

    /// Font line metrics at the effective size
    pub fn line_metrics(&self) -> Option<LineMetrics> {
        self.source.line_metrics(self.settings.effective_size())
    }

    /// Rasterize one code point
    ///
    /// Metrics are rounded to whole pixels. `bearing_horizontal` is the
    /// outline's left edge and `bearing_vertical` the depth of its bottom
    /// edge below the baseline.
    pub fn rasterize(&self, code_point: u32) -> Result<RasterizedGlyph, RasterError> {
        let ch = char::from_u32(code_point).ok_or(RasterError::InvalidCodePoint(code_point))?;
        if !self.source.has_glyph(ch) {
            return Err(RasterError::NotInFont(ch));
        }

        let px = self.settings.effective_size();
        let (outline, coverage) = self.source.rasterize(ch, px);
        let expected = outline.width * outline.height;
        if coverage.len() != expected {
            return Err(RasterError::BitmapSize { ch, expected, actual: coverage.len() });
        }

        let advance = outline.advance_width.round() as i32;
        if outline.width > 0 && outline.height > 0 {
            return Ok(RasterizedGlyph {
                code_point: ch,
                metrics: GlyphMetrics {
                    width: outline.width as u32,
                    height: outline.height as u32,
                    advance,
                    bearing_horizontal: outline.xmin,
                    bearing_vertical: -outline.ymin,
                },
                bounds: GlyphBounds::Outline,
                coverage,
            });
        }

        if let Some(line) = self.source.line_metrics(px) {
            let height = (line.ascent - line.descent).round() as i32;
            if advance >= 1 && height >= 1 {
                let (width, height) = (advance as u32, height as u32);
                return Ok(RasterizedGlyph {
                    code_point: ch,
                    metrics: GlyphMetrics {
                        width,
                        height,
                        advance,
                        bearing_horizontal: 0,
                        bearing_vertical: (-line.descent).round() as i32,
                    },
                    bounds: GlyphBounds::LineBox,
                    coverage: vec![0; width as usize * height as usize],
                });
            }
        }

        log::trace!("Glyph {:?} has no usable bounds, using 1x1 placeholder", ch);
        Ok(RasterizedGlyph {
            code_point: ch,
            metrics: GlyphMetrics {
                width: 1,
                height: 1,
                advance,
                bearing_horizontal: 0,
                bearing_vertical: 0,
            },
            bounds: GlyphBounds::Placeholder,
            coverage: vec![0],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::text::font::testing::SyntheticFont;
    use crate::render::text::FontData;

    fn rasterizer(font: SyntheticFont, pixel_size: f32) -> GlyphRasterizer {
        GlyphRasterizer::new(Arc::new(font), RasterSettings::new(pixel_size, 1.0)).unwrap()
    }

    #[test]
    fn test_outline_metrics() {
        let glyph = rasterizer(SyntheticFont::ascii(), 32.0).rasterize('A' as u32).unwrap();
        assert_eq!(glyph.bounds, GlyphBounds::Outline);
        assert_eq!(
            glyph.metrics,
            GlyphMetrics { width: 6, height: 10, advance: 9, bearing_horizontal: 1, bearing_vertical: 2 }
        );
        assert_eq!(glyph.coverage().len(), 60);
    }

    #[test]
    fn test_dpi_scale_multiplies_size() {
        let source = Arc::new(SyntheticFont::ascii());
        let hidpi = GlyphRasterizer::new(source, RasterSettings::new(16.0, 2.0)).unwrap();
        let glyph = hidpi.rasterize('B' as u32).unwrap();
        assert_eq!((glyph.metrics.width, glyph.metrics.height), (6, 10));
        assert_eq!(hidpi.settings().effective_size(), 32.0);
    }

    #[test]
    fn test_space_falls_back_to_line_box() {
        let glyph = rasterizer(SyntheticFont::ascii(), 32.0).rasterize(0x20).unwrap();
        assert_eq!(glyph.bounds, GlyphBounds::LineBox);
        // advance 8, ascent 24 - descent -8
        assert_eq!((glyph.metrics.width, glyph.metrics.height), (8, 32));
        assert_eq!(glyph.metrics.bearing_vertical, 8);
        assert!(glyph.coverage().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_space_without_line_metrics_is_placeholder() {
        let font = SyntheticFont { line_metrics: false, ..SyntheticFont::ascii() };
        let glyph = rasterizer(font, 32.0).rasterize(0x20).unwrap();
        assert_eq!(glyph.bounds, GlyphBounds::Placeholder);
        assert_eq!((glyph.metrics.width, glyph.metrics.height), (1, 1));
        assert_eq!(glyph.metrics.advance, 8);
    }

    #[test]
    fn test_tiny_size_is_placeholder() {
        // Advance rounds to zero at 1px, so the line box is degenerate too.
        let glyph = rasterizer(SyntheticFont::ascii(), 1.0).rasterize(0x20).unwrap();
        assert_eq!(glyph.bounds, GlyphBounds::Placeholder);
        assert_eq!(glyph.coverage(), &[0]);
    }

    #[test]
    fn test_errors() {
        let font = SyntheticFont { broken: Some('x'), ..SyntheticFont::ascii() };
        let rasterizer = rasterizer(font, 32.0);

        assert_eq!(rasterizer.rasterize(0xD800).unwrap_err(), RasterError::InvalidCodePoint(0xD800));
        assert_eq!(rasterizer.rasterize(0xE9).unwrap_err(), RasterError::NotInFont('é'));
        assert_eq!(rasterizer.rasterize(0x1F).unwrap_err(), RasterError::NotInFont('\u{1f}'));
        assert!(matches!(
            rasterizer.rasterize('x' as u32),
            Err(RasterError::BitmapSize { ch: 'x', expected: 60, actual: 61 })
        ));
    }

    #[test]
    fn test_invalid_settings() {
        let source: Arc<dyn GlyphSource> = Arc::new(SyntheticFont::ascii());
        for settings in [
            RasterSettings::new(0.0, 1.0),
            RasterSettings::new(-4.0, 1.0),
            RasterSettings::new(12.0, f32::NAN),
            RasterSettings::new(f32::INFINITY, 1.0),
        ] {
            assert!(matches!(
                GlyphRasterizer::new(Arc::clone(&source), settings),
                Err(RasterError::InvalidSize { .. })
            ));
        }
    }

    #[test]
    fn test_rgba_expansion_and_png_export() {
        let glyph = rasterizer(SyntheticFont::ascii(), 32.0).rasterize('k' as u32).unwrap();
        let rgba = glyph.to_rgba();
        assert_eq!(rgba.len(), 60 * 4);
        assert_eq!(&rgba[..4], &[255, 255, 255, 255]);

        let path = std::env::temp_dir().join(format!("glyph_engine_k_{}.png", std::process::id()));
        glyph.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (6, 10));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_system_font_never_degenerate() {
        let path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
        if !Path::new(path).exists() {
            return;
        }
        let font = FontData::from_file(path).unwrap();
        let rasterizer = GlyphRasterizer::new(Arc::new(font), RasterSettings::default()).unwrap();
        for cp in 32..=126 {
            let glyph = rasterizer.rasterize(cp).unwrap();
            assert!(glyph.metrics.width >= 1 && glyph.metrics.height >= 1, "U+{cp:04X}");
        }
        assert_eq!(rasterizer.rasterize(0x20).unwrap().bounds, GlyphBounds::LineBox);
    }
}
