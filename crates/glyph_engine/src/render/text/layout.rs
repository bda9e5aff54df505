//! Left-to-right glyph placement
//!
//! Pixel space is y-down with the origin at the top-left of the framebuffer.
//! The cursor sits on the baseline; each glyph's bitmap top is placed
//! `height - bearing_vertical` scaled pixels above it.

use bytemuck::{Pod, Zeroable};

use super::glyph::{GlyphEntry, GlyphMetrics};
use super::glyph_cache::GlyphCache;
use crate::foundation::math::Vec2;
use crate::render::gl::GlDevice;

/// Pen position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderCursor {
    /// Horizontal pen position
    pub x: f32,
    /// Baseline
    pub y: f32,
}

impl RenderCursor {
    /// Cursor at `(x, y)`
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move past a glyph
    pub fn advance(&mut self, metrics: &GlyphMetrics, scale: f32) {
        self.x += metrics.advance as f32 * scale;
    }
}

impl From<Vec2> for RenderCursor {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<(f32, f32)> for RenderCursor {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// One interleaved vertex of a glyph quad
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct QuadVertex {
    /// Position in pixels
    pub position: [f32; 2],
    /// Texture coordinate
    pub uv: [f32; 2],
}

impl QuadVertex {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { position: [x, y], uv: [u, v] }
    }
}

/// Screen-space quad for one glyph, in triangle-strip order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    /// Top-left, top-right, bottom-left, bottom-right
    pub vertices: [QuadVertex; 4],
}

impl GlyphQuad {
    /// Vertices per quad
    pub const VERTEX_COUNT: i32 = 4;

    /// Place a glyph at `cursor`
    pub fn new(cursor: RenderCursor, metrics: &GlyphMetrics, scale: f32) -> Self {
        let x = cursor.x + metrics.bearing_horizontal as f32 * scale;
        let y = cursor.y - (metrics.height as i32 - metrics.bearing_vertical) as f32 * scale;
        let w = metrics.width as f32 * scale;
        let h = metrics.height as f32 * scale;

        Self {
            vertices: [
                QuadVertex::new(x, y, 0.0, 0.0),
                QuadVertex::new(x + w, y, 1.0, 0.0),
                QuadVertex::new(x, y + h, 0.0, 1.0),
                QuadVertex::new(x + w, y + h, 1.0, 1.0),
            ],
        }
    }

    /// Top-left corner
    pub fn origin(&self) -> [f32; 2] {
        self.vertices[0].position
    }

    /// Width and height in pixels
    pub fn size(&self) -> [f32; 2] {
        let [x0, y0] = self.vertices[0].position;
        let [x1, y1] = self.vertices[3].position;
        [x1 - x0, y1 - y0]
    }

    /// Vertex data as uploaded to the buffer
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Result of laying out one string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSummary {
    /// Glyphs placed
    pub placed: usize,
    /// Characters skipped because no glyph was available
    pub skipped: usize,
    /// Cursor after the last glyph
    pub end: RenderCursor,
}

/// Walk `text`, resolving each character through `cache`
///
/// `visit` receives every available glyph with its quad. Unavailable
/// characters are skipped and contribute no advance. Drawing and measuring
/// both go through here so their widths always agree.
pub fn layout<D, F>(
    cache: &mut GlyphCache<D>,
    text: &str,
    origin: RenderCursor,
    scale: f32,
    mut visit: F,
) -> LayoutSummary
where
    D: GlDevice,
    F: FnMut(&GlyphEntry<D::Texture>, &GlyphQuad),
{
    let mut cursor = origin;
    let mut placed = 0;
    let mut skipped = 0;

    for ch in text.chars() {
        match cache.resolve(ch) {
            Ok(entry) => {
                let quad = GlyphQuad::new(cursor, &entry.metrics, scale);
                visit(&entry, &quad);
                cursor.advance(&entry.metrics, scale);
                placed += 1;
            }
            Err(unavailable) => {
                log::trace!("Skipping {:?}: {}", ch, unavailable);
                skipped += 1;
            }
        }
    }

    LayoutSummary { placed, skipped, end: cursor }
}
