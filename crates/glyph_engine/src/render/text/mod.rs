//! Text rendering
//!
//! Glyphs are rasterized on the CPU with `fontdue`, one texture per code
//! point, and cached lazily in batches of [`glyph_cache::BATCH_SIZE`]
//! neighbouring code points. [`FontContext`] lays strings out glyph by glyph
//! and issues one textured triangle-strip quad per glyph.

pub mod font;
pub mod glyph;
pub mod glyph_cache;
pub mod layout;
pub mod rasterizer;
pub mod renderer;
pub mod shaders;

pub use font::{FontData, GlyphSource, LineMetrics, OutlineMetrics};
pub use glyph::{GlyphEntry, GlyphMetrics};
pub use glyph_cache::{batch_window, BatchReport, CacheStats, FillError, GlyphCache, GlyphUnavailable, BATCH_SIZE};
pub use layout::{layout, GlyphQuad, LayoutSummary, QuadVertex, RenderCursor};
pub use rasterizer::{GlyphBounds, GlyphRasterizer, RasterError, RasterSettings, RasterizedGlyph};
pub use renderer::FontContext;

use crate::config::ConfigError;
use crate::render::gl::GlError;
use thiserror::Error;

/// Result type for text setup operations
pub type TextResult<T> = Result<T, TextError>;

/// Fatal text setup errors
#[derive(Error, Debug)]
pub enum TextError {
    /// Font bytes could not be parsed
    #[error("Failed to parse font: {0}")]
    FontParse(String),

    /// Font file could not be read
    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    /// Shader, buffer or texture setup failed
    #[error(transparent)]
    Gl(#[from] GlError),

    /// Text configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A glyph could not be rasterized
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// Debug image export failed
    #[error("Failed to write glyph image: {0}")]
    Image(#[from] image::ImageError),
}
