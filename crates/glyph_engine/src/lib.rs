//! # Glyph Engine
//!
//! Immediate-mode OpenGL text rendering with an on-demand glyph texture
//! cache, plus simple mouse-aware widgets.
//!
//! ## Features
//!
//! - **Glyph cache**: code points are rasterized with `fontdue` on first use,
//!   32 neighbours at a time, one texture per glyph
//! - **Text layout**: per-glyph quads from a baseline cursor, with a width
//!   measurement that always matches what is drawn
//! - **Scoped GL state**: every draw restores the bindings it found
//! - **Headless testing**: [`render::gl::RecordingDevice`] stands in for a
//!   GPU and records every draw
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use std::sync::Arc;
//! use glyph_engine::prelude::*;
//!
//! fn draw_label(gl: Rc<glow::Context>) -> Result<(), TextError> {
//!     let config = TextConfig::new("fonts/DejaVuSans.ttf").with_pixel_size(24.0);
//!     let font = config.load_font()?;
//!     let mut text = FontContext::new(&gl, Arc::new(font), &config, &ShaderSources::glyph(), (1280, 720))?;
//!
//!     text.set_color(Color::new(1.0, 0.8, 0.2, 1.0));
//!     let width = text.measure_width(1.0, "Hello, world!");
//!     text.draw_text("Hello, world!", Vec2::new(640.0 - width / 2.0, 360.0), 1.0);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod ui;

/// Commonly used types
pub mod prelude {
    pub use crate::core::config::{ApplicationConfig, Config, ConfigError, EngineConfig, TextConfig, WindowConfig};
    pub use crate::foundation::math::{Color, Vec2, Vec4};
    pub use crate::render::gl::{
        clear, init_render_state, resize_viewport, GlDevice, GlError, OpenGlInfo, RecordingDevice, ShaderSources, TextureFilter,
    };
    pub use crate::render::text::{FontContext, FontData, GlyphSource, LayoutSummary, RenderCursor, TextError};
    pub use crate::ui::{MouseTransition, Widget};

    #[cfg(feature = "window")]
    pub use crate::render::window::{GlWindow, WindowError};
}
