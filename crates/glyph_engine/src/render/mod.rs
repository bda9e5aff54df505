//! # Rendering
//!
//! Immediate-mode OpenGL rendering for overlay text and simple widgets.
//!
//! ## Architecture
//!
//! - **gl**: Thin OpenGL layer (shaders, vertex arrays, textures, scoped binding)
//! - **text**: Glyph rasterization, the per-code-point texture cache and text layout
//! - **window**: GLFW window and OpenGL context creation (feature `window`)
//!
//! Every call in this module must run on the thread that owns the current
//! OpenGL context.

pub mod gl;
pub mod text;

#[cfg(feature = "window")]
pub mod window;
