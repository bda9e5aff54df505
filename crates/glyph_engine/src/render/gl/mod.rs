//! Thin OpenGL layer
//!
//! Shader compilation, vertex buffers, glyph textures and scoped binding on
//! top of the [`GlDevice`] abstraction.

pub mod device;
pub mod glow_device;
pub mod info;
pub mod recording;
pub mod shader;
pub mod state;
pub mod texture;
pub mod vertex_array;

pub use device::{
    Capability, GlDevice, IntegerQuery, Primitive, ShaderStage, StringQuery, TextureFilter,
    UniformInfo,
};
pub use info::OpenGlInfo;
pub use recording::{DrawCall, RecordingDevice};
pub use shader::{Shader, ShaderProgram, ShaderSources};
pub use state::BindingScope;
pub use texture::GlyphTexture;
pub use vertex_array::{VertexArray, VertexAttribute};

use crate::foundation::math::Color;
use thiserror::Error;

/// OpenGL layer errors
#[derive(Error, Debug)]
pub enum GlError {
    /// A shader failed to compile
    #[error("{stage:?} shader compilation failed:\n{log}\nsource:\n{source_text}")]
    ShaderCompile {
        /// Stage of the failing shader
        stage: ShaderStage,
        /// Compiler info log
        log: String,
        /// The offending source text
        source_text: String,
    },

    /// A program failed to link
    #[error("Program linking failed:\n{0}")]
    ProgramLink(String),

    /// The driver refused to allocate an object
    #[error("Failed to create {object}: {reason}")]
    ObjectCreation {
        /// Kind of object (shader, program, texture, ...)
        object: &'static str,
        /// Driver message
        reason: String,
    },

    /// A uniform name is not active in the program
    #[error("Unknown uniform '{0}'")]
    UnknownUniform(String),

    /// An attribute name is not active in the program
    #[error("Unknown vertex attribute '{0}'")]
    UnknownAttribute(String),

    /// Buffer read-back disagrees with what was uploaded
    #[error("Vertex buffer verification failed at component {index}: wrote {expected}, read {actual}")]
    BufferMismatch {
        /// Index of the first differing float
        index: usize,
        /// Uploaded value
        expected: f32,
        /// Value read back
        actual: f32,
    },

    /// Texture dimensions are zero or disagree with the pixel data
    #[error("Invalid texture size {width}x{height} for {len} bytes of RGBA data")]
    InvalidTextureSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Length of the supplied pixel data
        len: usize,
    },
}

/// Result type for OpenGL layer operations
pub type GlResult<T> = Result<T, GlError>;

/// Handle a GPU-state error (bad uniform name, buffer mismatch)
///
/// These are programmer errors: fatal in debug builds, downgraded to a
/// warning in release builds.
pub fn report_state_error(err: &GlError) {
    if cfg!(debug_assertions) {
        panic!("OpenGL state error: {err}");
    }
    log::warn!("OpenGL state error: {}", err);
}

/// Enable alpha blending and scissor testing for 2D overlay rendering
pub fn init_render_state<D: GlDevice>(device: &D) {
    device.enable(Capability::Blend);
    device.enable(Capability::ScissorTest);
    device.blend_alpha();
    log::debug!("Enabled alpha blending and scissor test");
}

/// Point the viewport and scissor box at the whole framebuffer
pub fn resize_viewport<D: GlDevice>(device: &D, width: u32, height: u32) {
    let (width, height) = (width as i32, height as i32);
    device.viewport(0, 0, width, height);
    device.scissor(0, 0, width, height);
    log::debug!("Viewport resized to {}x{}", width, height);
}

/// Clear the color buffer
pub fn clear<D: GlDevice>(device: &D, color: Color) {
    device.clear_color(color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_state_setup() {
        let device = RecordingDevice::new();
        init_render_state(&device);
        resize_viewport(&device, 1024, 768);
        clear(&device, Color::BLACK);

        assert!(device.is_enabled(Capability::Blend));
        assert!(device.is_enabled(Capability::ScissorTest));
        assert!(device.blend_alpha_configured());
        assert_eq!(device.last_viewport(), (0, 0, 1024, 768));
        assert_eq!(device.last_scissor(), (0, 0, 1024, 768));
        assert_eq!(device.last_clear_color(), Some(Color::BLACK));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "OpenGL state error")]
    fn test_state_errors_fatal_in_debug() {
        report_state_error(&GlError::UnknownUniform("u_missing".to_string()));
    }
}
