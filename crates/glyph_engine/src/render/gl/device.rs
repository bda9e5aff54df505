//! The OpenGL entry points used by the renderer
//!
//! [`GlDevice`] is deliberately narrow: it covers exactly the OpenGL 3.3 core
//! calls this crate issues, expressed with typed enums instead of raw `GLenum`
//! values. The production implementation lives in [`super::glow_device`];
//! [`super::recording::RecordingDevice`] implements it headlessly for tests.
//!
//! Every method must be called on the thread that owns the current context.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Color;

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

/// Primitive topology for `glDrawArrays`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Strip of triangles sharing edges (a quad is 4 vertices)
    TriangleStrip,
    /// Independent triangles
    Triangles,
}

/// Texture sampling filter used for both minification and magnification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFilter {
    /// Smooth sampling, better for large text
    #[default]
    Linear,
    /// Crisp sampling, better for small pixel text
    Nearest,
}

/// Server-side capabilities toggled with `glEnable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Color blending
    Blend,
    /// Scissor test
    ScissorTest,
}

/// String queries for `glGetString`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringQuery {
    /// `GL_VENDOR`
    Vendor,
    /// `GL_RENDERER`
    Renderer,
    /// `GL_VERSION`
    Version,
    /// `GL_SHADING_LANGUAGE_VERSION`
    ShadingLanguageVersion,
}

/// Integer queries for `glGetIntegerv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerQuery {
    /// `GL_MAJOR_VERSION`
    MajorVersion,
    /// `GL_MINOR_VERSION`
    MinorVersion,
    /// `GL_NUM_EXTENSIONS`
    NumExtensions,
}

/// An active uniform reported by program introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    /// Uniform name as declared in GLSL
    pub name: String,
    /// GL type enum of the uniform
    pub utype: u32,
    /// Array size (1 for non-arrays)
    pub size: i32,
}

/// Narrow OpenGL 3.3 core device
pub trait GlDevice {
    /// Shader object handle
    type Shader: Copy + Eq + Hash + Debug;
    /// Program object handle
    type Program: Copy + Eq + Hash + Debug;
    /// Buffer object handle
    type Buffer: Copy + Eq + Hash + Debug;
    /// Vertex array object handle
    type VertexArray: Copy + Eq + Hash + Debug;
    /// Texture object handle
    type Texture: Copy + Eq + Hash + Debug;
    /// Uniform location handle
    type UniformLocation: Clone + Debug;

    // Shaders and programs

    /// Create an empty shader object
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Set the shader source and compile it, returning the compile status
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool;
    /// Compiler diagnostics for a shader
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    /// Delete a shader object
    fn delete_shader(&self, shader: Self::Shader);
    /// Create an empty program object
    fn create_program(&self) -> Result<Self::Program, String>;
    /// Attach a compiled shader to a program
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Link a program, returning the link status
    fn link_program(&self, program: Self::Program) -> bool;
    /// Linker diagnostics for a program
    fn program_info_log(&self, program: Self::Program) -> String;
    /// Delete a program object
    fn delete_program(&self, program: Self::Program);
    /// Install a program (or none) as current
    fn use_program(&self, program: Option<Self::Program>);
    /// Look up a uniform by name
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    /// Look up a vertex attribute by name
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    /// All active uniforms of a linked program
    fn active_uniforms(&self, program: Self::Program) -> Vec<UniformInfo>;
    /// Upload an `int` uniform on the current program
    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32);
    /// Upload a `float` uniform on the current program
    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32);
    /// Upload a `vec2` uniform on the current program
    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32);
    /// Upload a `vec4` uniform on the current program
    fn uniform_4_f32(&self, location: &Self::UniformLocation, value: [f32; 4]);

    // Vertex arrays and buffers

    /// Create a vertex array object
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    /// Bind a vertex array (or none)
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// Delete a vertex array object
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    /// Create a buffer object
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Bind a buffer (or none) to `GL_ARRAY_BUFFER`
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Replace the contents of the bound array buffer
    fn array_buffer_data(&self, data: &[u8]);
    /// Read back the start of the bound array buffer into `dst`
    fn read_array_buffer(&self, dst: &mut [u8]);
    /// Delete a buffer object
    fn delete_buffer(&self, buffer: Self::Buffer);
    /// Enable a vertex attribute slot on the bound vertex array
    fn enable_vertex_attrib(&self, index: u32);
    /// Describe float attribute `index` (sizes and offsets in components/bytes)
    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32);

    // Textures

    /// Create a texture object
    fn create_texture(&self) -> Result<Self::Texture, String>;
    /// Select the active texture unit (0-based)
    fn active_texture(&self, unit: u32);
    /// Bind a texture (or none) to `GL_TEXTURE_2D` on the active unit
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);
    /// Set clamp-to-edge wrapping and `filter` on the bound 2D texture
    fn texture_2d_parameters(&self, filter: TextureFilter);
    /// Upload tightly packed RGBA8 pixels to the bound 2D texture
    fn texture_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]);
    /// Delete a texture object
    fn delete_texture(&self, texture: Self::Texture);

    // Drawing and fixed state

    /// Issue `glDrawArrays`
    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32);
    /// Enable a capability
    fn enable(&self, capability: Capability);
    /// Standard `SRC_ALPHA, ONE_MINUS_SRC_ALPHA` blending with `FUNC_ADD`
    fn blend_alpha(&self);
    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Set the scissor box
    fn scissor(&self, x: i32, y: i32, width: i32, height: i32);
    /// Clear the color buffer to `color`
    fn clear_color(&self, color: Color);

    // Queries

    /// Currently installed program
    fn current_program(&self) -> Option<Self::Program>;
    /// Currently bound vertex array
    fn current_vertex_array(&self) -> Option<Self::VertexArray>;
    /// Buffer bound to `GL_ARRAY_BUFFER`
    fn current_array_buffer(&self) -> Option<Self::Buffer>;
    /// Texture bound to `GL_TEXTURE_2D` on the active unit
    fn current_texture_2d(&self) -> Option<Self::Texture>;
    /// Active texture unit (0-based)
    fn current_active_texture(&self) -> u32;
    /// `glGetString`
    fn get_string(&self, query: StringQuery) -> String;
    /// `glGetIntegerv`
    fn get_integer(&self, query: IntegerQuery) -> i32;
    /// `glGetStringi(GL_EXTENSIONS, index)`
    fn extension(&self, index: u32) -> String;
}
