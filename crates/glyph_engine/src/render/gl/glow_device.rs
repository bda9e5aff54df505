//! [`GlDevice`] backed by a real OpenGL context through `glow`
//!
//! This is the only module that issues raw GL calls. The calls are `unsafe`
//! in glow because they require a current context on the calling thread;
//! holders of a `glow::Context` uphold that by construction (see
//! [`crate::render::window`]).

#![allow(unsafe_code)]

use glow::HasContext;

use super::device::{
    Capability, GlDevice, IntegerQuery, Primitive, ShaderStage, StringQuery, TextureFilter,
    UniformInfo,
};
use crate::foundation::math::Color;

const fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

const fn filter_enum(filter: TextureFilter) -> i32 {
    match filter {
        TextureFilter::Linear => glow::LINEAR as i32,
        TextureFilter::Nearest => glow::NEAREST as i32,
    }
}

impl GlDevice for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage_enum(stage)) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> bool {
        unsafe {
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) -> bool {
        unsafe {
            HasContext::link_program(self, program);
            self.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn active_uniforms(&self, program: Self::Program) -> Vec<UniformInfo> {
        unsafe {
            let count = self.get_active_uniforms(program);
            (0..count)
                .filter_map(|index| self.get_active_uniform(program, index))
                .map(|u| UniformInfo { name: u.name, utype: u.utype, size: u.size })
                .collect()
        }
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, x: i32) {
        unsafe { HasContext::uniform_1_i32(self, Some(location), x) }
    }

    fn uniform_1_f32(&self, location: &Self::UniformLocation, x: f32) {
        unsafe { HasContext::uniform_1_f32(self, Some(location), x) }
    }

    fn uniform_2_f32(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { HasContext::uniform_2_f32(self, Some(location), x, y) }
    }

    fn uniform_4_f32(&self, location: &Self::UniformLocation, [x, y, z, w]: [f32; 4]) {
        unsafe { HasContext::uniform_4_f32(self, Some(location), x, y, z, w) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { HasContext::create_vertex_array(self) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { HasContext::bind_vertex_array(self, vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { HasContext::delete_vertex_array(self, vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { HasContext::create_buffer(self) }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe { self.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::DYNAMIC_DRAW) }
    }

    fn read_array_buffer(&self, dst: &mut [u8]) {
        unsafe { self.get_buffer_sub_data(glow::ARRAY_BUFFER, 0, dst) }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { HasContext::delete_buffer(self, buffer) }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe { self.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe { self.vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset) }
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&self, texture: Option<Self::Texture>) {
        unsafe { self.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn texture_2d_parameters(&self, filter: TextureFilter) {
        unsafe {
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter_enum(filter));
            self.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter_enum(filter));
        }
    }

    fn texture_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            // Glyph widths are arbitrary; rows are tightly packed.
            self.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(pixels),
            );
        }
    }

    fn delete_texture(&self, texture: Self::Texture) {
        unsafe { HasContext::delete_texture(self, texture) }
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        let mode = match primitive {
            Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
            Primitive::Triangles => glow::TRIANGLES,
        };
        unsafe { HasContext::draw_arrays(self, mode, first, count) }
    }

    fn enable(&self, capability: Capability) {
        let cap = match capability {
            Capability::Blend => glow::BLEND,
            Capability::ScissorTest => glow::SCISSOR_TEST,
        };
        unsafe { HasContext::enable(self, cap) }
    }

    fn blend_alpha(&self) {
        unsafe {
            self.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            self.blend_equation(glow::FUNC_ADD);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { HasContext::scissor(self, x, y, width, height) }
    }

    fn clear_color(&self, color: Color) {
        unsafe {
            HasContext::clear_color(self, color.r, color.g, color.b, color.a);
            self.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn current_program(&self) -> Option<Self::Program> {
        unsafe { self.get_parameter_program(glow::CURRENT_PROGRAM) }
    }

    fn current_vertex_array(&self) -> Option<Self::VertexArray> {
        unsafe { self.get_parameter_vertex_array(glow::VERTEX_ARRAY_BINDING) }
    }

    fn current_array_buffer(&self) -> Option<Self::Buffer> {
        unsafe { self.get_parameter_buffer(glow::ARRAY_BUFFER_BINDING) }
    }

    fn current_texture_2d(&self) -> Option<Self::Texture> {
        unsafe { self.get_parameter_texture(glow::TEXTURE_BINDING_2D) }
    }

    fn current_active_texture(&self) -> u32 {
        let unit = unsafe { self.get_parameter_i32(glow::ACTIVE_TEXTURE) } as u32;
        unit.saturating_sub(glow::TEXTURE0)
    }

    fn get_string(&self, query: StringQuery) -> String {
        let parameter = match query {
            StringQuery::Vendor => glow::VENDOR,
            StringQuery::Renderer => glow::RENDERER,
            StringQuery::Version => glow::VERSION,
            StringQuery::ShadingLanguageVersion => glow::SHADING_LANGUAGE_VERSION,
        };
        unsafe { self.get_parameter_string(parameter) }
    }

    fn get_integer(&self, query: IntegerQuery) -> i32 {
        let parameter = match query {
            IntegerQuery::MajorVersion => glow::MAJOR_VERSION,
            IntegerQuery::MinorVersion => glow::MINOR_VERSION,
            IntegerQuery::NumExtensions => glow::NUM_EXTENSIONS,
        };
        unsafe { self.get_parameter_i32(parameter) }
    }

    fn extension(&self, index: u32) -> String {
        unsafe { self.get_parameter_indexed_string(glow::EXTENSIONS, index) }
    }
}
