//! Headless [`GlDevice`] that records what would have reached the GPU
//!
//! `RecordingDevice` hands out integer handles, keeps texture and buffer
//! contents in memory, tracks bindings the way a GL context would, and logs
//! every `glDrawArrays` together with the vertices it consumed. Shader
//! sources are scanned for `uniform` and `in` declarations so that name
//! lookups behave like a real linked program.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::device::{
    Capability, GlDevice, IntegerQuery, Primitive, ShaderStage, StringQuery, TextureFilter,
    UniformInfo,
};
use crate::foundation::math::Color;

/// A recorded `glDrawArrays` call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Primitive topology
    pub primitive: Primitive,
    /// First vertex
    pub first: i32,
    /// Vertex count
    pub count: i32,
    /// Program installed at draw time
    pub program: Option<u32>,
    /// Vertex array bound at draw time
    pub vertex_array: Option<u32>,
    /// Texture bound to `TEXTURE_2D` on the active unit
    pub texture: Option<u32>,
    /// Contents of the vertex array's buffer as floats
    pub vertices: Vec<f32>,
}

/// Value last written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` / `bool` / sampler
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `vec4`
    Vec4([f32; 4]),
}

/// Snapshot of a recorded texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Filter set on the texture
    pub filter: Option<TextureFilter>,
    /// Whether clamp-to-edge wrapping was set
    pub clamped: bool,
    /// RGBA8 pixels
    pub pixels: Vec<u8>,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    shaders: Vec<u32>,
    linked: bool,
    uniforms: Vec<(String, String)>,
    attributes: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: HashMap<u32, (ShaderStage, String)>,
    programs: HashMap<u32, ProgramRecord>,
    vertex_arrays: HashSet<u32>,
    vertex_array_buffers: HashMap<u32, u32>,
    enabled_attributes: HashSet<(u32, u32)>,
    buffers: HashMap<u32, Vec<u8>>,
    textures: HashMap<u32, TextureRecord>,
    textures_created: usize,
    current_program: Option<u32>,
    current_vertex_array: Option<u32>,
    current_buffer: Option<u32>,
    active_unit: u32,
    bound_textures: HashMap<u32, u32>,
    uniform_values: HashMap<(u32, u32), UniformValue>,
    draws: Vec<DrawCall>,
    enabled: HashSet<Capability>,
    blend_alpha: bool,
    viewport: (i32, i32, i32, i32),
    scissor: (i32, i32, i32, i32),
    clear_color: Option<Color>,
    corrupt_reads: bool,
}

impl State {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Headless, call-recording OpenGL device
#[derive(Debug)]
pub struct RecordingDevice {
    state: RefCell<State>,
    extensions: Vec<String>,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract `(type, name)` pairs for declarations starting with `keyword`
fn declarations(source: &str, keyword: &str) -> Vec<(String, String)> {
    source
        .lines()
        .filter_map(|line| {
            // Strip an optional `layout(...)` qualifier.
            let line = line.trim();
            let line = match line.find(')') {
                Some(end) if line.starts_with("layout") => line[end + 1..].trim(),
                _ => line,
            };
            let mut tokens = line.split_whitespace();
            if tokens.next()? != keyword {
                return None;
            }
            let ty = tokens.next()?;
            let name = tokens.next()?.trim_end_matches(';');
            let name = name.split('[').next().unwrap_or(name);
            Some((ty.to_string(), name.to_string()))
        })
        .collect()
}

fn glsl_type_enum(ty: &str) -> u32 {
    match ty {
        "float" => glow::FLOAT,
        "int" | "bool" => glow::INT,
        "vec2" => glow::FLOAT_VEC2,
        "vec3" => glow::FLOAT_VEC3,
        "vec4" => glow::FLOAT_VEC4,
        "mat4" => glow::FLOAT_MAT4,
        "sampler2D" => glow::SAMPLER_2D,
        _ => 0,
    }
}

impl RecordingDevice {
    /// Create a device with no objects and default bindings
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State { viewport: (0, 0, 0, 0), ..State::default() }),
            extensions: vec!["GL_ARB_debug_output".to_string(), "GL_KHR_debug".to_string()],
        }
    }

    /// Replace the extension list reported by queries
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Make subsequent buffer read-backs return altered data
    pub fn corrupt_buffer_reads(&self, corrupt: bool) {
        self.state.borrow_mut().corrupt_reads = corrupt;
    }

    /// All draw calls recorded so far
    pub fn draw_calls(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    /// Forget recorded draw calls
    pub fn clear_draw_calls(&self) {
        self.state.borrow_mut().draws.clear();
    }

    /// Number of textures currently alive
    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Number of textures ever created
    pub fn textures_created(&self) -> usize {
        self.state.borrow().textures_created
    }

    /// Number of programs, vertex arrays and buffers currently alive
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.programs.len() + state.vertex_arrays.len() + state.buffers.len() + state.shaders.len()
    }

    /// Snapshot of a texture
    pub fn texture(&self, texture: u32) -> Option<TextureRecord> {
        self.state.borrow().textures.get(&texture).cloned()
    }

    /// Value last written to uniform `name` of `program`
    pub fn uniform(&self, program: u32, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let record = state.programs.get(&program)?;
        let location = record.uniforms.iter().position(|(_, n)| n == name)? as u32;
        state.uniform_values.get(&(program, location)).copied()
    }

    /// Whether a capability was enabled
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.state.borrow().enabled.contains(&capability)
    }

    /// Whether standard alpha blending was configured
    pub fn blend_alpha_configured(&self) -> bool {
        self.state.borrow().blend_alpha
    }

    /// Last viewport set
    pub fn last_viewport(&self) -> (i32, i32, i32, i32) {
        self.state.borrow().viewport
    }

    /// Last scissor box set
    pub fn last_scissor(&self) -> (i32, i32, i32, i32) {
        self.state.borrow().scissor
    }

    /// Last clear color
    pub fn last_clear_color(&self) -> Option<Color> {
        self.state.borrow().clear_color
    }
}

impl GlDevice for RecordingDevice {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.shaders.insert(id, (stage, String::new()));
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> bool {
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some((_, stored)) => {
                *stored = source.to_string();
                !source.contains("#error")
            }
            None => false,
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let state = self.state.borrow();
        match state.shaders.get(&shader) {
            Some((_, source)) if source.contains("#error") => {
                "0:1(1): error: #error directive encountered".to_string()
            }
            Some(_) => String::new(),
            None => format!("invalid shader {shader}"),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.programs.insert(id, ProgramRecord::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(record) = self.state.borrow_mut().programs.get_mut(&program) {
            record.shaders.push(shader);
        }
    }

    fn link_program(&self, program: u32) -> bool {
        let mut state = self.state.borrow_mut();
        let sources: Vec<(ShaderStage, String)> = match state.programs.get(&program) {
            Some(record) => record
                .shaders
                .iter()
                .filter_map(|s| state.shaders.get(s).cloned())
                .collect(),
            None => return false,
        };
        let has_vertex = sources.iter().any(|(stage, _)| *stage == ShaderStage::Vertex);
        let has_fragment = sources.iter().any(|(stage, _)| *stage == ShaderStage::Fragment);

        let mut uniforms = Vec::new();
        let mut attributes = Vec::new();
        for (stage, source) in &sources {
            for decl in declarations(source, "uniform") {
                if !uniforms.contains(&decl) {
                    uniforms.push(decl);
                }
            }
            if *stage == ShaderStage::Vertex {
                attributes.extend(declarations(source, "in").into_iter().map(|(_, name)| name));
            }
        }

        let Some(record) = state.programs.get_mut(&program) else {
            return false;
        };
        record.linked = has_vertex && has_fragment;
        record.uniforms = uniforms;
        record.attributes = attributes;
        record.linked
    }

    fn program_info_log(&self, program: u32) -> String {
        match self.state.borrow().programs.get(&program) {
            Some(record) if !record.linked => {
                "error: program needs both a vertex and a fragment shader".to_string()
            }
            Some(_) => String::new(),
            None => format!("invalid program {program}"),
        }
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        state.uniform_values.retain(|(p, _), _| *p != program);
        if state.current_program == Some(program) {
            state.current_program = None;
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let record = state.programs.get(&program)?;
        record.uniforms.iter().position(|(_, n)| n == name).map(|i| i as u32)
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let record = state.programs.get(&program)?;
        record.attributes.iter().position(|n| n == name).map(|i| i as u32)
    }

    fn active_uniforms(&self, program: u32) -> Vec<UniformInfo> {
        let state = self.state.borrow();
        state
            .programs
            .get(&program)
            .map(|record| {
                record
                    .uniforms
                    .iter()
                    .map(|(ty, name)| UniformInfo { name: name.clone(), utype: glsl_type_enum(ty), size: 1 })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn uniform_1_i32(&self, location: &u32, x: i32) {
        set_uniform(&mut self.state.borrow_mut(), *location, UniformValue::Int(x));
    }

    fn uniform_1_f32(&self, location: &u32, x: f32) {
        set_uniform(&mut self.state.borrow_mut(), *location, UniformValue::Float(x));
    }

    fn uniform_2_f32(&self, location: &u32, x: f32, y: f32) {
        set_uniform(&mut self.state.borrow_mut(), *location, UniformValue::Vec2([x, y]));
    }

    fn uniform_4_f32(&self, location: &u32, value: [f32; 4]) {
        set_uniform(&mut self.state.borrow_mut(), *location, UniformValue::Vec4(value));
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.vertex_arrays.insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.state.borrow_mut().current_vertex_array = vertex_array;
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        let mut state = self.state.borrow_mut();
        state.vertex_arrays.remove(&vertex_array);
        state.vertex_array_buffers.remove(&vertex_array);
        if state.current_vertex_array == Some(vertex_array) {
            state.current_vertex_array = None;
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.buffers.insert(id, Vec::new());
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.state.borrow_mut().current_buffer = buffer;
    }

    fn array_buffer_data(&self, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        if let Some(buffer) = state.current_buffer {
            state.buffers.insert(buffer, data.to_vec());
        }
    }

    fn read_array_buffer(&self, dst: &mut [u8]) {
        let state = self.state.borrow();
        let Some(contents) = state.current_buffer.and_then(|b| state.buffers.get(&b)) else {
            return;
        };
        let n = dst.len().min(contents.len());
        dst[..n].copy_from_slice(&contents[..n]);
        if state.corrupt_reads {
            if let Some(byte) = dst.get_mut(n.saturating_sub(1)) {
                *byte ^= 0x40;
            }
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(&buffer);
        if state.current_buffer == Some(buffer) {
            state.current_buffer = None;
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(vao) = state.current_vertex_array {
            state.enabled_attributes.insert((vao, index));
        }
    }

    fn vertex_attrib_f32(&self, _index: u32, _size: i32, _stride: i32, _offset: i32) {
        let mut state = self.state.borrow_mut();
        if let (Some(vao), Some(buffer)) = (state.current_vertex_array, state.current_buffer) {
            state.vertex_array_buffers.insert(vao, buffer);
        }
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.textures.insert(
            id,
            TextureRecord { width: 0, height: 0, filter: None, clamped: false, pixels: Vec::new() },
        );
        state.textures_created += 1;
        Ok(id)
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture_2d(&self, texture: Option<u32>) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        match texture {
            Some(texture) => state.bound_textures.insert(unit, texture),
            None => state.bound_textures.remove(&unit),
        };
    }

    fn texture_2d_parameters(&self, filter: TextureFilter) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        if let Some(texture) = state.bound_textures.get(&unit).copied() {
            if let Some(record) = state.textures.get_mut(&texture) {
                record.filter = Some(filter);
                record.clamped = true;
            }
        }
    }

    fn texture_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        if let Some(texture) = state.bound_textures.get(&unit).copied() {
            if let Some(record) = state.textures.get_mut(&texture) {
                record.width = width;
                record.height = height;
                record.pixels = pixels.to_vec();
            }
        }
    }

    fn delete_texture(&self, texture: u32) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture);
        state.bound_textures.retain(|_, bound| *bound != texture);
    }

    fn draw_arrays(&self, primitive: Primitive, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        let vertices = state
            .current_vertex_array
            .and_then(|vao| state.vertex_array_buffers.get(&vao))
            .and_then(|buffer| state.buffers.get(buffer))
            .map(|bytes| {
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect()
            })
            .unwrap_or_default();
        let call = DrawCall {
            primitive,
            first,
            count,
            program: state.current_program,
            vertex_array: state.current_vertex_array,
            texture: state.bound_textures.get(&state.active_unit).copied(),
            vertices,
        };
        state.draws.push(call);
    }

    fn enable(&self, capability: Capability) {
        self.state.borrow_mut().enabled.insert(capability);
    }

    fn blend_alpha(&self) {
        self.state.borrow_mut().blend_alpha = true;
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().viewport = (x, y, width, height);
    }

    fn scissor(&self, x: i32, y: i32, width: i32, height: i32) {
        self.state.borrow_mut().scissor = (x, y, width, height);
    }

    fn clear_color(&self, color: Color) {
        self.state.borrow_mut().clear_color = Some(color);
    }

    fn current_program(&self) -> Option<u32> {
        self.state.borrow().current_program
    }

    fn current_vertex_array(&self) -> Option<u32> {
        self.state.borrow().current_vertex_array
    }

    fn current_array_buffer(&self) -> Option<u32> {
        self.state.borrow().current_buffer
    }

    fn current_texture_2d(&self) -> Option<u32> {
        let state = self.state.borrow();
        state.bound_textures.get(&state.active_unit).copied()
    }

    fn current_active_texture(&self) -> u32 {
        self.state.borrow().active_unit
    }

    fn get_string(&self, query: StringQuery) -> String {
        match query {
            StringQuery::Vendor => "glyph_engine",
            StringQuery::Renderer => "recording device",
            StringQuery::Version => "3.3.0 (headless)",
            StringQuery::ShadingLanguageVersion => "3.30",
        }
        .to_string()
    }

    fn get_integer(&self, query: IntegerQuery) -> i32 {
        match query {
            IntegerQuery::MajorVersion | IntegerQuery::MinorVersion => 3,
            IntegerQuery::NumExtensions => self.extensions.len() as i32,
        }
    }

    fn extension(&self, index: u32) -> String {
        self.extensions.get(index as usize).cloned().unwrap_or_default()
    }
}

fn set_uniform(state: &mut State, location: u32, value: UniformValue) {
    match state.current_program {
        Some(program) => {
            state.uniform_values.insert((program, location), value);
        }
        None => log::warn!("Uniform write with no program in use"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_scanning() {
        let source = "#version 330 core\n\
                      layout(location = 0) in vec2 vert;\n\
                      in vec2 vertTexCoord;\n\
                      uniform vec2 u_resolution;\n\
                      uniform sampler2D tex[2];\n";
        let uniforms = declarations(source, "uniform");
        assert_eq!(uniforms, vec![
            ("vec2".to_string(), "u_resolution".to_string()),
            ("sampler2D".to_string(), "tex".to_string()),
        ]);
        let inputs: Vec<_> = declarations(source, "in").into_iter().map(|(_, n)| n).collect();
        assert_eq!(inputs, vec!["vert", "vertTexCoord"]);
    }

    #[test]
    fn test_texture_binding_per_unit() {
        let device = RecordingDevice::new();
        let a = device.create_texture().unwrap();
        let b = device.create_texture().unwrap();

        device.active_texture(0);
        device.bind_texture_2d(Some(a));
        device.active_texture(1);
        device.bind_texture_2d(Some(b));

        assert_eq!(device.current_texture_2d(), Some(b));
        device.active_texture(0);
        assert_eq!(device.current_texture_2d(), Some(a));

        device.delete_texture(a);
        assert_eq!(device.current_texture_2d(), None);
        assert_eq!(device.live_textures(), 1);
        assert_eq!(device.textures_created(), 2);
    }

    #[test]
    fn test_draw_captures_vertex_array_contents() {
        let device = RecordingDevice::new();
        let vao = device.create_vertex_array().unwrap();
        let vbo = device.create_buffer().unwrap();
        device.bind_vertex_array(Some(vao));
        device.bind_array_buffer(Some(vbo));
        device.vertex_attrib_f32(0, 2, 8, 0);
        device.array_buffer_data(bytemuck::cast_slice(&[1.0f32, 2.0, 3.0, 4.0]));
        device.bind_array_buffer(None);

        device.draw_arrays(Primitive::TriangleStrip, 0, 2);

        let draws = device.draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(draws[0].vertex_array, Some(vao));
    }
}
