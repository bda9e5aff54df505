//! Shader compilation and program linking
//!
//! Shaders and programs are RAII wrappers: dropping them deletes the GL
//! object. Uniform locations are resolved by name once per program and then
//! memoized.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::device::{GlDevice, ShaderStage, UniformInfo};
use super::{GlError, GlResult};

/// Vertex and fragment shader text for one program
///
/// Renderers receive their shader text explicitly at construction instead
/// of reading process-wide constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderSources {
    /// GLSL vertex shader source
    pub vertex: String,
    /// GLSL fragment shader source
    pub fragment: String,
}

impl ShaderSources {
    /// Wrap vertex and fragment source text
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read both stages from disk
    pub fn from_files(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            vertex: std::fs::read_to_string(vertex)?,
            fragment: std::fs::read_to_string(fragment)?,
        })
    }
}

/// A compiled shader object
pub struct Shader<D: GlDevice> {
    device: Rc<D>,
    handle: D::Shader,
    stage: ShaderStage,
}

impl<D: GlDevice> Shader<D> {
    /// Compile `source` for `stage`
    ///
    /// The compiler log is returned in the error together with the source.
    pub fn compile(device: &Rc<D>, stage: ShaderStage, source: &str) -> GlResult<Self> {
        let handle = device
            .create_shader(stage)
            .map_err(|reason| GlError::ObjectCreation { object: "shader", reason })?;
        let shader = Self { device: Rc::clone(device), handle, stage };

        if !device.compile_shader(handle, source) {
            let log = device.shader_info_log(handle);
            log::error!("{:?} shader failed to compile: {}", stage, log.trim_end());
            return Err(GlError::ShaderCompile {
                stage,
                log,
                source_text: source.to_string(),
            });
        }
        Ok(shader)
    }

    /// Pipeline stage of this shader
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Raw shader handle
    pub fn handle(&self) -> D::Shader {
        self.handle
    }
}

impl<D: GlDevice> Drop for Shader<D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.handle);
    }
}

/// A linked shader program
pub struct ShaderProgram<D: GlDevice> {
    device: Rc<D>,
    handle: D::Program,
    uniforms: RefCell<HashMap<String, D::UniformLocation>>,
}

/// Keeps a program installed; restores the previous one on drop
pub struct ProgramBinding<'a, D: GlDevice> {
    device: &'a D,
    previous: Option<D::Program>,
}

impl<D: GlDevice> Drop for ProgramBinding<'_, D> {
    fn drop(&mut self) {
        self.device.use_program(self.previous);
    }
}

impl<D: GlDevice> ShaderProgram<D> {
    /// Link compiled shaders, in the given order, into a program
    ///
    /// The shader objects are consumed: once linked they are no longer
    /// needed and are deleted.
    pub fn link(device: &Rc<D>, shaders: Vec<Shader<D>>) -> GlResult<Self> {
        let handle = device
            .create_program()
            .map_err(|reason| GlError::ObjectCreation { object: "program", reason })?;
        let program = Self {
            device: Rc::clone(device),
            handle,
            uniforms: RefCell::new(HashMap::new()),
        };

        for shader in &shaders {
            device.attach_shader(handle, shader.handle());
        }
        if !device.link_program(handle) {
            let log = device.program_info_log(handle);
            log::error!("Shader program failed to link: {}", log.trim_end());
            return Err(GlError::ProgramLink(log));
        }
        drop(shaders);

        Ok(program)
    }

    /// Compile both stages and link them
    pub fn from_sources(device: &Rc<D>, sources: &ShaderSources) -> GlResult<Self> {
        let shaders = vec![
            Shader::compile(device, ShaderStage::Vertex, &sources.vertex)?,
            Shader::compile(device, ShaderStage::Fragment, &sources.fragment)?,
        ];
        Self::link(device, shaders)
    }

    /// Raw program handle
    pub fn handle(&self) -> D::Program {
        self.handle
    }

    /// Install the program until the returned binding is dropped
    pub fn bind(&self) -> ProgramBinding<'_, D> {
        let previous = self.device.current_program();
        self.device.use_program(Some(self.handle));
        ProgramBinding { device: &self.device, previous }
    }

    /// Location of a vertex attribute by name
    pub fn attrib_location(&self, name: &str) -> GlResult<u32> {
        self.device
            .attrib_location(self.handle, name)
            .ok_or_else(|| GlError::UnknownAttribute(name.to_string()))
    }

    /// Active uniforms reported by the driver
    pub fn active_uniforms(&self) -> Vec<UniformInfo> {
        self.device.active_uniforms(self.handle)
    }

    fn location(&self, name: &str) -> GlResult<D::UniformLocation> {
        if let Some(location) = self.uniforms.borrow().get(name) {
            return Ok(location.clone());
        }
        let location = self
            .device
            .uniform_location(self.handle, name)
            .ok_or_else(|| GlError::UnknownUniform(name.to_string()))?;
        self.uniforms.borrow_mut().insert(name.to_string(), location.clone());
        Ok(location)
    }

    /// Set an `int` uniform
    pub fn set_uniform_1i(&self, name: &str, value: i32) -> GlResult<()> {
        let location = self.location(name)?;
        let _bound = self.bind();
        self.device.uniform_1_i32(&location, value);
        Ok(())
    }

    /// Set a `float` uniform
    pub fn set_uniform_1f(&self, name: &str, value: f32) -> GlResult<()> {
        let location = self.location(name)?;
        let _bound = self.bind();
        self.device.uniform_1_f32(&location, value);
        Ok(())
    }

    /// Set a `vec2` uniform
    pub fn set_uniform_2f(&self, name: &str, value: [f32; 2]) -> GlResult<()> {
        let location = self.location(name)?;
        let _bound = self.bind();
        self.device.uniform_2_f32(&location, value[0], value[1]);
        Ok(())
    }

    /// Set a `vec4` uniform
    pub fn set_uniform_4f(&self, name: &str, value: [f32; 4]) -> GlResult<()> {
        let location = self.location(name)?;
        let _bound = self.bind();
        self.device.uniform_4_f32(&location, value);
        Ok(())
    }
}

impl<D: GlDevice> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.device.delete_program(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::recording::{RecordingDevice, UniformValue};

    const VERTEX: &str = "#version 330 core\nin vec2 position;\nuniform vec2 u_offset;\nvoid main() {}\n";
    const FRAGMENT: &str = "#version 330 core\nuniform vec4 u_color;\nout vec4 color;\nvoid main() {}\n";

    #[test]
    fn test_compile_failure_reports_log_and_source() {
        let device = Rc::new(RecordingDevice::new());
        let broken = "#version 330 core\n#error nope\n";
        match Shader::compile(&device, ShaderStage::Fragment, broken) {
            Err(GlError::ShaderCompile { stage, log, source_text }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("error"));
                assert_eq!(source_text, broken);
            }
            other => panic!("expected compile error, got {:?}", other.err()),
        }
        // The failed shader object does not leak.
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn test_link_requires_both_stages() {
        let device = Rc::new(RecordingDevice::new());
        let vertex = Shader::compile(&device, ShaderStage::Vertex, VERTEX).unwrap();
        let result = ShaderProgram::link(&device, vec![vertex]);
        assert!(matches!(result, Err(GlError::ProgramLink(_))));
    }

    #[test]
    fn test_shaders_deleted_after_linking() {
        let device = Rc::new(RecordingDevice::new());
        let program = ShaderProgram::from_sources(&device, &ShaderSources::new(VERTEX, FRAGMENT)).unwrap();
        // Only the program remains.
        assert_eq!(device.live_objects(), 1);
        drop(program);
        assert_eq!(device.live_objects(), 0);
    }

    #[test]
    fn test_uniforms_by_name() {
        let device = Rc::new(RecordingDevice::new());
        let program = ShaderProgram::from_sources(&device, &ShaderSources::new(VERTEX, FRAGMENT)).unwrap();

        program.set_uniform_4f("u_color", [1.0, 0.5, 0.25, 1.0]).unwrap();
        program.set_uniform_2f("u_offset", [3.0, 4.0]).unwrap();

        assert_eq!(
            device.uniform(program.handle(), "u_color"),
            Some(UniformValue::Vec4([1.0, 0.5, 0.25, 1.0]))
        );
        assert_eq!(device.uniform(program.handle(), "u_offset"), Some(UniformValue::Vec2([3.0, 4.0])));
        // Setting a uniform leaves no program installed.
        assert_eq!(device.current_program(), None);

        assert!(matches!(
            program.set_uniform_1i("u_missing", 1),
            Err(GlError::UnknownUniform(name)) if name == "u_missing"
        ));
        assert_eq!(program.attrib_location("position").unwrap(), 0);
        assert!(program.attrib_location("normal").is_err());

        let names: Vec<_> = program.active_uniforms().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["u_offset", "u_color"]);
    }
}
