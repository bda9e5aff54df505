//! Scoped binding of shared OpenGL state
//!
//! A renderer that shares the context with others wraps each bind/draw
//! sequence in a [`BindingScope`]. The scope snapshots the bindings it may
//! disturb and puts them back when dropped, on every exit path.

use super::device::GlDevice;

/// Snapshot of program, vertex array, array buffer and texture bindings
pub struct BindingScope<'a, D: GlDevice> {
    device: &'a D,
    program: Option<D::Program>,
    vertex_array: Option<D::VertexArray>,
    array_buffer: Option<D::Buffer>,
    active_texture: u32,
    texture: Option<D::Texture>,
}

impl<'a, D: GlDevice> BindingScope<'a, D> {
    /// Record the current bindings
    ///
    /// `texture_unit` is the unit the caller is about to draw with; its
    /// `TEXTURE_2D` binding is captured and that unit is made active.
    pub fn capture(device: &'a D, texture_unit: u32) -> Self {
        let active_texture = device.current_active_texture();
        let program = device.current_program();
        let vertex_array = device.current_vertex_array();
        let array_buffer = device.current_array_buffer();

        device.active_texture(texture_unit);
        let texture = device.current_texture_2d();

        Self {
            device,
            program,
            vertex_array,
            array_buffer,
            active_texture,
            texture,
        }
    }
}

impl<D: GlDevice> Drop for BindingScope<'_, D> {
    fn drop(&mut self) {
        // The texture binding belongs to the unit that was made active.
        self.device.bind_texture_2d(self.texture);
        self.device.active_texture(self.active_texture);
        self.device.bind_vertex_array(self.vertex_array);
        self.device.bind_array_buffer(self.array_buffer);
        self.device.use_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::RecordingDevice;

    #[test]
    fn test_scope_restores_previous_bindings() {
        let device = RecordingDevice::new();
        let program = device.create_program().unwrap();
        let vao = device.create_vertex_array().unwrap();
        let tex = device.create_texture().unwrap();
        let other = device.create_texture().unwrap();

        device.use_program(Some(program));
        device.bind_vertex_array(Some(vao));
        device.active_texture(2);
        device.active_texture(0);
        device.bind_texture_2d(Some(tex));
        device.active_texture(2);

        {
            let _scope = BindingScope::capture(&device, 0);
            assert_eq!(device.current_active_texture(), 0);
            device.use_program(None);
            device.bind_vertex_array(None);
            device.bind_texture_2d(Some(other));
        }

        assert_eq!(device.current_program(), Some(program));
        assert_eq!(device.current_vertex_array(), Some(vao));
        assert_eq!(device.current_active_texture(), 2);
        device.active_texture(0);
        assert_eq!(device.current_texture_2d(), Some(tex));
    }

    #[test]
    fn test_scope_restores_unbound_state() {
        let device = RecordingDevice::new();
        let tex = device.create_texture().unwrap();
        {
            let _scope = BindingScope::capture(&device, 0);
            device.bind_texture_2d(Some(tex));
        }
        assert_eq!(device.current_texture_2d(), None);
        assert_eq!(device.current_vertex_array(), None);
    }
}
