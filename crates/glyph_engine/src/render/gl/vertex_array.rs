//! Vertex array + buffer pair for streamed per-draw vertex data

use std::rc::Rc;

use super::device::GlDevice;
use super::{GlError, GlResult};

/// One interleaved `f32` vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute location in the program
    pub location: u32,
    /// Number of float components
    pub components: i32,
}

impl VertexAttribute {
    /// Describe an attribute
    pub const fn new(location: u32, components: i32) -> Self {
        Self { location, components }
    }
}

/// Owns a vertex array object and its vertex buffer
pub struct VertexArray<D: GlDevice> {
    device: Rc<D>,
    vao: D::VertexArray,
    vbo: D::Buffer,
    verify_uploads: bool,
}

/// Keeps the vertex array bound; restores the previous binding on drop
pub struct VertexArrayBinding<'a, D: GlDevice> {
    device: &'a D,
    previous: Option<D::VertexArray>,
}

impl<D: GlDevice> Drop for VertexArrayBinding<'_, D> {
    fn drop(&mut self) {
        self.device.bind_vertex_array(self.previous);
    }
}

impl<D: GlDevice> VertexArray<D> {
    /// Create the pair and describe interleaved float attributes
    ///
    /// Attributes are laid out in the order given; the stride is the sum of
    /// their sizes.
    pub fn new(device: &Rc<D>, attributes: &[VertexAttribute]) -> GlResult<Self> {
        let vao = device
            .create_vertex_array()
            .map_err(|reason| GlError::ObjectCreation { object: "vertex array", reason })?;
        let vbo = match device.create_buffer() {
            Ok(vbo) => vbo,
            Err(reason) => {
                device.delete_vertex_array(vao);
                return Err(GlError::ObjectCreation { object: "vertex buffer", reason });
            }
        };

        let float_size = std::mem::size_of::<f32>() as i32;
        let stride = attributes.iter().map(|a| a.components).sum::<i32>() * float_size;

        let previous_vao = device.current_vertex_array();
        let previous_buffer = device.current_array_buffer();
        device.bind_vertex_array(Some(vao));
        device.bind_array_buffer(Some(vbo));

        let mut offset = 0;
        for attribute in attributes {
            device.enable_vertex_attrib(attribute.location);
            device.vertex_attrib_f32(attribute.location, attribute.components, stride, offset);
            offset += attribute.components * float_size;
        }

        device.bind_array_buffer(previous_buffer);
        device.bind_vertex_array(previous_vao);

        Ok(Self {
            device: Rc::clone(device),
            vao,
            vbo,
            verify_uploads: cfg!(debug_assertions),
        })
    }

    /// Enable or disable read-back verification of uploads
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_uploads = verify;
        self
    }

    /// Bind until the returned guard is dropped
    pub fn bind(&self) -> VertexArrayBinding<'_, D> {
        let previous = self.device.current_vertex_array();
        self.device.bind_vertex_array(Some(self.vao));
        VertexArrayBinding { device: &self.device, previous }
    }

    /// Replace the buffer contents with `vertices`
    ///
    /// With verification enabled the data is read back and compared; the
    /// first differing component is reported as `BufferMismatch`.
    pub fn buffer_data(&self, vertices: &[f32]) -> GlResult<()> {
        let previous = self.device.current_array_buffer();
        self.device.bind_array_buffer(Some(self.vbo));
        self.device.array_buffer_data(bytemuck::cast_slice(vertices));

        let result = if self.verify_uploads { self.verify(vertices) } else { Ok(()) };

        self.device.bind_array_buffer(previous);
        result
    }

    fn verify(&self, vertices: &[f32]) -> GlResult<()> {
        let mut readback = vec![0u8; std::mem::size_of_val(vertices)];
        self.device.read_array_buffer(&mut readback);

        let actual = readback
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]));
        for (index, (expected, actual)) in vertices.iter().copied().zip(actual).enumerate() {
            if expected.to_bits() != actual.to_bits() {
                return Err(GlError::BufferMismatch { index, expected, actual });
            }
        }
        Ok(())
    }

    /// Raw vertex array handle
    pub fn handle(&self) -> D::VertexArray {
        self.vao
    }
}

impl<D: GlDevice> Drop for VertexArray<D> {
    fn drop(&mut self) {
        self.device.delete_buffer(self.vbo);
        self.device.delete_vertex_array(self.vao);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gl::{Primitive, RecordingDevice};

    fn quad_layout() -> [VertexAttribute; 2] {
        [VertexAttribute::new(0, 2), VertexAttribute::new(1, 2)]
    }

    #[test]
    fn test_buffer_data_feeds_draws() {
        let device = Rc::new(RecordingDevice::new());
        let vertex_array = VertexArray::new(&device, &quad_layout()).unwrap();
        let data = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

        vertex_array.buffer_data(&data).unwrap();
        {
            let _bound = vertex_array.bind();
            device.draw_arrays(Primitive::TriangleStrip, 0, 2);
        }

        assert_eq!(device.draw_calls()[0].vertices, data.to_vec());
        assert_eq!(device.current_vertex_array(), None);
        assert_eq!(device.current_array_buffer(), None);
    }

    #[test]
    fn test_verification_detects_mismatch() {
        let device = Rc::new(RecordingDevice::new());
        let vertex_array = VertexArray::new(&device, &quad_layout()).unwrap().with_verification(true);
        device.corrupt_buffer_reads(true);

        let err = vertex_array.buffer_data(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, GlError::BufferMismatch { index: 1, expected, .. } if expected == 2.0));

        let unchecked = VertexArray::new(&device, &quad_layout()).unwrap().with_verification(false);
        assert!(unchecked.buffer_data(&[1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_drop_releases_objects() {
        let device = Rc::new(RecordingDevice::new());
        let vertex_array = VertexArray::new(&device, &quad_layout()).unwrap();
        assert_eq!(device.live_objects(), 2);
        drop(vertex_array);
        assert_eq!(device.live_objects(), 0);
    }
}
