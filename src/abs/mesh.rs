//! Mesh management module.
//!
//! This module defines the [`GpuMesh`] struct which keeps the attributes of an
//! [`ObjData`] in one vertex array with one buffer per attribute.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use glow::HasContext;

use crate::error::{Error, Result};
use crate::obj::ObjData;

/// Shader attribute slots. These match the `layout(location = N)` qualifiers.
pub const POSITION_ATTRIB: u32 = 0;
pub const UV_ATTRIB: u32 = 1;
pub const NORMAL_ATTRIB: u32 = 2;

/// Reinterprets a slice of plain float vectors as bytes for upload.
fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

/// Represents a static mesh stored on the GPU side.
pub struct GpuMesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    buffers: Vec<glow::Buffer>,
    vertex_count: usize,
}

impl GpuMesh {
    /// Uploads the object's attributes. Absent UVs or normals leave their slot disabled.
    pub fn new(gl: &Arc<glow::Context>, data: &ObjData) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(Error::Gl)?;
            gl.bind_vertex_array(Some(vao));

            let mut mesh = Self {
                gl: Arc::clone(gl),
                vao,
                buffers: Vec::with_capacity(3),
                vertex_count: data.vertex_count(),
            };

            mesh.attach::<Vec3>(POSITION_ATTRIB, 3, &data.positions)?;
            if data.has_uvs() {
                mesh.attach::<Vec2>(UV_ATTRIB, 2, &data.uvs)?;
            }
            if data.has_normals() {
                mesh.attach::<Vec3>(NORMAL_ATTRIB, 3, &data.normals)?;
            }

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            log::debug!(
                "Uploaded mesh: {} vertices in {} buffers",
                mesh.vertex_count,
                mesh.buffers.len()
            );
            Ok(mesh)
        }
    }

    /// Creates a buffer for one attribute while the VAO is bound.
    unsafe fn attach<T: Copy>(&mut self, index: u32, components: i32, data: &[T]) -> Result<()> {
        debug_assert_eq!(data.len(), self.vertex_count);
        unsafe {
            let buffer = self.gl.create_buffer().map_err(Error::Gl)?;
            self.buffers.push(buffer);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(data), glow::STATIC_DRAW);
            self.gl.enable_vertex_attrib_array(index);
            self.gl.vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, 0, 0);
        }
        Ok(())
    }

    /// Draws the mesh as a triangle list.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(glow::TRIANGLES, 0, self.vertex_count as i32);
            self.gl.bind_vertex_array(None);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        unsafe {
            for buffer in self.buffers.drain(..) {
                self.gl.delete_buffer(buffer);
            }
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_sizes_match_vertex_counts() {
        let positions = vec![Vec3::ONE; 36];
        let uvs = vec![Vec2::ONE; 36];
        assert_eq!(as_bytes(&positions).len(), 36 * 12);
        assert_eq!(as_bytes(&uvs).len(), 36 * 8);
    }

    #[test]
    fn test_bytes_are_native_floats() {
        let data = [Vec2::new(1.0, -2.0)];
        let bytes = as_bytes(&data);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &(-2.0f32).to_ne_bytes());
    }
}
