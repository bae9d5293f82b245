//! Vertex and index buffers for the sphere mesh.

use pano_mesh::{SphereMesh, SphereVertex};
use wgpu::util::DeviceExt;

/// Vertex and index buffers ready for an indexed draw.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub index_format: wgpu::IndexFormat,
}

impl MeshBuffer {
    pub fn bind<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), self.index_format);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Index data in either width.
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    /// Narrow to `u16` when every index fits.
    pub fn compact(indices: Vec<u32>, vertex_count: usize) -> Self {
        if vertex_count <= u16::MAX as usize + 1 {
            IndexData::U16(indices.into_iter().map(|i| i as u16).collect())
        } else {
            IndexData::U32(indices)
        }
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        match self {
            IndexData::U16(_) => wgpu::IndexFormat::Uint16,
            IndexData::U32(_) => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            IndexData::U16(data) => data.len() as u32,
            IndexData::U32(data) => data.len() as u32,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(data) => bytemuck::cast_slice(data),
            IndexData::U32(data) => bytemuck::cast_slice(data),
        }
    }
}

/// Upload the sphere, triangulating its quads.
pub fn upload_sphere(device: &wgpu::Device, mesh: &SphereMesh) -> MeshBuffer {
    let indices = IndexData::compact(mesh.triangle_indices(), mesh.vertex_count());

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("sphere-vertices"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("sphere-indices"),
        contents: indices.as_bytes(),
        usage: wgpu::BufferUsages::INDEX,
    });

    log::debug!(
        "Uploaded sphere: {} vertices, {} indices ({:?})",
        mesh.vertex_count(),
        indices.count(),
        indices.format()
    );

    MeshBuffer {
        vertex_buffer,
        index_buffer,
        index_count: indices.count(),
        index_format: indices.format(),
    }
}

const SPHERE_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x4,
    2 => Float32x2,
];

/// Layout of [`SphereVertex`]: position@0, color@1, uv@2.
pub fn sphere_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SPHERE_VERTEX_ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_sphere_vertex_layout() {
        let layout = sphere_vertex_layout();
        // position (f32x3) + color (f32x4) + uv (f32x2) = 36 bytes
        assert_eq!(layout.array_stride, 36);
        assert_eq!(layout.attributes.len(), 3);
        let locations: Vec<_> = layout
            .attributes
            .iter()
            .map(|a| (a.shader_location, a.offset, a.format))
            .collect();
        assert_eq!(
            locations,
            vec![
                (0, 0, wgpu::VertexFormat::Float32x3),
                (1, 12, wgpu::VertexFormat::Float32x4),
                (2, 28, wgpu::VertexFormat::Float32x2),
            ]
        );
    }

    #[test]
    fn test_compact_picks_u16_for_default_sphere() {
        let mesh = pano_mesh::build_sphere(50, 50, 10.0);
        let data = IndexData::compact(mesh.triangle_indices(), mesh.vertex_count());
        assert_eq!(data.format(), wgpu::IndexFormat::Uint16);
        assert_eq!(data.count(), 50 * 50 * 6);
        assert_eq!(data.as_bytes().len(), 50 * 50 * 6 * 2);
    }

    #[test]
    fn test_compact_keeps_u32_for_large_meshes() {
        let data = IndexData::compact(vec![0, 1, 70_000], 70_001);
        assert_eq!(data.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(data.as_bytes().len(), 12);
    }

    #[test]
    fn test_upload_sphere_index_count() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mesh = pano_mesh::build_sphere(8, 16, 10.0);
        let buffer = upload_sphere(&device, &mesh);
        assert_eq!(buffer.index_count, 8 * 16 * 6);
        assert_eq!(buffer.index_format, wgpu::IndexFormat::Uint16);
    }
}
