//! GPU copies of scene meshes.

use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;

use crate::resources::mesh::{MeshData, MeshHandle, MeshLibrary, ShapeInfo, Vertex};

/// Vertex layout matching [`Vertex`]: position, normal, uv.
pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

#[must_use]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Vertex and index buffers of one mesh plus its sub-shape table.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub shapes: Vec<ShapeInfo>,
}

impl GpuMesh {
    #[must_use]
    pub fn new(device: &wgpu::Device, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            shapes: mesh.shapes.clone(),
        }
    }

    /// Binds both buffers on `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draws one sub-shape; the buffers must already be bound.
    pub fn draw_shape(&self, pass: &mut wgpu::RenderPass<'_>, shape: &ShapeInfo) {
        let start = shape.start_index;
        pass.draw_indexed(start..start + shape.index_count, 0, 0..1);
    }
}

/// GPU meshes keyed by the scene's mesh handles.
#[derive(Default)]
pub struct GpuMeshes {
    meshes: SecondaryMap<MeshHandle, GpuMesh>,
}

impl GpuMeshes {
    /// Uploads every mesh of the library that has no GPU copy yet.
    pub fn sync(&mut self, device: &wgpu::Device, library: &MeshLibrary) {
        for (handle, mesh) in library {
            if !self.meshes.contains_key(handle) && !mesh.indices.is_empty() {
                log::debug!("Uploading mesh '{}' ({} indices)", mesh.name, mesh.index_count());
                self.meshes.insert(handle, GpuMesh::new(device, mesh));
            }
        }
    }

    #[must_use]
    pub fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
