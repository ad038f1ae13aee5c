//! CPU-side mesh data.
//!
//! A [`MeshData`] is what the mesh provider hands the core: one interleaved
//! vertex/index set split into named sub-shapes, each with its own material.
//! GPU buffers are created from it by
//! [`GpuMesh`](crate::renderer::gpu_mesh::GpuMesh).

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle into a [`MeshLibrary`].
    pub struct MeshHandle;
}

/// Interleaved vertex: position, normal, uv (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    #[must_use]
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Material properties of one sub-shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialData {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            specular: Vec3::splat(0.5),
            shininess: 32.0,
        }
    }
}

impl MaterialData {
    /// Scalar specular strength: the mean of the specular channels.
    #[inline]
    #[must_use]
    pub fn specular_intensity(&self) -> f32 {
        (self.specular.x + self.specular.y + self.specular.z) / 3.0
    }
}

/// A named index range of a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    pub name: String,
    /// Center of the shape's vertex bounds, in mesh space.
    pub center: Vec3,
    pub material: MaterialData,
    pub start_index: u32,
    pub index_count: u32,
}

/// Geometry as delivered by a mesh provider.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub shapes: Vec<ShapeInfo>,
}

impl MeshData {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a sub-shape, rebasing its indices onto the shared vertex list.
    ///
    /// The shape center is the midpoint of the appended vertices' bounds.
    pub fn push_shape(
        &mut self,
        name: impl Into<String>,
        vertices: &[Vertex],
        indices: &[u32],
        material: MaterialData,
    ) {
        let base = self.vertices.len() as u32;
        let start_index = self.indices.len() as u32;

        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));

        let (min, max) = bounds(vertices);
        self.shapes.push(ShapeInfo {
            name: name.into(),
            center: (min + max) * 0.5,
            material,
            start_index,
            index_count: indices.len() as u32,
        });
    }

    /// Lowest vertex Y, or 0 for an empty mesh.
    #[must_use]
    pub fn min_y(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.position[1])
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Finds a sub-shape by exact name.
    #[must_use]
    pub fn shape(&self, name: &str) -> Option<&ShapeInfo> {
        self.shapes.iter().find(|s| s.name == name)
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

fn bounds(vertices: &[Vertex]) -> (Vec3, Vec3) {
    if vertices.is_empty() {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    vertices.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), v| {
            let p = Vec3::from(v.position);
            (min.min(p), max.max(p))
        },
    )
}

/// Owns every mesh referenced by the scene (stage, fixture models).
pub type MeshLibrary = SlotMap<MeshHandle, MeshData>;
