//! Uniform block layouts shared with the WGSL shaders.
//!
//! Every block is `#[repr(C)]` + `Pod` and padded to 16 bytes so it matches
//! WGSL uniform layout rules without manual offsets.

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat4, Vec2};

use crate::config::{display, spotlight, volumetric};
use crate::renderer::settings::VolumetricSettings;
use crate::resources::mesh::MaterialData;
use crate::scene::camera::OrbitCamera;
use crate::scene::spotlight::{Spotlight, SpotlightGpuData};

/// Camera matrices plus frame-global values.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Reconstructs world positions from depth in the volumetric pass.
    pub inv_view_proj: [[f32; 4]; 4],
    /// xyz camera position, w elapsed time
    pub position: [f32; 4],
    /// xy target size, zw reciprocal size
    pub viewport: [f32; 4],
}

impl CameraUniforms {
    #[must_use]
    pub fn new(camera: &OrbitCamera, time: f32) -> Self {
        let view_proj = camera.view_projection();
        let (w, h) = (display::WIDTH as f32, display::HEIGHT as f32);
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: camera.inverse_view_projection().to_cols_array_2d(),
            position: camera.position().extend(time).to_array(),
            viewport: [w, h, 1.0 / w, 1.0 / h],
        }
    }
}

/// Active spotlight count followed by a fixed-size light array.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpotlightBlock {
    /// x = active count, yzw unused
    pub count: [u32; 4],
    pub lights: [SpotlightGpuData; spotlight::MAX_SPOTLIGHTS],
}

impl SpotlightBlock {
    /// Packs up to [`MAX_SPOTLIGHTS`](spotlight::MAX_SPOTLIGHTS) lights; the rest
    /// are ignored.
    #[must_use]
    pub fn new(spotlights: &[Spotlight]) -> Self {
        let mut block = Self::zeroed();
        let active = spotlights.len().min(spotlight::MAX_SPOTLIGHTS);
        for (slot, light) in block.lights.iter_mut().zip(&spotlights[..active]) {
            *slot = light.gpu_data();
        }
        block.count[0] = active as u32;
        block
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.count[0] as usize
    }
}

/// Per-draw object data, addressed with a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix.
    pub normal: [[f32; 4]; 4],
    /// rgb diffuse, a unused
    pub diffuse: [f32; 4],
    /// x specular strength, y shininess
    pub specular: [f32; 4],
}

impl DrawUniforms {
    #[must_use]
    pub fn new(world: &Affine3A, material: &MaterialData) -> Self {
        let model = Mat4::from(*world);
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
            diffuse: material.diffuse.extend(1.0).to_array(),
            specular: [material.specular_intensity(), material.shininess, 0.0, 0.0],
        }
    }
}

/// Light view-projection plus the caster's model matrix for one shadow layer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub light_view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

/// Ray-march parameters and the per-frame jitter seed (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VolumetricUniforms {
    /// steps, density, intensity, anisotropy
    pub params: [f32; 4],
    /// x = time-driven jitter offset
    pub jitter: [f32; 4],
}

impl VolumetricUniforms {
    #[must_use]
    pub fn new(settings: &VolumetricSettings, time: f32) -> Self {
        let s = settings.clamped();
        Self {
            params: [s.steps, s.density, s.intensity, s.anisotropy],
            jitter: [time * volumetric::JITTER_SCALE, 0.0, 0.0, 0.0],
        }
    }
}

/// One separable blur direction.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlurUniforms {
    pub direction: [f32; 2],
    pub texel_size: [f32; 2],
}

impl BlurUniforms {
    #[must_use]
    pub fn new(direction: Vec2, width: u32, height: u32) -> Self {
        Self {
            direction: direction.to_array(),
            texel_size: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
        }
    }
}

/// Reciprocal frame size for the FXAA filter.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FxaaUniforms {
    pub rcp_frame: [f32; 2],
    pub _pad: [f32; 2],
}

impl FxaaUniforms {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            rcp_frame: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            _pad: [0.0; 2],
        }
    }
}

/// Rounds `value` up to a multiple of `alignment`.
#[inline]
#[must_use]
pub fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}
