use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::ceiling as cfg;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightGpuData {
    /// xyz position, w range
    pub pos: [f32; 4],
    /// rgb color, w intensity
    pub color: [f32; 4],
}

/// Uniform block: the whole grid followed by the ambient term.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CeilingLightGpuData {
    pub lights: [PointLightGpuData; cfg::LIGHT_COUNT],
    /// rgb ambient, w = 1
    pub ambient: [f32; 4],
}

/// Fixed grid of ceiling point lights plus a uniform ambient fill.
///
/// The GPU block is a pure function of the two knobs and the color, rebuilt
/// by [`CeilingLights::update`].
#[derive(Debug, Clone)]
pub struct CeilingLights {
    intensity: f32,
    ambient_fill: f32,
    color: Vec3,
    data: CeilingLightGpuData,
}

impl Default for CeilingLights {
    fn default() -> Self {
        Self::new()
    }
}

impl CeilingLights {
    #[must_use]
    pub fn new() -> Self {
        let mut lights = Self {
            intensity: cfg::DEFAULT_INTENSITY,
            ambient_fill: cfg::DEFAULT_FILL,
            color: Vec3::ONE,
            data: CeilingLightGpuData::zeroed(),
        };
        lights.update();
        lights
    }

    /// Clamped to `[0, MAX_INTENSITY]`.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.clamp(0.0, cfg::MAX_INTENSITY);
    }

    /// Clamped to `[0, MAX_FILL]`.
    pub fn set_ambient(&mut self, fill: f32) {
        self.ambient_fill = fill.clamp(0.0, cfg::MAX_FILL);
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[must_use]
    pub fn ambient(&self) -> f32 {
        self.ambient_fill
    }

    /// Recomputes the grid, row by row along X, then the ambient term.
    pub fn update(&mut self) {
        for z in 0..cfg::GRID_Z {
            for x in 0..cfg::GRID_X {
                let pos_x = cfg::X_START + x as f32 * cfg::X_SPACING;
                let pos_z = cfg::Z_START + z as f32 * cfg::Z_SPACING;

                self.data.lights[z * cfg::GRID_X + x] = PointLightGpuData {
                    pos: [pos_x, cfg::HEIGHT, pos_z, cfg::RANGE],
                    color: self
                        .color
                        .extend(self.intensity * cfg::INTENSITY_MULTIPLIER)
                        .to_array(),
                };
            }
        }

        let ambient = self.ambient_level();
        self.data.ambient = [ambient, ambient, ambient, 1.0];
    }

    /// Fill mapped onto `[0, 1]`.
    #[must_use]
    pub fn ambient_level(&self) -> f32 {
        (self.ambient_fill / cfg::MAX_FILL).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn gpu_data(&self) -> &CeilingLightGpuData {
        &self.data
    }
}
