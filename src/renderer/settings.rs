//! Renderer settings
//!
//! Two groups of knobs:
//!
//! - [`GpuSettings`]: consumed once by [`GpuContext::new`](super::context::GpuContext::new)
//! - [`PipelineSettings`]: passed by reference into every
//!   [`RenderPipeline::render`](super::pipeline::RenderPipeline::render) call, so
//!   the pipeline itself holds no mutable toggles
//!
//! # Example
//!
//! ```rust,ignore
//! use stagelight::renderer::settings::{PipelineSettings, VolumetricSettings};
//!
//! let settings = PipelineSettings {
//!     fxaa: false,
//!     blur_passes: 3,
//!     volumetric: VolumetricSettings {
//!         density: 0.1,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! }
//! .clamped();
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{post_process, volumetric};

// ---------------------------------------------------------------------------
// GpuSettings
// ---------------------------------------------------------------------------

/// Device and surface bootstrap options.
///
/// | Field              | Description                      | Default           |
/// |--------------------|----------------------------------|-------------------|
/// | `vsync`            | Present with vertical sync       | `true`            |
/// | `power_preference` | Adapter selection strategy       | `HighPerformance` |
#[derive(Debug, Clone)]
pub struct GpuSettings {
    pub vsync: bool,
    pub power_preference: wgpu::PowerPreference,
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
        }
    }
}

// ---------------------------------------------------------------------------
// VolumetricSettings
// ---------------------------------------------------------------------------

/// Ray-march parameters of the volumetric pass.
///
/// | Field        | Range          | Default |
/// |--------------|----------------|---------|
/// | `steps`      | `[16, 512]`    | 512     |
/// | `density`    | `[0, 1]`       | 0.065   |
/// | `intensity`  | `[0, 50]`      | 10      |
/// | `anisotropy` | `[-0.99, 0.99]`| 0.509   |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumetricSettings {
    pub steps: f32,
    pub density: f32,
    pub intensity: f32,
    /// Henyey-Greenstein `g`: positive values scatter forward.
    pub anisotropy: f32,
}

impl Default for VolumetricSettings {
    fn default() -> Self {
        Self {
            steps: volumetric::DEFAULT_STEPS,
            density: volumetric::DEFAULT_DENSITY,
            intensity: volumetric::DEFAULT_INTENSITY,
            anisotropy: volumetric::DEFAULT_ANISOTROPY,
        }
    }
}

impl VolumetricSettings {
    /// Each field clamped independently to its range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            steps: self.steps.clamp(volumetric::MIN_STEPS, volumetric::MAX_STEPS),
            density: self.density.clamp(0.0, volumetric::MAX_DENSITY),
            intensity: self.intensity.clamp(0.0, volumetric::MAX_INTENSITY),
            anisotropy: self
                .anisotropy
                .clamp(-volumetric::ANISOTROPY_LIMIT, volumetric::ANISOTROPY_LIMIT),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineSettings
// ---------------------------------------------------------------------------

/// Per-frame pass toggles.
///
/// | Field         | Description                           | Default |
/// |---------------|---------------------------------------|---------|
/// | `fxaa`        | FXAA in the final pass (else copy)    | `true`  |
/// | `blur`        | Blur the volumetric buffer            | `true`  |
/// | `blur_passes` | Horizontal+vertical repetitions [1,5] | 1       |
/// | `volumetric`  | Ray-march parameters                  | see [`VolumetricSettings`] |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub fxaa: bool,
    pub blur: bool,
    pub blur_passes: u32,
    pub volumetric: VolumetricSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            fxaa: true,
            blur: true,
            blur_passes: post_process::DEFAULT_BLUR_PASSES,
            volumetric: VolumetricSettings::default(),
        }
    }
}

impl PipelineSettings {
    /// Copy with every numeric field inside its documented range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            blur_passes: self
                .blur_passes
                .clamp(post_process::MIN_BLUR_PASSES, post_process::MAX_BLUR_PASSES),
            volumetric: self.volumetric.clamped(),
            ..self
        }
    }

    /// Blur repetitions to run this frame; zero when blur is off.
    #[must_use]
    pub fn effective_blur_passes(&self) -> u32 {
        if self.blur {
            self.clamped().blur_passes
        } else {
            0
        }
    }
}
