//! Compile-time constants
//!
//! Grouped by the subsystem that consumes them. Per-frame tunables (FXAA,
//! blur, volumetric parameters) live in
//! [`PipelineSettings`](crate::renderer::settings::PipelineSettings); the values
//! here are the fixed shape of the scene and the defaults those settings start
//! from.

use std::f32::consts::FRAC_PI_4;

/// Output resolution of the offscreen targets.
pub mod display {
    pub const WIDTH: u32 = 1920;
    pub const HEIGHT: u32 = 1080;
    pub const ASPECT_RATIO: f32 = WIDTH as f32 / HEIGHT as f32;
}

/// Room box the camera lives in.
pub mod room {
    pub const HALF_WIDTH: f32 = 50.0;
    /// Slightly below zero so the stage floor does not z-fight the room floor.
    pub const FLOOR_Y: f32 = -0.05;
    pub const CEILING_Y: f32 = 100.0;
    pub const INDEX_COUNT: u32 = 36;
}

pub mod camera_defaults {
    use super::FRAC_PI_4;

    pub const DISTANCE: f32 = 40.0;
    pub const PITCH: f32 = 0.4;
    pub const YAW: f32 = 0.0;
    pub const FOV: f32 = FRAC_PI_4;
    pub const CLIP_NEAR: f32 = 0.1;
    pub const CLIP_FAR: f32 = 1000.0;
    pub const MIN_DISTANCE: f32 = 5.0;
    pub const MAX_DISTANCE: f32 = 200.0;
    pub const PITCH_LIMIT: f32 = 1.5;
}

pub mod spotlight {
    /// Upper bound on lights uploaded to the GPU and shadow-map layers.
    pub const MAX_SPOTLIGHTS: usize = 8;
    pub const DEFAULT_RANGE: f32 = 500.0;
    pub const DEFAULT_INTENSITY: f32 = 100.0;
    /// Cosine of the inner cone half-angle.
    pub const DEFAULT_BEAM_ANGLE: f32 = 0.98;
    /// Cosine of the outer cone half-angle.
    pub const DEFAULT_FIELD_ANGLE: f32 = 0.71;
    pub const DEFAULT_HEIGHT: f32 = 15.0;
    /// Point fixtures aim at after construction.
    pub const AIM_TARGET: glam::Vec3 = glam::Vec3::ZERO;

    pub const SHAKE_SCALE: f32 = 0.05;
    pub const SHAKE_FREQ_X: f32 = 30.0;
    pub const SHAKE_FREQ_Y: f32 = 35.0;

    /// Light-space projection parameters.
    pub const SHADOW_FOV: f32 = std::f32::consts::FRAC_PI_2;
    pub const SHADOW_NEAR: f32 = 0.1;

    /// Directions whose |y| exceeds this switch the view up-vector to +Z.
    pub const UP_SWITCH_THRESHOLD: f32 = 0.99;
}

pub mod shadow {
    pub const MAP_SIZE: u32 = 2048;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
}

pub mod volumetric {
    pub const DEFAULT_STEPS: f32 = 512.0;
    pub const MIN_STEPS: f32 = 16.0;
    pub const MAX_STEPS: f32 = 512.0;
    pub const DEFAULT_DENSITY: f32 = 0.065;
    pub const MAX_DENSITY: f32 = 1.0;
    pub const DEFAULT_INTENSITY: f32 = 10.0;
    pub const MAX_INTENSITY: f32 = 50.0;
    pub const DEFAULT_ANISOTROPY: f32 = 0.509;
    pub const ANISOTROPY_LIMIT: f32 = 0.99;
    pub const JITTER_SCALE: f32 = 0.005;
}

pub mod ceiling {
    pub const HEIGHT: f32 = 95.0;
    pub const RANGE: f32 = 200.0;
    pub const X_START: f32 = -40.0;
    pub const Z_START: f32 = -20.0;
    pub const X_SPACING: f32 = 26.6;
    pub const Z_SPACING: f32 = 40.0;
    pub const GRID_X: usize = 4;
    pub const GRID_Z: usize = 2;
    pub const LIGHT_COUNT: usize = GRID_X * GRID_Z;
    pub const DEFAULT_INTENSITY: f32 = 1.0;
    pub const MAX_INTENSITY: f32 = 10.0;
    pub const INTENSITY_MULTIPLIER: f32 = 500.0;
    pub const DEFAULT_FILL: f32 = 2.0;
    pub const MAX_FILL: f32 = 100.0;
}

pub mod materials {
    pub const ROOM_COLOR: f32 = 0.2;
    pub const ROOM_SPECULAR: f32 = 0.8;
    pub const ROOM_SHININESS: f32 = 64.0;
    pub const STAGE_SPECULAR: f32 = 0.1;
    pub const STAGE_SHININESS: f32 = 16.0;
    pub const FIXTURE_COLOR: [f32; 3] = [0.08, 0.08, 0.09];
}

pub mod post_process {
    pub const DEFAULT_BLUR_PASSES: u32 = 1;
    pub const MIN_BLUR_PASSES: u32 = 1;
    pub const MAX_BLUR_PASSES: u32 = 5;
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
    pub const SCENE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
}

/// Demo-mode animation constants.
pub mod effects {
    pub const PAN_SPEED: f32 = 0.6;
    pub const TILT_SPEED: f32 = 0.9;
    pub const RAINBOW_SPEED: f32 = 0.15;
    pub const GOBO_SPEED: f32 = 0.375;
    pub const PAN_AMPLITUDE: f32 = 45.0;
    pub const TILT_AMPLITUDE: f32 = 30.0;
    pub const TILT_OFFSET: f32 = -20.0;
    pub const PHASE_STEP: f32 = 0.5;
    pub const HUE_STEP: f32 = 0.25;
}

/// Mounting of fixture hierarchies onto stage anchors.
pub mod fixture {
    pub const SCALE: f32 = 1.0;
    /// Drop below the anchor so the yoke clears the truss marker.
    pub const MOUNT_OFFSET: f32 = 0.35;
    pub const ANCHOR_PREFIX: &str = "Anchor.";
    pub const FALLBACK_ANCHOR_SHAPE: &str = "Cylinder.000";
    pub const PAN_NAMES: &[&str] = &["Yoke", "Pan", "Arm"];
    pub const TILT_NAMES: &[&str] = &["Head", "Tilt"];
    pub const BEAM_NAMES: &[&str] = &["Beam", "Lens"];
    /// Suffix of the base-matrix node that sits above each axis motion node.
    pub const PLACEMENT_SUFFIX: &str = "#placement";
}

pub mod gobo {
    pub const IMAGE_SIZE: u32 = 512;
    pub const OPEN_RADIUS: f32 = 0.40;
    pub const OPEN_SOFTNESS: f32 = 0.10;
    pub const WHEEL_KEYWORD: &str = "Gobo";
}
