use glam::{Mat4, Vec3};

use crate::config::camera_defaults as cfg;

/// Camera orbiting a target point.
///
/// Position on the sphere: `(d·cos p·sin y, d·sin p, −d·cos p·cos y)`
/// around the target, so yaw 0 looks down +Z from the -Z side.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    distance: f32,
    pitch: f32,
    yaw: f32,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            distance: cfg::DISTANCE,
            pitch: cfg::PITCH,
            yaw: cfg::YAW,
            fov: cfg::FOV,
            aspect,
            near: cfg::CLIP_NEAR,
            far: cfg::CLIP_FAR,
        }
    }

    /// Adds to yaw and pitch; pitch stays within `±PITCH_LIMIT`.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-cfg::PITCH_LIMIT, cfg::PITCH_LIMIT);
    }

    /// Moves toward (negative) or away from the target.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(cfg::MIN_DISTANCE, cfg::MAX_DISTANCE);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        self.target + self.distance * Vec3::new(cp * sy, sp, -cp * cy)
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Clip space back to world space; used to reconstruct rays from depth.
    #[must_use]
    pub fn inverse_view_projection(&self) -> Mat4 {
        self.view_projection().inverse()
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(crate::config::display::ASPECT_RATIO)
    }
}
