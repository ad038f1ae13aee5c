//! Viewer controls
//!
//! Platform-independent actions the viewer reacts to. The winit adapter
//! maps keys onto [`ViewerAction`]s; everything after that is plain data
//! and testable without a window.

use crate::config::{ceiling, post_process};
use crate::renderer::settings::PipelineSettings;
use crate::scene::scene::Scene;

/// Radians per orbit key press.
pub const ORBIT_STEP: f32 = 0.05;
/// World units per zoom key press.
pub const ZOOM_STEP: f32 = 2.0;
/// Ceiling intensity change per key press.
pub const CEILING_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    ToggleFxaa,
    ToggleBlur,
    SetBlurPasses(u32),
    ToggleDemo,
    Orbit { yaw: f32, pitch: f32 },
    Zoom(f32),
    AdjustCeiling(f32),
}

impl ViewerAction {
    /// Applies the action. Values are clamped by the setters they go
    /// through, so repeated presses saturate instead of overflowing.
    pub fn apply(self, scene: &mut Scene, settings: &mut PipelineSettings) {
        match self {
            Self::ToggleFxaa => {
                settings.fxaa = !settings.fxaa;
                log::info!("FXAA {}", on_off(settings.fxaa));
            }
            Self::ToggleBlur => {
                settings.blur = !settings.blur;
                log::info!("Volumetric blur {}", on_off(settings.blur));
            }
            Self::SetBlurPasses(n) => {
                settings.blur_passes =
                    n.clamp(post_process::MIN_BLUR_PASSES, post_process::MAX_BLUR_PASSES);
                log::info!("Blur passes: {}", settings.blur_passes);
            }
            Self::ToggleDemo => {
                let enabled = !scene.demo_mode();
                scene.set_demo_mode(enabled);
                log::info!("Demo mode {}", on_off(enabled));
            }
            Self::Orbit { yaw, pitch } => scene.camera.orbit(yaw, pitch),
            Self::Zoom(delta) => scene.camera.zoom(delta),
            Self::AdjustCeiling(delta) => {
                let intensity =
                    (scene.ceiling_lights.intensity() + delta).clamp(0.0, ceiling::MAX_INTENSITY);
                scene.ceiling_lights.set_intensity(intensity);
                scene.ceiling_lights.update();
                log::debug!("Ceiling intensity: {intensity:.2}");
            }
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::scene::SceneSources;

    fn scene() -> Scene {
        Scene::initialize(SceneSources::default())
    }

    #[test]
    fn toggles_flip_settings() {
        let mut scene = scene();
        let mut settings = PipelineSettings::default();

        ViewerAction::ToggleFxaa.apply(&mut scene, &mut settings);
        ViewerAction::ToggleBlur.apply(&mut scene, &mut settings);
        ViewerAction::ToggleDemo.apply(&mut scene, &mut settings);

        assert!(!settings.fxaa);
        assert!(!settings.blur);
        assert!(scene.demo_mode());
    }

    #[test]
    fn blur_passes_saturate() {
        let mut scene = scene();
        let mut settings = PipelineSettings::default();

        ViewerAction::SetBlurPasses(12).apply(&mut scene, &mut settings);
        assert_eq!(settings.blur_passes, post_process::MAX_BLUR_PASSES);
    }

    #[test]
    fn ceiling_adjustment_stays_in_range() {
        let mut scene = scene();
        let mut settings = PipelineSettings::default();

        for _ in 0..100 {
            ViewerAction::AdjustCeiling(-CEILING_STEP).apply(&mut scene, &mut settings);
        }
        assert_eq!(scene.ceiling_lights.intensity(), 0.0);
        assert_eq!(scene.ceiling_lights.gpu_data().lights[0].color[3], 0.0);
    }

    #[test]
    fn zoom_and_orbit_move_camera() {
        let mut scene = scene();
        let mut settings = PipelineSettings::default();
        let distance = scene.camera.distance();
        let yaw = scene.camera.yaw();

        ViewerAction::Zoom(ZOOM_STEP).apply(&mut scene, &mut settings);
        ViewerAction::Orbit { yaw: ORBIT_STEP, pitch: 0.0 }.apply(&mut scene, &mut settings);

        assert!(scene.camera.distance() > distance);
        assert!(scene.camera.yaw() > yaw);
    }
}
