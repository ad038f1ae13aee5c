//! Demo-mode animation.

use glam::Vec3;

use crate::config::effects as cfg;
use crate::scene::node::NodeTree;
use crate::scene::spotlight::Spotlight;

/// Drives pan, tilt, color and gobo rotation of every spotlight with
/// phase-staggered periodic functions.
#[derive(Debug, Clone)]
pub struct EffectsEngine {
    pub enabled: bool,
    pub pan_tilt: bool,
    pub rainbow: bool,
    pub gobo_rotation: bool,
    /// Global time multiplier.
    pub speed: f32,
}

impl Default for EffectsEngine {
    fn default() -> Self {
        Self {
            enabled: false,
            pan_tilt: true,
            rainbow: true,
            gobo_rotation: true,
            speed: 1.0,
        }
    }
}

impl EffectsEngine {
    /// Applies the effects for elapsed time `time`. Does nothing while
    /// disabled.
    pub fn update(&self, spotlights: &mut [Spotlight], nodes: &mut NodeTree, time: f32) {
        if !self.enabled {
            return;
        }

        let t = time * self.speed;

        for (i, light) in spotlights.iter_mut().enumerate() {
            let phase = i as f32 * cfg::PHASE_STEP;

            if self.pan_tilt {
                light.set_pan(pan_at(t, phase), nodes);
                light.set_tilt(tilt_at(t, phase), nodes);
            }

            if self.rainbow {
                let hue = (t * cfg::RAINBOW_SPEED + i as f32 * cfg::HUE_STEP).rem_euclid(1.0);
                light.set_color(hue_to_rgb(hue));
            }

            if self.gobo_rotation {
                light.set_gobo_rotation(t * cfg::GOBO_SPEED + phase);
            }
        }
    }
}

/// Pan in degrees at scaled time `t`.
#[must_use]
pub fn pan_at(t: f32, phase: f32) -> f32 {
    (t * cfg::PAN_SPEED + phase).sin() * cfg::PAN_AMPLITUDE
}

/// Tilt in degrees at scaled time `t`.
#[must_use]
pub fn tilt_at(t: f32, phase: f32) -> f32 {
    (t * cfg::TILT_SPEED + phase).cos() * cfg::TILT_AMPLITUDE + cfg::TILT_OFFSET
}

/// Fully saturated HSV with value 1, hue in `[0, 1)`.
#[must_use]
pub fn hue_to_rgb(hue: f32) -> Vec3 {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();

    match h as u32 {
        0 => Vec3::new(1.0, x, 0.0),
        1 => Vec3::new(x, 1.0, 0.0),
        2 => Vec3::new(0.0, 1.0, x),
        3 => Vec3::new(0.0, x, 1.0),
        4 => Vec3::new(x, 0.0, 1.0),
        _ => Vec3::new(1.0, 0.0, x),
    }
}
