//! Viewer configuration
//!
//! Everything the viewer can be told at startup, loaded from an optional
//! JSON file. Every field has a default, so `{}` is a valid file.
//!
//! ```json
//! {
//!     "pipeline": { "fxaa": false, "blur_passes": 3 },
//!     "ceiling_intensity": 2.0,
//!     "demo_mode": true,
//!     "fixture_archive": "assets/moving_head.zip",
//!     "spotlights": [
//!         { "cmy": [0.0, 0.6, 1.0], "gobo_index": 2, "target": [0.0, 0.0, 4.0] },
//!         { "pan": 30.0, "tilt": -45.0, "gobo_shake": 0.5 }
//!     ]
//! }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{ceiling, materials};
use crate::errors::Result;
use crate::renderer::settings::PipelineSettings;
use crate::scene::scene::{Scene, SceneSources};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub pipeline: PipelineSettings,
    pub vsync: bool,
    pub ceiling_intensity: f32,
    pub ambient_fill: f32,
    pub room_specular: f32,
    pub room_shininess: f32,
    pub demo_mode: bool,
    /// Zip archive holding `description.json` and gobo media.
    pub fixture_archive: Option<PathBuf>,
    /// Gobo image used when the fixture has none.
    pub gobo_image: Option<PathBuf>,
    /// Overrides for the scene's spotlights, in order.
    pub spotlights: Vec<SpotlightConfig>,
}

/// Overrides for one spotlight. Unset fields keep the scene's value.
///
/// Angles are degrees for `pan`/`tilt` and cosines for the cones, matching
/// the [`Spotlight`](crate::scene::spotlight::Spotlight) setters. An aim
/// (`target`, or `direction` from the light's position) is applied last and
/// wins over `pan`/`tilt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotlightConfig {
    /// Ignored for lights mounted on a fixture.
    pub position: Option<[f32; 3]>,
    pub direction: Option<[f32; 3]>,
    pub target: Option<[f32; 3]>,
    pub color: Option<[f32; 3]>,
    /// Cyan, magenta, yellow; applied after `color`.
    pub cmy: Option<[f32; 3]>,
    pub intensity: Option<f32>,
    pub range: Option<f32>,
    pub beam_angle: Option<f32>,
    pub field_angle: Option<f32>,
    pub gobo_index: Option<u32>,
    pub gobo_rotation: Option<f32>,
    pub gobo_shake: Option<f32>,
    pub pan: Option<f32>,
    pub tilt: Option<f32>,
}

impl SpotlightConfig {
    /// Writes the set fields into spotlight `index` of `scene`.
    pub fn apply(&self, scene: &mut Scene, index: usize) {
        let gobo_layers = scene.gobos().len() as u32;
        let Some(light) = scene.spotlights.get_mut(index) else {
            log::warn!("Config for spotlight {index} ignored; the scene has fewer lights");
            return;
        };

        if let Some(position) = self.position {
            if light.links().is_some() {
                log::warn!("Spotlight {index} follows its fixture; position ignored");
            } else {
                light.set_position(Vec3::from(position));
            }
        }
        if let Some(color) = self.color {
            light.set_color(Vec3::from(color));
        }
        if let Some([c, m, y]) = self.cmy {
            light.set_color_from_cmy(c, m, y);
        }
        if let Some(intensity) = self.intensity {
            light.set_intensity(intensity.max(0.0));
        }
        if let Some(range) = self.range {
            light.set_range(range.max(0.0));
        }
        if let Some(beam) = self.beam_angle {
            light.set_beam_angle(beam);
        }
        if let Some(field) = self.field_angle {
            light.set_field_angle(field);
        }
        if let Some(gobo) = self.gobo_index {
            let last = gobo_layers.saturating_sub(1);
            if gobo > last {
                log::warn!("Spotlight {index}: gobo {gobo} out of range, using {last}");
            }
            light.set_gobo_index(gobo.min(last));
        }
        if let Some(rotation) = self.gobo_rotation {
            light.set_gobo_rotation(rotation);
        }
        if let Some(shake) = self.gobo_shake {
            light.set_gobo_shake(shake.max(0.0));
        }
        if let Some(pan) = self.pan {
            light.set_pan(pan, &mut scene.nodes);
        }
        if let Some(tilt) = self.tilt {
            light.set_tilt(tilt, &mut scene.nodes);
        }

        let aim = self
            .target
            .map(Vec3::from)
            .or_else(|| self.direction.map(|d| light.position() + Vec3::from(d)));
        if let Some(target) = aim {
            scene.aim_spotlight(index, target);
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineSettings::default(),
            vsync: true,
            ceiling_intensity: ceiling::DEFAULT_INTENSITY,
            ambient_fill: ceiling::DEFAULT_FILL,
            room_specular: materials::ROOM_SPECULAR,
            room_shininess: materials::ROOM_SHININESS,
            demo_mode: false,
            fixture_archive: None,
            gobo_image: None,
            spotlights: Vec::new(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads `path`, or returns the defaults when no path is given or the
    /// file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            log::warn!("Config file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::from_json(&std::fs::read(path)?)?;
        log::info!("Loaded viewer config from {}", path.display());
        Ok(config)
    }

    /// Provider data for [`Scene::initialize`].
    ///
    /// An unreadable archive is an error; an unreadable gobo image only
    /// falls back to the procedural pattern.
    pub fn scene_sources(&self) -> Result<SceneSources> {
        let mut sources = match &self.fixture_archive {
            Some(path) => SceneSources::with_archive(path)?,
            None => SceneSources::demo(),
        };

        if let Some(path) = &self.gobo_image {
            match image::open(path) {
                Ok(img) => sources.fallback_gobo = Some(img.to_rgba8()),
                Err(e) => log::warn!("Gobo image {} unreadable: {e}", path.display()),
            }
        }

        Ok(sources)
    }

    /// Pushes the scene-side knobs into `scene`.
    pub fn apply(&self, scene: &mut Scene) {
        scene.ceiling_lights.set_intensity(self.ceiling_intensity);
        scene.ceiling_lights.set_ambient(self.ambient_fill);
        scene.ceiling_lights.update();

        scene.room_material.specular = glam::Vec3::splat(self.room_specular.max(0.0));
        scene.room_material.shininess = self.room_shininess.max(1.0);

        for (index, light) in self.spotlights.iter().enumerate() {
            light.apply(scene, index);
        }
        scene.sync_spotlights();

        scene.set_demo_mode(self.demo_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = ViewerConfig::from_json(b"{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_pipeline_section_keeps_other_defaults() {
        let config =
            ViewerConfig::from_json(br#"{ "pipeline": { "fxaa": false }, "demo_mode": true }"#)
                .unwrap();
        assert!(!config.pipeline.fxaa);
        assert!(config.pipeline.blur);
        assert!(config.demo_mode);
    }

    #[test]
    fn spotlight_overrides_reach_the_lights() {
        let config = ViewerConfig::from_json(
            br#"{ "spotlights": [
                { "cmy": [0.0, 0.5, 1.0], "intensity": 40.0, "gobo_index": 99, "gobo_shake": 0.5 },
                { "pan": 30.0, "tilt": -60.0 }
            ] }"#,
        )
        .unwrap();
        let mut scene = Scene::initialize(SceneSources::demo());
        config.apply(&mut scene);

        let first = &scene.spotlights[0];
        assert_eq!(first.color(), Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(first.intensity(), 40.0);
        assert_eq!(first.gobo_index(), scene.gobos().len() as u32 - 1);
        assert_eq!(first.gobo_shake(), 0.5);

        let second = &scene.spotlights[1];
        assert_eq!(second.pan(), 30.0);
        assert_eq!(second.tilt(), -60.0);
        assert!(second.direction().y < -0.5);
    }

    #[test]
    fn target_aims_a_linked_light() {
        let config =
            ViewerConfig::from_json(br#"{ "spotlights": [{ "target": [0.0, 0.0, 10.0] }] }"#)
                .unwrap();
        let mut scene = Scene::initialize(SceneSources::demo());
        config.apply(&mut scene);

        let light = &scene.spotlights[0];
        let wanted = (Vec3::new(0.0, 0.0, 10.0) - light.position()).normalize();
        assert!(light.direction().dot(wanted) > 0.99, "got {:?}", light.direction());
    }

    #[test]
    fn extra_spotlight_entries_are_ignored() {
        let config = ViewerConfig {
            spotlights: vec![SpotlightConfig::default(); 9],
            ..ViewerConfig::default()
        };
        let mut scene = Scene::initialize(SceneSources::demo());
        config.apply(&mut scene);
        assert_eq!(scene.spotlights.len(), 4);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = ViewerConfig::load(Some(Path::new("/nonexistent/stagelight.json"))).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}
