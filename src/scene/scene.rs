//! Scene
//!
//! Owns everything the renderer reads each frame: camera, spotlights,
//! ceiling lights, the mesh library (room, stage, fixture models), the gobo
//! image set and the fixture node forest.
//!
//! The scene is CPU-only. GPU copies of its meshes and gobo images are made
//! by the renderer.

use std::path::Path;

use glam::Vec3;
use image::RgbaImage;

use crate::config::{fixture as fixture_cfg, gobo as gobo_cfg, materials, room, spotlight};
use crate::errors::Result;
use crate::math::Ray;
use crate::resources::archive::FixtureArchive;
use crate::resources::fixture::FixtureDescription;
use crate::resources::gobo::{GoboSet, breakup_gobo};
use crate::resources::mesh::{MaterialData, MeshData, MeshHandle, MeshLibrary};
use crate::resources::primitives::{create_demo_stage, create_moving_head_models, create_room};
use crate::scene::camera::OrbitCamera;
use crate::scene::ceiling_lights::CeilingLights;
use crate::scene::effects::EffectsEngine;
use crate::scene::fixture::{FixtureBuilder, FixtureInstance};
use crate::scene::node::{MeshInstance, NodeTree};
use crate::scene::spotlight::Spotlight;

/// Radius of the sphere used to pick a spotlight with a ray.
const PICK_RADIUS: f32 = 1.0;

/// Typed inputs from the mesh, fixture and texture providers.
///
/// Every field is optional; missing data is replaced by a deterministic
/// fallback in [`Scene::initialize`].
#[derive(Debug, Default)]
pub struct SceneSources {
    pub stage: Option<MeshData>,
    pub fixture: Option<FixtureDescription>,
    /// Fixture model meshes keyed by their `MeshData::name`.
    pub fixture_models: Vec<MeshData>,
    /// Gobo wheel images extracted from the fixture.
    pub gobo_images: Vec<RgbaImage>,
    /// Used when the fixture supplies no gobo media.
    pub fallback_gobo: Option<RgbaImage>,
}

impl SceneSources {
    /// The procedural demo stage with the built-in moving head.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            stage: Some(create_demo_stage()),
            ..Self::default()
        }
    }

    /// Demo stage plus a fixture read from an archive on disk.
    pub fn with_archive(path: impl AsRef<Path>) -> Result<Self> {
        let mut archive = FixtureArchive::open(path)?;
        let description = archive.description()?;
        let gobo_images = archive.gobo_images(&description);
        log::info!(
            "Loaded fixture '{}' ({} gobo images, {} DMX channels)",
            description.name,
            gobo_images.len(),
            description.dmx_channels().len()
        );

        Ok(Self {
            stage: Some(create_demo_stage()),
            fixture: Some(description),
            gobo_images,
            ..Self::default()
        })
    }
}

pub struct Scene {
    pub camera: OrbitCamera,
    pub spotlights: Vec<Spotlight>,
    pub ceiling_lights: CeilingLights,
    pub effects: EffectsEngine,
    pub nodes: NodeTree,
    pub meshes: MeshLibrary,
    pub room_material: MaterialData,

    fixtures: Vec<FixtureInstance>,
    fixture: FixtureDescription,
    room: MeshHandle,
    stage: Option<MeshHandle>,
    stage_offset: f32,
    anchors: Vec<Vec3>,
    gobos: GoboSet,
    selected: Option<usize>,
    time: f32,
}

impl Scene {
    /// Builds the scene from whatever the providers delivered.
    pub fn initialize(sources: SceneSources) -> Self {
        let mut meshes = MeshLibrary::default();
        let room = meshes.insert(create_room());

        let (stage, stage_offset, anchors) = match sources.stage {
            Some(mesh) => {
                let offset = room::FLOOR_Y - mesh.min_y();
                let anchors = find_anchors(&mesh, offset);
                (Some(meshes.insert(mesh)), offset, anchors)
            }
            None => {
                log::warn!("No stage mesh; using a single default anchor");
                (None, 0.0, vec![default_anchor()])
            }
        };

        let (fixture, models) = match sources.fixture {
            Some(description) => (description, sources.fixture_models),
            None => {
                log::warn!("No fixture description; using the built-in moving head");
                let models = if sources.fixture_models.is_empty() {
                    create_moving_head_models()
                } else {
                    sources.fixture_models
                };
                (FixtureDescription::default_moving_head(), models)
            }
        };

        let mut nodes = NodeTree::new();
        let mut builder = FixtureBuilder::new(&fixture, models);
        let mut fixtures = Vec::with_capacity(anchors.len());
        let mut spotlights = Vec::with_capacity(anchors.len());

        for (index, anchor) in anchors.iter().enumerate() {
            let instance = builder.build(&mut nodes, &mut meshes, *anchor, index);

            let mut light = Spotlight::new();
            light.set_position(*anchor);
            light.link_nodes(instance.pan, instance.tilt, instance.beam);

            fixtures.push(instance);
            spotlights.push(light);
        }

        if spotlights.len() > spotlight::MAX_SPOTLIGHTS {
            log::warn!(
                "{} anchors found; only the first {} spotlights cast light",
                spotlights.len(),
                spotlight::MAX_SPOTLIGHTS
            );
        }

        let gobos = if sources.gobo_images.is_empty() {
            log::warn!("Fixture has no gobo media; using the fallback gobo image");
            GoboSet::single(
                sources
                    .fallback_gobo
                    .unwrap_or_else(|| breakup_gobo(gobo_cfg::IMAGE_SIZE)),
            )
        } else {
            GoboSet::from_wheel_images(sources.gobo_images)
        };

        let mut scene = Self {
            camera: OrbitCamera::default(),
            spotlights,
            ceiling_lights: CeilingLights::new(),
            effects: EffectsEngine::default(),
            nodes,
            meshes,
            room_material: MaterialData {
                diffuse: Vec3::splat(materials::ROOM_COLOR),
                specular: Vec3::splat(materials::ROOM_SPECULAR),
                shininess: materials::ROOM_SHININESS,
            },
            fixtures,
            fixture,
            room,
            stage,
            stage_offset,
            anchors,
            gobos,
            selected: None,
            time: 0.0,
        };
        scene.sync_spotlights();
        for light in &mut scene.spotlights {
            light.aim_at(spotlight::AIM_TARGET, &mut scene.nodes);
        }
        scene.sync_spotlights();

        log::info!(
            "Scene initialized: {} spotlight(s), {} gobo layer(s), stage offset {:.3}",
            scene.spotlights.len(),
            scene.gobos.len(),
            scene.stage_offset
        );
        scene
    }

    /// Advances the scene by `delta_time` seconds.
    ///
    /// Demo effects write pan/tilt first so that propagation and the
    /// node-derived spotlight sync see this frame's pose.
    pub fn update(&mut self, delta_time: f32) {
        self.time += delta_time;

        self.effects
            .update(&mut self.spotlights, &mut self.nodes, self.time);

        self.sync_spotlights();
        self.ceiling_lights.update();
    }

    /// Propagates node transforms, then refreshes every light's pose,
    /// gobo shake and shadow matrix.
    ///
    /// [`Self::update`] does this every frame; call it directly after
    /// editing lights or nodes outside the frame loop.
    pub fn sync_spotlights(&mut self) {
        self.nodes.update_world_matrices();
        for light in &mut self.spotlights {
            light.update_from_nodes(&self.nodes);
            light.update_gobo_shake(self.time);
            light.update_light_matrix();
        }
    }

    // ========================================================================
    // Spotlight management
    // ========================================================================

    /// Adds an unlinked spotlight.
    pub fn add_spotlight(&mut self, light: Spotlight) {
        self.spotlights.push(light);
    }

    /// Removes a spotlight; the last remaining one is kept.
    ///
    /// The first `fixtures().len()` spotlights belong to the fixture at the
    /// same index. Removing one of those also removes its fixture hierarchy,
    /// so the model stops being drawn.
    pub fn remove_spotlight(&mut self, index: usize) {
        if index >= self.spotlights.len() || self.spotlights.len() <= 1 {
            return;
        }

        let light = self.spotlights.remove(index);
        if light.links().is_some() && index < self.fixtures.len() {
            let fixture = self.fixtures.remove(index);
            self.nodes.remove(fixture.root);
            log::debug!("Removed spotlight {index} and its fixture");
        }
        self.selected = None;
    }

    /// Aims one spotlight at `target` and refreshes the pose.
    pub fn aim_spotlight(&mut self, index: usize, target: Vec3) {
        self.nodes.update_world_matrices();
        if let Some(light) = self.spotlights.get_mut(index) {
            light.aim_at(target, &mut self.nodes);
        }
        self.sync_spotlights();
    }

    /// Index of the nearest spotlight whose pick sphere the ray hits.
    #[must_use]
    pub fn pick_spotlight(&self, ray: &Ray) -> Option<usize> {
        self.spotlights
            .iter()
            .enumerate()
            .filter_map(|(i, light)| {
                let (t0, t1) = ray.intersect_sphere(light.position(), PICK_RADIUS)?;
                let t = if t0 >= 0.0 { t0 } else { t1 };
                (t >= 0.0).then_some((i, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|i| *i < self.spotlights.len());
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    // ========================================================================
    // Demo mode
    // ========================================================================

    pub fn set_demo_mode(&mut self, enabled: bool) {
        self.effects.enabled = enabled;
    }

    #[must_use]
    pub fn demo_mode(&self) -> bool {
        self.effects.enabled
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn stage_offset(&self) -> f32 {
        self.stage_offset
    }

    #[must_use]
    pub fn anchors(&self) -> &[Vec3] {
        &self.anchors
    }

    #[must_use]
    pub fn fixtures(&self) -> &[FixtureInstance] {
        &self.fixtures
    }

    #[must_use]
    pub fn fixture_description(&self) -> &FixtureDescription {
        &self.fixture
    }

    #[must_use]
    pub fn room_mesh(&self) -> MeshHandle {
        self.room
    }

    #[must_use]
    pub fn stage_mesh(&self) -> Option<MeshHandle> {
        self.stage
    }

    #[must_use]
    pub fn gobos(&self) -> &GoboSet {
        &self.gobos
    }

    /// Every mesh-bearing fixture node with its current world matrix.
    pub fn fixture_mesh_instances(&self, out: &mut Vec<MeshInstance>) {
        out.clear();
        for fixture in &self.fixtures {
            self.nodes.collect_mesh_instances(fixture.root, out);
        }
    }
}

/// Mounting points from the stage mesh, lifted by the stage offset.
///
/// Sub-shapes named with the anchor prefix win; otherwise the fallback shape
/// is used, and failing that a fixed default position.
#[must_use]
pub fn find_anchors(mesh: &MeshData, stage_offset: f32) -> Vec<Vec3> {
    let lift = Vec3::new(0.0, stage_offset, 0.0);

    let anchors: Vec<Vec3> = mesh
        .shapes
        .iter()
        .filter(|s| s.name.contains(fixture_cfg::ANCHOR_PREFIX))
        .map(|s| s.center + lift)
        .collect();
    if !anchors.is_empty() {
        return anchors;
    }

    if let Some(shape) = mesh.shape(fixture_cfg::FALLBACK_ANCHOR_SHAPE) {
        log::warn!("No anchor shapes; mounting at '{}'", shape.name);
        return vec![shape.center + lift];
    }

    log::warn!("No anchor shapes; using the default fixture position");
    vec![default_anchor() + lift]
}

fn default_anchor() -> Vec3 {
    Vec3::new(0.0, spotlight::DEFAULT_HEIGHT, 0.0)
}
