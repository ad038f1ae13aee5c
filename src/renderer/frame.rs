//! Frame Render Context
//!
//! [`FrameRenderContext`] is the read-only snapshot every pass consumes for
//! one frame. It is assembled by the caller after `Scene::update` and dropped
//! once `RenderPipeline::render` returns.
//!
//! The context also flattens the scene into an ordered [`DrawItem`] list
//! (room, stage shapes, fixture shapes) so the draw order and per-draw
//! material selection can be checked without a GPU.

use glam::{Affine3A, Vec3};

use crate::config::spotlight::MAX_SPOTLIGHTS;
use crate::resources::mesh::{MaterialData, MeshHandle, MeshLibrary};
use crate::scene::camera::OrbitCamera;
use crate::scene::ceiling_lights::CeilingLights;
use crate::scene::node::MeshInstance;
use crate::scene::scene::Scene;
use crate::scene::spotlight::Spotlight;

/// Which group of geometry a draw belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawLayer {
    /// Drawn without back-face culling; the camera sits inside it.
    Room,
    Stage,
    Fixture,
}

/// One indexed draw of the scene color pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub layer: DrawLayer,
    pub mesh: MeshHandle,
    /// Index into the mesh's shape table.
    pub shape: usize,
    pub world: Affine3A,
    pub material: MaterialData,
}

pub struct FrameRenderContext<'a> {
    pub camera: &'a OrbitCamera,
    pub spotlights: &'a [Spotlight],
    pub ceiling_lights: &'a CeilingLights,
    pub meshes: &'a MeshLibrary,
    pub room_mesh: MeshHandle,
    /// Overrides the material of every room shape.
    pub room_material: MaterialData,
    pub stage_mesh: Option<MeshHandle>,
    pub fixture_meshes: Vec<MeshInstance>,
    pub stage_offset: f32,
    pub time: f32,
    pub gobo_layers: u32,
}

impl<'a> FrameRenderContext<'a> {
    /// Snapshots `scene`; world matrices must already be propagated.
    #[must_use]
    pub fn from_scene(scene: &'a Scene) -> Self {
        let mut fixture_meshes = Vec::new();
        scene.fixture_mesh_instances(&mut fixture_meshes);

        Self {
            camera: &scene.camera,
            spotlights: &scene.spotlights,
            ceiling_lights: &scene.ceiling_lights,
            meshes: &scene.meshes,
            room_mesh: scene.room_mesh(),
            room_material: scene.room_material,
            stage_mesh: scene.stage_mesh(),
            fixture_meshes,
            stage_offset: scene.stage_offset(),
            time: scene.time(),
            gobo_layers: scene.gobos().len() as u32,
        }
    }

    /// The lights that reach the GPU, in scene order.
    #[must_use]
    pub fn active_spotlights(&self) -> &'a [Spotlight] {
        let n = self.spotlights.len().min(MAX_SPOTLIGHTS);
        &self.spotlights[..n]
    }

    /// The shadow pass has nothing to do without lights or a stage mesh.
    #[must_use]
    pub fn casts_shadows(&self) -> bool {
        !self.active_spotlights().is_empty() && self.stage_mesh.is_some()
    }

    /// Places the stage mesh so its lowest point rests on the room floor.
    #[must_use]
    pub fn stage_transform(&self) -> Affine3A {
        Affine3A::from_translation(Vec3::new(0.0, self.stage_offset, 0.0))
    }

    /// Draws of the scene color pass in submission order.
    ///
    /// Meshes missing from the library are skipped.
    #[must_use]
    pub fn draw_items(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();

        if let Some(room) = self.meshes.get(self.room_mesh) {
            items.extend((0..room.shapes.len()).map(|shape| DrawItem {
                layer: DrawLayer::Room,
                mesh: self.room_mesh,
                shape,
                world: Affine3A::IDENTITY,
                material: self.room_material,
            }));
        } else {
            log::debug!("Room mesh missing; skipping room draw");
        }

        if let Some(handle) = self.stage_mesh {
            match self.meshes.get(handle) {
                Some(stage) => {
                    let world = self.stage_transform();
                    items.extend(stage.shapes.iter().enumerate().map(|(shape, info)| {
                        DrawItem {
                            layer: DrawLayer::Stage,
                            mesh: handle,
                            shape,
                            world,
                            material: info.material,
                        }
                    }));
                }
                None => log::debug!("Stage mesh missing; skipping stage draws"),
            }
        }

        for instance in &self.fixture_meshes {
            let Some(mesh) = self.meshes.get(instance.mesh) else {
                log::debug!("Fixture mesh missing; skipping instance");
                continue;
            };
            items.extend(mesh.shapes.iter().enumerate().map(|(shape, info)| DrawItem {
                layer: DrawLayer::Fixture,
                mesh: instance.mesh,
                shape,
                world: instance.world,
                material: info.material,
            }));
        }

        items
    }
}
