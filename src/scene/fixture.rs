//! Fixture hierarchy builder.
//!
//! Turns a [`FixtureDescription`] into transform-node trees, one per anchor:
//!
//! ```text
//! Placement (anchor translation, base matrix)
//! └── Orientation (roll π, uniform scale, mounting drop)
//!     └── Base ─── Yoke#placement ─── Yoke ─── Head#placement ─── Head ─── Beam
//! ```
//!
//! Every `Axis` geometry is split into a base-matrix placement node carrying
//! the authored matrix and a component-mode motion node carrying the
//! geometry's name. Pan/tilt rotations target the motion node and never
//! touch authored placement.

use std::f32::consts::PI;

use glam::{Affine3A, Vec3};
use rustc_hash::FxHashMap;

use crate::config::fixture as cfg;
use crate::resources::fixture::{FixtureDescription, GeometryKind, GeometryNode};
use crate::resources::mesh::{MeshData, MeshHandle, MeshLibrary};
use crate::scene::NodeHandle;
use crate::scene::node::{NodePayload, NodeTree, TransformNode};

/// Handles of one instantiated fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureInstance {
    /// Placement root, translated to the anchor.
    pub root: NodeHandle,
    pub orientation: NodeHandle,
    pub pan: Option<NodeHandle>,
    pub tilt: Option<NodeHandle>,
    /// Beam node, or the tilt node when the fixture has no beam geometry.
    pub beam: Option<NodeHandle>,
}

/// Instantiates one description any number of times, sharing model meshes.
pub struct FixtureBuilder<'a> {
    description: &'a FixtureDescription,
    /// Model meshes not yet uploaded into the library, by mesh name.
    pending_models: FxHashMap<String, MeshData>,
    /// Resolved model handles; `None` records a model known to be missing.
    model_cache: FxHashMap<String, Option<MeshHandle>>,
}

impl<'a> FixtureBuilder<'a> {
    #[must_use]
    pub fn new(description: &'a FixtureDescription, models: Vec<MeshData>) -> Self {
        Self {
            description,
            pending_models: models.into_iter().map(|m| (m.name.clone(), m)).collect(),
            model_cache: FxHashMap::default(),
        }
    }

    /// Builds one hierarchy at `anchor` and returns its handles.
    pub fn build(
        &mut self,
        nodes: &mut NodeTree,
        meshes: &mut MeshLibrary,
        anchor: Vec3,
        index: usize,
    ) -> FixtureInstance {
        let root = nodes.insert(
            TransformNode::new(format!("{} #{}", self.description.name, index + 1))
                .with_matrix(Affine3A::from_translation(anchor)),
        );

        let orientation = nodes.create("Orientation");
        nodes.set_translation(orientation, Vec3::new(0.0, -cfg::MOUNT_OFFSET, 0.0));
        nodes.set_rotation(orientation, Vec3::new(0.0, 0.0, PI));
        nodes.set_scale(orientation, Vec3::splat(cfg::SCALE));
        nodes.add_child(root, orientation);

        let description = self.description;
        self.instantiate(nodes, meshes, &description.geometry, orientation);

        let pan = nodes.find_any(root, cfg::PAN_NAMES);
        let tilt = nodes.find_any(root, cfg::TILT_NAMES);
        let beam = nodes.find_any(root, cfg::BEAM_NAMES).or(tilt);

        if pan.is_none() || tilt.is_none() {
            log::warn!(
                "Fixture '{}' lacks a pan or tilt axis; the light will not follow motion",
                self.description.name
            );
        }

        FixtureInstance {
            root,
            orientation,
            pan,
            tilt,
            beam,
        }
    }

    fn instantiate(
        &mut self,
        nodes: &mut NodeTree,
        meshes: &mut MeshLibrary,
        geometry: &GeometryNode,
        parent: NodeHandle,
    ) {
        let payload = match self.resolve_model(meshes, &geometry.model) {
            Some(mesh) => NodePayload::MeshRef(mesh),
            None => NodePayload::Empty,
        };

        let node = if geometry.kind == GeometryKind::Axis {
            let placement = nodes.insert(
                TransformNode::new(format!("{}{}", geometry.name, cfg::PLACEMENT_SUFFIX))
                    .with_matrix(geometry.matrix),
            );
            nodes.add_child(parent, placement);

            let motion = nodes.insert(TransformNode::new(&geometry.name).with_payload(payload));
            nodes.add_child(placement, motion);
            motion
        } else {
            let node = nodes.insert(
                TransformNode::new(&geometry.name)
                    .with_matrix(geometry.matrix)
                    .with_payload(payload),
            );
            nodes.add_child(parent, node);
            node
        };

        for child in &geometry.children {
            self.instantiate(nodes, meshes, child, node);
        }
    }

    fn resolve_model(&mut self, meshes: &mut MeshLibrary, model: &str) -> Option<MeshHandle> {
        if model.is_empty() {
            return None;
        }
        if let Some(cached) = self.model_cache.get(model) {
            return *cached;
        }

        let description = self.description;
        let file = description.model_file(model);
        let mesh = self
            .pending_models
            .remove(model)
            .or_else(|| self.pending_models.remove(file));

        let handle = match mesh {
            Some(mesh) => Some(meshes.insert(mesh)),
            None => {
                log::warn!("Model '{model}' has no mesh; geometry is drawn without it");
                None
            }
        };

        self.model_cache.insert(model.to_string(), handle);
        handle
    }
}
