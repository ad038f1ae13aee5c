//! Scene model
//!
//! CPU-side state driving every frame:
//! - Node / Transform: fixture hierarchies and world-matrix propagation
//! - Spotlight: per-fixture light state, optionally derived from linked nodes
//! - CeilingLights: fixed grid of point lights plus an ambient term
//! - OrbitCamera: the viewer camera
//! - EffectsEngine: demo-mode animation
//! - FixtureBuilder: instantiates a fixture description at an anchor
//! - Scene: owns all of the above

pub mod camera;
pub mod ceiling_lights;
pub mod effects;
pub mod fixture;
pub mod node;
pub mod scene;
pub mod spotlight;
pub mod transform;
pub mod transform_system;

pub use camera::OrbitCamera;
pub use ceiling_lights::{CeilingLightGpuData, CeilingLights, PointLightGpuData};
pub use effects::EffectsEngine;
pub use fixture::{FixtureBuilder, FixtureInstance};
pub use node::{MeshInstance, NodePayload, NodeTree, TransformNode};
pub use scene::{Scene, SceneSources};
pub use spotlight::{Spotlight, SpotlightGpuData};
pub use transform::{LocalTransform, Transform};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
