#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Real-time stage lighting visualizer.
//!
//! Moving-head spotlights hang from the anchors of a stage mesh, cast
//! shadow-mapped, gobo-textured light into a room, and scatter through haze
//! rendered by a ray-marched volumetric pass:
//!
//! ```text
//! Shadow → Scene → Volumetric → Blur → Composite → FXAA / Copy
//! ```
//!
//! [`Scene`] holds the CPU-side state, [`FrameRenderContext`] snapshots it
//! each frame, and [`RenderPipeline`] turns the snapshot into pixels.

pub mod app;
pub mod config;
pub mod errors;
pub mod math;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{Result, StageError};
pub use math::Ray;
pub use renderer::{FrameRenderContext, GpuContext, PipelineSettings, RenderPipeline, VolumetricSettings};
pub use resources::{FixtureDescription, GoboSet, MaterialData, MeshData, MeshLibrary};
pub use scene::{CeilingLights, EffectsEngine, NodeTree, OrbitCamera, Scene, SceneSources, Spotlight};

#[cfg(feature = "winit")]
pub use app::winit::App;
