//! Rendering
//!
//! - [`context`]: device, queue and surface bootstrap
//! - [`pipeline`]: the multi-pass orchestrator
//! - [`frame`]: the per-frame snapshot passes read from
//! - [`passes`]: shadow, scene, volumetric, blur, composite, final
//! - [`settings`]: bootstrap options and per-frame toggles
//! - [`uniforms`]: uniform block layouts shared with WGSL

pub mod context;
pub mod frame;
pub mod gobo_texture;
pub mod gpu_mesh;
pub mod node;
pub mod passes;
pub mod pipeline;
pub mod render_target;
pub mod settings;
pub mod shared;
pub mod uniforms;

pub use context::GpuContext;
pub use frame::{DrawItem, DrawLayer, FrameRenderContext};
pub use pipeline::RenderPipeline;
pub use settings::{GpuSettings, PipelineSettings, VolumetricSettings};
