//! Render node trait
//!
//! Every pass of the pipeline implements [`RenderNode`]. A frame calls
//! `prepare` on every node in order, then records `run` for every node into
//! one command encoder.
//!
//! - `prepare` may write buffers through `ctx.queue` and grow pass-owned
//!   resources; it is the only place a node mutates itself
//! - `run` only records commands and must not allocate GPU resources

use crate::renderer::frame::FrameRenderContext;
use crate::renderer::gpu_mesh::GpuMeshes;
use crate::renderer::render_target::RenderTargets;
use crate::renderer::settings::PipelineSettings;
use crate::renderer::shared::SharedResources;

/// Everything a pass may read during one frame.
pub struct PassContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub frame: &'a FrameRenderContext<'a>,
    /// Already clamped.
    pub settings: &'a PipelineSettings,
    pub shared: &'a SharedResources,
    pub targets: &'a RenderTargets,
    pub meshes: &'a GpuMeshes,
    /// The presentable view the final pass writes.
    pub output: &'a wgpu::TextureView,
}

pub trait RenderNode {
    fn name(&self) -> &'static str;

    fn prepare(&mut self, _ctx: &PassContext) {}

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder);
}
