//! Composite Pass: adds the volumetric target onto the scene color target.

use crate::config::post_process;
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::{
    FULLSCREEN_WGSL, create_shader, fullscreen_pipeline, linear_sampler,
    texture_sampler_bind_group, texture_sampler_layout,
};
use crate::renderer::render_target::RenderTargets;

/// `src + dst` on both color and alpha.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl CompositePass {
    #[must_use]
    pub fn new(device: &wgpu::Device, targets: &RenderTargets) -> Self {
        let layout = texture_sampler_layout(device, "Composite BindGroup Layout", false);
        let sampler = linear_sampler(device, "Composite Sampler");
        let bind_group = texture_sampler_bind_group(
            device,
            "Composite BindGroup",
            &layout,
            &targets.volumetric.sample_view,
            &sampler,
            None,
        );

        let shader = create_shader(
            device,
            "Composite Shader",
            &[FULLSCREEN_WGSL, include_str!("../shaders/composite.wgsl")],
        );
        // The blend state is baked into the pipeline, so later passes see the
        // default state again without any reset.
        let pipeline = fullscreen_pipeline(
            device,
            "Composite Pipeline",
            &shader,
            &[&layout],
            post_process::COLOR_FORMAT,
            Some(ADDITIVE_BLEND),
        );

        Self {
            pipeline,
            bind_group,
        }
    }
}

impl RenderNode for CompositePass {
    fn name(&self) -> &'static str {
        "Composite Pass"
    }

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &ctx.targets.scene_color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
