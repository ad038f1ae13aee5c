//! Final Pass
//!
//! Resolves the scene color target onto the presentable output, either
//! through FXAA or as a plain copy. The output is cleared first in both
//! modes.
//!
//! ```text
//! Scene Color (Rgba16Float) ──► FXAA | Copy ──► Surface
//! ```

use crate::config::display;
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::{
    FULLSCREEN_WGSL, create_shader, fullscreen_pipeline, linear_sampler,
    texture_sampler_bind_group, texture_sampler_layout,
};
use crate::renderer::render_target::RenderTargets;
use crate::renderer::shared::uniform_buffer;
use crate::renderer::uniforms::FxaaUniforms;

pub struct FinalPass {
    fxaa_pipeline: wgpu::RenderPipeline,
    fxaa_bind_group: wgpu::BindGroup,
    copy_pipeline: wgpu::RenderPipeline,
    copy_bind_group: wgpu::BindGroup,
}

impl FinalPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        targets: &RenderTargets,
        output_format: wgpu::TextureFormat,
    ) -> Self {
        // Linear filtering drives FXAA's sub-pixel blend.
        let sampler = linear_sampler(device, "Final Sampler");
        let source = &targets.scene_color.sample_view;

        let fxaa_layout = texture_sampler_layout(device, "FXAA BindGroup Layout", true);
        let fxaa_buffer = uniform_buffer::<FxaaUniforms>(device, "FXAA Uniforms");
        // Targets never resize, so the reciprocal frame size is written once.
        let fxaa_uniforms = FxaaUniforms::new(display::WIDTH, display::HEIGHT);
        queue.write_buffer(&fxaa_buffer, 0, bytemuck::bytes_of(&fxaa_uniforms));

        let fxaa_bind_group = texture_sampler_bind_group(
            device,
            "FXAA BindGroup",
            &fxaa_layout,
            source,
            &sampler,
            Some(&fxaa_buffer),
        );
        let fxaa_shader = create_shader(
            device,
            "FXAA Shader",
            &[FULLSCREEN_WGSL, include_str!("../shaders/fxaa.wgsl")],
        );
        let fxaa_pipeline = fullscreen_pipeline(
            device,
            "FXAA Pipeline",
            &fxaa_shader,
            &[&fxaa_layout],
            output_format,
            Some(wgpu::BlendState::REPLACE),
        );

        let copy_layout = texture_sampler_layout(device, "Copy BindGroup Layout", false);
        let copy_bind_group =
            texture_sampler_bind_group(device, "Copy BindGroup", &copy_layout, source, &sampler, None);
        let copy_shader = create_shader(
            device,
            "Copy Shader",
            &[FULLSCREEN_WGSL, include_str!("../shaders/copy.wgsl")],
        );
        let copy_pipeline = fullscreen_pipeline(
            device,
            "Copy Pipeline",
            &copy_shader,
            &[&copy_layout],
            output_format,
            Some(wgpu::BlendState::REPLACE),
        );

        Self {
            fxaa_pipeline,
            fxaa_bind_group,
            copy_pipeline,
            copy_bind_group,
        }
    }
}

impl RenderNode for FinalPass {
    fn name(&self) -> &'static str {
        "Final Pass"
    }

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder) {
        let (label, pipeline, bind_group) = if ctx.settings.fxaa {
            ("FXAA Pass", &self.fxaa_pipeline, &self.fxaa_bind_group)
        } else {
            ("Copy Pass", &self.copy_pipeline, &self.copy_bind_group)
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
