//! Blur Pass
//!
//! Separable Gaussian over the volumetric target. One repetition is a
//! horizontal step (volumetric → temp) followed by a vertical step
//! (temp → volumetric), so the result always ends up back in the
//! volumetric target.
//!
//! The two directions use separate uniform buffers; a single buffer
//! rewritten between steps would only keep the last write by submit time.

use glam::Vec2;

use crate::config::{display, post_process};
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::{
    FULLSCREEN_WGSL, cleared_attachment, create_shader, fullscreen_pipeline, linear_sampler,
    texture_sampler_bind_group, texture_sampler_layout,
};
use crate::renderer::render_target::RenderTargets;
use crate::renderer::shared::uniform_buffer;
use crate::renderer::uniforms::BlurUniforms;

pub struct BlurPass {
    pipeline: wgpu::RenderPipeline,
    horizontal_buffer: wgpu::Buffer,
    vertical_buffer: wgpu::Buffer,
    /// Reads volumetric, horizontal direction.
    horizontal: wgpu::BindGroup,
    /// Reads blur temp, vertical direction.
    vertical: wgpu::BindGroup,
    passes: u32,
}

impl BlurPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, targets: &RenderTargets) -> Self {
        let layout = texture_sampler_layout(device, "Blur BindGroup Layout", true);
        let sampler = linear_sampler(device, "Blur Sampler");

        let horizontal_buffer = uniform_buffer::<BlurUniforms>(device, "Blur Horizontal Uniforms");
        let vertical_buffer = uniform_buffer::<BlurUniforms>(device, "Blur Vertical Uniforms");

        let horizontal = texture_sampler_bind_group(
            device,
            "Blur Horizontal BindGroup",
            &layout,
            &targets.volumetric.sample_view,
            &sampler,
            Some(&horizontal_buffer),
        );
        let vertical = texture_sampler_bind_group(
            device,
            "Blur Vertical BindGroup",
            &layout,
            &targets.blur_temp.sample_view,
            &sampler,
            Some(&vertical_buffer),
        );

        let shader = create_shader(
            device,
            "Blur Shader",
            &[FULLSCREEN_WGSL, include_str!("../shaders/blur.wgsl")],
        );
        let pipeline = fullscreen_pipeline(
            device,
            "Blur Pipeline",
            &shader,
            &[&layout],
            post_process::COLOR_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );

        Self {
            pipeline,
            horizontal_buffer,
            vertical_buffer,
            horizontal,
            vertical,
            passes: 0,
        }
    }

    fn step(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(cleared_attachment(target))],
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl RenderNode for BlurPass {
    fn name(&self) -> &'static str {
        "Blur Pass"
    }

    fn prepare(&mut self, ctx: &PassContext) {
        self.passes = ctx.settings.effective_blur_passes();
        if self.passes == 0 {
            return;
        }

        let (w, h) = (display::WIDTH, display::HEIGHT);
        let horizontal = BlurUniforms::new(Vec2::X, w, h);
        let vertical = BlurUniforms::new(Vec2::Y, w, h);
        ctx.queue
            .write_buffer(&self.horizontal_buffer, 0, bytemuck::bytes_of(&horizontal));
        ctx.queue
            .write_buffer(&self.vertical_buffer, 0, bytemuck::bytes_of(&vertical));
    }

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder) {
        for _ in 0..self.passes {
            self.step(
                encoder,
                "Blur Horizontal",
                &ctx.targets.blur_temp.view,
                &self.horizontal,
            );
            self.step(
                encoder,
                "Blur Vertical",
                &ctx.targets.volumetric.view,
                &self.vertical,
            );
        }
    }
}
