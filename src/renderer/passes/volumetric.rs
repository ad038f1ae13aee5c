//! Volumetric Pass
//!
//! Ray-marches from the camera to the scene depth through every pixel and
//! accumulates in-scattered spotlight energy, sampling the shadow maps and
//! gobo array at each step. Writes the cleared volumetric target.

use crate::config::post_process;
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::{
    COMMON_WGSL, FULLSCREEN_WGSL, cleared_attachment, create_shader, fullscreen_pipeline,
    texture_entry, uniform_entry,
};
use crate::renderer::render_target::RenderTarget;
use crate::renderer::shared::uniform_buffer;
use crate::renderer::uniforms::VolumetricUniforms;

pub struct VolumetricPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl VolumetricPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame_layout: &wgpu::BindGroupLayout,
        scene_depth: &RenderTarget,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Volumetric BindGroup Layout"),
            entries: &[
                texture_entry(
                    0,
                    wgpu::TextureSampleType::Depth,
                    wgpu::TextureViewDimension::D2,
                ),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });

        let uniform_buffer = uniform_buffer::<VolumetricUniforms>(device, "Volumetric Uniforms");

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Volumetric BindGroup"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&scene_depth.sample_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = create_shader(
            device,
            "Volumetric Shader",
            &[
                COMMON_WGSL,
                FULLSCREEN_WGSL,
                include_str!("../shaders/volumetric.wgsl"),
            ],
        );

        let pipeline = fullscreen_pipeline(
            device,
            "Volumetric Pipeline",
            &shader,
            &[frame_layout, &layout],
            post_process::COLOR_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        );

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }
}

impl RenderNode for VolumetricPass {
    fn name(&self) -> &'static str {
        "Volumetric Pass"
    }

    fn prepare(&mut self, ctx: &PassContext) {
        let uniforms = VolumetricUniforms::new(&ctx.settings.volumetric, ctx.frame.time);
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Volumetric Pass"),
            color_attachments: &[Some(cleared_attachment(&ctx.targets.volumetric.view))],
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &ctx.shared.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
