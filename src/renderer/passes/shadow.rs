//! Shadow Pass
//!
//! Renders the stage mesh depth-only from every active spotlight into its
//! own layer of the shadow-map array. Each layer reads its light matrix
//! through a dynamic offset into one uniform buffer.

use crate::config::{shadow, spotlight::MAX_SPOTLIGHTS};
use crate::renderer::gpu_mesh::vertex_layout;
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::create_shader;
use crate::renderer::uniforms::{ShadowUniforms, align_to};

pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u32,
    /// Layers written by the last `prepare`.
    active_layers: u32,
}

impl ShadowPass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform_size = size_of::<ShadowUniforms>() as u64;
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(uniform_size as u32, min_alignment);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shadow Uniform Buffer"),
            size: u64::from(stride) * MAX_SPOTLIGHTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow BindGroup"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size),
                }),
            }],
        });

        let shader = create_shader(device, "Shadow Shader", &[include_str!("../shaders/shadow.wgsl")]);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Pipeline Layout"),
            bind_group_layouts: &[Some(&layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: shadow::DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            stride,
            active_layers: 0,
        }
    }
}

impl RenderNode for ShadowPass {
    fn name(&self) -> &'static str {
        "Shadow Pass"
    }

    fn prepare(&mut self, ctx: &PassContext) {
        self.active_layers = 0;
        if !ctx.frame.casts_shadows() {
            log::trace!("Shadow pass skipped: no active spotlights or stage mesh");
            return;
        }

        let lights = ctx.frame.active_spotlights();
        let model = glam::Mat4::from(ctx.frame.stage_transform()).to_cols_array_2d();
        let stride = self.stride as usize;

        let mut bytes = vec![0u8; stride * lights.len()];
        for (layer, light) in lights.iter().enumerate() {
            let uniforms = ShadowUniforms {
                light_view_proj: light.gpu_data().light_view_proj,
                model,
            };
            let src = bytemuck::bytes_of(&uniforms);
            bytes[layer * stride..layer * stride + src.len()].copy_from_slice(src);
        }

        ctx.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        self.active_layers = lights.len() as u32;
    }

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder) {
        if self.active_layers == 0 {
            return;
        }
        let Some(mesh) = ctx.frame.stage_mesh.and_then(|h| ctx.meshes.get(h)) else {
            log::debug!("Stage mesh has no GPU copy; shadow pass skipped");
            return;
        };

        let layer_views = &ctx.shared.shadow_maps.layer_views;
        for (layer, view) in layer_views.iter().enumerate().take(self.active_layers as usize) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[layer as u32 * self.stride]);
            mesh.bind(&mut pass);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
