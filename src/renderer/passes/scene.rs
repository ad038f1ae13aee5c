//! Scene Color Pass
//!
//! Clears the scene color and depth targets, then draws the room (no
//! culling, the camera is inside it), every stage sub-shape and every
//! fixture sub-shape. Per-draw matrices and materials live in one uniform
//! buffer addressed with dynamic offsets.

use crate::config::post_process;
use crate::renderer::frame::DrawLayer;
use crate::renderer::gpu_mesh::vertex_layout;
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::{COMMON_WGSL, create_shader};
use crate::renderer::uniforms::{DrawUniforms, align_to};
use crate::resources::mesh::MeshHandle;

/// A draw resolved during `prepare`.
#[derive(Debug, Clone, Copy)]
struct PreparedDraw {
    layer: DrawLayer,
    mesh: MeshHandle,
    shape: usize,
    offset: u32,
}

pub struct ScenePass {
    room_pipeline: wgpu::RenderPipeline,
    object_pipeline: wgpu::RenderPipeline,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: u32,
    stride: u32,
    draws: Vec<PreparedDraw>,
}

impl ScenePass {
    #[must_use]
    pub fn new(device: &wgpu::Device, frame_layout: &wgpu::BindGroupLayout) -> Self {
        let uniform_size = size_of::<DrawUniforms>() as u64;
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let stride = align_to(uniform_size as u32, min_alignment);

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let shader = create_shader(
            device,
            "Scene Shader",
            &[COMMON_WGSL, include_str!("../shaders/scene.wgsl")],
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[Some(frame_layout), Some(&draw_layout)],
            immediate_size: 0,
        });

        let room_pipeline = Self::create_pipeline(device, &shader, &pipeline_layout, None, "Scene Room Pipeline");
        let object_pipeline = Self::create_pipeline(
            device,
            &shader,
            &pipeline_layout,
            Some(wgpu::Face::Back),
            "Scene Object Pipeline",
        );

        let capacity = 64;
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &draw_layout, stride, capacity);

        Self {
            room_pipeline,
            object_pipeline,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity: capacity,
            stride,
            draws: Vec::new(),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        cull_mode: Option<wgpu::Face>,
        label: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: post_process::COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: post_process::SCENE_DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u32,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: u64::from(stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Grows the draw buffer geometrically until it holds `required` draws.
    fn ensure_capacity(&mut self, device: &wgpu::Device, required: u32) {
        if required <= self.draw_capacity {
            return;
        }

        let mut capacity = self.draw_capacity.max(1);
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }

        log::debug!("Growing draw uniform buffer to {capacity} entries");
        let (buffer, bind_group) =
            Self::create_draw_buffer(device, &self.draw_layout, self.stride, capacity);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
    }
}

impl RenderNode for ScenePass {
    fn name(&self) -> &'static str {
        "Scene Pass"
    }

    fn prepare(&mut self, ctx: &PassContext) {
        let items = ctx.frame.draw_items();
        self.draws.clear();
        if items.is_empty() {
            return;
        }

        self.ensure_capacity(ctx.device, items.len() as u32);

        let stride = self.stride as usize;
        let mut bytes = vec![0u8; stride * items.len()];
        for (i, item) in items.iter().enumerate() {
            let uniforms = DrawUniforms::new(&item.world, &item.material);
            let src = bytemuck::bytes_of(&uniforms);
            bytes[i * stride..i * stride + src.len()].copy_from_slice(src);

            self.draws.push(PreparedDraw {
                layer: item.layer,
                mesh: item.mesh,
                shape: item.shape,
                offset: i as u32 * self.stride,
            });
        }

        ctx.queue.write_buffer(&self.draw_buffer, 0, &bytes);
    }

    fn run(&self, ctx: &PassContext, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Color Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &ctx.targets.scene_color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.targets.scene_depth.view,
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

        pass.set_bind_group(0, &ctx.shared.frame_bind_group, &[]);

        let mut bound_layer = None;
        let mut bound_mesh = None;

        for draw in &self.draws {
            let Some(mesh) = ctx.meshes.get(draw.mesh) else {
                log::debug!("Mesh has no GPU copy; draw skipped");
                continue;
            };
            let Some(shape) = mesh.shapes.get(draw.shape) else {
                continue;
            };

            let is_room = draw.layer == DrawLayer::Room;
            if bound_layer != Some(is_room) {
                pass.set_pipeline(if is_room {
                    &self.room_pipeline
                } else {
                    &self.object_pipeline
                });
                bound_layer = Some(is_room);
            }
            if bound_mesh != Some(draw.mesh) {
                mesh.bind(&mut pass);
                bound_mesh = Some(draw.mesh);
            }

            pass.set_bind_group(1, &self.draw_bind_group, &[draw.offset]);
            mesh.draw_shape(&mut pass, shape);
        }
    }
}
