//! Resources shared by several passes.
//!
//! The frame bind group (camera, spotlights, ceiling lights, shadow maps,
//! gobo array) is read by both the scene color pass and the volumetric pass.
//! Its buffers are written once per frame by the pipeline before any pass
//! records commands.

use crate::config::{shadow, spotlight::MAX_SPOTLIGHTS};
use crate::renderer::gobo_texture::GoboTexture;
use crate::renderer::passes::{sampler_entry, texture_entry, uniform_entry};
use crate::renderer::uniforms::{CameraUniforms, SpotlightBlock};
use crate::scene::ceiling_lights::CeilingLightGpuData;

/// One depth layer per spotlight slot.
pub struct ShadowMaps {
    pub texture: wgpu::Texture,
    /// Per-layer views used as depth attachments.
    pub layer_views: Vec<wgpu::TextureView>,
    /// `D2Array` view sampled by the lighting shaders.
    pub array_view: wgpu::TextureView,
    pub comparison_sampler: wgpu::Sampler,
}

impl ShadowMaps {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let layers = MAX_SPOTLIGHTS as u32;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map Array"),
            size: wgpu::Extent3d {
                width: shadow::MAP_SIZE,
                height: shadow::MAP_SIZE,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: shadow::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&format!("Shadow Map Layer {layer}")),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            layer_views,
            array_view,
            comparison_sampler,
        }
    }
}

/// Per-frame buffers and the bind group exposing them.
pub struct SharedResources {
    pub camera_buffer: wgpu::Buffer,
    pub spotlight_buffer: wgpu::Buffer,
    pub ceiling_buffer: wgpu::Buffer,
    pub shadow_maps: ShadowMaps,
    pub gobo: GoboTexture,
    pub frame_layout: wgpu::BindGroupLayout,
    pub frame_bind_group: wgpu::BindGroup,
}

impl SharedResources {
    #[must_use]
    pub fn new(device: &wgpu::Device, gobo: GoboTexture) -> Self {
        let camera_buffer = uniform_buffer::<CameraUniforms>(device, "Camera Uniforms");
        let spotlight_buffer = uniform_buffer::<SpotlightBlock>(device, "Spotlight Uniforms");
        let ceiling_buffer = uniform_buffer::<CeilingLightGpuData>(device, "Ceiling Light Uniforms");
        let shadow_maps = ShadowMaps::new(device);

        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame BindGroup Layout"),
            entries: &[
                uniform_entry(0, both, false),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, false),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT, false),
                texture_entry(
                    3,
                    wgpu::TextureSampleType::Depth,
                    wgpu::TextureViewDimension::D2Array,
                ),
                sampler_entry(4, wgpu::SamplerBindingType::Comparison),
                texture_entry(
                    5,
                    wgpu::TextureSampleType::Float { filterable: true },
                    wgpu::TextureViewDimension::D2Array,
                ),
                sampler_entry(6, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BindGroup"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: spotlight_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: ceiling_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&shadow_maps.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&shadow_maps.comparison_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&gobo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(&gobo.sampler),
                },
            ],
        });

        Self {
            camera_buffer,
            spotlight_buffer,
            ceiling_buffer,
            shadow_maps,
            gobo,
            frame_layout,
            frame_bind_group,
        }
    }

    /// Uploads this frame's camera, spotlight and ceiling data.
    pub fn write(
        &self,
        queue: &wgpu::Queue,
        camera: &CameraUniforms,
        spotlights: &SpotlightBlock,
        ceiling: &CeilingLightGpuData,
    ) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        queue.write_buffer(&self.spotlight_buffer, 0, bytemuck::bytes_of(spotlights));
        queue.write_buffer(&self.ceiling_buffer, 0, bytemuck::bytes_of(ceiling));
    }
}

/// Zeroed uniform buffer sized for `T`.
pub(crate) fn uniform_buffer<T>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
