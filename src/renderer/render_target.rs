//! Offscreen render targets.
//!
//! All targets are created once at the fixed output resolution and never
//! resized; a window resize only reconfigures the surface.

use crate::config::post_process;

/// An offscreen texture with an attachment view and a sampling view.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    /// Bound as a render attachment.
    pub view: wgpu::TextureView,
    /// Bound as a shader input by later passes.
    pub sample_view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label} Attachment View")),
            ..Default::default()
        });
        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label} Sample View")),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sample_view,
            format,
            width,
            height,
        }
    }
}

/// The shared offscreen targets of the pipeline.
pub struct RenderTargets {
    pub scene_color: RenderTarget,
    pub scene_depth: RenderTarget,
    pub volumetric: RenderTarget,
    /// Ping-pong partner of `volumetric` for the separable blur.
    pub blur_temp: RenderTarget,
}

impl RenderTargets {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let color = post_process::COLOR_FORMAT;
        Self {
            scene_color: RenderTarget::new(device, "Scene Color", width, height, color),
            scene_depth: RenderTarget::new(
                device,
                "Scene Depth",
                width,
                height,
                post_process::SCENE_DEPTH_FORMAT,
            ),
            volumetric: RenderTarget::new(device, "Volumetric", width, height, color),
            blur_temp: RenderTarget::new(device, "Blur Temp", width, height, color),
        }
    }
}
