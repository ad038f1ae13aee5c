//! Gobo wheel as a 2D array texture, one layer per slot.

use crate::resources::gobo::GoboSet;

pub struct GoboTexture {
    pub texture: wgpu::Texture,
    /// `D2Array` view, even for a single layer.
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub layers: u32,
}

impl GoboTexture {
    /// Uploads every layer of `gobos`.
    ///
    /// An empty set becomes a single opaque white layer so the shaders
    /// always have something to sample.
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, gobos: &GoboSet) -> Self {
        let (width, height) = gobos
            .layers()
            .first()
            .map_or((1, 1), image::RgbaImage::dimensions);
        let layers = (gobos.len() as u32).max(1);

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Gobo Array"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if gobos.is_empty() {
            log::warn!("Gobo set is empty; uploading a white placeholder");
            Self::upload_layer(queue, &texture, 0, 1, 1, &[255; 4]);
        }

        for (layer, image) in gobos.layers().iter().enumerate() {
            if image.dimensions() != (width, height) {
                log::warn!("Gobo layer {layer} has mismatched size; skipped");
                continue;
            }
            Self::upload_layer(queue, &texture, layer as u32, width, height, image.as_raw());
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Gobo Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Gobo Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!("Gobo texture: {layers} layer(s) of {width}x{height}");

        Self {
            texture,
            view,
            sampler,
            layers,
        }
    }

    fn upload_layer(
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        layer: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}
