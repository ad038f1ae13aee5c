//! Render Pipeline
//!
//! Owns the offscreen targets, the shared frame resources, the GPU meshes
//! and the six passes, and runs them in a fixed order on one command
//! encoder per frame:
//!
//! ```text
//! Shadow → Scene → Volumetric → Blur → Composite → Final
//! ```
//!
//! Construction builds every shader, pipeline, buffer and bind group up
//! front under validation error scopes; a failure there is returned as an
//! error and the pipeline is not usable. Per-frame problems (missing meshes, no spotlights) only skip the
//! affected draws.

use crate::config::{display, shadow, spotlight::MAX_SPOTLIGHTS};
use crate::errors::{Result, StageError};
use crate::renderer::frame::FrameRenderContext;
use crate::renderer::gobo_texture::GoboTexture;
use crate::renderer::gpu_mesh::GpuMeshes;
use crate::renderer::node::{PassContext, RenderNode};
use crate::renderer::passes::{
    BlurPass, CompositePass, FinalPass, ScenePass, ShadowPass, VolumetricPass,
};
use crate::renderer::render_target::RenderTargets;
use crate::renderer::settings::PipelineSettings;
use crate::renderer::shared::SharedResources;
use crate::renderer::uniforms::{CameraUniforms, SpotlightBlock};
use crate::scene::scene::Scene;

/// Number of bind groups the widest pass layout uses.
const REQUIRED_BIND_GROUPS: u32 = 2;

pub struct RenderPipeline {
    targets: RenderTargets,
    shared: SharedResources,
    meshes: GpuMeshes,

    shadow: ShadowPass,
    scene: ScenePass,
    volumetric: VolumetricPass,
    blur: BlurPass,
    composite: CompositePass,
    final_pass: FinalPass,
}

impl RenderPipeline {
    /// Builds every pass for `output_format` and uploads the scene's meshes
    /// and gobo images.
    ///
    /// Each group of resources is created inside a validation error scope,
    /// so a shader or pipeline that fails validation comes back as
    /// [`StageError::PipelineCreationFailed`] naming the pass.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        scene: &Scene,
    ) -> Result<Self> {
        check_limits(&device.limits())?;

        let (targets, shared, meshes) = scoped(device, "Shared Resources", || {
            let targets = RenderTargets::new(device, display::WIDTH, display::HEIGHT);
            let gobo = GoboTexture::new(device, queue, scene.gobos());
            let shared = SharedResources::new(device, gobo);

            let mut meshes = GpuMeshes::default();
            meshes.sync(device, &scene.meshes);
            (targets, shared, meshes)
        })
        .await?;

        let shadow = scoped(device, "Shadow Pass", || ShadowPass::new(device)).await?;
        let scene_pass = scoped(device, "Scene Pass", || {
            ScenePass::new(device, &shared.frame_layout)
        })
        .await?;
        let volumetric = scoped(device, "Volumetric Pass", || {
            VolumetricPass::new(device, &shared.frame_layout, &targets.scene_depth)
        })
        .await?;
        let blur = scoped(device, "Blur Pass", || BlurPass::new(device, &targets)).await?;
        let composite =
            scoped(device, "Composite Pass", || CompositePass::new(device, &targets)).await?;
        let final_pass = scoped(device, "Final Pass", || {
            FinalPass::new(device, queue, &targets, output_format)
        })
        .await?;

        log::info!(
            "Render pipeline created: {}x{} targets, {} meshes, {} gobo layer(s), output {:?}",
            display::WIDTH,
            display::HEIGHT,
            meshes.len(),
            shared.gobo.layers,
            output_format,
        );

        Ok(Self {
            targets,
            shared,
            meshes,
            shadow,
            scene: scene_pass,
            volumetric,
            blur,
            composite,
            final_pass,
        })
    }

    /// Renders one frame into `output` and submits it.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &FrameRenderContext<'_>,
        settings: &PipelineSettings,
        output: &wgpu::TextureView,
    ) {
        let settings = settings.clamped();

        // Meshes added to the scene after construction.
        self.meshes.sync(device, frame.meshes);

        if frame.gobo_layers != self.shared.gobo.layers {
            log::trace!(
                "Scene has {} gobo layer(s), texture has {}",
                frame.gobo_layers,
                self.shared.gobo.layers
            );
        }

        self.shared.write(
            queue,
            &CameraUniforms::new(frame.camera, frame.time),
            &SpotlightBlock::new(frame.spotlights),
            frame.ceiling_lights.gpu_data(),
        );

        let ctx = PassContext {
            device,
            queue,
            frame,
            settings: &settings,
            shared: &self.shared,
            targets: &self.targets,
            meshes: &self.meshes,
            output,
        };

        let mut nodes: [&mut dyn RenderNode; 6] = [
            &mut self.shadow,
            &mut self.scene,
            &mut self.volumetric,
            &mut self.blur,
            &mut self.composite,
            &mut self.final_pass,
        ];

        for node in &mut nodes {
            node.prepare(&ctx);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Stage Frame Encoder"),
        });

        for node in &nodes {
            encoder.push_debug_group(node.name());
            node.run(&ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    #[must_use]
    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    #[must_use]
    pub fn gobo_layers(&self) -> u32 {
        self.shared.gobo.layers
    }
}

/// Runs `build` inside a validation error scope.
async fn scoped<T>(
    device: &wgpu::Device,
    pass: &'static str,
    build: impl FnOnce() -> T,
) -> Result<T> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    scope_result(pass, value, scope.pop().await)
}

/// Turns the error captured by a scope into a construction failure.
fn scope_result<T>(pass: &'static str, value: T, error: Option<wgpu::Error>) -> Result<T> {
    match error {
        None => Ok(value),
        Some(e) => {
            log::error!("{pass} failed validation: {e}");
            Err(StageError::PipelineCreationFailed {
                pass,
                message: e.to_string(),
            })
        }
    }
}

/// Rejects devices that cannot hold the fixed-size targets and the shadow
/// map array.
pub fn check_limits(limits: &wgpu::Limits) -> Result<()> {
    let needed_dim = shadow::MAP_SIZE.max(display::WIDTH).max(display::HEIGHT);
    if limits.max_texture_dimension_2d < needed_dim {
        return Err(StageError::PipelineCreationFailed {
            pass: "targets",
            message: format!(
                "max_texture_dimension_2d is {}, need {needed_dim}",
                limits.max_texture_dimension_2d
            ),
        });
    }

    if limits.max_texture_array_layers < MAX_SPOTLIGHTS as u32 {
        return Err(StageError::PipelineCreationFailed {
            pass: "Shadow Pass",
            message: format!(
                "max_texture_array_layers is {}, need {MAX_SPOTLIGHTS}",
                limits.max_texture_array_layers
            ),
        });
    }

    if limits.max_bind_groups < REQUIRED_BIND_GROUPS {
        return Err(StageError::PipelineCreationFailed {
            pass: "Scene Pass",
            message: format!(
                "max_bind_groups is {}, need {REQUIRED_BIND_GROUPS}",
                limits.max_bind_groups
            ),
        });
    }

    let spotlight_block = size_of::<SpotlightBlock>() as u64;
    if u64::from(limits.max_uniform_buffer_binding_size) < spotlight_block {
        return Err(StageError::PipelineCreationFailed {
            pass: "Scene Pass",
            message: format!(
                "max_uniform_buffer_binding_size is {}, need {spotlight_block}",
                limits.max_uniform_buffer_binding_size
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_sufficient() {
        assert!(check_limits(&wgpu::Limits::default()).is_ok());
    }

    #[test]
    fn small_textures_are_rejected() {
        let limits = wgpu::Limits {
            max_texture_dimension_2d: 1024,
            ..wgpu::Limits::default()
        };
        let err = check_limits(&limits).unwrap_err();
        assert!(matches!(err, StageError::PipelineCreationFailed { pass: "targets", .. }));
    }

    #[test]
    fn validation_error_names_the_pass() {
        let error = wgpu::Error::Validation {
            source: Box::new(std::io::Error::other("entry point `fs_main` not found")),
            description: "Shader validation error".to_string(),
        };

        let err = scope_result("Volumetric Pass", (), Some(error)).unwrap_err();
        match err {
            StageError::PipelineCreationFailed { pass, message } => {
                assert_eq!(pass, "Volumetric Pass");
                assert!(message.contains("Shader validation error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn clean_scope_keeps_the_value() {
        assert_eq!(scope_result("Blur Pass", 7, None).unwrap(), 7);
    }

    #[test]
    fn shadow_layers_must_fit() {
        let limits = wgpu::Limits {
            max_texture_array_layers: 4,
            ..wgpu::Limits::default()
        };
        assert!(check_limits(&limits).is_err());
    }
}
