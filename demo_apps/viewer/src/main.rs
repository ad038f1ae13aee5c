//! Stage light viewer
//!
//! ```text
//! stage_viewer [config.json]
//! ```
//!
//! Keys: F FXAA, B blur, 1-5 blur passes, D demo mode, arrows orbit,
//! PageUp/PageDown zoom, +/- ceiling intensity.

use std::path::PathBuf;

use stagelight::App;
use stagelight::app::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load(config_path.as_deref())?;

    log::info!(
        "FXAA {}, blur {} x{}, demo mode {}",
        config.pipeline.fxaa,
        config.pipeline.blur,
        config.pipeline.blur_passes,
        config.demo_mode
    );

    App::new().with_config(config).run()?;
    Ok(())
}
