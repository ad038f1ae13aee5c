//! Viewer application
//!
//! - [`config`]: the JSON startup configuration
//! - [`controls`]: platform-independent viewer actions
//! - `winit`: the windowed runner (feature `winit`)

pub mod config;
pub mod controls;

#[cfg(feature = "winit")]
pub mod winit;

pub use config::{SpotlightConfig, ViewerConfig};
pub use controls::ViewerAction;
