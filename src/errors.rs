//! Error Types
//!
//! This module defines the error types used throughout the visualizer.
//!
//! # Overview
//!
//! The main error type [`StageError`] covers construction-time failures:
//! - GPU bootstrap (adapter, device, surface)
//! - Shader and pipeline validation
//! - Asset input (fixture archives, images, XML and JSON descriptions)
//! - Windowing
//!
//! Per-frame problems (a missing mesh, an absent gobo texture) are never
//! reported through this type; the render pipeline skips the affected draw
//! and keeps going.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stagelight::errors::{Result, StageError};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the visualizer.
#[derive(Error, Debug)]
pub enum StageError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create or configure the presentation surface.
    #[error("Surface error: {0}")]
    SurfaceError(String),

    /// A shader module or render pipeline failed validation during creation.
    #[error("Pipeline creation failed for {pass}: {message}")]
    PipelineCreationFailed {
        /// Name of the pass whose resources failed
        pass: &'static str,
        /// Validation message reported by the device
        message: String,
    },

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[cfg(feature = "winit")]
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Input Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML fixture description could not be parsed.
    #[error("XML parse error: {0}")]
    XmlError(#[from] roxmltree::Error),

    /// The description parsed but lacks a required element.
    #[error("Invalid fixture description: {0}")]
    InvalidDescription(String),

    /// Fixture archive could not be opened or a member could not be read.
    #[error("Fixture archive error: {0}")]
    ArchiveError(String),

    /// A required member is missing from a fixture archive.
    #[error("Fixture archive is missing '{0}'")]
    ArchiveMemberMissing(String),

    // ========================================================================
    // Scene Construction Errors
    // ========================================================================
    /// A placement matrix string did not contain sixteen numbers.
    #[error("Invalid placement matrix '{0}'")]
    InvalidMatrix(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for StageError {
    fn from(err: image::ImageError) -> Self {
        StageError::ImageDecodeError(err.to_string())
    }
}

impl From<zip::result::ZipError> for StageError {
    fn from(err: zip::result::ZipError) -> Self {
        StageError::ArchiveError(err.to_string())
    }
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;
