// src/lib.rs
//! viewer3d
//!
//! An interactive 3D viewer built on wgpu and winit: a world scene navigated
//! with a trackball, a corner gnomon showing the orientation, and ray picking.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerOptions;
pub use error::{GpuError, ViewerError};

/// Creates a viewer application with options read from the environment
pub fn default() -> Result<ViewerApp, ViewerError> {
    ViewerApp::new(ViewerOptions::from_env()?)
}
