// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles the render targets of the wgpu backend.

pub mod texture_resource;

// Re-export main types
pub use texture_resource::{supported_sample_count, TextureResource};
