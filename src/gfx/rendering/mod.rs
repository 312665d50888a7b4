// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The wgpu backend: render pipelines, per-draw uniforms, GPU timing and the
//! frame recording done by [`RenderEngine`].

pub mod gpu_timer;
pub mod pipeline_manager;
pub mod render_engine;
pub mod uniforms;

// Re-export main types
pub use gpu_timer::GpuTimer;
pub use pipeline_manager::{PipelineKey, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
pub use uniforms::ShaderUniforms;
