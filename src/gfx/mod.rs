//! # Graphics Module
//!
//! Everything the viewer draws lives here: cameras and the trackball, the
//! scene graph, procedural geometry, picking and the wgpu backend.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Perspective/orthographic camera and trackball
//! - **GPU Layer** ([`gpu`]) - The [`GpuContext`](gpu::GpuContext) trait the scene core draws through
//! - **Scene Management** ([`scene`]) - Actors, groups, the world and the gnomon
//! - **Rendering Pipeline** ([`rendering`]) - wgpu implementation of the GPU layer
//! - **Renderer** ([`renderer`]) - Pointer input, camera presets and per-frame orchestration
//!
//! ## Usage
//!
//! The graphics system is primarily used through [`RenderEngine`] and [`Renderer`]:
//!
//! ```no_run
//! use viewer3d::config::ViewerOptions;
//! use viewer3d::gfx::{gpu::CommandRecorder, Renderer};
//!
//! let mut gpu = CommandRecorder::new();
//! let mut renderer = Renderer::new(&mut gpu, &ViewerOptions::default()).unwrap();
//! renderer.render(&mut gpu).unwrap();
//! ```

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod gpu;
pub mod material;
pub mod picking;
pub mod renderer;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod shader_library;

// Re-export commonly used types
pub use camera::{Camera, Trackball};
pub use renderer::{Renderer, ViewDirection};
pub use rendering::render_engine::RenderEngine;
