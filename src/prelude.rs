//! # Viewer Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use viewer3d::prelude::*;
//! ```

// Re-export core application types
pub use crate::app::ViewerApp;
pub use crate::config::ViewerOptions;
pub use crate::default;
pub use crate::error::{GpuError, ViewerError};

// Re-export graphics and scene types
pub use crate::gfx::camera::{Camera, Lens, Trackball, TrackballMode};
pub use crate::gfx::gpu::GpuContext;
pub use crate::gfx::material::Material;
pub use crate::gfx::renderer::{Renderer, ViewDirection};
pub use crate::gfx::scene::{
    Actor, DrawStyle, Group, RenderRole, RenderType, Scene, SceneNode, Shading, Shape,
};

// Re-export performance monitoring
pub use crate::performance::{FrameMetrics, FrameStatistics};

// Re-export common external dependencies
pub use cgmath::{Deg, InnerSpace, Matrix4, Vector3, Zero};
