//! # Camera System
//!
//! - [`Camera`] - Perspective/orthographic camera with store and recall
//! - [`Trackball`] - Pointer-driven rotation controller with inertial spin
//! - [`camera_utils`] - Matrix and quaternion helpers shared with the renderer

pub mod camera;
pub mod camera_utils;
pub mod trackball;

pub use camera::{Camera, CameraSnapshot, Lens};
pub use trackball::{Trackball, TrackballMode};
