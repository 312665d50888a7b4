//! # Gizmo System
//!
//! Gizmos are visual aids drawn alongside the user's actors. The viewer has
//! one: the [`OrientationMarker`] shown by the gnomon scene.
//!
//! ## Usage
//!
//! ```no_run
//! use std::rc::Rc;
//! use viewer3d::gfx::gizmos::OrientationMarker;
//! use viewer3d::gfx::gpu::CommandRecorder;
//! use viewer3d::gfx::shader_library::ShaderLibrary;
//!
//! let mut gpu = CommandRecorder::new();
//! let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
//! let marker = OrientationMarker::default().build(&mut gpu, &library).unwrap();
//! assert_eq!(marker.parts().len(), 4);
//! ```

pub mod orientation_marker;

pub use orientation_marker::OrientationMarker;
