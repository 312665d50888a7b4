//! # Scene Management Module
//!
//! Scenes hold the actors of one view together with its camera and light,
//! and know how to draw, select and pick them.
//!
//! ## Key Components
//!
//! - [`Scene`] - Ordered actors, selection slots, two-pass rendering and picking
//! - [`Actor`] - One renderable shape with its GPU buffers, materials and flags
//! - [`Group`] - Named parts drawn as one object
//! - [`World`] - The navigable main scene with background, grid and axes
//! - [`Gnomon`] - Fixed-size corner scene mirroring the main camera rotation
//! - [`Drawable`] - Bind / draw / unbind lifecycle shared by actors
//!
//! ## Usage
//!
//! ```no_run
//! use std::rc::Rc;
//! use viewer3d::gfx::gpu::CommandRecorder;
//! use viewer3d::gfx::scene::{Actor, Scene, Shape};
//! use viewer3d::gfx::shader_library::ShaderLibrary;
//!
//! let mut gpu = CommandRecorder::new();
//! let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
//! let cube = Actor::new("cube", &library, Shape::Cube { size: 1.0 })
//!     .build(&mut gpu)
//!     .unwrap();
//!
//! let mut scene = Scene::new("world");
//! scene.add_actor(cube, true).unwrap();
//! scene.render(&mut gpu);
//! ```

pub mod actor;
pub mod drawable;
pub mod gnomon;
pub mod group;
pub mod light;
pub mod scene;
pub mod world;

// Re-export main types
pub use actor::{Actor, ActorUpdate, RenderRole, RenderType, Shape};
pub use drawable::{DrawStyle, Drawable, RenderContext, RenderPass, Shading};
pub use gnomon::Gnomon;
pub use group::Group;
pub use light::Light;
pub use scene::{Scene, SceneNode, EDGE_POLYGON_OFFSET};
pub use world::{GridParameters, World};
