//! # World Scene
//!
//! The main, navigable scene. Besides the user's actors it owns three system
//! actors, drawn before everything else:
//!
//! - `background` - full-screen gradient
//! - `floor` - grid lines on the `y = 0` plane
//! - `axis` - x and z axis lines on top of the grid

use std::rc::Rc;

use cgmath::{Vector3, Zero};

use super::actor::{Actor, Shape};
use super::light::Light;
use super::scene::Scene;
use crate::error::GpuError;
use crate::gfx::camera::{Camera, Lens};
use crate::gfx::geometry::{generate_background_colors, BackgroundPalette, GeometryData};
use crate::gfx::gpu::{GpuContext, Viewport};
use crate::gfx::material::Material;
use crate::gfx::shader_library::ShaderLibrary;

pub const BACKGROUND_NAME: &str = "background";
pub const GRID_NAME: &str = "floor";
pub const AXIS_NAME: &str = "axis";

/// Extent, cell count and colour of the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParameters {
    pub color: [f32; 3],
    pub length_rows: f32,
    pub length_cols: f32,
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridParameters {
    fn default() -> Self {
        let grey = 128.0 / 255.0;
        Self {
            color: [grey, grey, grey],
            length_rows: 10.0,
            length_cols: 10.0,
            rows: 24,
            cols: 24,
        }
    }
}

/// Width over height with the height clamped to at least one pixel
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

#[derive(Debug, Clone)]
pub struct World {
    scene: Scene,
    library: Rc<ShaderLibrary>,
    home_position: Vector3<f32>,
    palette: BackgroundPalette,
    grid: GridParameters,
}

impl World {
    pub fn new(library: &Rc<ShaderLibrary>, home_position: Vector3<f32>) -> Self {
        let mut camera = Camera::new()
            .with_lens(Lens::Perspective)
            .with_position(home_position);
        camera.point_at(Vector3::zero(), Vector3::unit_y());

        let light = Light::default()
            .with_position(2.0, 2.0, 0.5)
            .with_directional(true)
            .with_intensities(0.5, 1.0, 1.0)
            .with_headlight(true);

        Self {
            scene: Scene::new("world").with_camera(camera).with_light(light),
            library: Rc::clone(library),
            home_position,
            palette: BackgroundPalette::default(),
            grid: GridParameters::default(),
        }
    }

    /// Builder pattern: Set the grid used by [`World::initialize`]
    pub fn with_grid_parameters(mut self, grid: GridParameters) -> Self {
        self.grid = grid;
        self
    }

    /// Builder pattern: Set the background used by [`World::initialize`]
    pub fn with_background_palette(mut self, palette: BackgroundPalette) -> Self {
        self.palette = palette;
        self
    }

    /// (Re)creates the background, grid and axis system actors
    pub fn initialize(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError> {
        self.scene.remove_system_actor(gpu, BACKGROUND_NAME);
        let background = Actor::new(BACKGROUND_NAME, &self.library, Shape::Background(self.palette))
            .with_pickable(false)
            .build(gpu)?;
        if let Err(mut rejected) = self.scene.add_system_actor(background) {
            rejected.destroy(gpu);
        }
        self.create_grid_lines(gpu)
    }

    /// Rebuilds grid and axis from the current parameters, keeping their visibility
    pub fn create_grid_lines(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError> {
        let grid_visible = self.grid_lines_enabled();
        let axis_visible = self.axes_enabled();
        self.scene.remove_system_actor(gpu, GRID_NAME);
        self.scene.remove_system_actor(gpu, AXIS_NAME);

        let g = self.grid;
        let [r, gr, b] = g.color;
        let mut grid = Actor::new(
            GRID_NAME,
            &self.library,
            Shape::Grid {
                length_rows: g.length_rows,
                length_cols: g.length_cols,
                rows: g.rows,
                cols: g.cols,
            },
        )
        .with_material(Material::default().with_diffuse(r, gr, b))
        .with_pickable(false)
        .build(gpu)?;
        grid.set_visible(grid_visible);

        let mut axis = Actor::new(
            AXIS_NAME,
            &self.library,
            Shape::Axis {
                length_row: g.length_rows,
                length_col: g.length_cols,
            },
        )
        .with_pickable(false)
        .build(gpu)?;
        axis.set_visible(axis_visible);

        for actor in [grid, axis] {
            if let Err(mut rejected) = self.scene.add_system_actor(actor) {
                rejected.destroy(gpu);
            }
        }
        log::debug!(
            "Rebuilt grid lines: {}x{} cells over {}x{}",
            g.rows,
            g.cols,
            g.length_rows,
            g.length_cols
        );
        Ok(())
    }

    pub fn background_palette(&self) -> &BackgroundPalette {
        &self.palette
    }

    /// Re-colours the background in place
    pub fn set_background_palette(
        &mut self,
        gpu: &mut dyn GpuContext,
        palette: BackgroundPalette,
    ) -> Result<(), GpuError> {
        self.palette = palette;
        let Some(background) = self
            .scene
            .system_actor_mut(BACKGROUND_NAME)
            .and_then(|node| node.as_actor_mut())
        else {
            return Ok(());
        };
        let colors = GeometryData {
            colors: generate_background_colors(&palette),
            ..Default::default()
        };
        background.update_buffer(gpu, &colors)
    }

    pub fn grid_parameters(&self) -> &GridParameters {
        &self.grid
    }

    /// Stores new grid parameters and rebuilds the grid lines when they exist
    pub fn set_grid_parameters(
        &mut self,
        gpu: &mut dyn GpuContext,
        grid: GridParameters,
    ) -> Result<(), GpuError> {
        self.grid = grid;
        if self.scene.system_actor(GRID_NAME).is_some() {
            self.create_grid_lines(gpu)?;
        }
        Ok(())
    }

    pub fn grid_lines_enabled(&self) -> bool {
        self.scene
            .system_actor(GRID_NAME)
            .map_or(true, |node| node.is_visible())
    }

    pub fn enable_grid_lines(&mut self, enabled: bool) {
        if let Some(node) = self.scene.system_actor_mut(GRID_NAME) {
            node.set_visible(enabled);
        }
    }

    pub fn axes_enabled(&self) -> bool {
        self.scene
            .system_actor(AXIS_NAME)
            .map_or(true, |node| node.is_visible())
    }

    pub fn enable_axes(&mut self, enabled: bool) {
        if let Some(node) = self.scene.system_actor_mut(AXIS_NAME) {
            node.set_visible(enabled);
        }
    }

    /// Switches lens keeping the framing at the focal distance
    pub fn set_camera_lens(&mut self, lens: Lens) {
        self.scene.camera_mut().set_lens(lens, true);
    }

    pub fn store_camera(&mut self) {
        self.scene.camera_mut().store();
    }

    /// Restores the stored camera for a window of the given size
    pub fn recall_camera(&mut self, width: u32, height: u32) -> bool {
        self.scene
            .camera_mut()
            .recall(aspect_ratio(width, height))
    }

    /// Home position, looking at the origin through a perspective lens
    pub fn reset_camera(&mut self, width: u32, height: u32) {
        let camera = self.scene.camera_mut();
        camera.set_position(self.home_position);
        camera.point_at(Vector3::zero(), Vector3::unit_y());
        camera.set_aspect_ratio(aspect_ratio(width, height));
        camera.set_lens(Lens::Perspective, false);
    }

    /// Full-window viewport and matching aspect ratio
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.set_viewport(Viewport::new(0, 0, width, height));
        self.scene
            .camera_mut()
            .set_aspect_ratio(aspect_ratio(width, height));
    }

    pub fn render(&self, gpu: &mut dyn GpuContext) {
        self.scene.render(gpu);
    }

    pub fn home_position(&self) -> Vector3<f32> {
        self.home_position
    }

    pub fn library(&self) -> &Rc<ShaderLibrary> {
        &self.library
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}
