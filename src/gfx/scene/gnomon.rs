//! Corner scene showing the orientation of the main camera

use std::rc::Rc;

use cgmath::{Quaternion, Vector3, Zero};

use super::light::Light;
use super::scene::Scene;
use crate::error::GpuError;
use crate::gfx::camera::{Camera, Lens};
use crate::gfx::gizmos::orientation_marker::{OrientationMarker, MARKER_NAME};
use crate::gfx::gpu::{GpuContext, Viewport};
use crate::gfx::shader_library::ShaderLibrary;

/// Edge length of the gnomon viewport in logical pixels
pub const GNOMON_SIZE: u32 = 70;

/// Fixed-size scene in the bottom-right corner of the window
///
/// Only the rotation of the main camera is mirrored, so the marker turns
/// with the world but never moves or zooms.
#[derive(Debug, Clone)]
pub struct Gnomon {
    scene: Scene,
    library: Rc<ShaderLibrary>,
    marker: OrientationMarker,
    size: u32,
}

impl Gnomon {
    pub fn new(library: &Rc<ShaderLibrary>, size: u32) -> Self {
        let mut camera = Camera::new()
            .with_lens(Lens::Perspective)
            .with_position(Vector3::new(0.0, 0.0, 4.0));
        camera.point_at(Vector3::zero(), Vector3::unit_y());
        camera.scale_height(0.6);

        let light = Light::default()
            .with_intensities(0.5, 1.0, 1.0)
            .with_headlight(true);

        Self {
            scene: Scene::new("gnomon").with_camera(camera).with_light(light),
            library: Rc::clone(library),
            marker: OrientationMarker::default(),
            size,
        }
    }

    pub fn with_marker(mut self, marker: OrientationMarker) -> Self {
        self.marker = marker;
        self
    }

    /// (Re)creates the orientation marker
    pub fn initialize(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError> {
        self.scene.remove_actor(gpu, MARKER_NAME);
        let marker = self.marker.build(gpu, &self.library)?;
        if let Err(mut rejected) = self.scene.add_actor(marker, false) {
            rejected.destroy(gpu);
        }
        Ok(())
    }

    pub fn set_camera_lens(&mut self, lens: Lens) {
        self.scene.camera_mut().set_lens(lens, true);
    }

    /// Mirrors the interactive rotation of the main camera
    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) {
        self.scene.camera_mut().set_rotation(rotation);
    }

    /// Places the viewport in the bottom-right corner of a window in physical pixels
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        let size = self.pixel_size(scale_factor).min(width).min(height);
        let x = width.saturating_sub(size) as i32;
        self.scene.set_viewport(Viewport::new(x, 0, size, size));
    }

    /// Edge length in physical pixels
    pub fn pixel_size(&self, scale_factor: f64) -> u32 {
        (self.size as f64 * scale_factor).round().max(0.0) as u32
    }

    pub fn render(&self, gpu: &mut dyn GpuContext) {
        self.scene.render(gpu);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::camera_utils::quat_from_axis_angle;
    use crate::gfx::gpu::CommandRecorder;

    fn gnomon() -> (CommandRecorder, Gnomon) {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let mut gnomon = Gnomon::new(&library, GNOMON_SIZE);
        gnomon.initialize(&mut gpu).unwrap();
        (gpu, gnomon)
    }

    #[test]
    fn viewport_sits_in_the_bottom_right_corner() {
        let (_, mut gnomon) = gnomon();
        gnomon.resize(1600, 1000, 2.0);
        assert_eq!(gnomon.scene().viewport(), Viewport::new(1460, 0, 140, 140));

        gnomon.resize(50, 40, 1.0);
        assert_eq!(gnomon.scene().viewport(), Viewport::new(10, 0, 40, 40));
    }

    #[test]
    fn reinitializing_replaces_the_marker() {
        let (mut gpu, mut gnomon) = gnomon();
        let buffers = gpu.live_buffers();

        gnomon.initialize(&mut gpu).unwrap();

        assert_eq!(gpu.live_buffers(), buffers);
        assert_eq!(gnomon.scene().actors().len(), 1);
        assert!(gnomon.scene().actor(MARKER_NAME).unwrap().as_group().is_some());
    }

    #[test]
    fn only_rotation_is_mirrored() {
        let (_, mut gnomon) = gnomon();
        let rotation = quat_from_axis_angle(Vector3::unit_y(), 30.0);

        gnomon.set_rotation(rotation);

        let camera = gnomon.scene().camera();
        assert_eq!(camera.rotation(), rotation);
        assert_eq!(camera.position(), Vector3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn draws_the_marker_into_its_viewport() {
        let (mut gpu, mut gnomon) = gnomon();
        gnomon.resize(800, 600, 1.0);
        gpu.clear_commands();

        gnomon.render(&mut gpu);

        let draws = gpu.draws();
        assert_eq!(draws.len(), 4);
        assert!(draws
            .iter()
            .all(|d| d.viewport == Some(Viewport::new(730, 0, 70, 70))));
    }
}
