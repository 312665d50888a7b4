//! # Renderer
//!
//! Ties the [`World`], the [`Gnomon`] and a shared [`Trackball`] together and
//! turns window-space pointer input into camera motion.
//!
//! Every frame the trackball rotation is inverted and pushed into both
//! cameras: the trackball spins the world around the viewer, so the camera
//! has to turn the other way. The world is drawn first into the whole window
//! and the gnomon on top of it into its corner viewport.
//!
//! The renderer never talks to wgpu directly; everything goes through a
//! `&mut dyn GpuContext`, which keeps it testable against the
//! [`CommandRecorder`](crate::gfx::gpu::CommandRecorder).

use std::rc::Rc;

use cgmath::{
    Deg, InnerSpace, Matrix4, One, Quaternion, Rotation, Vector2, Vector3,
};

use crate::config::ViewerOptions;
use crate::error::GpuError;
use crate::gfx::camera::camera_utils::quat_from_axis_angle;
use crate::gfx::camera::{Lens, Trackball, TrackballMode};
use crate::gfx::gpu::GpuContext;
use crate::gfx::picking::PickResult;
use crate::gfx::scene::{Actor, DrawStyle, Gnomon, Scene, Shading, Shape, World};
use crate::gfx::shader_library::ShaderLibrary;
use crate::performance::{FrameStatistics, Stopwatch};

pub const INITIAL_ACTOR_NAME: &str = "cone";

/// Wheel angle (in 1/8 degree units) that zooms by a factor of e
const WHEEL_STEPS_PER_E: f32 = 950.0;

const TRACKBALL_VELOCITY: f32 = 0.05;

/// Rotation the viewer starts from and returns to on reset
pub fn home_rotation() -> Quaternion<f32> {
    quat_from_axis_angle(Vector3::unit_x(), 25.0) * quat_from_axis_angle(Vector3::unit_y(), -50.0)
}

/// Canonical views reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewDirection {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl ViewDirection {
    pub const ALL: [ViewDirection; 6] = [
        ViewDirection::Front,
        ViewDirection::Back,
        ViewDirection::Left,
        ViewDirection::Right,
        ViewDirection::Top,
        ViewDirection::Bottom,
    ];

    /// Trackball rotation showing the scene from this side
    pub fn rotation(&self) -> Quaternion<f32> {
        match self {
            ViewDirection::Front => Quaternion::one(),
            ViewDirection::Back => quat_from_axis_angle(Vector3::unit_y(), 180.0),
            ViewDirection::Left => quat_from_axis_angle(Vector3::unit_y(), -90.0),
            ViewDirection::Right => quat_from_axis_angle(Vector3::unit_y(), 90.0),
            ViewDirection::Top => quat_from_axis_angle(Vector3::unit_x(), 90.0),
            ViewDirection::Bottom => quat_from_axis_angle(Vector3::unit_x(), -90.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewDirection::Front => "front",
            ViewDirection::Back => "back",
            ViewDirection::Left => "left",
            ViewDirection::Right => "right",
            ViewDirection::Top => "top",
            ViewDirection::Bottom => "bottom",
        }
    }
}

pub struct Renderer {
    library: Rc<ShaderLibrary>,
    world: World,
    gnomon: Gnomon,
    trackball: Trackball,
    animating: bool,
    profiling: bool,
    width: u32,
    height: u32,
    scale_factor: f64,
    last_pan: Option<Vector2<f32>>,
    stopwatch: Stopwatch,
    frame_time_ms: f64,
    gpu_time_ms: f64,
    statistics: FrameStatistics,
    frame_count: u64,
}

impl Renderer {
    /// Compiles the shaders, builds both scenes and adds the initial cone
    pub fn new(gpu: &mut dyn GpuContext, options: &ViewerOptions) -> Result<Self, GpuError> {
        let library = Rc::new(ShaderLibrary::new(gpu)?);

        let mut world =
            World::new(&library, options.home_position).with_grid_parameters(options.grid);
        world.initialize(gpu)?;
        {
            let scene = world.scene_mut();
            scene.set_lighting(options.lighting);
            scene.set_draw_style(options.draw_style);
            scene.set_shading(options.shading);
        }

        let mut gnomon = Gnomon::new(&library, options.gnomon_size);
        gnomon.initialize(gpu)?;

        let cone = Actor::new(
            INITIAL_ACTOR_NAME,
            &library,
            Shape::Cone {
                radius: 0.5,
                height: 1.0,
                resolution: 24,
            },
        )
        .with_transform(Matrix4::from_angle_z(Deg(-90.0)))
        .build(gpu)?;
        if let Err(mut rejected) = world.scene_mut().add_actor(cone, false) {
            rejected.destroy(gpu);
        }

        let trackball = Trackball::new(TrackballMode::Planar)
            .with_rotation(home_rotation())
            .with_velocity(TRACKBALL_VELOCITY)
            .with_axis(Vector3::unit_y())
            .with_paused(true);

        let mut renderer = Self {
            library,
            world,
            gnomon,
            trackball,
            animating: options.animate,
            profiling: options.profiling,
            width: 0,
            height: 0,
            scale_factor: 1.0,
            last_pan: None,
            stopwatch: Stopwatch::new(),
            frame_time_ms: 0.0,
            gpu_time_ms: 0.0,
            statistics: FrameStatistics::new(),
            frame_count: 0,
        };
        renderer.resize(options.width, options.height, 1.0);
        renderer.world.reset_camera(options.width, options.height);
        Ok(renderer)
    }

    /// Draws one frame: world first, then the gnomon on top
    pub fn render(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError> {
        let rotation = self.trackball.rotation().invert();
        self.world.scene_mut().camera_mut().set_rotation(rotation);
        self.gnomon.set_rotation(rotation);

        gpu.begin_frame(self.profiling)?;
        self.world.render(gpu);
        self.gnomon.render(gpu);
        let gpu_time = gpu.end_frame()?;

        self.frame_time_ms = self.stopwatch.restart().as_secs_f64() * 1000.0;
        if let Some(ms) = gpu_time {
            self.gpu_time_ms = ms;
        }
        self.statistics.record(self.frame_time_ms, gpu_time);

        self.frame_count += 1;
        if self.frame_count % crate::performance::DEFAULT_SAMPLES as u64 == 0 {
            let metrics = self.statistics.metrics();
            log::debug!(
                "{:.1} fps, frame {:.2} ms (min {:.2}, max {:.2}), gpu {:?} ms",
                metrics.fps,
                metrics.frame_time_ms,
                metrics.min_frame_time_ms,
                metrics.max_frame_time_ms,
                metrics.gpu_time_ms
            );
        }
        Ok(())
    }

    /// Last wall clock frame time and last measured GPU time, in milliseconds
    pub fn render_time_estimates(&self) -> (f64, f64) {
        (self.frame_time_ms, self.gpu_time_ms)
    }

    pub fn statistics(&self) -> &FrameStatistics {
        &self.statistics
    }

    /// Window size in physical pixels
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.width = width;
        self.height = height;
        self.scale_factor = scale_factor;
        self.world.resize(width, height);
        self.gnomon.resize(width, height, scale_factor);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Maps window pixels (origin top-left) to view coordinates in [-1, 1], y up
    pub fn pixel_to_view(&self, x: f32, y: f32) -> Option<Vector2<f32>> {
        pixel_to_view(x, y, self.width, self.height)
    }

    /// Grabs the trackball at a window position
    pub fn rotate_start(&mut self, x: f32, y: f32) {
        if let Some(point) = self.pixel_to_view(x, y) {
            self.trackball.press(point);
            self.trackball.start();
        }
    }

    pub fn rotate_to(&mut self, x: f32, y: f32) {
        if let Some(point) = self.pixel_to_view(x, y) {
            self.trackball.move_to(point, Quaternion::one());
        }
    }

    /// Lets go of the trackball; without animation it stops dead
    pub fn rotate_end(&mut self, x: f32, y: f32) {
        if let Some(point) = self.pixel_to_view(x, y) {
            self.trackball.release(point, Quaternion::one());
        }
        if !self.animating {
            self.trackball.stop();
        }
    }

    pub fn pan_start(&mut self, x: f32, y: f32) {
        self.last_pan = self.pixel_to_view(x, y);
    }

    /// Slides the camera in its view plane opposite to the pointer motion
    pub fn pan_to(&mut self, x: f32, y: f32) {
        let Some(point) = self.pixel_to_view(x, y) else {
            return;
        };
        let Some(last) = self.last_pan.replace(point) else {
            return;
        };

        let delta = point - last;
        let length = delta.magnitude();
        if length <= f32::EPSILON {
            return;
        }
        let direction = Vector3::new(-delta.x, -delta.y, 0.0).normalize();
        let camera = self.world.scene_mut().camera_mut();
        let position = camera.position() + direction * (length * 2.0);
        camera.set_position(position);
    }

    pub fn pan_end(&mut self) {
        self.last_pan = None;
    }

    /// Mouse wheel, `angle_y` in 1/8 degree units as reported by most mice
    pub fn wheel(&mut self, angle_y: f32) {
        self.zoom(-angle_y / WHEEL_STEPS_PER_E);
    }

    /// Zooms by a factor of `exp(diff)`
    ///
    /// Orthographic lenses scale their height. Perspective lenses move the
    /// camera along its view direction so the focal point stays put.
    pub fn zoom(&mut self, diff: f32) {
        let factor = diff.exp();
        let camera = self.world.scene_mut().camera_mut();
        match camera.lens() {
            Lens::Orthographic => camera.scale_height(factor),
            Lens::Perspective => {
                let focal_distance = camera.focal_distance();
                let new_focal_distance = focal_distance * factor;
                let direction = camera.view_direction();
                let position =
                    camera.position() + (new_focal_distance - focal_distance) * -direction;
                camera.set_position(position);
                camera.set_focal_distance(new_focal_distance);
            }
        }
    }

    /// Picks the closest actor under the pointer
    pub fn pick(&self, x: f32, y: f32) -> Option<PickResult> {
        let point = self.pixel_to_view(x, y)?;
        self.world.scene().pick(point)
    }

    /// Selects the selectable actor under the pointer, or clears the selection
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<String> {
        let target = self
            .pick(x, y)
            .map(|hit| hit.name)
            .filter(|name| {
                self.world
                    .scene()
                    .actor(name)
                    .is_some_and(|node| node.is_selectable())
            });

        let scene = self.world.scene_mut();
        scene.select_actor(target.as_deref());
        scene.selected().map(str::to_string)
    }

    pub fn set_view(&mut self, view: ViewDirection) {
        log::info!("View from {}", view.label());
        self.trackball.reset(view.rotation());
    }

    pub fn store_camera(&mut self) {
        log::info!("Camera stored");
        self.world.store_camera();
    }

    /// Restores the stored camera and turns the trackball to match it
    pub fn recall_camera(&mut self) -> bool {
        if !self.world.recall_camera(self.width, self.height) {
            log::info!("No stored camera to recall");
            return false;
        }
        log::info!("Camera recalled");
        let rotation = self.world.scene().camera().rotation().invert();
        self.trackball.reset(rotation);
        true
    }

    pub fn reset_camera(&mut self) {
        log::info!("Camera reset");
        self.world.reset_camera(self.width, self.height);
        self.trackball.reset(home_rotation());
    }

    pub fn lens(&self) -> Lens {
        self.world.scene().camera().lens()
    }

    pub fn set_lens(&mut self, lens: Lens) {
        log::info!("Lens {:?}", lens);
        self.world.set_camera_lens(lens);
        self.gnomon.set_camera_lens(lens);
    }

    pub fn set_draw_style(&mut self, draw_style: DrawStyle) {
        log::info!("Draw style {:?}", draw_style);
        self.world.scene_mut().set_draw_style(draw_style);
    }

    pub fn set_lighting(&mut self, lighting: bool) {
        log::info!("Lighting {}", if lighting { "on" } else { "off" });
        self.world.scene_mut().set_lighting(lighting);
    }

    pub fn set_shading(&mut self, shading: Shading) {
        log::info!("Shading {:?}", shading);
        self.world.scene_mut().set_shading(shading);
    }

    pub fn set_headlight(&mut self, headlight: bool) {
        self.world.scene_mut().light_mut().headlight = headlight;
    }

    pub fn set_directional(&mut self, directional: bool) {
        self.world.scene_mut().light_mut().directional = directional;
    }

    pub fn enable_profiling(&mut self, profiling: bool) {
        self.profiling = profiling;
        if !profiling {
            self.gpu_time_ms = 0.0;
        }
    }

    pub fn is_profiling(&self) -> bool {
        self.profiling
    }

    pub fn enable_animation(&mut self, animating: bool) {
        self.animating = animating;
        if !animating {
            self.trackball.stop();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn trackball(&self) -> &Trackball {
        &self.trackball
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Shortcut to the world's scene, where user actors live
    pub fn scene(&self) -> &Scene {
        self.world.scene()
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.world.scene_mut()
    }

    pub fn gnomon(&self) -> &Gnomon {
        &self.gnomon
    }

    pub fn library(&self) -> &Rc<ShaderLibrary> {
        &self.library
    }

    /// Releases every buffer and program
    pub fn destroy(&mut self, gpu: &mut dyn GpuContext) {
        self.world.scene_mut().destroy(gpu);
        self.gnomon.scene_mut().destroy(gpu);
        self.library.release(gpu);
    }
}

/// Window pixels to view coordinates, `None` for an empty window
pub fn pixel_to_view(x: f32, y: f32, width: u32, height: u32) -> Option<Vector2<f32>> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(Vector2::new(
        2.0 * x / width as f32 - 1.0,
        1.0 - 2.0 * y / height as f32,
    ))
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("animating", &self.animating)
            .field("profiling", &self.profiling)
            .field("actors", &self.world.scene().actors().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::gpu::{CommandRecorder, GpuCommand};
    use crate::gfx::scene::world::{AXIS_NAME, BACKGROUND_NAME, GRID_NAME};
    use crate::gfx::scene::gnomon::GNOMON_SIZE;
    use crate::gfx::gizmos::orientation_marker::MARKER_NAME;

    const EPSILON: f32 = 1e-4;

    fn renderer() -> (CommandRecorder, Renderer) {
        let mut gpu = CommandRecorder::new();
        let options = ViewerOptions::default().with_size(800, 600);
        let renderer = Renderer::new(&mut gpu, &options).unwrap();
        (gpu, renderer)
    }

    fn assert_vec3_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < EPSILON, "{:?} != {:?}", a, b);
    }

    fn assert_same_rotation(a: Quaternion<f32>, b: Quaternion<f32>) {
        assert!(a.dot(b).abs() > 1.0 - EPSILON, "{:?} != {:?}", a, b);
    }

    #[test]
    fn starts_with_system_actors_cone_and_marker() {
        let (_, renderer) = renderer();
        let scene = renderer.scene();
        for name in [BACKGROUND_NAME, GRID_NAME, AXIS_NAME] {
            assert!(scene.system_actor(name).is_some(), "missing {name}");
        }
        assert!(scene.has_actor(INITIAL_ACTOR_NAME));
        assert!(renderer.gnomon().scene().has_actor(MARKER_NAME));
        assert_vec3_eq(scene.camera().position(), Vector3::new(0.0, 0.0, 3.5));
        assert!(renderer.trackball().is_paused());
    }

    #[test]
    fn pixel_to_view_maps_corners() {
        assert_eq!(pixel_to_view(0.0, 0.0, 800, 600), Some(Vector2::new(-1.0, 1.0)));
        assert_eq!(pixel_to_view(800.0, 600.0, 800, 600), Some(Vector2::new(1.0, -1.0)));
        assert_eq!(pixel_to_view(400.0, 300.0, 800, 600), Some(Vector2::new(0.0, 0.0)));
        assert_eq!(pixel_to_view(1.0, 1.0, 0, 600), None);
        assert_eq!(pixel_to_view(1.0, 1.0, 800, 0), None);
    }

    #[test]
    fn render_mirrors_the_inverse_trackball_rotation() {
        let (mut gpu, mut renderer) = renderer();
        renderer.render(&mut gpu).unwrap();

        let expected = home_rotation().invert();
        assert_same_rotation(renderer.scene().camera().rotation(), expected);
        assert_same_rotation(renderer.gnomon().scene().camera().rotation(), expected);
    }

    #[test]
    fn render_draws_world_then_gnomon_inside_one_frame() {
        let (mut gpu, mut renderer) = renderer();
        gpu.clear_commands();

        renderer.render(&mut gpu).unwrap();

        let commands = gpu.commands();
        assert!(matches!(commands.first(), Some(GpuCommand::BeginFrame { timed: true })));
        assert!(matches!(commands.last(), Some(GpuCommand::EndFrame)));

        let draws = gpu.draws();
        let gnomon_size = GNOMON_SIZE;
        let first_gnomon = draws
            .iter()
            .position(|d| d.viewport.map(|v| v.width) == Some(gnomon_size))
            .unwrap();
        assert!(first_gnomon > 0);
        assert!(draws[first_gnomon..]
            .iter()
            .all(|d| d.viewport.map(|v| v.width) == Some(gnomon_size)));
    }

    #[test]
    fn profiling_feeds_the_statistics() {
        let (mut gpu, mut renderer) = renderer();
        renderer.render(&mut gpu).unwrap();
        assert_eq!(renderer.statistics().latest().map(|(_, gpu)| gpu), Some(Some(0.0)));

        renderer.enable_profiling(false);
        renderer.render(&mut gpu).unwrap();
        assert_eq!(renderer.statistics().latest().map(|(_, gpu)| gpu), Some(None));
        assert_eq!(renderer.statistics().metrics().samples, 2);
        assert!(renderer.render_time_estimates().0 >= 0.0);
    }

    #[test]
    fn zoom_moves_a_perspective_camera_along_its_view_direction() {
        let (_, mut renderer) = renderer();
        let before = renderer.scene().camera().focal_distance();

        renderer.zoom(2.0f32.ln());

        let camera = renderer.scene().camera();
        assert!((camera.focal_distance() - 2.0 * before).abs() < EPSILON);
        let expected = Vector3::new(0.0, 0.0, 3.5) - camera.view_direction() * before;
        assert_vec3_eq(camera.position(), expected);
    }

    #[test]
    fn zoom_scales_an_orthographic_height() {
        let (_, mut renderer) = renderer();
        renderer.set_lens(Lens::Orthographic);
        let height = renderer.scene().camera().height();
        let position = renderer.scene().camera().position();

        renderer.zoom(0.5);

        let camera = renderer.scene().camera();
        assert!((camera.height() - height * 0.5f32.exp()).abs() < EPSILON);
        assert_vec3_eq(camera.position(), position);
        assert_eq!(renderer.gnomon().scene().camera().lens(), Lens::Orthographic);
    }

    #[test]
    fn wheel_forward_zooms_in() {
        let (_, mut renderer) = renderer();
        let before = renderer.scene().camera().focal_distance();
        renderer.wheel(120.0);
        assert!(renderer.scene().camera().focal_distance() < before);
    }

    #[test]
    fn pan_moves_against_the_pointer() {
        let (_, mut renderer) = renderer();
        renderer.pan_start(400.0, 300.0);
        renderer.pan_to(440.0, 300.0);
        renderer.pan_end();

        // 40 pixels of 800 is 0.1 in view units, doubled
        assert_vec3_eq(renderer.scene().camera().position(), Vector3::new(-0.2, 0.0, 3.5));

        renderer.pan_to(500.0, 300.0);
        assert_vec3_eq(renderer.scene().camera().position(), Vector3::new(-0.2, 0.0, 3.5));
    }

    #[test]
    fn view_presets_reset_the_trackball() {
        let (mut gpu, mut renderer) = renderer();
        for view in ViewDirection::ALL {
            renderer.set_view(view);
            renderer.render(&mut gpu).unwrap();
            assert_same_rotation(renderer.trackball().rotation(), view.rotation());
            assert_same_rotation(
                renderer.scene().camera().rotation(),
                view.rotation().invert(),
            );
        }
    }

    #[test]
    fn recall_resyncs_the_trackball() {
        let (mut gpu, mut renderer) = renderer();
        assert!(!renderer.recall_camera());

        renderer.render(&mut gpu).unwrap();
        renderer.store_camera();
        renderer.set_view(ViewDirection::Back);
        renderer.render(&mut gpu).unwrap();

        assert!(renderer.recall_camera());
        assert_same_rotation(renderer.trackball().rotation(), home_rotation());

        renderer.set_view(ViewDirection::Top);
        renderer.reset_camera();
        assert_same_rotation(renderer.trackball().rotation(), home_rotation());
        assert_eq!(renderer.lens(), Lens::Perspective);
    }

    #[test]
    fn disabling_animation_stops_the_trackball() {
        let (_, mut renderer) = renderer();
        renderer.enable_animation(true);
        renderer.set_view(ViewDirection::Front);
        assert!(!renderer.trackball().is_paused());

        renderer.enable_animation(false);
        assert!(renderer.trackball().is_paused());
    }

    #[test]
    fn click_selects_only_selectable_actors() {
        let (mut gpu, mut renderer) = renderer();
        renderer.set_view(ViewDirection::Front);
        renderer.render(&mut gpu).unwrap();

        // the cone is pickable but not selectable
        assert_eq!(renderer.pick(400.0, 300.0).map(|hit| hit.name), Some("cone".into()));
        assert_eq!(renderer.select_at(400.0, 300.0), None);

        let cube = Actor::new("cube", renderer.library(), Shape::Cube { size: 1.0 })
            .with_transform(Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0)))
            .build(&mut gpu)
            .unwrap();
        renderer.scene_mut().add_actor(cube, false).unwrap();

        assert_eq!(renderer.select_at(400.0, 300.0), Some("cube".into()));
        assert_eq!(renderer.select_at(5.0, 5.0), None);
    }

    #[test]
    fn destroy_releases_everything() {
        let (mut gpu, mut renderer) = renderer();
        renderer.destroy(&mut gpu);
        assert_eq!(gpu.live_buffers(), 0);
    }
}
