//! Quaternion trackball driven by pointer drags
//!
//! Pointer positions are expected in view coordinates, `-1..1` on both axes
//! with `y` pointing up. A drag accumulates rotation; once released, the
//! trackball keeps spinning about the last axis at the last measured angular
//! velocity until [`Trackball::stop`] freezes it.

use std::time::{Duration, Instant};

use cgmath::{InnerSpace, Quaternion, Rotation, Vector2, Vector3};

use super::camera_utils::quat_from_axis_angle;

/// Moves closer together than this are ignored to keep the velocity estimate stable
pub const MOVE_DEBOUNCE: Duration = Duration::from_millis(20);

/// How pointer motion maps to a rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackballMode {
    /// Axis perpendicular to the drag in the screen plane
    Planar,
    /// Drag projected onto a virtual hemisphere
    Spherical,
}

#[derive(Debug, Clone)]
pub struct Trackball {
    rotation: Quaternion<f32>,
    /// Degrees per millisecond
    velocity: f32,
    axis: Vector3<f32>,
    mode: TrackballMode,
    last_position: Vector2<f32>,
    last_time: Instant,
    pressed: bool,
    paused: bool,
}

impl Default for Trackball {
    fn default() -> Self {
        Self {
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            velocity: 0.0,
            axis: Vector3::unit_y(),
            mode: TrackballMode::Spherical,
            last_position: Vector2::new(0.0, 0.0),
            last_time: Instant::now(),
            pressed: false,
            paused: false,
        }
    }
}

impl Trackball {
    pub fn new(mode: TrackballMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Builder pattern: Set the starting rotation
    pub fn with_rotation(mut self, rotation: Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set the spin velocity in degrees per millisecond
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder pattern: Set the spin axis
    pub fn with_axis(mut self, axis: Vector3<f32>) -> Self {
        self.axis = axis;
        self
    }

    /// Builder pattern: Start paused
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn mode(&self) -> TrackballMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TrackballMode) {
        self.mode = mode;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn axis(&self) -> Vector3<f32> {
        self.axis
    }

    /// Restarts from `rotation` with no spin
    pub fn reset(&mut self, rotation: Quaternion<f32>) {
        self.reset_at(rotation, Instant::now());
    }

    pub fn reset_at(&mut self, rotation: Quaternion<f32>, now: Instant) {
        self.rotation = rotation;
        self.velocity = 0.0;
        self.last_position = Vector2::new(0.0, 0.0);
        self.last_time = now;
        self.pressed = false;
        self.paused = false;
    }

    /// Begins a drag at `point`
    pub fn press(&mut self, point: Vector2<f32>) {
        self.press_at(point, Instant::now());
    }

    pub fn press_at(&mut self, point: Vector2<f32>, now: Instant) {
        self.rotation = self.rotation_at(now);
        self.pressed = true;
        self.last_time = now;
        self.last_position = point;
        self.velocity = 0.0;
    }

    /// Continues a drag
    ///
    /// # Arguments
    /// * `point` - Pointer position in view coordinates
    /// * `reference` - Frame the new rotation axis is expressed in
    pub fn move_to(&mut self, point: Vector2<f32>, reference: Quaternion<f32>) {
        self.move_at(point, reference, Instant::now());
    }

    pub fn move_at(&mut self, point: Vector2<f32>, reference: Quaternion<f32>, now: Instant) {
        if !self.pressed {
            return;
        }

        let elapsed = now.saturating_duration_since(self.last_time);
        if elapsed <= MOVE_DEBOUNCE {
            return;
        }
        let msecs = elapsed.as_secs_f32() * 1000.0;

        let (axis, angle) = match self.mode {
            TrackballMode::Planar => {
                let delta = point - self.last_position;
                let length = delta.magnitude();
                let axis = Vector3::new(-delta.y, delta.x, 0.0);
                (axis, length.to_degrees())
            }
            TrackballMode::Spherical => {
                let last = project_to_hemisphere(self.last_position);
                let current = project_to_hemisphere(point);
                let axis = last.cross(current);
                let sine = axis.magnitude().min(1.0);
                (axis, 2.0 * sine.asin().to_degrees())
            }
        };

        if axis.magnitude2() > 0.0 && angle > 0.0 {
            self.axis = reference.rotate_vector(axis.normalize());
            self.velocity = angle / msecs;
            self.rotation = quat_from_axis_angle(self.axis, angle) * self.rotation;
        } else {
            self.velocity = 0.0;
        }

        self.last_position = point;
        self.last_time = now;
    }

    /// Ends a drag with one final move
    pub fn release(&mut self, point: Vector2<f32>, reference: Quaternion<f32>) {
        self.release_at(point, reference, Instant::now());
    }

    pub fn release_at(&mut self, point: Vector2<f32>, reference: Quaternion<f32>, now: Instant) {
        self.move_at(point, reference, now);
        self.pressed = false;
    }

    /// Resumes spinning
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        self.last_time = now;
        self.paused = false;
    }

    /// Freezes the current rotation
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn stop_at(&mut self, now: Instant) {
        self.rotation = self.rotation_at(now);
        self.paused = true;
    }

    /// Current rotation including inertial spin
    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation_at(Instant::now())
    }

    pub fn rotation_at(&self, now: Instant) -> Quaternion<f32> {
        if self.paused || self.pressed || self.velocity == 0.0 {
            return self.rotation;
        }
        let msecs = now.saturating_duration_since(self.last_time).as_secs_f32() * 1000.0;
        quat_from_axis_angle(self.axis, self.velocity * msecs) * self.rotation
    }
}

/// Lifts a view-space point onto the unit hemisphere facing the viewer
fn project_to_hemisphere(point: Vector2<f32>) -> Vector3<f32> {
    let flat = Vector3::new(point.x, point.y, 0.0);
    let sqr_z = 1.0 - flat.magnitude2();
    if sqr_z > 0.0 {
        Vector3::new(point.x, point.y, sqr_z.sqrt())
    } else if flat.magnitude2() > 0.0 {
        flat.normalize()
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3};

    fn later(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn identity() -> Quaternion<f32> {
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn reset_rotation_is_returned_exactly() {
        let mut trackball = Trackball::new(TrackballMode::Planar).with_velocity(0.3);
        let q = Quaternion::from_angle_x(Deg(25.0)) * Quaternion::from_angle_y(Deg(-50.0));
        let now = Instant::now();
        trackball.reset_at(q, now);

        assert_eq!(trackball.rotation_at(now), q);
        assert_eq!(trackball.rotation_at(later(now, 500)), q);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut trackball = Trackball::default();
        let now = Instant::now();
        trackball.move_at(Vector2::new(0.5, 0.5), identity(), later(now, 100));
        assert_eq!(trackball.rotation_at(later(now, 100)), identity());
    }

    #[test]
    fn moves_inside_debounce_window_are_dropped() {
        let mut trackball = Trackball::new(TrackballMode::Planar);
        let now = Instant::now();
        trackball.press_at(Vector2::new(0.0, 0.0), now);
        trackball.move_at(Vector2::new(0.5, 0.0), identity(), later(now, 20));
        assert_eq!(trackball.rotation_at(later(now, 20)), identity());
        assert_eq!(trackball.velocity(), 0.0);
    }

    #[test]
    fn spherical_drag_in_place_gives_no_rotation() {
        let mut trackball = Trackball::new(TrackballMode::Spherical);
        let now = Instant::now();
        let point = Vector2::new(0.3, -0.2);
        trackball.press_at(point, now);
        trackball.move_at(point, identity(), later(now, 50));

        assert_eq!(trackball.velocity(), 0.0);
        let rotation = trackball.rotation_at(later(now, 50));
        assert_eq!(rotation, identity());
        assert!(!rotation.s.is_nan());
    }

    #[test]
    fn planar_drag_rotates_about_perpendicular_axis() {
        let mut trackball = Trackball::new(TrackballMode::Planar);
        let now = Instant::now();
        trackball.press_at(Vector2::new(0.0, 0.0), now);
        trackball.move_at(Vector2::new(0.1, 0.0), identity(), later(now, 40));

        assert!((trackball.axis() - Vector3::unit_y()).magnitude() < 1e-6);
        let expected_angle = 0.1f32.to_degrees();
        assert!((trackball.velocity() - expected_angle / 40.0).abs() < 1e-3);

        let rotation = trackball.rotation_at(later(now, 40));
        let expected = Quaternion::from_angle_y(Deg(expected_angle));
        assert!((rotation.s - expected.s).abs() < 1e-5);
        assert!((rotation.v - expected.v).magnitude() < 1e-5);
    }

    #[test]
    fn spherical_drag_uses_twice_the_arc_sine() {
        let mut trackball = Trackball::new(TrackballMode::Spherical);
        let now = Instant::now();
        trackball.press_at(Vector2::new(0.0, 0.0), now);
        trackball.move_at(Vector2::new(0.5, 0.0), identity(), later(now, 30));

        let sine: f32 = 0.5;
        let expected = 2.0 * sine.asin().to_degrees();
        assert!((trackball.velocity() * 30.0 - expected).abs() < 1e-2);
        assert!((trackball.axis() - Vector3::unit_y()).magnitude() < 1e-6);
    }

    #[test]
    fn reference_frame_rotates_the_axis() {
        let mut trackball = Trackball::new(TrackballMode::Planar);
        let now = Instant::now();
        let reference = Quaternion::from_angle_z(Deg(90.0));
        trackball.press_at(Vector2::new(0.0, 0.0), now);
        trackball.move_at(Vector2::new(0.1, 0.0), reference, later(now, 40));

        assert!((trackball.axis() - Vector3::new(-1.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn released_trackball_spins_until_stopped() {
        let mut trackball = Trackball::new(TrackballMode::Planar);
        let now = Instant::now();
        trackball.press_at(Vector2::new(0.0, 0.0), now);
        trackball.release_at(Vector2::new(0.2, 0.0), identity(), later(now, 40));
        assert!(!trackball.is_pressed());

        let at_release = trackball.rotation_at(later(now, 40));
        let spinning = trackball.rotation_at(later(now, 140));
        assert_ne!(at_release, spinning);

        trackball.stop_at(later(now, 140));
        assert!(trackball.is_paused());
        assert_eq!(trackball.rotation_at(later(now, 1000)), spinning);
    }
}
