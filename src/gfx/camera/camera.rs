//! Scene camera with perspective and orthographic lenses
//!
//! The camera matrix is composed as `orientation · rotation · translate(position)`,
//! so the interactive rotation coming from the trackball turns the world around
//! the origin before the camera offset is applied. The view matrix is the
//! inverse of that product.

use cgmath::{
    perspective, ortho, Deg, InnerSpace, Matrix4, Quaternion, Rotation, SquareMatrix, Vector3,
};

/// Projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lens {
    Perspective,
    Orthographic,
}

impl Lens {
    pub fn toggled(&self) -> Self {
        match self {
            Lens::Perspective => Lens::Orthographic,
            Lens::Orthographic => Lens::Perspective,
        }
    }
}

/// Copy of every camera parameter, taken by [`Camera::store`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub lens: Lens,
    pub position: Vector3<f32>,
    pub fovy: Deg<f32>,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    pub orientation: Matrix4<f32>,
    pub rotation: Quaternion<f32>,
    pub focal_distance: f32,
    pub aspect_ratio: f32,
}

impl Default for CameraSnapshot {
    fn default() -> Self {
        Self {
            lens: Lens::Perspective,
            position: Vector3::new(0.0, 0.0, 1.0),
            fovy: Deg(45.0),
            height: 2.0,
            near: 0.1,
            far: 100.0,
            orientation: Matrix4::identity(),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            focal_distance: 5.0,
            aspect_ratio: 1.0,
        }
    }
}

/// Camera owned by a scene
///
/// All parameters live in [`CameraSnapshot`] so that storing and recalling is a
/// plain copy.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    state: CameraSnapshot,
    stored: Option<CameraSnapshot>,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set lens without adjusting other parameters
    pub fn with_lens(mut self, lens: Lens) -> Self {
        self.state.lens = lens;
        self
    }

    /// Builder pattern: Set position
    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.state.position = position;
        self
    }

    /// Builder pattern: Set aspect ratio
    pub fn with_aspect_ratio(mut self, aspect: f32) -> Self {
        self.state.aspect_ratio = aspect;
        self
    }

    pub fn lens(&self) -> Lens {
        self.state.lens
    }

    /// Switches the projection kind
    ///
    /// With `adjust` the apparent size of objects at the focal distance is
    /// preserved: going orthographic derives the view height from the field of
    /// view, going perspective moves the camera so the focal point stays put.
    ///
    /// # Arguments
    /// * `lens` - New projection kind
    /// * `adjust` - Whether to keep the framing at the focal distance
    pub fn set_lens(&mut self, lens: Lens, adjust: bool) {
        if lens == self.state.lens {
            return;
        }

        if adjust {
            let half_fov = Deg(self.state.fovy.0 * 0.5);
            let tan_half = cgmath::Angle::tan(half_fov);
            match lens {
                Lens::Orthographic => {
                    self.state.height = 2.0 * self.state.focal_distance * tan_half;
                }
                Lens::Perspective => {
                    let direction = self.view_direction();
                    let focal_point = self.state.position + direction * self.state.focal_distance;
                    self.state.focal_distance = self.state.height * 0.5 / tan_half;
                    self.state.position = focal_point - direction * self.state.focal_distance;
                }
            }
        }

        self.state.lens = lens;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.state.position
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.state.position = position;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.state.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.state.aspect_ratio = aspect;
    }

    pub fn focal_distance(&self) -> f32 {
        self.state.focal_distance
    }

    pub fn set_focal_distance(&mut self, focal_distance: f32) {
        self.state.focal_distance = focal_distance;
    }

    /// Vertical extent of the orthographic view volume
    pub fn height(&self) -> f32 {
        self.state.height
    }

    pub fn set_height(&mut self, height: f32) {
        self.state.height = height;
    }

    /// Zoom operator: scales the height of an orthographic lens, the field of
    /// view of a perspective one
    pub fn scale_height(&mut self, factor: f32) {
        match self.state.lens {
            Lens::Orthographic => self.state.height *= factor,
            Lens::Perspective => self.state.fovy = Deg(self.state.fovy.0 * factor),
        }
    }

    pub fn field_of_view(&self) -> Deg<f32> {
        self.state.fovy
    }

    pub fn set_field_of_view(&mut self, fovy: Deg<f32>) {
        self.state.fovy = fovy;
    }

    pub fn near_plane(&self) -> f32 {
        self.state.near
    }

    pub fn set_near_plane(&mut self, near: f32) {
        self.state.near = near;
    }

    pub fn far_plane(&self) -> f32 {
        self.state.far
    }

    pub fn set_far_plane(&mut self, far: f32) {
        self.state.far = far;
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        self.state.rotation
    }

    /// Sets the interactive rotation applied on top of the orientation
    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) {
        self.state.rotation = rotation;
    }

    pub fn orientation(&self) -> Matrix4<f32> {
        self.state.orientation
    }

    pub fn set_orientation(&mut self, orientation: Matrix4<f32>) {
        self.state.orientation = orientation;
    }

    /// Aims the camera at `target` and makes the distance to it the focal distance
    ///
    /// # Arguments
    /// * `target` - World point to look at
    /// * `up` - Approximate up direction
    pub fn point_at(&mut self, target: Vector3<f32>, up: Vector3<f32>) {
        let offset = target - self.state.position;
        self.state.focal_distance = offset.magnitude();
        if self.state.focal_distance <= f32::EPSILON {
            return;
        }
        self.look_at(offset.normalize(), up.normalize());
    }

    /// Derives the orientation basis from a view direction and up vector
    ///
    /// The basis vectors `x`, `y`, `z` form the rows of the orientation matrix.
    pub fn look_at(&mut self, direction: Vector3<f32>, up: Vector3<f32>) {
        let z = -direction;
        let x = up.cross(z);
        let y = z.cross(x);
        #[rustfmt::skip]
        let orientation = Matrix4::new(
            x.x, y.x, z.x, 0.0,
            x.y, y.y, z.y, 0.0,
            x.z, y.z, z.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        self.state.orientation = orientation;
    }

    /// Forward direction after the orientation is applied
    pub fn view_direction(&self) -> Vector3<f32> {
        (self.state.orientation * Vector3::new(0.0, 0.0, -1.0).extend(0.0)).truncate()
    }

    /// `orientation · rotation · translate(position)`
    pub fn camera_matrix(&self) -> Matrix4<f32> {
        self.state.orientation
            * Matrix4::from(self.state.rotation)
            * Matrix4::from_translation(self.state.position)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let camera = self.camera_matrix();
        camera.invert().unwrap_or_else(|| {
            log::warn!("camera matrix is singular, using its rotation inverse");
            Matrix4::from(self.state.rotation.invert())
                * Matrix4::from_translation(-self.state.position)
        })
    }

    /// OpenGL-convention projection for the current lens
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let s = &self.state;
        match s.lens {
            Lens::Orthographic => {
                let y_radius = 0.5 * s.height;
                let x_radius = y_radius * s.aspect_ratio;
                ortho(-x_radius, x_radius, -y_radius, y_radius, s.near, s.far)
            }
            Lens::Perspective => perspective(s.fovy, s.aspect_ratio, s.near, s.far),
        }
    }

    /// Copies the current parameters into the stored slot
    pub fn store(&mut self) {
        self.stored = Some(self.state);
    }

    pub fn has_stored(&self) -> bool {
        self.stored.is_some()
    }

    /// Restores the stored parameters, keeping the caller's aspect ratio
    ///
    /// Returns `false` when nothing was stored.
    pub fn recall(&mut self, aspect: f32) -> bool {
        match self.stored {
            Some(snapshot) => {
                self.state = snapshot;
                self.state.aspect_ratio = aspect;
                true
            }
            None => false,
        }
    }

    /// Current parameters as a snapshot
    pub fn snapshot(&self) -> CameraSnapshot {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Rotation3, Vector4};
    use rand::Rng;

    const EPS: f32 = 1e-4;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    fn close_vec(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < EPS
    }

    #[test]
    fn defaults_match_a_unit_perspective_camera() {
        let camera = Camera::new();
        assert_eq!(camera.lens(), Lens::Perspective);
        assert_eq!(camera.position(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(camera.field_of_view(), Deg(45.0));
        assert_eq!(camera.focal_distance(), 5.0);
        assert!(!camera.has_stored());
    }

    #[test]
    fn view_matrix_inverts_the_camera_matrix() {
        let mut camera = Camera::new().with_position(Vector3::new(0.0, 0.0, 3.5));
        camera.set_rotation(Quaternion::from_angle_y(Deg(30.0)));

        let product = camera.camera_matrix() * camera.view_matrix();
        for c in 0..4 {
            for r in 0..4 {
                let expected = if c == r { 1.0 } else { 0.0 };
                assert!(close(product[c][r], expected));
            }
        }
    }

    #[test]
    fn point_at_sets_focal_distance_and_direction() {
        let mut camera = Camera::new().with_position(Vector3::new(0.0, 0.0, 3.5));
        camera.point_at(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_y());

        assert!(close(camera.focal_distance(), 3.5));
        assert!(close_vec(camera.view_direction(), Vector3::new(0.0, 0.0, -1.0)));

        let eye_space = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(close(eye_space.z, -3.5));
    }

    #[test]
    fn lens_round_trip_restores_framing() {
        let mut rng = rand::rng();
        for _ in 0..32 {
            let distance = rng.random_range(0.5f32..20.0);
            let mut camera = Camera::new().with_position(Vector3::new(0.0, 0.0, distance));
            camera.point_at(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_y());
            let before = camera.snapshot();

            camera.set_lens(Lens::Orthographic, true);
            let expected_height = 2.0 * distance * (22.5f32).to_radians().tan();
            assert!((camera.height() - expected_height).abs() < 1e-3 * distance.max(1.0));

            camera.set_lens(Lens::Perspective, true);
            let after = camera.snapshot();
            assert_eq!(after.fovy, before.fovy);
            assert!((after.focal_distance - before.focal_distance).abs() < 1e-3 * distance);
            assert!((after.position - before.position).magnitude() < 1e-3 * distance);
        }
    }

    #[test]
    fn unadjusted_lens_switch_keeps_parameters() {
        let mut camera = Camera::new();
        camera.set_lens(Lens::Orthographic, false);
        assert_eq!(camera.lens(), Lens::Orthographic);
        assert_eq!(camera.height(), 2.0);
    }

    #[test]
    fn store_and_recall_reproduce_state() {
        let mut camera = Camera::new().with_aspect_ratio(1.5);
        camera.set_position(Vector3::new(1.0, 2.0, 3.0));
        camera.point_at(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_y());
        camera.set_rotation(Quaternion::from_angle_x(Deg(25.0)));
        let stored = camera.snapshot();
        camera.store();

        camera.set_lens(Lens::Orthographic, true);
        camera.set_position(Vector3::new(9.0, 9.0, 9.0));
        camera.scale_height(3.0);
        camera.set_near_plane(1.0);

        assert!(camera.recall(1.5));
        assert_eq!(camera.snapshot(), stored);

        assert!(camera.recall(2.0));
        assert_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn recall_without_store_is_a_no_op() {
        let mut camera = Camera::new();
        assert!(!camera.recall(2.0));
        assert_eq!(camera.aspect_ratio(), 1.0);
    }

    #[test]
    fn scale_height_targets_the_active_lens() {
        let mut camera = Camera::new();
        camera.scale_height(0.5);
        assert_eq!(camera.field_of_view(), Deg(22.5));
        assert_eq!(camera.height(), 2.0);

        camera.set_lens(Lens::Orthographic, false);
        camera.scale_height(0.5);
        assert_eq!(camera.height(), 1.0);
    }

    #[test]
    fn orthographic_projection_uses_height_and_aspect() {
        let mut camera = Camera::new().with_aspect_ratio(2.0);
        camera.set_lens(Lens::Orthographic, false);
        camera.set_height(4.0);

        let corner = camera.projection_matrix() * Vector4::new(4.0, 2.0, -1.0, 1.0);
        assert!(close(corner.x, 1.0));
        assert!(close(corner.y, 1.0));
    }
}
