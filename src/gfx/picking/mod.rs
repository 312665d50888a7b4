//! # Object Picking System
//!
//! Mouse picking works by casting a world-space ray through the pointer and
//! testing it against an oriented bounding box per actor.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: [`Scene::ray`](crate::gfx::scene::Scene::ray) unprojects
//!    the pointer through the inverse projection and view matrices
//! 2. **Ray-Object Intersection**: every pickable actor tests the ray against
//!    the box spanned by its transform ([`OrientedBox`])
//! 3. **Selection**: the closest hit wins, the first inserted on ties
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::{Matrix4, Vector3};
//! use viewer3d::gfx::picking::{OrientedBox, Ray};
//!
//! let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
//! let bounds = OrientedBox::from_transform(&Matrix4::from_scale(1.0), 1.0);
//! assert_eq!(bounds.intersect(&ray), Some(4.5));
//! ```

use cgmath::{InnerSpace, Matrix4, Vector3, Zero};

/// Directions closer to perpendicular than this are treated as parallel to a slab
const PARALLEL_EPSILON: f32 = 1e-5;

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vector3::zero(),
            direction: -Vector3::unit_z(),
        }
    }
}

impl Ray {
    /// Create a new ray, normalizing `direction` when it has a length
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        };
        Self { origin, direction }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the plane `z = depth`, if it is crossed ahead
    pub fn plane_z_distance(&self, depth: f32) -> Option<f32> {
        if self.direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = (depth - self.origin.z) / self.direction.z;
        (t >= 0.0).then_some(t)
    }
}

/// Box spanned by the columns of a model transform
///
/// A unit cube under `transform` fits exactly; `pick_factor` scales the box
/// around its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vector3<f32>,
    /// Unit axes, zero for a collapsed column
    pub axes: [Vector3<f32>; 3],
    pub half_lengths: [f32; 3],
}

impl OrientedBox {
    pub fn from_transform(transform: &Matrix4<f32>, pick_factor: f32) -> Self {
        let column = |c: Vector3<f32>| {
            let length = c.magnitude();
            let axis = if length > 0.0 { c / length } else { c };
            (axis, length * 0.5 * pick_factor)
        };
        let (x, hx) = column(transform.x.truncate());
        let (y, hy) = column(transform.y.truncate());
        let (z, hz) = column(transform.z.truncate());
        Self {
            center: transform.w.truncate(),
            axes: [x, y, z],
            half_lengths: [hx, hy, hz],
        }
    }

    /// Slab test, returns the distance along the ray to the first hit
    ///
    /// When the origin is inside the box the exit distance is returned.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        let delta = self.center - ray.origin;

        for (axis, half) in self.axes.iter().zip(self.half_lengths) {
            let e = axis.dot(delta);
            let f = axis.dot(ray.direction);

            if f.abs() > PARALLEL_EPSILON {
                let mut t1 = (e + half) / f;
                let mut t2 = (e - half) / f;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max || t_max < 0.0 {
                    return None;
                }
            } else if -e - half > 0.0 || -e + half < 0.0 {
                return None;
            }
        }

        if t_min > 0.0 {
            Some(t_min)
        } else if t_max.is_finite() {
            Some(t_max)
        } else {
            // Every slab was parallel: the ray runs inside a collapsed box.
            Some(0.0)
        }
    }
}

/// Closest actor hit by a pick ray
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    /// Name of the scene node that was hit
    pub name: String,
    /// Part of a group that was hit
    pub part: Option<String>,
    /// Distance along the ray from its origin
    pub distance: f32,
    /// Hit point in world space
    pub point: Vector3<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Matrix4, Rad};
    use rand::Rng;

    fn unit_box() -> OrientedBox {
        OrientedBox::from_transform(&Matrix4::from_scale(1.0), 1.0)
    }

    #[test]
    fn rays_through_the_centre_hit_along_each_axis() {
        let bounds = unit_box();
        for axis in [Vector3::unit_x(), Vector3::unit_y(), Vector3::unit_z()] {
            let ray = Ray::new(axis * 3.0, -axis);
            let distance = bounds.intersect(&ray);
            assert_eq!(distance, Some(2.5));

            let reverse = Ray::new(-axis * 3.0, axis);
            assert_eq!(bounds.intersect(&reverse), Some(2.5));
        }
    }

    #[test]
    fn offset_beyond_the_half_length_misses() {
        let bounds = unit_box();
        let ray = Ray::new(Vector3::new(0.55, 0.0, 3.0), -Vector3::unit_z());
        assert_eq!(bounds.intersect(&ray), None);

        let inside = Ray::new(Vector3::new(0.45, 0.45, 3.0), -Vector3::unit_z());
        assert!(bounds.intersect(&inside).is_some());
    }

    #[test]
    fn pick_factor_enlarges_the_box() {
        let ray = Ray::new(Vector3::new(0.7, 0.0, 3.0), -Vector3::unit_z());
        assert_eq!(unit_box().intersect(&ray), None);

        let enlarged = OrientedBox::from_transform(&Matrix4::from_scale(1.0), 1.5);
        let hit = enlarged.intersect(&ray).unwrap();
        assert!((hit - 2.25).abs() < 1e-6);

        let miss = Ray::new(Vector3::new(0.76, 0.0, 3.0), -Vector3::unit_z());
        assert_eq!(enlarged.intersect(&miss), None);
    }

    #[test]
    fn boxes_behind_the_origin_are_missed() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 3.0), Vector3::unit_z());
        assert_eq!(unit_box().intersect(&ray), None);
    }

    #[test]
    fn origin_inside_reports_exit_distance() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.25), -Vector3::unit_z());
        assert_eq!(unit_box().intersect(&ray), Some(0.75));
    }

    #[test]
    fn random_transforms_are_hit_through_their_centre() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let center = Vector3::new(
                rng.random_range(-5.0f32..5.0),
                rng.random_range(-5.0f32..5.0),
                rng.random_range(-5.0f32..5.0),
            );
            let transform = Matrix4::from_translation(center)
                * Matrix4::from_angle_y(Deg(rng.random_range(0.0f32..360.0)))
                * Matrix4::from_angle_x(Rad(rng.random_range(0.0f32..3.0)))
                * Matrix4::from_nonuniform_scale(
                    rng.random_range(0.2f32..2.0),
                    rng.random_range(0.2f32..2.0),
                    rng.random_range(0.2f32..2.0),
                );
            let bounds = OrientedBox::from_transform(&transform, 1.0);

            let origin = center + Vector3::new(0.0, 0.0, 20.0);
            let ray = Ray::new(origin, center - origin);
            let distance = bounds.intersect(&ray).unwrap();
            assert!(distance > 0.0 && distance <= 20.0);
        }
    }

    #[test]
    fn plane_distance_requires_a_crossing_ahead() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 2.0), -Vector3::unit_z());
        assert_eq!(ray.plane_z_distance(0.0), Some(2.0));
        assert_eq!(ray.plane_z_distance(3.0), None);

        let flat = Ray::new(Vector3::zero(), Vector3::unit_x());
        assert_eq!(flat.plane_z_distance(0.0), None);
    }
}
