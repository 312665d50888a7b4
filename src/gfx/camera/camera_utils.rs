use cgmath::{Matrix4, Quaternion, Rotation3, Vector3, Vector4};

/// Maps OpenGL clip space (z in -1..1) onto wgpu clip space (z in 0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

pub fn vec3_to_array4(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

pub fn vec4_to_array(v: Vector4<f32>) -> [f32; 4] {
    v.into()
}

/// Rotation of `degrees` about `axis`, identity for a degenerate axis
pub fn quat_from_axis_angle(axis: Vector3<f32>, degrees: f32) -> Quaternion<f32> {
    use cgmath::InnerSpace;

    let length = axis.magnitude();
    if length <= f32::EPSILON || !length.is_finite() {
        return Quaternion::new(1.0, 0.0, 0.0, 0.0);
    }
    Quaternion::from_axis_angle(axis / length, cgmath::Deg(degrees))
}

/// Divides a homogeneous point by `w`
pub fn dehomogenize(v: Vector4<f32>) -> Vector3<f32> {
    if v.w.abs() <= f32::EPSILON {
        v.truncate()
    } else {
        v.truncate() / v.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Rotation};

    #[test]
    fn degenerate_axis_yields_identity() {
        let q = quat_from_axis_angle(Vector3::new(0.0, 0.0, 0.0), 90.0);
        assert_eq!(q, Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn axis_is_normalized_before_use() {
        let q = quat_from_axis_angle(Vector3::new(0.0, 3.0, 0.0), 90.0);
        let v = q.rotate_vector(Vector3::new(1.0, 0.0, 0.0));
        assert!((v - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-6);
    }

    #[test]
    fn depth_is_remapped_to_unit_range() {
        let near = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU_MATRIX * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(far.z, 1.0);
    }
}
