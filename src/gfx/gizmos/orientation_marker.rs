//! # Orientation Marker
//!
//! A sphere with three cones pointing along the world axes. The gnomon scene
//! renders it in a corner of the window so the current camera rotation can be
//! read at a glance.

use std::rc::Rc;

use cgmath::{Deg, Matrix4, Vector3};

use crate::error::GpuError;
use crate::gfx::geometry::AXIS_Z_COLOR;
use crate::gfx::gpu::GpuContext;
use crate::gfx::material::Material;
use crate::gfx::scene::{Actor, Group, Shape};
use crate::gfx::shader_library::ShaderLibrary;

pub const MARKER_NAME: &str = "marker";

/// Cone resolution used by the gnomon
pub const DEFAULT_RESOLUTION: u32 = 24;

/// Axis colours and cone resolution of a marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationMarker {
    pub resolution: u32,
    pub x_color: Vector3<f32>,
    pub y_color: Vector3<f32>,
    pub z_color: Vector3<f32>,
}

impl Default for OrientationMarker {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            x_color: Vector3::new(1.0, 0.0, 0.0),
            y_color: Vector3::new(0.0, 1.0, 0.0),
            z_color: Vector3::from(AXIS_Z_COLOR),
        }
    }
}

impl OrientationMarker {
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Uploads the sphere and cones and returns them as one group
    ///
    /// The sphere is the first part, so only the cones are hit by picking.
    pub fn build(
        &self,
        gpu: &mut dyn GpuContext,
        library: &Rc<ShaderLibrary>,
    ) -> Result<Group, GpuError> {
        let mut group = Group::new(MARKER_NAME);

        let sphere_material = Material::new(
            Vector3::new(0.25, 0.25, 0.25),
            Vector3::new(0.4, 0.4, 0.4),
            Vector3::new(0.2, 0.2, 0.2),
            128.8,
        );
        let sphere = Actor::new(
            "sphere",
            library,
            Shape::Icosahedron {
                radius: 1.0,
                level: 2,
                colors: false,
            },
        )
        .with_material(sphere_material)
        .with_transform(Matrix4::from_scale(0.4))
        .build(gpu)?;
        group.add_part(sphere);

        let cone_scale = Matrix4::from_nonuniform_scale(0.19, 0.2, 0.19);
        let arms = [
            (
                "xaxis",
                self.x_color,
                Matrix4::from_angle_z(Deg(-90.0))
                    * cone_scale
                    * Matrix4::from_translation(Vector3::new(0.0, 2.8, 0.0)),
            ),
            (
                "yaxis",
                self.y_color,
                cone_scale * Matrix4::from_translation(Vector3::new(0.0, 2.7, 0.0)),
            ),
            (
                "zaxis",
                self.z_color,
                Matrix4::from_angle_x(Deg(90.0))
                    * cone_scale
                    * Matrix4::from_translation(Vector3::new(0.0, 2.7, 0.0)),
            ),
        ];
        for (name, color, transform) in arms {
            let material = Material::default()
                .with_diffuse(color.x, color.y, color.z)
                .with_specular(0.5, 0.5, 0.5)
                .with_shininess(76.8);
            let cone = Actor::new(
                name,
                library,
                Shape::Cone {
                    radius: 1.0,
                    height: 2.0,
                    resolution: self.resolution,
                },
            )
            .with_material(material)
            .with_transform(transform)
            .build(gpu)?;
            group.add_part(cone);
        }

        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::gpu::CommandRecorder;
    use cgmath::InnerSpace;

    #[test]
    fn marker_has_a_sphere_and_three_cones() {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let group = OrientationMarker::default().build(&mut gpu, &library).unwrap();

        let names: Vec<&str> = group.parts().iter().map(Actor::name).collect();
        assert_eq!(names, ["sphere", "xaxis", "yaxis", "zaxis"]);
        assert_eq!(gpu.live_buffers(), 2 + 3);
        assert_eq!(group.part("yaxis").unwrap().material().diffuse, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn cones_point_along_their_axes() {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let group = OrientationMarker::default().build(&mut gpu, &library).unwrap();

        let direction = |name: &str| group.part(name).unwrap().position().normalize();
        let close = |a: Vector3<f32>, b: Vector3<f32>| (a - b).magnitude() < 1e-5;
        assert!(close(direction("xaxis"), Vector3::unit_x()));
        assert!(close(direction("yaxis"), Vector3::unit_y()));
        assert!(close(direction("zaxis"), Vector3::unit_z()));
    }
}
