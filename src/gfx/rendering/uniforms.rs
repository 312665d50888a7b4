//! GPU layout of [`DrawUniforms`]
//!
//! Mirrors the `DrawUniforms` struct of `viewer.wgsl`. Every member is a
//! `vec4` or `mat4x4` so the Rust and WGSL layouts agree without padding.

use bytemuck::{Pod, Zeroable};

use crate::gfx::camera::camera_utils::{
    convert_matrix4_to_array, vec3_to_array4, vec4_to_array, OPENGL_TO_WGPU_MATRIX,
};
use crate::gfx::gpu::DrawUniforms;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Emission, ambient, diffuse, specular
    pub material: [[f32; 4]; 4],
    /// Shininess, selected factor, unused, unused
    pub params: [f32; 4],
    /// Position, ambient, diffuse, specular, attenuation
    pub light: [[f32; 4]; 5],
}

impl ShaderUniforms {
    /// Packs the uniforms, converting the projection to wgpu clip space
    pub fn from_draw(uniforms: &DrawUniforms) -> Self {
        let material = &uniforms.material;
        let light = &uniforms.light;

        Self {
            model: convert_matrix4_to_array(uniforms.model),
            view: convert_matrix4_to_array(uniforms.view),
            projection: convert_matrix4_to_array(OPENGL_TO_WGPU_MATRIX * uniforms.projection),
            normal: convert_matrix4_to_array(uniforms.normal),
            material: [
                vec3_to_array4(material.emission, 1.0),
                vec3_to_array4(material.ambient, 1.0),
                vec3_to_array4(material.diffuse, 1.0),
                vec3_to_array4(material.specular, 1.0),
            ],
            params: [material.shininess, uniforms.selected, 0.0, 0.0],
            light: [
                vec4_to_array(light.position),
                vec3_to_array4(light.ambient, 1.0),
                vec3_to_array4(light.diffuse, 1.0),
                vec3_to_array4(light.specular, 1.0),
                vec3_to_array4(light.attenuation, 0.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Matrix4, Vector4};

    #[test]
    fn layout_matches_the_shader() {
        // 4 matrices, 4 material vectors, params, 5 light vectors
        assert_eq!(std::mem::size_of::<ShaderUniforms>(), 4 * 64 + 4 * 16 + 16 + 5 * 16);
    }

    #[test]
    fn projection_depth_is_remapped_to_zero_one() {
        let mut uniforms = DrawUniforms::default();
        uniforms.projection = cgmath::perspective(Deg(45.0), 1.0, 0.1, 100.0);
        let packed = ShaderUniforms::from_draw(&uniforms);
        let projection = Matrix4::from(packed.projection);

        let near = projection * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = projection * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn material_and_light_terms_are_packed_in_order() {
        let mut uniforms = DrawUniforms::default();
        uniforms.material.shininess = 76.8;
        uniforms.selected = 0.65;
        let packed = ShaderUniforms::from_draw(&uniforms);

        assert_eq!(packed.params, [76.8, 0.65, 0.0, 0.0]);
        assert_eq!(packed.material[2], [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(packed.light[0], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(packed.light[4], [1.0, 0.02, 0.002, 0.0]);
    }
}
