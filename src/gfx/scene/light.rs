//! Single light source shared by every actor of a scene

use cgmath::{Matrix4, Vector3, Vector4};

use crate::gfx::gpu::LightUniform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Locked to the camera instead of the world
    pub headlight: bool,
    /// Infinitely far away, `position` is a direction
    pub directional: bool,
    pub position: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    /// Constant, linear and quadratic attenuation coefficients
    pub attenuation: Vector3<f32>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            headlight: false,
            directional: true,
            position: Vector3::new(0.0, 0.0, 0.0),
            ambient: Vector3::new(0.2, 0.2, 0.2),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(0.0, 0.0, 0.0),
            attenuation: Vector3::new(1.0, 0.02, 0.002),
        }
    }
}

impl Light {
    /// Builder pattern: Set position (or direction for directional lights)
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    /// Builder pattern: Set uniform grey ambient, diffuse and specular intensities
    pub fn with_intensities(mut self, ambient: f32, diffuse: f32, specular: f32) -> Self {
        self.ambient = Vector3::new(ambient, ambient, ambient);
        self.diffuse = Vector3::new(diffuse, diffuse, diffuse);
        self.specular = Vector3::new(specular, specular, specular);
        self
    }

    /// Builder pattern: Toggle headlight mode
    pub fn with_headlight(mut self, headlight: bool) -> Self {
        self.headlight = headlight;
        self
    }

    /// Builder pattern: Toggle directional mode
    pub fn with_directional(mut self, directional: bool) -> Self {
        self.directional = directional;
        self
    }

    /// Light position in eye space
    ///
    /// A headlight sits at the eye (or shines along the view axis when
    /// directional); otherwise the world position is moved by `view`.
    pub fn eye_position(&self, view: &Matrix4<f32>) -> Vector4<f32> {
        match (self.headlight, self.directional) {
            (true, true) => Vector4::new(0.0, 0.0, 1.0, 0.0),
            (true, false) => Vector4::new(0.0, 0.0, 0.0, 1.0),
            (false, directional) => {
                let w = if directional { 0.0 } else { 1.0 };
                view * self.position.extend(w)
            }
        }
    }

    /// Uniform block for this light seen through `view`
    pub fn uniform(&self, view: &Matrix4<f32>) -> LightUniform {
        LightUniform {
            position: self.eye_position(view),
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            attenuation: self.attenuation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headlight_ignores_the_view() {
        let view = Matrix4::from_translation(Vector3::new(0.0, 0.0, -5.0));
        let light = Light::default().with_headlight(true);
        assert_eq!(light.eye_position(&view), Vector4::new(0.0, 0.0, 1.0, 0.0));

        let point = light.with_directional(false);
        assert_eq!(point.eye_position(&view), Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn world_lights_follow_the_view() {
        let view = Matrix4::from_translation(Vector3::new(0.0, 0.0, -5.0));
        let directional = Light::default().with_position(2.0, 2.0, 0.5);
        assert_eq!(
            directional.eye_position(&view),
            Vector4::new(2.0, 2.0, 0.5, 0.0)
        );

        let point = directional.with_directional(false);
        assert_eq!(point.eye_position(&view), Vector4::new(2.0, 2.0, -4.5, 1.0));
    }
}
