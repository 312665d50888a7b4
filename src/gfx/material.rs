//! Material definitions for Phong shading
//!
//! A [`Material`] is plain data copied into the per-draw uniforms. Actors
//! carry two of them: the surface material and an alternate material used
//! when edges are drawn on top of solid geometry.

use cgmath::Vector3;

/// Phong material with emission, ambient, diffuse and specular colours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub emission: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emission: Vector3::new(0.0, 0.0, 0.0),
            ambient: Vector3::new(0.2, 0.2, 0.2),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(0.0, 0.0, 0.0),
            shininess: 12.0,
        }
    }
}

impl Material {
    /// Creates a material from its four colour terms and shininess
    ///
    /// # Arguments
    /// * `ambient` - Ambient reflectance
    /// * `diffuse` - Diffuse reflectance
    /// * `specular` - Specular reflectance
    /// * `shininess` - Specular exponent
    pub fn new(
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        shininess: f32,
    ) -> Self {
        Self {
            emission: Vector3::new(0.0, 0.0, 0.0),
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }

    /// Builder pattern: Set emission colour
    pub fn with_emission(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emission = Vector3::new(r, g, b);
        self
    }

    /// Builder pattern: Set ambient colour
    pub fn with_ambient(mut self, r: f32, g: f32, b: f32) -> Self {
        self.ambient = Vector3::new(r, g, b);
        self
    }

    /// Builder pattern: Set diffuse colour
    pub fn with_diffuse(mut self, r: f32, g: f32, b: f32) -> Self {
        self.diffuse = Vector3::new(r, g, b);
        self
    }

    /// Builder pattern: Set specular colour
    pub fn with_specular(mut self, r: f32, g: f32, b: f32) -> Self {
        self.specular = Vector3::new(r, g, b);
        self
    }

    /// Builder pattern: Set specular exponent
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess.max(0.0);
        self
    }

    /// Takes ambient, diffuse, specular and shininess from `other`, keeping emission
    pub fn with_surface_of(mut self, other: &Material) -> Self {
        self.ambient = other.ambient;
        self.diffuse = other.diffuse;
        self.specular = other.specular;
        self.shininess = other.shininess;
        self
    }

    /// Grey material with the given diffuse intensity, used for edges and grids
    pub fn grey(diffuse: f32) -> Self {
        Self::default().with_diffuse(diffuse, diffuse, diffuse)
    }

    pub fn brass() -> Self {
        Self::new(
            Vector3::new(0.329412, 0.223529, 0.027451),
            Vector3::new(0.780392, 0.568627, 0.113725),
            Vector3::new(0.992157, 0.941176, 0.807843),
            27.897436,
        )
    }

    pub fn chrome() -> Self {
        Self::new(
            Vector3::new(0.25, 0.25, 0.25),
            Vector3::new(0.4, 0.4, 0.4),
            Vector3::new(0.774597, 0.774597, 0.774597),
            76.8,
        )
    }

    pub fn emerald() -> Self {
        Self::new(
            Vector3::new(0.0215, 0.1745, 0.0215),
            Vector3::new(0.07568, 0.61424, 0.07568),
            Vector3::new(0.633, 0.727811, 0.633),
            76.8,
        )
    }

    /// Used to flag actors in a warning state
    pub fn gold() -> Self {
        Self::new(
            Vector3::new(0.24725, 0.1995, 0.0745),
            Vector3::new(0.75164, 0.60648, 0.22648),
            Vector3::new(0.628281, 0.555802, 0.366065),
            51.2,
        )
    }

    /// Used to flag actors in an error state
    pub fn ruby() -> Self {
        Self::new(
            Vector3::new(0.1745, 0.01175, 0.01175),
            Vector3::new(0.61424, 0.04136, 0.04136),
            Vector3::new(0.727811, 0.626959, 0.626959),
            76.8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_is_matte_grey() {
        let material = Material::default();
        assert_eq!(material.diffuse, Vector3::new(0.8, 0.8, 0.8));
        assert_eq!(material.specular, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(material.shininess, 12.0);
    }

    #[test]
    fn builders_replace_single_terms() {
        let material = Material::gold().with_diffuse(0.1, 0.2, 0.3).with_shininess(-4.0);
        assert_eq!(material.diffuse, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(material.ambient, Material::gold().ambient);
        assert_eq!(material.shininess, 0.0);
    }
}
