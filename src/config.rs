//! Viewer startup options
//!
//! Defaults can be overridden in code with the `with_*` builders or from the
//! environment with [`ViewerOptions::from_env`]:
//!
//! | Variable | Type |
//! |----------|------|
//! | `VIEWER3D_ANTIALIASING` | bool |
//! | `VIEWER3D_VSYNC` | bool |
//! | `VIEWER3D_PROFILING` | bool |
//! | `VIEWER3D_ANIMATE` | bool |
//! | `VIEWER3D_WIDTH` | u32 |
//! | `VIEWER3D_HEIGHT` | u32 |

use std::str::FromStr;

use cgmath::Vector3;

use crate::error::ViewerError;
use crate::gfx::scene::gnomon::GNOMON_SIZE;
use crate::gfx::scene::{DrawStyle, GridParameters, Shading};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// 4x multisampling when the surface format supports it
    pub antialiasing: bool,
    pub vsync: bool,
    /// Measure GPU time with timestamp queries
    pub profiling: bool,
    /// Keep spinning after the trackball is released
    pub animate: bool,
    pub home_position: Vector3<f32>,
    pub lighting: bool,
    pub draw_style: DrawStyle,
    pub shading: Shading,
    pub clear_color: [f64; 3],
    /// Gnomon edge length in logical pixels
    pub gnomon_size: u32,
    pub grid: GridParameters,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "viewer3d".to_string(),
            width: 1280,
            height: 800,
            antialiasing: true,
            vsync: false,
            profiling: true,
            animate: false,
            home_position: Vector3::new(0.0, 0.0, 3.5),
            lighting: true,
            draw_style: DrawStyle::Solid,
            shading: Shading::Smooth,
            clear_color: [0.75, 0.76, 0.76],
            gnomon_size: GNOMON_SIZE,
            grid: GridParameters::default(),
        }
    }
}

impl ViewerOptions {
    /// Defaults overlaid with the `VIEWER3D_*` environment variables
    pub fn from_env() -> Result<Self, ViewerError> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Applies every variable `lookup` knows about
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self, ViewerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = read_bool(&lookup, "VIEWER3D_ANTIALIASING")? {
            self.antialiasing = value;
        }
        if let Some(value) = read_bool(&lookup, "VIEWER3D_VSYNC")? {
            self.vsync = value;
        }
        if let Some(value) = read_bool(&lookup, "VIEWER3D_PROFILING")? {
            self.profiling = value;
        }
        if let Some(value) = read_bool(&lookup, "VIEWER3D_ANIMATE")? {
            self.animate = value;
        }
        if let Some(value) = read::<u32, _>(&lookup, "VIEWER3D_WIDTH")? {
            self.width = value;
        }
        if let Some(value) = read::<u32, _>(&lookup, "VIEWER3D_HEIGHT")? {
            self.height = value;
        }
        Ok(self)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_antialiasing(mut self, antialiasing: bool) -> Self {
        self.antialiasing = antialiasing;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_profiling(mut self, profiling: bool) -> Self {
        self.profiling = profiling;
        self
    }

    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    pub fn with_home_position(mut self, position: Vector3<f32>) -> Self {
        self.home_position = position;
        self
    }

    pub fn with_lighting(mut self, lighting: bool) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_draw_style(mut self, draw_style: DrawStyle) -> Self {
        self.draw_style = draw_style;
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_clear_color(mut self, r: f64, g: f64, b: f64) -> Self {
        self.clear_color = [r, g, b];
        self
    }

    pub fn with_gnomon_size(mut self, size: u32) -> Self {
        self.gnomon_size = size;
        self
    }

    pub fn with_grid(mut self, grid: GridParameters) -> Self {
        self.grid = grid;
        self
    }
}

fn read<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ViewerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| ViewerError::Config(format!("{key}={raw:?}: {e}")))
}

fn read_bool<F>(lookup: &F, key: &str) -> Result<Option<bool>, ViewerError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ViewerError::Config(format!("{key}={raw:?}: expected a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_viewer() {
        let options = ViewerOptions::default();
        assert_eq!((options.width, options.height), (1280, 800));
        assert!(options.antialiasing && options.profiling);
        assert!(!options.vsync && !options.animate);
        assert_eq!(options.gnomon_size, 70);
        assert_eq!(options.clear_color, [0.75, 0.76, 0.76]);
    }

    #[test]
    fn environment_overrides_defaults() {
        let options = ViewerOptions::default()
            .overlay(lookup(&[
                ("VIEWER3D_VSYNC", "on"),
                ("VIEWER3D_ANTIALIASING", "0"),
                ("VIEWER3D_WIDTH", " 640 "),
            ]))
            .unwrap();

        assert!(options.vsync);
        assert!(!options.antialiasing);
        assert_eq!(options.width, 640);
        assert_eq!(options.height, 800);
    }

    #[test]
    fn unparsable_values_are_config_errors() {
        let result = ViewerOptions::default().overlay(lookup(&[("VIEWER3D_HEIGHT", "tall")]));
        assert!(matches!(result, Err(ViewerError::Config(message)) if message.contains("VIEWER3D_HEIGHT")));

        let result = ViewerOptions::default().overlay(lookup(&[("VIEWER3D_ANIMATE", "maybe")]));
        assert!(matches!(result, Err(ViewerError::Config(_))));
    }
}
