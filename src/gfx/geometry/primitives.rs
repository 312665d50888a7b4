//! # Primitive Shape Generation
//!
//! Shapes are centred at the origin with `y` pointing up. Solid shapes carry
//! outward normals; line shapes carry positions (and colours) only.

use std::collections::HashMap;
use std::f32::consts::PI;

use super::{DrawRange, GeometryData};
use crate::gfx::gpu::Topology;

/// Generate a cube centred at the origin
///
/// 36 vertices, two triangles per face, each face with its own normal and
/// texture coordinates from 0 to 1.
pub fn generate_cube(size: f32) -> GeometryData {
    let h = size * 0.5;

    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ];
    let corners: [[f32; 2]; 6] = [
        [-1.0, -1.0],
        [1.0, -1.0],
        [1.0, 1.0],
        [1.0, 1.0],
        [-1.0, 1.0],
        [-1.0, -1.0],
    ];

    let mut data = GeometryData::new();
    for (n, u, v) in faces {
        for [cu, cv] in corners {
            data.vertices.push([
                (n[0] + cu * u[0] + cv * v[0]) * h,
                (n[1] + cu * u[1] + cv * v[1]) * h,
                (n[2] + cu * u[2] + cv * v[2]) * h,
            ]);
            data.normals.push(n);
            data.tex_coords.push([(cu + 1.0) * 0.5, (cv + 1.0) * 0.5]);
        }
    }
    data.draw_ranges
        .push(DrawRange::new(Topology::Triangles, 0, data.vertices.len() as u32));
    data
}

/// Points of a circle in the x-z plane, closed by repeating the first point
fn ring(resolution: u32) -> Vec<(f32, f32)> {
    (0..=resolution)
        .map(|i| {
            let angle = 2.0 * PI * (i % resolution) as f32 / resolution as f32;
            (angle.cos(), angle.sin())
        })
        .collect()
}

/// Generate a cone along `y` with its apex at `height / 2`
///
/// # Arguments
/// * `radius` - Radius of the base
/// * `height` - Distance from base to apex
/// * `resolution` - Number of side segments (at least 3)
pub fn generate_cone(radius: f32, height: f32, resolution: u32) -> GeometryData {
    let resolution = resolution.max(3);
    let h2 = height * 0.5;
    let slant = (height * height + radius * radius).sqrt().max(f32::EPSILON);
    let cosn = height / slant;
    let sinn = radius / slant;
    let ring = ring(resolution);

    let mut vertices = Vec::with_capacity(resolution as usize * 3);
    let mut normals = Vec::with_capacity(resolution as usize * 3);
    for i in 0..resolution as usize {
        let (c0, s0) = ring[i];
        let (c1, s1) = ring[i + 1];
        vertices.push([0.0, h2, 0.0]);
        normals.push([(c0 + c1) * 0.5 * cosn, sinn, (s0 + s1) * 0.5 * cosn]);
        vertices.push([c0 * radius, -h2, s0 * radius]);
        normals.push([c0 * cosn, sinn, s0 * cosn]);
        vertices.push([c1 * radius, -h2, s1 * radius]);
        normals.push([c1 * cosn, sinn, s1 * cosn]);
    }

    let mut data = GeometryData::new();
    data.push_range(Topology::Triangles, &vertices, &normals);
    let (cap, cap_normals) = cap(&ring, radius, -h2, false);
    data.push_range(Topology::Triangles, &cap, &cap_normals);
    data
}

/// Generate a capped cylinder along `y`
pub fn generate_cylinder(radius: f32, height: f32, resolution: u32) -> GeometryData {
    let resolution = resolution.max(3);
    let h2 = height * 0.5;
    let ring = ring(resolution);

    let mut data = GeometryData::new();
    let (top, top_normals) = cap(&ring, radius, h2, true);
    data.push_range(Topology::Triangles, &top, &top_normals);

    let mut vertices = Vec::with_capacity(resolution as usize * 6);
    let mut normals = Vec::with_capacity(resolution as usize * 6);
    for i in 0..resolution as usize {
        let (c0, s0) = ring[i];
        let (c1, s1) = ring[i + 1];
        let (n0, n1) = ([c0, 0.0, s0], [c1, 0.0, s1]);
        let (top0, bot0) = ([c0 * radius, h2, s0 * radius], [c0 * radius, -h2, s0 * radius]);
        let (top1, bot1) = ([c1 * radius, h2, s1 * radius], [c1 * radius, -h2, s1 * radius]);

        vertices.extend_from_slice(&[top0, top1, bot0, bot0, top1, bot1]);
        normals.extend_from_slice(&[n0, n1, n0, n0, n1, n1]);
    }
    data.push_range(Topology::Triangles, &vertices, &normals);

    let (bottom, bottom_normals) = cap(&ring, radius, -h2, false);
    data.push_range(Topology::Triangles, &bottom, &bottom_normals);
    data
}

/// Triangulated disc at height `y`, facing up or down
fn cap(ring: &[(f32, f32)], radius: f32, y: f32, up: bool) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let mut vertices = Vec::with_capacity((ring.len() - 1) * 3);
    for pair in ring.windows(2) {
        let (c0, s0) = pair[0];
        let (c1, s1) = pair[1];
        let a = [c0 * radius, y, s0 * radius];
        let b = [c1 * radius, y, s1 * radius];
        vertices.push([0.0, y, 0.0]);
        if up {
            vertices.push(b);
            vertices.push(a);
        } else {
            vertices.push(a);
            vertices.push(b);
        }
    }
    let normals = vec![normal; vertices.len()];
    (vertices, normals)
}

/// Generate an icosphere
///
/// # Arguments
/// * `radius` - Distance of every vertex from the origin
/// * `level` - Number of subdivision passes; each one splits every face in four
/// * `colors` - Add per-vertex colours equal to the absolute unit position
pub fn generate_icosahedron(radius: f32, level: u32, colors: bool) -> GeometryData {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let mut unit: Vec<[f32; 3]> = Vec::new();
    for v in [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ] {
        unit.push(normalize(v));
    }

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    for _ in 0..level {
        let mut subdivided = Vec::with_capacity(faces.len() * 4);
        for [p0, p1, p2] in faces {
            let a = midpoint(p0, p1, &mut unit, &mut midpoints);
            let b = midpoint(p1, p2, &mut unit, &mut midpoints);
            let c = midpoint(p2, p0, &mut unit, &mut midpoints);
            subdivided.extend_from_slice(&[[p0, a, c], [p1, b, a], [p2, c, b], [a, b, c]]);
        }
        faces = subdivided;
    }

    let mut data = GeometryData::new();
    data.vertices = unit
        .iter()
        .map(|v| [v[0] * radius, v[1] * radius, v[2] * radius])
        .collect();
    data.normals = unit.clone();
    if colors {
        data.colors = unit
            .iter()
            .map(|v| [v[0].abs(), v[1].abs(), v[2].abs()])
            .collect();
    }
    data.indices = faces.into_iter().flatten().collect();
    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length <= f32::EPSILON {
        return v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Index of the unit-sphere point halfway between two vertices, cached per edge
fn midpoint(
    p1: u32,
    p2: u32,
    vertices: &mut Vec<[f32; 3]>,
    cache: &mut HashMap<(u32, u32), u32>,
) -> u32 {
    let key = (p1.min(p2), p1.max(p2));
    if let Some(index) = cache.get(&key) {
        return *index;
    }
    let a = vertices[p1 as usize];
    let b = vertices[p2 as usize];
    vertices.push(normalize([
        (a[0] + b[0]) * 0.5,
        (a[1] + b[1]) * 0.5,
        (a[2] + b[2]) * 0.5,
    ]));
    let index = vertices.len() as u32 - 1;
    cache.insert(key, index);
    index
}

/// Evenly spaced values from `start` to `end` inclusive
fn linspace(start: f32, end: f32, count: u32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..count)
            .map(|i| start + (end - start) * i as f32 / (count - 1) as f32)
            .collect(),
    }
}

/// Line strips in the `y = 0` plane
///
/// One strip per value of `xs` running along z, then one per value of `zs`
/// running along x.
fn line_lattice(xs: &[f32], zs: &[f32]) -> GeometryData {
    let mut data = GeometryData::new();
    for &x in xs {
        let first = data.vertices.len() as u32;
        data.vertices.extend(zs.iter().map(|&z| [x, 0.0, z]));
        data.draw_ranges
            .push(DrawRange::new(Topology::LineStrip, first, zs.len() as u32));
    }
    for &z in zs {
        let first = data.vertices.len() as u32;
        data.vertices.extend(xs.iter().map(|&x| [x, 0.0, z]));
        data.draw_ranges
            .push(DrawRange::new(Topology::LineStrip, first, xs.len() as u32));
    }
    data
}

/// Generate a grid of `rows` by `cols` cells centred at the origin
///
/// # Arguments
/// * `length_rows` - Extent along z
/// * `length_cols` - Extent along x
pub fn generate_grid(length_rows: f32, length_cols: f32, rows: u32, cols: u32) -> GeometryData {
    let xs = linspace(-length_cols / 2.0, length_cols / 2.0, cols + 1);
    let zs = linspace(-length_rows / 2.0, length_rows / 2.0, rows + 1);
    line_lattice(&xs, &zs)
}

/// Generate a square floor grid spanning `-length..length` with `resolution` lines per side
pub fn generate_floor(length: f32, resolution: u32) -> GeometryData {
    let steps = linspace(-length, length, resolution.max(2));
    line_lattice(&steps, &steps)
}

/// Axis colours of the viewer: red for x, blue for z
pub const AXIS_X_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
pub const AXIS_Z_COLOR: [f32; 3] = [0.0, 0.47, 0.78];

/// Generate the x and z axis lines lying on the grid plane
pub fn generate_axis(length_row: f32, length_col: f32) -> GeometryData {
    let mut data = GeometryData::new();
    data.vertices = vec![
        [-length_col / 2.0, 0.0, 0.0],
        [length_col / 2.0, 0.0, 0.0],
        [0.0, 0.0, -length_row / 2.0],
        [0.0, 0.0, length_row / 2.0],
    ];
    data.colors = vec![AXIS_X_COLOR, AXIS_X_COLOR, AXIS_Z_COLOR, AXIS_Z_COLOR];
    data.draw_ranges.push(DrawRange::new(Topology::Lines, 0, 4));
    data
}

/// Nine colours of a background gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPalette {
    pub top_left: [f32; 3],
    pub top_center: [f32; 3],
    pub top_right: [f32; 3],
    pub mid_left: [f32; 3],
    pub mid_center: [f32; 3],
    pub mid_right: [f32; 3],
    pub bot_left: [f32; 3],
    pub bot_center: [f32; 3],
    pub bot_right: [f32; 3],
}

impl BackgroundPalette {
    /// Vertical gradient, each row a single colour
    pub fn rows(top: [f32; 3], mid: [f32; 3], bottom: [f32; 3]) -> Self {
        Self {
            top_left: top,
            top_center: top,
            top_right: top,
            mid_left: mid,
            mid_center: mid,
            mid_right: mid,
            bot_left: bottom,
            bot_center: bottom,
            bot_right: bottom,
        }
    }

    /// Vertical gradient from 8-bit colours
    pub fn rows_rgb8(top: [u8; 3], mid: [u8; 3], bottom: [u8; 3]) -> Self {
        let f = |c: [u8; 3]| [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0];
        Self::rows(f(top), f(mid), f(bottom))
    }
}

impl Default for BackgroundPalette {
    fn default() -> Self {
        Self::rows_rgb8([107, 128, 140], [149, 164, 164], [191, 199, 199])
    }
}

/// Full-screen quad split into four cells, in clip space at the far plane
pub fn generate_background(palette: &BackgroundPalette) -> GeometryData {
    let quads: [([f32; 2], [f32; 2]); 4] = [
        ([-1.0, -1.0], [0.0, 0.0]),
        ([-1.0, 0.0], [0.0, 1.0]),
        ([0.0, -1.0], [1.0, 0.0]),
        ([0.0, 0.0], [1.0, 1.0]),
    ];
    let mut data = GeometryData::new();
    for (min, max) in quads {
        data.vertices.extend_from_slice(&[
            [min[0], min[1], 1.0],
            [max[0], min[1], 1.0],
            [max[0], max[1], 1.0],
            [max[0], max[1], 1.0],
            [min[0], max[1], 1.0],
            [min[0], min[1], 1.0],
        ]);
    }
    data.colors = generate_background_colors(palette);
    data.draw_ranges.push(DrawRange::new(Topology::Triangles, 0, 24));
    data
}

/// Per-vertex colours matching [`generate_background`]
#[rustfmt::skip]
pub fn generate_background_colors(palette: &BackgroundPalette) -> Vec<[f32; 3]> {
    let p = palette;
    vec![
        // bottom left cell
        p.bot_left, p.bot_center, p.mid_center,
        p.mid_center, p.mid_left, p.bot_left,
        // top left cell
        p.mid_left, p.mid_center, p.top_center,
        p.top_center, p.top_left, p.mid_left,
        // bottom right cell
        p.bot_center, p.bot_right, p.mid_right,
        p.mid_right, p.mid_center, p.bot_center,
        // top right cell
        p.mid_center, p.mid_right, p.top_right,
        p.top_right, p.top_center, p.mid_center,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn length(v: [f32; 3]) -> f32 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube(1.0);
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.normals.len(), 36);
        assert_eq!(cube.tex_coords.len(), 36);
        assert!(!cube.is_indexed());
        assert_eq!(cube.draw_ranges, vec![DrawRange::new(Topology::Triangles, 0, 36)]);
        for v in &cube.vertices {
            assert!(v.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn test_cone_generation() {
        let cone = generate_cone(0.5, 1.0, 24);
        assert_eq!(cone.draw_ranges.len(), 2);
        assert_eq!(cone.draw_ranges[0].count, 24 * 3);
        assert_eq!(cone.draw_ranges[1].first, 24 * 3);
        assert_eq!(cone.draw_ranges[1].count, 24 * 3);
        assert_eq!(cone.vertices[0], [0.0, 0.5, 0.0]);
        assert!(cone.vertices.iter().all(|v| v[1] == 0.5 || v[1] == -0.5));
        assert_eq!(cone.normals.len(), cone.vertices.len());
    }

    #[test]
    fn test_cylinder_generation() {
        let cylinder = generate_cylinder(1.0, 2.0, 8);
        let counts: Vec<u32> = cylinder.draw_ranges.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![24, 48, 24]);
        for (v, n) in cylinder.vertices.iter().zip(&cylinder.normals).skip(24).take(48) {
            assert!((length([v[0], 0.0, v[2]]) - 1.0).abs() < 1e-5);
            assert!((length(*n) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_icosahedron_generation() {
        let base = generate_icosahedron(1.0, 0, false);
        assert_eq!(base.vertex_count(), 12);
        assert_eq!(base.index_count(), 60);
        assert!(base.colors.is_empty());

        let sphere = generate_icosahedron(2.0, 2, true);
        assert_eq!(sphere.vertex_count(), 162);
        assert_eq!(sphere.index_count(), 20 * 16 * 3);
        assert_eq!(sphere.colors.len(), 162);
        for v in &sphere.vertices {
            assert!((length(*v) - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_grid_generation() {
        let grid = generate_grid(10.0, 6.0, 4, 3);
        assert_eq!(grid.draw_ranges.len(), (3 + 1) + (4 + 1));
        assert_eq!(grid.vertex_count(), 4 * 5 * 2);
        assert_eq!(grid.draw_ranges[0].count, 5);
        assert_eq!(grid.draw_ranges[4], DrawRange::new(Topology::LineStrip, 20, 4));
        assert_eq!(grid.vertices[0], [-3.0, 0.0, -5.0]);
        assert!(grid.vertices.iter().all(|v| v[1] == 0.0));
    }

    #[test]
    fn test_axis_generation() {
        let axis = generate_axis(4.0, 2.0);
        assert_eq!(axis.vertices[1], [1.0, 0.0, 0.0]);
        assert_eq!(axis.vertices[3], [0.0, 0.0, 2.0]);
        assert_eq!(axis.colors[0], AXIS_X_COLOR);
        assert_eq!(axis.colors[2], AXIS_Z_COLOR);
        assert_eq!(axis.primary_topology(), Topology::Lines);
    }

    #[test]
    fn test_background_generation() {
        let palette = BackgroundPalette::default();
        let background = generate_background(&palette);
        assert_eq!(background.vertex_count(), 24);
        assert_eq!(background.colors.len(), 24);
        assert!(background.vertices.iter().all(|v| v[2] == 1.0));
        assert_eq!(background.colors[10], palette.top_left);
    }
}
