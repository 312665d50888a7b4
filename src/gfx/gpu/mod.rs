//! # GPU Resource Layer
//!
//! The scene core never talks to a graphics API directly. Everything it needs
//! from the GPU goes through the [`GpuContext`] trait: program creation,
//! vertex/index buffer upload, fixed-function state and draw calls.
//!
//! Two implementations exist:
//!
//! - [`RenderEngine`](crate::gfx::rendering::RenderEngine) records the calls of
//!   a frame and replays them through wgpu render passes.
//! - [`CommandRecorder`] keeps the calls in memory so scene behaviour can be
//!   inspected without a device.
//!
//! ## Usage
//!
//! ```rust
//! use viewer3d::gfx::gpu::{BufferUsage, CommandRecorder, GpuContext};
//!
//! let mut gpu = CommandRecorder::new();
//! let buffer = gpu.create_buffer(BufferUsage::Vertex, 36).unwrap();
//! gpu.write_buffer(buffer, 0, &[0u8; 36]).unwrap();
//! ```

pub mod recorder;

pub use recorder::{CommandRecorder, GpuCommand};

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use crate::error::GpuError;
use crate::gfx::material::Material;

/// Opaque reference to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// Opaque reference to a compiled shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Shader families the viewer knows how to draw with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Smooth Phong lighting with a uniform material
    Phong,
    /// Phong lighting with per-face normals
    PhongFlat,
    /// Unlit, material diffuse colour
    UniformMaterial,
    /// Unlit edges in the material diffuse colour plus emission
    WireframeMaterial,
    /// Unlit, per-vertex colour
    AttributeColor,
    /// Per-vertex colour with positions already in clip space
    Background,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 6] = [
        ProgramKind::Phong,
        ProgramKind::PhongFlat,
        ProgramKind::UniformMaterial,
        ProgramKind::WireframeMaterial,
        ProgramKind::AttributeColor,
        ProgramKind::Background,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProgramKind::Phong => "phong",
            ProgramKind::PhongFlat => "phong_flat",
            ProgramKind::UniformMaterial => "uniform_material",
            ProgramKind::WireframeMaterial => "wireframe_material",
            ProgramKind::AttributeColor => "attribute_color",
            ProgramKind::Background => "background",
        }
    }
}

/// What a buffer will be bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

/// Primitive topology of a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl Topology {
    pub fn is_triangles(&self) -> bool {
        matches!(self, Topology::Triangles | Topology::TriangleStrip)
    }
}

/// Rasterization mode for filled primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

/// Depth test and depth write policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthPolicy {
    /// Depth test and depth write
    TestAndWrite,
    /// Depth test only
    TestOnly,
    /// Neither test nor write
    Disabled,
}

/// Depth offset applied to filled polygons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonOffset {
    pub factor: f32,
    pub units: f32,
}

/// Pixel rectangle with a bottom-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width over height, 1.0 for an empty rectangle
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Where each vertex attribute lives inside a vertex buffer
///
/// Positions always start at offset zero. The other attributes are optional
/// and stored one after another, never interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexLayout {
    pub vertex_count: u32,
    pub normals: Option<u64>,
    pub colors: Option<u64>,
    pub texcoords: Option<u64>,
}

impl VertexLayout {
    pub const NORMALS: u8 = 0b001;
    pub const COLORS: u8 = 0b010;
    pub const TEXCOORDS: u8 = 0b100;

    /// Bit mask of the attributes present besides positions
    pub fn attribute_mask(&self) -> u8 {
        let mut mask = 0;
        if self.normals.is_some() {
            mask |= Self::NORMALS;
        }
        if self.colors.is_some() {
            mask |= Self::COLORS;
        }
        if self.texcoords.is_some() {
            mask |= Self::TEXCOORDS;
        }
        mask
    }
}

/// GPU-side geometry of a single actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBuffers {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: Option<BufferHandle>,
    pub layout: VertexLayout,
    pub index_count: u32,
}

/// Light terms in eye space, ready for upload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightUniform {
    /// `w == 0` for a directional light
    pub position: Vector4<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Vector3<f32>,
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            position: Vector4::new(0.0, 0.0, 1.0, 0.0),
            ambient: Vector3::new(0.2, 0.2, 0.2),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(0.0, 0.0, 0.0),
            attenuation: Vector3::new(1.0, 0.02, 0.002),
        }
    }
}

/// Everything a shader program reads for a single draw
///
/// The projection uses OpenGL clip conventions (z in -1..1). Backends
/// convert to their own clip space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub normal: Matrix4<f32>,
    pub material: Material,
    pub selected: f32,
    pub light: LightUniform,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        Self {
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            normal: Matrix4::identity(),
            material: Material::default(),
            selected: 1.0,
            light: LightUniform::default(),
        }
    }
}

/// Capability the scene core needs from a graphics backend
///
/// Calls are issued in order on a single thread. Between `begin_frame` and
/// `end_frame` the state set by `set_*` applies to every following draw.
pub trait GpuContext {
    /// Compiles a shader program
    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramHandle, GpuError>;

    fn release_program(&mut self, program: ProgramHandle);

    /// Allocates an uninitialised buffer of `size` bytes
    fn create_buffer(&mut self, usage: BufferUsage, size: u64) -> Result<BufferHandle, GpuError>;

    /// Writes `data` at `offset` bytes into `buffer`
    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8])
        -> Result<(), GpuError>;

    fn release_buffer(&mut self, buffer: BufferHandle);

    /// Associates a vertex layout with a program so the pairing can be drawn later
    fn bind_attributes(
        &mut self,
        program: ProgramHandle,
        layout: &VertexLayout,
    ) -> Result<(), GpuError>;

    fn set_viewport(&mut self, viewport: Viewport);

    /// Clears the depth buffer and starts a new layer of drawing
    fn clear_depth(&mut self);

    fn set_polygon_mode(&mut self, mode: PolygonMode);

    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>);

    fn set_depth_policy(&mut self, policy: DepthPolicy);

    fn bind_program(&mut self, program: ProgramHandle, geometry: &GeometryBuffers);

    fn unbind_program(&mut self);

    fn set_uniforms(&mut self, uniforms: &DrawUniforms);

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32);

    fn draw_elements(&mut self, topology: Topology, count: u32);

    /// Issues one non-indexed draw per `(first, count)` pair
    fn draw_multi_arrays(&mut self, topology: Topology, firsts: &[u32], counts: &[u32]) {
        for (first, count) in firsts.iter().zip(counts) {
            self.draw_arrays(topology, *first, *count);
        }
    }

    /// Starts a frame; `timed` requests a GPU elapsed-time measurement
    fn begin_frame(&mut self, timed: bool) -> Result<(), GpuError>;

    /// Submits the frame and returns the GPU time in milliseconds when one was requested
    fn end_frame(&mut self) -> Result<Option<f64>, GpuError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_mask_tracks_optional_attributes() {
        let mut layout = VertexLayout {
            vertex_count: 3,
            ..Default::default()
        };
        assert_eq!(layout.attribute_mask(), 0);

        layout.normals = Some(36);
        layout.texcoords = Some(72);
        assert_eq!(
            layout.attribute_mask(),
            VertexLayout::NORMALS | VertexLayout::TEXCOORDS
        );
    }

    #[test]
    fn viewport_aspect_guards_zero_height() {
        assert_eq!(Viewport::new(0, 0, 800, 0).aspect_ratio(), 1.0);
        assert_eq!(Viewport::new(0, 0, 800, 400).aspect_ratio(), 2.0);
    }
}
