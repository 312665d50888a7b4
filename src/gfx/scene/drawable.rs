//! Render lifecycle shared by everything a scene can draw

use cgmath::Matrix4;

use crate::gfx::gpu::{GpuContext, LightUniform, PolygonMode};

/// Rasterization style of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawStyle {
    Points,
    Wireframe,
    #[default]
    Solid,
    /// Filled geometry with its edges drawn on top
    SolidWithEdges,
}

impl DrawStyle {
    pub const ALL: [DrawStyle; 4] = [
        DrawStyle::Points,
        DrawStyle::Wireframe,
        DrawStyle::Solid,
        DrawStyle::SolidWithEdges,
    ];

    pub fn polygon_mode(&self) -> PolygonMode {
        match self {
            DrawStyle::Points => PolygonMode::Point,
            DrawStyle::Wireframe => PolygonMode::Line,
            DrawStyle::Solid | DrawStyle::SolidWithEdges => PolygonMode::Fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    Flat,
    #[default]
    Smooth,
}

impl Shading {
    pub fn toggled(&self) -> Self {
        match self {
            Shading::Flat => Shading::Smooth,
            Shading::Smooth => Shading::Flat,
        }
    }
}

/// Which of the two scene passes is being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// Geometry in the requested style, or filled under an edge overlay
    Primary,
    /// Edge overlay drawn with the wireframe material
    Edges,
}

/// Per-frame state handed to every drawable of a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub light: LightUniform,
    pub lighting: bool,
    pub shading: Shading,
}

/// Three-step draw used by the scene for every visible part
///
/// `bind_state` picks a program and uploads uniforms, `issue_draw_call`
/// emits the draws of the concrete geometry and `unbind_state` releases
/// whatever was bound. When `bind_state` returns `false` nothing was bound
/// and the other two steps are skipped.
pub trait Drawable {
    fn bind_state(
        &self,
        gpu: &mut dyn GpuContext,
        ctx: &RenderContext,
        style: DrawStyle,
        pass: RenderPass,
    ) -> bool;

    fn issue_draw_call(&self, gpu: &mut dyn GpuContext);

    fn unbind_state(&self, gpu: &mut dyn GpuContext);

    /// Runs the whole lifecycle
    fn draw(
        &self,
        gpu: &mut dyn GpuContext,
        ctx: &RenderContext,
        style: DrawStyle,
        pass: RenderPass,
    ) {
        if self.bind_state(gpu, ctx, style, pass) {
            self.issue_draw_call(gpu);
            self.unbind_state(gpu);
        }
    }
}
