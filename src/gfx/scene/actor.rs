//! # Actors
//!
//! An [`Actor`] is the renderable unit of a scene: one GPU vertex buffer (plus
//! an optional index buffer), a model transform, materials and the flags the
//! scene uses for selection and picking.
//!
//! Geometry is uploaded once by [`Actor::create`]. All attributes share a
//! single buffer, laid out one after another:
//!
//! ```text
//! | positions | normals? | colors? | texcoords? |
//! ```
//!
//! Later changes go through [`Actor::update_buffer`], which writes in place
//! at the offsets computed during creation.

use std::rc::Rc;

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use super::drawable::{DrawStyle, Drawable, RenderContext, RenderPass, Shading};
use crate::error::GpuError;
use crate::gfx::geometry::{
    generate_axis, generate_background, generate_cone, generate_cube, generate_cylinder,
    generate_floor, generate_grid, generate_icosahedron, BackgroundPalette, DrawRange,
    GeometryData,
};
use crate::gfx::gpu::{
    BufferUsage, DepthPolicy, DrawUniforms, GeometryBuffers, GpuContext, ProgramKind, Topology,
    VertexLayout,
};
use crate::gfx::material::Material;
use crate::gfx::picking::{OrientedBox, Ray};
use crate::gfx::shader_library::{ShaderLibrary, ShaderSet};

/// Emission added to highlighted or enabled actors
const HIGHLIGHT_EMISSION: f32 = 0.25;
/// Brightness factor of unselected actors
const UNSELECTED_FACTOR: f32 = 0.65;

/// Depth test and write policy category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderType {
    /// Depth test and depth write
    #[default]
    Solid,
    /// Depth test only
    Transparent,
    /// No depth test
    Overlay,
}

impl RenderType {
    pub fn depth_policy(&self) -> DepthPolicy {
        match self {
            RenderType::Solid => DepthPolicy::TestAndWrite,
            RenderType::Transparent => DepthPolicy::TestOnly,
            RenderType::Overlay => DepthPolicy::Disabled,
        }
    }
}

/// How the scene schedules an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderRole {
    /// Drawn in the requested style, with an edge pass when asked for
    #[default]
    Normal,
    /// Full-screen backdrop, always a single solid pass
    Background,
    /// Grid lines, always a single solid pass
    GridFloor,
}

/// Built-in shapes and their parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Cube {
        size: f32,
    },
    Cone {
        radius: f32,
        height: f32,
        resolution: u32,
    },
    Cylinder {
        radius: f32,
        height: f32,
        resolution: u32,
    },
    Icosahedron {
        radius: f32,
        level: u32,
        colors: bool,
    },
    Grid {
        length_rows: f32,
        length_cols: f32,
        rows: u32,
        cols: u32,
    },
    Floor {
        length: f32,
        resolution: u32,
    },
    Axis {
        length_row: f32,
        length_col: f32,
    },
    Background(BackgroundPalette),
    /// Caller-supplied geometry
    Mesh(GeometryData),
}

impl Shape {
    pub fn geometry(&self) -> GeometryData {
        match self {
            Shape::Cube { size } => generate_cube(*size),
            Shape::Cone {
                radius,
                height,
                resolution,
            } => generate_cone(*radius, *height, *resolution),
            Shape::Cylinder {
                radius,
                height,
                resolution,
            } => generate_cylinder(*radius, *height, *resolution),
            Shape::Icosahedron {
                radius,
                level,
                colors,
            } => generate_icosahedron(*radius, *level, *colors),
            Shape::Grid {
                length_rows,
                length_cols,
                rows,
                cols,
            } => generate_grid(*length_rows, *length_cols, *rows, *cols),
            Shape::Floor { length, resolution } => generate_floor(*length, *resolution),
            Shape::Axis {
                length_row,
                length_col,
            } => generate_axis(*length_row, *length_col),
            Shape::Background(palette) => generate_background(palette),
            Shape::Mesh(data) => data.clone(),
        }
    }

    fn shaders(&self) -> ShaderSet {
        match self {
            Shape::Grid { .. } | Shape::Floor { .. } => ShaderSet::GRID,
            Shape::Axis { .. } => ShaderSet::AXIS,
            Shape::Background(_) => ShaderSet::BACKGROUND,
            Shape::Icosahedron { colors: true, .. } => ShaderSet {
                nolight_solid: ProgramKind::AttributeColor,
                ..ShaderSet::LIT
            },
            _ => ShaderSet::LIT,
        }
    }

    fn render_type(&self) -> RenderType {
        match self {
            Shape::Axis { .. } | Shape::Background(_) => RenderType::Overlay,
            _ => RenderType::Solid,
        }
    }

    fn role(&self) -> RenderRole {
        match self {
            Shape::Background(_) => RenderRole::Background,
            Shape::Grid { .. } | Shape::Floor { .. } => RenderRole::GridFloor,
            _ => RenderRole::Normal,
        }
    }

    fn material(&self) -> Material {
        match self {
            Shape::Grid { .. } | Shape::Floor { .. } => Material::default().with_diffuse(0.5, 0.5, 0.5),
            _ => Material::default(),
        }
    }

    fn selectable(&self) -> bool {
        matches!(self, Shape::Cube { .. } | Shape::Mesh(_))
    }
}

/// Optional replacements for [`Actor::update`]; omitted fields reset to defaults
#[derive(Debug, Clone, Default)]
pub struct ActorUpdate {
    pub transform: Option<Matrix4<f32>>,
    pub mode: Option<Topology>,
    pub render_type: Option<RenderType>,
    pub material: Option<Material>,
    pub wireframe: Option<Material>,
}

impl ActorUpdate {
    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_mode(mut self, mode: Topology) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_render_type(mut self, render_type: RenderType) -> Self {
        self.render_type = Some(render_type);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_wireframe(mut self, wireframe: Material) -> Self {
        self.wireframe = Some(wireframe);
        self
    }
}

/// Byte offsets of the optional attributes, kept for in-place updates
#[derive(Debug, Clone, Copy, Default)]
struct AttributeOffsets {
    normals: Option<u64>,
    colors: Option<u64>,
    texcoords: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Actor {
    name: String,
    shape: Shape,
    transform: Matrix4<f32>,
    mode: Topology,
    render_type: RenderType,
    role: RenderRole,
    material: Material,
    wireframe: Material,
    error_material: Material,
    warning_material: Material,
    shaders: ShaderSet,
    library: Rc<ShaderLibrary>,

    visible: bool,
    enabled: bool,
    pickable: bool,
    selectable: bool,
    selected: bool,
    highlighted: bool,
    error_highlight: bool,
    warning_highlight: bool,
    pick_factor: f32,

    geometry: Option<GeometryBuffers>,
    offsets: AttributeOffsets,
    draw_ranges: Vec<DrawRange>,
}

impl Actor {
    /// Describes an actor; nothing touches the GPU until [`Actor::build`] or [`Actor::create`]
    pub fn new(name: impl Into<String>, library: &Rc<ShaderLibrary>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            mode: Topology::Triangles,
            render_type: shape.render_type(),
            role: shape.role(),
            material: shape.material(),
            wireframe: default_wireframe(),
            error_material: Material::ruby(),
            warning_material: Material::gold(),
            shaders: shape.shaders(),
            library: Rc::clone(library),
            visible: true,
            enabled: false,
            pickable: true,
            selectable: shape.selectable(),
            selected: false,
            highlighted: false,
            error_highlight: false,
            warning_highlight: false,
            pick_factor: 1.0,
            geometry: None,
            offsets: AttributeOffsets::default(),
            draw_ranges: Vec::new(),
            shape,
        }
    }

    /// Builder pattern: Set the model transform
    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }

    /// Builder pattern: Set the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Builder pattern: Set the material of the edge pass
    pub fn with_wireframe_material(mut self, material: Material) -> Self {
        self.wireframe = material;
        self
    }

    pub fn with_render_type(mut self, render_type: RenderType) -> Self {
        self.render_type = render_type;
        self
    }

    pub fn with_role(mut self, role: RenderRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_shaders(mut self, shaders: ShaderSet) -> Self {
        self.shaders = shaders;
        self
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn with_pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    /// Builder pattern: Scale the pick volume, values above 1 make thin shapes easier to hit
    pub fn with_pick_factor(mut self, pick_factor: f32) -> Self {
        self.pick_factor = pick_factor;
        self
    }

    /// Uploads the geometry of the actor's shape
    pub fn build(mut self, gpu: &mut dyn GpuContext) -> Result<Self, GpuError> {
        let data = self.shape.geometry();
        self.create(gpu, &data)?;
        Ok(self)
    }

    /// Uploads `data` into a new vertex buffer (and index buffer when indexed)
    ///
    /// Attribute layouts are registered with every program the actor may
    /// switch to, so changing draw style never requires a re-bind.
    pub fn create(&mut self, gpu: &mut dyn GpuContext, data: &GeometryData) -> Result<(), GpuError> {
        if self.geometry.is_some() {
            log::warn!("Actor '{}' already has geometry, use update_buffer", self.name);
            return Ok(());
        }

        let vertices: &[u8] = bytemuck::cast_slice(&data.vertices);
        let normals: &[u8] = bytemuck::cast_slice(&data.normals);
        let colors: &[u8] = bytemuck::cast_slice(&data.colors);
        let texcoords: &[u8] = bytemuck::cast_slice(&data.tex_coords);

        let mut offset = vertices.len() as u64;
        let mut place = |bytes: &[u8]| {
            if bytes.is_empty() {
                return None;
            }
            let at = offset;
            offset += bytes.len() as u64;
            Some(at)
        };
        let offsets = AttributeOffsets {
            normals: place(normals),
            colors: place(colors),
            texcoords: place(texcoords),
        };
        let total = offset;

        let vertex_buffer = gpu.create_buffer(BufferUsage::Vertex, total)?;
        gpu.write_buffer(vertex_buffer, 0, vertices)?;
        for (at, bytes) in [
            (offsets.normals, normals),
            (offsets.colors, colors),
            (offsets.texcoords, texcoords),
        ] {
            if let Some(at) = at {
                gpu.write_buffer(vertex_buffer, at, bytes)?;
            }
        }

        let index_buffer = if data.is_indexed() {
            let indices: &[u8] = bytemuck::cast_slice(&data.indices);
            let buffer = gpu.create_buffer(BufferUsage::Index, indices.len() as u64)?;
            gpu.write_buffer(buffer, 0, indices)?;
            Some(buffer)
        } else {
            None
        };

        let layout = VertexLayout {
            vertex_count: data.vertex_count() as u32,
            normals: offsets.normals,
            colors: offsets.colors,
            texcoords: offsets.texcoords,
        };
        for kind in self.shaders.distinct() {
            gpu.bind_attributes(self.library.program(kind), &layout)?;
        }

        self.draw_ranges = if data.draw_ranges.is_empty() && !data.is_indexed() {
            vec![DrawRange::new(Topology::Triangles, 0, layout.vertex_count)]
        } else {
            data.draw_ranges.clone()
        };
        self.mode = data.primary_topology();
        self.offsets = offsets;
        self.geometry = Some(GeometryBuffers {
            vertex_buffer,
            index_buffer,
            layout,
            index_count: data.index_count() as u32,
        });
        Ok(())
    }

    /// Overwrites the attributes present in `data` at their original offsets
    ///
    /// Attributes the actor was created without are skipped with a warning.
    pub fn update_buffer(
        &mut self,
        gpu: &mut dyn GpuContext,
        data: &GeometryData,
    ) -> Result<(), GpuError> {
        let Some(geometry) = self.geometry else {
            log::warn!("Actor '{}' has no geometry to update", self.name);
            return Ok(());
        };
        let buffer = geometry.vertex_buffer;

        if !data.vertices.is_empty() {
            gpu.write_buffer(buffer, 0, bytemuck::cast_slice(&data.vertices))?;
        }
        let updates: [(&str, Option<u64>, &[u8]); 3] = [
            ("normals", self.offsets.normals, bytemuck::cast_slice(&data.normals)),
            ("colors", self.offsets.colors, bytemuck::cast_slice(&data.colors)),
            ("texcoords", self.offsets.texcoords, bytemuck::cast_slice(&data.tex_coords)),
        ];
        for (label, at, bytes) in updates {
            if bytes.is_empty() {
                continue;
            }
            match at {
                Some(at) => gpu.write_buffer(buffer, at, bytes)?,
                None => log::warn!("Actor '{}' was created without {}", self.name, label),
            }
        }
        Ok(())
    }

    /// Replaces transform, mode, render type and materials
    pub fn update(&mut self, update: ActorUpdate) {
        self.transform = update.transform.unwrap_or_else(Matrix4::identity);
        self.mode = update.mode.unwrap_or(Topology::Triangles);
        self.render_type = update.render_type.unwrap_or_default();
        self.material = update.material.unwrap_or_default();
        self.wireframe = update.wireframe.unwrap_or_else(default_wireframe);
    }

    /// Releases the GPU buffers
    pub fn destroy(&mut self, gpu: &mut dyn GpuContext) {
        if let Some(geometry) = self.geometry.take() {
            gpu.release_buffer(geometry.vertex_buffer);
            if let Some(index_buffer) = geometry.index_buffer {
                gpu.release_buffer(index_buffer);
            }
            log::debug!("Released geometry of actor '{}'", self.name);
        }
    }

    /// Uniform values for a draw with `material`
    pub fn uniforms(&self, ctx: &RenderContext, material: &Material) -> DrawUniforms {
        let mut active = *material;
        if self.highlighted || self.enabled {
            active.emission = Vector3::new(HIGHLIGHT_EMISSION, HIGHLIGHT_EMISSION, HIGHLIGHT_EMISSION);
        }
        if self.error_highlight {
            active = active.with_surface_of(&self.error_material);
        }
        if self.warning_highlight {
            active = active.with_surface_of(&self.warning_material);
        }

        DrawUniforms {
            model: self.transform,
            view: ctx.view,
            projection: ctx.projection,
            normal: normal_matrix(&self.transform),
            material: active,
            selected: if self.selectable && self.selected {
                1.0
            } else {
                UNSELECTED_FACTOR
            },
            light: ctx.light,
        }
    }

    /// Slab test against the box spanned by the transform, scaled by the pick factor
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        OrientedBox::from_transform(&self.transform, self.pick_factor).intersect(ray)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
    }

    /// Translation part of the transform
    pub fn position(&self) -> Vector3<f32> {
        self.transform.w.truncate()
    }

    /// Replaces the transform with a pure translation
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform = Matrix4::from_translation(position);
    }

    pub fn mode(&self) -> Topology {
        self.mode
    }

    pub fn render_type(&self) -> RenderType {
        self.render_type
    }

    pub fn role(&self) -> RenderRole {
        self.role
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn wireframe_material(&self) -> &Material {
        &self.wireframe
    }

    pub fn set_error_material(&mut self, material: Material) {
        self.error_material = material;
    }

    pub fn set_warning_material(&mut self, material: Material) {
        self.warning_material = material;
    }

    pub fn shaders(&self) -> &ShaderSet {
        &self.shaders
    }

    pub fn geometry(&self) -> Option<&GeometryBuffers> {
        self.geometry.as_ref()
    }

    pub fn draw_ranges(&self) -> &[DrawRange] {
        &self.draw_ranges
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_pickable(&self) -> bool {
        self.pickable
    }

    pub fn set_pickable(&mut self, pickable: bool) {
        self.pickable = pickable;
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn set_error_highlight(&mut self, value: bool) {
        self.error_highlight = value;
    }

    pub fn set_warning_highlight(&mut self, value: bool) {
        self.warning_highlight = value;
    }

    pub fn pick_factor(&self) -> f32 {
        self.pick_factor
    }

    pub fn set_pick_factor(&mut self, pick_factor: f32) {
        self.pick_factor = pick_factor;
    }
}

impl Drawable for Actor {
    fn bind_state(
        &self,
        gpu: &mut dyn GpuContext,
        ctx: &RenderContext,
        style: DrawStyle,
        pass: RenderPass,
    ) -> bool {
        let Some(geometry) = self.geometry.as_ref() else {
            return false;
        };

        let wireframe = style == DrawStyle::Wireframe;
        let kind = self
            .shaders
            .select(ctx.lighting, wireframe, ctx.shading == Shading::Flat);
        let material = if wireframe && pass == RenderPass::Edges {
            &self.wireframe
        } else {
            &self.material
        };

        gpu.set_polygon_mode(style.polygon_mode());
        gpu.set_depth_policy(self.render_type.depth_policy());
        gpu.bind_program(self.library.program(kind), geometry);
        gpu.set_uniforms(&self.uniforms(ctx, material));
        true
    }

    fn issue_draw_call(&self, gpu: &mut dyn GpuContext) {
        let Some(geometry) = self.geometry.as_ref() else {
            return;
        };
        if geometry.index_buffer.is_some() {
            gpu.draw_elements(self.mode, geometry.index_count);
            return;
        }
        let firsts: Vec<u32> = self.draw_ranges.iter().map(|r| r.first).collect();
        let counts: Vec<u32> = self.draw_ranges.iter().map(|r| r.count).collect();
        gpu.draw_multi_arrays(self.mode, &firsts, &counts);
    }

    fn unbind_state(&self, gpu: &mut dyn GpuContext) {
        gpu.unbind_program();
    }
}

fn default_wireframe() -> Material {
    Material::grey(0.25)
}

/// Inverse transpose of the upper 3x3 block, identity when singular
fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
    let linear = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    linear
        .invert()
        .map(|inverse| Matrix4::from(inverse.transpose()))
        .unwrap_or_else(Matrix4::identity)
}
