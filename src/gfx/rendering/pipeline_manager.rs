//! Render pipeline management for wgpu
//!
//! The fixed-function state of the [`GpuContext`](crate::gfx::gpu::GpuContext)
//! (topology, polygon mode, depth policy, polygon offset) is baked into wgpu
//! pipelines. Pipelines are created lazily, the first time a draw needs a
//! given combination, and cached for the lifetime of the manager.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::gpu::{
    DepthPolicy, PolygonMode as ViewerPolygonMode, PolygonOffset, ProgramKind,
    Topology as ViewerTopology, VertexLayout,
};
use crate::gfx::resources::TextureResource;

/// Depth bias in a hashable form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BiasKey {
    pub constant: i32,
    slope_scale_bits: u32,
}

impl BiasKey {
    pub fn from_offset(offset: PolygonOffset) -> Self {
        Self {
            constant: offset.units.round() as i32,
            slope_scale_bits: offset.factor.to_bits(),
        }
    }

    pub fn slope_scale(&self) -> f32 {
        f32::from_bits(self.slope_scale_bits)
    }
}

/// Everything that selects a distinct pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: ProgramKind,
    pub topology: ViewerTopology,
    pub polygon_mode: ViewerPolygonMode,
    pub depth_policy: DepthPolicy,
    pub bias: Option<BiasKey>,
    /// [`VertexLayout::attribute_mask`] of the bound geometry
    pub attribute_mask: u8,
}

impl PipelineKey {
    pub fn new(
        program: ProgramKind,
        topology: ViewerTopology,
        polygon_mode: ViewerPolygonMode,
        depth_policy: DepthPolicy,
        offset: Option<PolygonOffset>,
        attribute_mask: u8,
    ) -> Self {
        // polygon mode and depth bias only apply to filled primitives
        let filled = topology.is_triangles();
        Self {
            program,
            topology,
            polygon_mode: if filled {
                polygon_mode
            } else {
                ViewerPolygonMode::Fill
            },
            depth_policy,
            bias: offset.filter(|_| filled).map(BiasKey::from_offset),
            attribute_mask,
        }
    }
}

/// Shader entry points of a program kind
pub fn entry_points(program: ProgramKind) -> (&'static str, &'static str) {
    match program {
        ProgramKind::Phong => ("vs_main", "fs_phong"),
        ProgramKind::PhongFlat => ("vs_main", "fs_phong_flat"),
        ProgramKind::UniformMaterial => ("vs_main", "fs_uniform"),
        ProgramKind::WireframeMaterial => ("vs_main", "fs_wireframe"),
        ProgramKind::AttributeColor => ("vs_main", "fs_attribute_color"),
        ProgramKind::Background => ("vs_screen", "fs_attribute_color"),
    }
}

pub fn primitive_topology(topology: ViewerTopology) -> (PrimitiveTopology, Option<IndexFormat>) {
    match topology {
        ViewerTopology::Points => (PrimitiveTopology::PointList, None),
        ViewerTopology::Lines => (PrimitiveTopology::LineList, None),
        ViewerTopology::LineStrip => (PrimitiveTopology::LineStrip, Some(IndexFormat::Uint32)),
        ViewerTopology::Triangles => (PrimitiveTopology::TriangleList, None),
        ViewerTopology::TriangleStrip => {
            (PrimitiveTopology::TriangleStrip, Some(IndexFormat::Uint32))
        }
    }
}

/// Depth state for a policy; `bias` must already be dropped for lines and points
pub fn depth_stencil_state(policy: DepthPolicy, bias: Option<BiasKey>) -> DepthStencilState {
    let (depth_write_enabled, depth_compare) = match policy {
        DepthPolicy::TestAndWrite => (true, CompareFunction::LessEqual),
        DepthPolicy::TestOnly => (false, CompareFunction::LessEqual),
        DepthPolicy::Disabled => (false, CompareFunction::Always),
    };
    let bias = bias.map_or_else(DepthBiasState::default, |bias| DepthBiasState {
        constant: bias.constant,
        slope_scale: bias.slope_scale(),
        clamp: 0.0,
    });

    DepthStencilState {
        format: TextureResource::DEPTH_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: StencilState::default(),
        bias,
    }
}

const POSITION_ATTRIBUTES: [VertexAttribute; 1] = vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [VertexAttribute; 1] = vertex_attr_array![1 => Float32x3];
const COLOR_ATTRIBUTES: [VertexAttribute; 1] = vertex_attr_array![2 => Float32x3];
const TEXCOORD_ATTRIBUTES: [VertexAttribute; 1] = vertex_attr_array![3 => Float32x2];

/// One vertex buffer slot per attribute, in shader location order
///
/// Attributes missing from `attribute_mask` are read from a shared zero
/// buffer with instance stepping, so every vertex sees the same zero value.
pub fn vertex_buffer_layouts(attribute_mask: u8) -> [VertexBufferLayout<'static>; 4] {
    let step = |bit: u8| {
        if attribute_mask & bit != 0 {
            VertexStepMode::Vertex
        } else {
            VertexStepMode::Instance
        }
    };

    [
        VertexBufferLayout {
            array_stride: 12,
            step_mode: VertexStepMode::Vertex,
            attributes: &POSITION_ATTRIBUTES,
        },
        VertexBufferLayout {
            array_stride: 12,
            step_mode: step(VertexLayout::NORMALS),
            attributes: &NORMAL_ATTRIBUTES,
        },
        VertexBufferLayout {
            array_stride: 12,
            step_mode: step(VertexLayout::COLORS),
            attributes: &COLOR_ATTRIBUTES,
        },
        VertexBufferLayout {
            array_stride: 8,
            step_mode: step(VertexLayout::TEXCOORDS),
            attributes: &TEXCOORD_ATTRIBUTES,
        },
    ]
}

/// Pipeline statistics for debugging and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub created: usize,
    pub sample_count: u32,
}

/// Creates and caches one pipeline per [`PipelineKey`]
pub struct PipelineManager {
    device: Arc<Device>,
    shader: ShaderModule,
    layout: PipelineLayout,
    color_format: TextureFormat,
    sample_count: u32,
    features: Features,
    pipelines: HashMap<PipelineKey, RenderPipeline>,
    warned_polygon_mode: bool,
}

impl PipelineManager {
    /// Creates a pipeline manager
    ///
    /// # Arguments
    /// * `device` - Shared wgpu device for creating resources
    /// * `bind_group_layout` - Layout of the per-draw uniform bind group
    /// * `color_format` - Format of the colour target
    /// * `sample_count` - MSAA sample count of colour and depth targets
    pub fn new(
        device: Arc<Device>,
        bind_group_layout: &BindGroupLayout,
        color_format: TextureFormat,
        sample_count: u32,
    ) -> Self {
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("viewer"),
            source: ShaderSource::Wgsl(include_str!("../shaders/viewer.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Viewer Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });
        let features = device.features();

        Self {
            device,
            shader,
            layout,
            color_format,
            sample_count,
            features,
            pipelines: HashMap::new(),
            warned_polygon_mode: false,
        }
    }

    /// Replaces polygon modes the device cannot rasterize with fill
    pub fn resolve(&mut self, mut key: PipelineKey) -> PipelineKey {
        let required = match key.polygon_mode {
            ViewerPolygonMode::Fill => None,
            ViewerPolygonMode::Line => Some(Features::POLYGON_MODE_LINE),
            ViewerPolygonMode::Point => Some(Features::POLYGON_MODE_POINT),
        };
        if let Some(feature) = required {
            if !self.features.contains(feature) {
                if !self.warned_polygon_mode {
                    log::warn!("{:?} is not supported, drawing filled polygons instead", feature);
                    self.warned_polygon_mode = true;
                }
                key.polygon_mode = ViewerPolygonMode::Fill;
            }
        }
        key
    }

    /// Gets or creates the pipeline for a resolved key
    pub fn get_pipeline(&mut self, key: PipelineKey) -> &RenderPipeline {
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.create_pipeline(&key);
            log::debug!("Created pipeline {:?}", key);
            self.pipelines.insert(key, pipeline);
        }
        &self.pipelines[&key]
    }

    /// Cached pipeline for a key created earlier in the frame
    pub fn cached(&self, key: &PipelineKey) -> Option<&RenderPipeline> {
        self.pipelines.get(key)
    }

    fn create_pipeline(&self, key: &PipelineKey) -> RenderPipeline {
        let (vertex_entry, fragment_entry) = entry_points(key.program);
        let (topology, strip_index_format) = primitive_topology(key.topology);
        let polygon_mode = match key.polygon_mode {
            ViewerPolygonMode::Fill => PolygonMode::Fill,
            ViewerPolygonMode::Line => PolygonMode::Line,
            ViewerPolygonMode::Point => PolygonMode::Point,
        };
        let buffers = vertex_buffer_layouts(key.attribute_mask);
        let label = format!("{} {:?}", key.program.label(), key.topology);

        self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&self.layout),
            vertex: VertexState {
                module: &self.shader,
                entry_point: Some(vertex_entry),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &buffers,
            },
            fragment: Some(FragmentState {
                module: &self.shader,
                entry_point: Some(fragment_entry),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: self.color_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology,
                strip_index_format,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode,
                conservative: false,
            },
            depth_stencil: Some(depth_stencil_state(key.depth_policy, key.bias)),
            multisample: MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    /// Drops every pipeline, e.g. after the sample count changed
    pub fn clear(&mut self) {
        self.pipelines.clear();
    }

    pub fn set_sample_count(&mut self, sample_count: u32) {
        if sample_count != self.sample_count {
            self.sample_count = sample_count;
            self.clear();
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            created: self.pipelines.len(),
            sample_count: self.sample_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::EDGE_POLYGON_OFFSET;

    #[test]
    fn lines_and_points_ignore_polygon_state() {
        let key = PipelineKey::new(
            ProgramKind::UniformMaterial,
            ViewerTopology::Lines,
            ViewerPolygonMode::Line,
            DepthPolicy::TestAndWrite,
            Some(EDGE_POLYGON_OFFSET),
            0,
        );
        assert_eq!(key.polygon_mode, ViewerPolygonMode::Fill);
        assert_eq!(key.bias, None);

        let key = PipelineKey::new(
            ProgramKind::Phong,
            ViewerTopology::Triangles,
            ViewerPolygonMode::Line,
            DepthPolicy::TestAndWrite,
            Some(EDGE_POLYGON_OFFSET),
            VertexLayout::NORMALS,
        );
        assert_eq!(key.polygon_mode, ViewerPolygonMode::Line);
        let bias = key.bias.unwrap();
        assert_eq!(bias.constant, 4);
        assert_eq!(bias.slope_scale(), 1.0);
    }

    #[test]
    fn depth_policies_map_to_write_and_compare() {
        let state = depth_stencil_state(DepthPolicy::TestAndWrite, None);
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, CompareFunction::LessEqual);
        assert_eq!(state.bias.constant, 0);

        let state = depth_stencil_state(DepthPolicy::TestOnly, None);
        assert!(!state.depth_write_enabled);

        let state = depth_stencil_state(DepthPolicy::Disabled, None);
        assert_eq!(state.depth_compare, CompareFunction::Always);
    }

    #[test]
    fn missing_attributes_step_per_instance() {
        let layouts = vertex_buffer_layouts(VertexLayout::COLORS);
        let steps: Vec<_> = layouts.iter().map(|l| l.step_mode).collect();
        assert_eq!(
            steps,
            [
                VertexStepMode::Vertex,
                VertexStepMode::Instance,
                VertexStepMode::Vertex,
                VertexStepMode::Instance,
            ]
        );
        let locations: Vec<_> = layouts
            .iter()
            .map(|l| l.attributes[0].shader_location)
            .collect();
        assert_eq!(locations, [0, 1, 2, 3]);
    }

    #[test]
    fn strips_carry_an_index_format() {
        assert_eq!(
            primitive_topology(ViewerTopology::TriangleStrip),
            (PrimitiveTopology::TriangleStrip, Some(IndexFormat::Uint32))
        );
        assert_eq!(primitive_topology(ViewerTopology::Lines).1, None);
        assert_eq!(entry_points(ProgramKind::Background).0, "vs_screen");
    }
}
