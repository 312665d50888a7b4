//! WGPU backend of the viewer
//!
//! [`RenderEngine`] implements [`GpuContext`] on top of wgpu. The scene core
//! issues immediate-mode style calls (set state, bind, draw); the engine
//! records them as draw calls with baked pipeline keys and replays the frame
//! through render passes when it ends.
//!
//! Every `clear_depth` starts a new render pass: depth is cleared, colour is
//! cleared by the first pass of a frame and loaded by the following ones. This
//! is how the gnomon is drawn on top of the world without sharing its depth.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::TextureFormat;

use crate::config::ViewerOptions;
use crate::error::GpuError;
use crate::gfx::gpu::{
    BufferHandle, BufferUsage, DepthPolicy, DrawUniforms, GeometryBuffers, GpuContext,
    PolygonMode, PolygonOffset, ProgramHandle, ProgramKind, Topology, VertexLayout, Viewport,
};
use crate::gfx::resources::{supported_sample_count, TextureResource};
use crate::wgpu_utils::{self, align_to, DynamicUniformBuffer};

use super::gpu_timer::GpuTimer;
use super::pipeline_manager::{PipelineKey, PipelineManager};
use super::uniforms::ShaderUniforms;

/// Uniform slots allocated up front, grown on demand
const INITIAL_UNIFORM_SLOTS: usize = 256;

/// Converts a bottom-left viewport into a top-left one clipped to the target
///
/// Returns `[x, y, width, height]`, or `None` when nothing of it is visible.
pub fn to_wgpu_viewport(viewport: Viewport, target_width: u32, target_height: u32) -> Option<[f32; 4]> {
    let width = viewport.width as i64;
    let height = viewport.height as i64;
    let top = target_height as i64 - (viewport.y as i64 + height);

    let x0 = (viewport.x as i64).max(0);
    let y0 = top.max(0);
    let x1 = (viewport.x as i64 + width).min(target_width as i64);
    let y1 = (top + height).min(target_height as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some([x0 as f32, y0 as f32, (x1 - x0) as f32, (y1 - y0) as f32])
}

/// Present mode for the vsync setting among the modes the surface offers
pub fn choose_present_mode(vsync: bool, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| available.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    /// Requested size, the allocation may be padded
    size: u64,
}

#[derive(Debug, Clone, Copy)]
enum DrawKind {
    Arrays { first: u32, count: u32 },
    Elements { count: u32 },
}

#[derive(Debug, Clone, Copy)]
struct DrawCall {
    key: PipelineKey,
    geometry: GeometryBuffers,
    uniform_offset: u32,
    viewport: Viewport,
    kind: DrawKind,
}

/// State set through the `set_*` calls, applied to every following draw
#[derive(Debug, Clone, Copy)]
struct DrawState {
    viewport: Option<Viewport>,
    polygon_mode: PolygonMode,
    polygon_offset: Option<PolygonOffset>,
    depth_policy: DepthPolicy,
    program: Option<(ProgramKind, GeometryBuffers)>,
    uniform_offset: Option<u32>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            viewport: None,
            polygon_mode: PolygonMode::Fill,
            polygon_offset: None,
            depth_policy: DepthPolicy::TestAndWrite,
            program: None,
            uniform_offset: None,
        }
    }
}

struct Frame {
    timed: bool,
    passes: Vec<Vec<DrawCall>>,
}

/// wgpu device, surface and the resources behind every handle
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    format_flags: wgpu::TextureFormatFeatureFlags,
    present_modes: Vec<wgpu::PresentMode>,
    sample_count: u32,
    depth_texture: TextureResource,
    msaa_target: Option<TextureResource>,
    pipeline_manager: PipelineManager,
    uniform_layout: wgpu::BindGroupLayout,
    uniforms: DynamicUniformBuffer<ShaderUniforms>,
    uniform_bind_group: wgpu::BindGroup,
    zero_buffer: wgpu::Buffer,
    timer: Option<GpuTimer>,
    clear_color: wgpu::Color,

    buffers: HashMap<BufferHandle, GpuBuffer>,
    programs: HashMap<ProgramHandle, ProgramKind>,
    next_buffer: u32,
    next_program: u32,
    state: DrawState,
    frame: Option<Frame>,
}

impl RenderEngine {
    /// Creates a render engine for the given window
    ///
    /// Picks an adapter compatible with the window surface and requests the
    /// optional features the viewer can use (line/point polygon modes and
    /// timestamp queries) when the adapter has them.
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `options` - Antialiasing, vsync, profiling and clear colour
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: &ViewerOptions,
    ) -> Result<RenderEngine, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| GpuError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GpuError::AdapterUnavailable(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let mut wanted = wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT;
        if options.profiling {
            wanted |= wgpu::Features::TIMESTAMP_QUERY;
        }
        let required_features = adapter.features() & wanted;
        for missing in (wanted - required_features).iter() {
            log::warn!("Adapter does not support {:?}", missing);
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| GpuError::DeviceRequest(e.to_string()))?;
        log::info!("Device ready with features {:?}", device.features());

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| GpuError::Surface("surface reports no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let present_modes = surface_capabilities.present_modes.clone();

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: choose_present_mode(options.vsync, &present_modes),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let format_flags = adapter.get_texture_format_features(format).flags;
        let sample_count = if options.antialiasing {
            supported_sample_count(format_flags, TextureResource::MSAA_SAMPLES)
        } else {
            1
        };

        let device: Arc<wgpu::Device> = device.into();
        let queue: Arc<wgpu::Queue> = queue.into();

        let uniform_layout = wgpu_utils::single_uniform_layout(
            &device,
            "Draw Uniforms Layout",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            wgpu_utils::uniform(true, std::mem::size_of::<ShaderUniforms>() as u64),
        );
        let uniforms = DynamicUniformBuffer::new(&device, INITIAL_UNIFORM_SLOTS);
        let uniform_bind_group = Self::create_uniform_bind_group(&device, &uniform_layout, &uniforms);

        let zero_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Zero Attributes"),
            size: 16,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        let pipeline_manager =
            PipelineManager::new(device.clone(), &uniform_layout, format, sample_count);
        let timer = if options.profiling {
            GpuTimer::new(&device, &queue)
        } else {
            None
        };

        let (depth_texture, msaa_target) =
            Self::create_targets(&device, format, config.width, config.height, sample_count);

        let [r, g, b] = options.clear_color;
        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            format,
            format_flags,
            present_modes,
            sample_count,
            depth_texture,
            msaa_target,
            pipeline_manager,
            uniform_layout,
            uniforms,
            uniform_bind_group,
            zero_buffer,
            timer,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            buffers: HashMap::new(),
            programs: HashMap::new(),
            next_buffer: 0,
            next_program: 0,
            state: DrawState::default(),
            frame: None,
        })
    }

    fn create_uniform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DynamicUniformBuffer<ShaderUniforms>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding_resource(),
            }],
        })
    }

    fn create_targets(
        device: &wgpu::Device,
        format: TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> (TextureResource, Option<TextureResource>) {
        let depth = TextureResource::create_depth_texture(device, width, height, sample_count);
        let msaa = (sample_count > 1).then(|| {
            TextureResource::create_msaa_target(device, format, width, height, sample_count)
        });
        (depth, msaa)
    }

    /// Resizes the surface and recreates the depth and MSAA targets
    ///
    /// A zero dimension (minimized window) is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        let (depth, msaa) =
            Self::create_targets(&self.device, self.format, width, height, self.sample_count);
        self.depth_texture = depth;
        self.msaa_target = msaa;
    }

    /// Set VSync (vertical synchronization) state
    ///
    /// # Arguments
    /// * `enable` - Whether to enable VSync
    pub fn set_vsync(&mut self, enable: bool) {
        self.config.present_mode = choose_present_mode(enable, &self.present_modes);
        self.surface.configure(&self.device, &self.config);
    }

    /// Switches 4x multisampling on or off, rebuilding targets and pipelines
    pub fn set_antialiasing(&mut self, enable: bool) {
        let sample_count = if enable {
            supported_sample_count(self.format_flags, TextureResource::MSAA_SAMPLES)
        } else {
            1
        };
        if sample_count == self.sample_count {
            return;
        }
        log::info!("Multisampling x{}", sample_count);
        self.sample_count = sample_count;
        self.pipeline_manager.set_sample_count(sample_count);
        let (depth, msaa) = Self::create_targets(
            &self.device,
            self.format,
            self.config.width,
            self.config.height,
            sample_count,
        );
        self.depth_texture = depth;
        self.msaa_target = msaa;
    }

    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64) {
        self.clear_color = wgpu::Color { r, g, b, a: 1.0 };
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Whether GPU times can be measured on this device
    pub fn supports_timing(&self) -> bool {
        self.timer.is_some()
    }

    fn record_draw(&mut self, topology: Topology, kind: DrawKind) {
        let Some(frame) = self.frame.as_mut() else {
            log::warn!("Draw outside of a frame ignored");
            return;
        };
        let Some((program, geometry)) = self.state.program else {
            log::warn!("Draw without a bound program ignored");
            return;
        };
        let Some(uniform_offset) = self.state.uniform_offset else {
            log::warn!("Draw without uniforms ignored");
            return;
        };
        let Some(viewport) = self.state.viewport else {
            log::warn!("Draw without a viewport ignored");
            return;
        };

        let released = !self.buffers.contains_key(&geometry.vertex_buffer)
            || matches!(kind, DrawKind::Elements { .. })
                && !geometry
                    .index_buffer
                    .is_some_and(|index| self.buffers.contains_key(&index));
        if released {
            log::warn!("Draw references a released buffer: {:?}", geometry);
            return;
        }

        let key = PipelineKey::new(
            program,
            topology,
            self.state.polygon_mode,
            self.state.depth_policy,
            self.state.polygon_offset,
            geometry.layout.attribute_mask(),
        );
        let key = self.pipeline_manager.resolve(key);
        self.pipeline_manager.get_pipeline(key);

        if frame.passes.is_empty() {
            frame.passes.push(Vec::new());
        }
        if let Some(pass) = frame.passes.last_mut() {
            pass.push(DrawCall {
                key,
                geometry,
                uniform_offset,
                viewport,
                kind,
            });
        }
    }

    fn encode_draw(&self, pass: &mut wgpu::RenderPass<'_>, draw: &DrawCall) {
        let layout = draw.geometry.layout;
        if layout.vertex_count == 0 {
            return;
        }
        let Some(pipeline) = self.pipeline_manager.cached(&draw.key) else {
            return;
        };
        let Some(vertex) = self.buffers.get(&draw.geometry.vertex_buffer) else {
            return;
        };
        let Some([x, y, w, h]) =
            to_wgpu_viewport(draw.viewport, self.config.width, self.config.height)
        else {
            return;
        };

        pass.set_viewport(x, y, w, h, 0.0, 1.0);
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[draw.uniform_offset]);

        let count = layout.vertex_count as u64;
        pass.set_vertex_buffer(0, vertex.buffer.slice(0..count * 12));
        for (slot, offset, size) in [
            (1, layout.normals, 12),
            (2, layout.colors, 12),
            (3, layout.texcoords, 8),
        ] {
            match offset {
                Some(at) => pass.set_vertex_buffer(slot, vertex.buffer.slice(at..at + count * size)),
                None => pass.set_vertex_buffer(slot, self.zero_buffer.slice(..)),
            }
        }

        match draw.kind {
            DrawKind::Arrays { first, count } => pass.draw(first..first + count, 0..1),
            DrawKind::Elements { count } => {
                let index = draw
                    .geometry
                    .index_buffer
                    .and_then(|handle| self.buffers.get(&handle));
                if let Some(index) = index {
                    pass.set_index_buffer(index.buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..count, 0, 0..1);
                }
            }
        }
    }
}

impl GpuContext for RenderEngine {
    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramHandle, GpuError> {
        let handle = ProgramHandle(self.next_program);
        self.next_program += 1;
        self.programs.insert(handle, kind);
        Ok(handle)
    }

    fn release_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
    }

    fn create_buffer(&mut self, usage: BufferUsage, size: u64) -> Result<BufferHandle, GpuError> {
        let usage_flags = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        };
        let handle = BufferHandle(self.next_buffer);
        self.next_buffer += 1;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{:?} buffer {}", usage, handle.0)),
            size: align_to(size.max(4), wgpu::COPY_BUFFER_ALIGNMENT),
            usage: usage_flags | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.buffers.insert(handle, GpuBuffer { buffer, size });
        Ok(handle)
    }

    fn write_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GpuError> {
        let target = self
            .buffers
            .get(&buffer)
            .ok_or(GpuError::UnknownBuffer(buffer))?;
        let len = data.len() as u64;
        if offset + len > target.size {
            return Err(GpuError::BufferOverflow {
                buffer,
                offset,
                len,
                size: target.size,
            });
        }
        if data.is_empty() {
            return Ok(());
        }
        if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            log::warn!("Unaligned write at offset {} into {:?} skipped", offset, buffer);
            return Ok(());
        }

        if len % wgpu::COPY_BUFFER_ALIGNMENT == 0 {
            self.queue.write_buffer(&target.buffer, offset, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(align_to(len, wgpu::COPY_BUFFER_ALIGNMENT) as usize, 0);
            self.queue.write_buffer(&target.buffer, offset, &padded);
        }
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        if let Some(released) = self.buffers.remove(&buffer) {
            released.buffer.destroy();
        }
    }

    fn bind_attributes(
        &mut self,
        program: ProgramHandle,
        layout: &VertexLayout,
    ) -> Result<(), GpuError> {
        let kind = self
            .programs
            .get(&program)
            .ok_or(GpuError::UnknownProgram(program))?;
        log::trace!(
            "{} reads attribute mask {:03b}",
            kind.label(),
            layout.attribute_mask()
        );
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = Some(viewport);
    }

    fn clear_depth(&mut self) {
        if let Some(frame) = self.frame.as_mut() {
            frame.passes.push(Vec::new());
        }
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.state.polygon_mode = mode;
    }

    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>) {
        self.state.polygon_offset = offset;
    }

    fn set_depth_policy(&mut self, policy: DepthPolicy) {
        self.state.depth_policy = policy;
    }

    fn bind_program(&mut self, program: ProgramHandle, geometry: &GeometryBuffers) {
        match self.programs.get(&program) {
            Some(kind) => self.state.program = Some((*kind, *geometry)),
            None => {
                log::warn!("Binding unknown program {:?}", program);
                self.state.program = None;
            }
        }
    }

    fn unbind_program(&mut self) {
        self.state.program = None;
        self.state.uniform_offset = None;
    }

    fn set_uniforms(&mut self, uniforms: &DrawUniforms) {
        if self.frame.is_none() {
            log::warn!("Uniforms outside of a frame ignored");
            return;
        }
        let offset = self.uniforms.push(&ShaderUniforms::from_draw(uniforms));
        self.state.uniform_offset = Some(offset);
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        if count > 0 {
            self.record_draw(topology, DrawKind::Arrays { first, count });
        }
    }

    fn draw_elements(&mut self, topology: Topology, count: u32) {
        if count > 0 {
            self.record_draw(topology, DrawKind::Elements { count });
        }
    }

    fn begin_frame(&mut self, timed: bool) -> Result<(), GpuError> {
        if self.frame.is_some() {
            log::warn!("Frame started twice, dropping the unfinished one");
        }
        self.uniforms.clear();
        self.state.program = None;
        self.state.uniform_offset = None;
        self.frame = Some(Frame {
            timed: timed && self.timer.is_some(),
            passes: Vec::new(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<Option<f64>, GpuError> {
        let Some(frame) = self.frame.take() else {
            return Ok(None);
        };

        if self.uniforms.upload(&self.device, &self.queue) {
            self.uniform_bind_group =
                Self::create_uniform_bind_group(&self.device, &self.uniform_layout, &self.uniforms);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface texture timed out, skipping frame");
                return Ok(None);
            }
            Err(e) => return Err(GpuError::Surface(e.to_string())),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Encoder"),
            });

        let mut passes = frame.passes;
        if passes.is_empty() {
            passes.push(Vec::new());
        }
        let timer = self.timer.as_ref().filter(|_| frame.timed);
        let pass_count = passes.len();

        let (color_view, resolve_target) = match &self.msaa_target {
            Some(target) => (&target.view, Some(&surface_view)),
            None => (&surface_view, None),
        };

        for (index, draws) in passes.iter().enumerate() {
            let load = if index == 0 {
                wgpu::LoadOp::Clear(self.clear_color)
            } else {
                wgpu::LoadOp::Load
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewer Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: timer.and_then(|t| t.pass_writes(index, pass_count)),
            });

            for draw in draws {
                self.encode_draw(&mut render_pass, draw);
            }
        }

        if let Some(timer) = timer {
            timer.resolve(&mut encoder);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        match timer {
            Some(timer) => timer.read_ms(&self.device).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_origin_moves_to_the_top() {
        // gnomon in the bottom-right corner of an 800x600 window
        let viewport = Viewport::new(730, 0, 70, 70);
        assert_eq!(to_wgpu_viewport(viewport, 800, 600), Some([730.0, 530.0, 70.0, 70.0]));

        let full = Viewport::new(0, 0, 800, 600);
        assert_eq!(to_wgpu_viewport(full, 800, 600), Some([0.0, 0.0, 800.0, 600.0]));
    }

    #[test]
    fn viewport_is_clipped_to_the_target() {
        let viewport = Viewport::new(-10, -10, 50, 50);
        assert_eq!(to_wgpu_viewport(viewport, 100, 100), Some([0.0, 60.0, 40.0, 40.0]));

        assert_eq!(to_wgpu_viewport(Viewport::new(200, 0, 10, 10), 100, 100), None);
        assert_eq!(to_wgpu_viewport(Viewport::new(0, 0, 0, 10), 100, 100), None);
    }

    #[test]
    fn present_mode_prefers_immediate_without_vsync() {
        use wgpu::PresentMode::*;
        assert_eq!(choose_present_mode(true, &[Immediate, Fifo]), Fifo);
        assert_eq!(choose_present_mode(false, &[Fifo, Immediate]), Immediate);
        assert_eq!(choose_present_mode(false, &[Fifo, Mailbox]), Mailbox);
        assert_eq!(choose_present_mode(false, &[Fifo]), Fifo);
    }
}
