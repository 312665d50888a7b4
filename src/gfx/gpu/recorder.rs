//! Headless [`GpuContext`] that records every call
//!
//! Used by the tests of the scene core, and handy for debugging the exact
//! order of state changes a frame produces.

use std::collections::HashMap;

use super::{
    BufferHandle, BufferUsage, DepthPolicy, DrawUniforms, GeometryBuffers, GpuContext,
    PolygonMode, PolygonOffset, ProgramHandle, ProgramKind, Topology, VertexLayout, Viewport,
};
use crate::error::GpuError;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateProgram(ProgramHandle, ProgramKind),
    ReleaseProgram(ProgramHandle),
    CreateBuffer(BufferHandle, BufferUsage, u64),
    WriteBuffer {
        buffer: BufferHandle,
        offset: u64,
        len: u64,
    },
    ReleaseBuffer(BufferHandle),
    BindAttributes(ProgramHandle, VertexLayout),
    SetViewport(Viewport),
    ClearDepth,
    SetPolygonMode(PolygonMode),
    SetPolygonOffset(Option<PolygonOffset>),
    SetDepthPolicy(DepthPolicy),
    BindProgram(ProgramHandle, GeometryBuffers),
    UnbindProgram,
    SetUniforms(Box<DrawUniforms>),
    DrawArrays {
        topology: Topology,
        first: u32,
        count: u32,
    },
    DrawElements {
        topology: Topology,
        count: u32,
    },
    BeginFrame {
        timed: bool,
    },
    EndFrame,
}

impl GpuCommand {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GpuCommand::DrawArrays { .. } | GpuCommand::DrawElements { .. }
        )
    }
}

/// A draw call together with the state that was current when it was issued
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub program: Option<ProgramKind>,
    pub geometry: Option<GeometryBuffers>,
    pub polygon_mode: PolygonMode,
    pub polygon_offset: Option<PolygonOffset>,
    pub depth_policy: DepthPolicy,
    pub viewport: Option<Viewport>,
    pub uniforms: Option<DrawUniforms>,
    pub command: GpuCommand,
}

/// In-memory GPU that keeps a byte shadow of every buffer
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<GpuCommand>,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    programs: HashMap<ProgramHandle, ProgramKind>,
    next_buffer: u32,
    next_program: u32,
    timed: bool,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Forgets recorded calls but keeps live buffers and programs
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Current contents of a buffer
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Reads a buffer region back as `f32` values
    pub fn buffer_floats(&self, buffer: BufferHandle, offset: u64, count: usize) -> Vec<f32> {
        let Some(data) = self.buffers.get(&buffer) else {
            return Vec::new();
        };
        let start = offset as usize;
        let end = (start + count * 4).min(data.len());
        data.get(start..end)
            .map(|bytes| {
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn program_kind(&self, program: ProgramHandle) -> Option<ProgramKind> {
        self.programs.get(&program).copied()
    }

    /// Replays the recorded calls and pairs each draw with the state it saw
    pub fn draws(&self) -> Vec<RecordedDraw> {
        let mut program = None;
        let mut geometry = None;
        let mut polygon_mode = PolygonMode::Fill;
        let mut polygon_offset = None;
        let mut depth_policy = DepthPolicy::TestAndWrite;
        let mut viewport = None;
        let mut uniforms = None;
        let mut draws = Vec::new();

        for command in &self.commands {
            match command {
                GpuCommand::BindProgram(handle, bound) => {
                    program = self.programs.get(handle).copied();
                    geometry = Some(*bound);
                }
                GpuCommand::UnbindProgram => {
                    program = None;
                    geometry = None;
                    uniforms = None;
                }
                GpuCommand::SetPolygonMode(mode) => polygon_mode = *mode,
                GpuCommand::SetPolygonOffset(offset) => polygon_offset = *offset,
                GpuCommand::SetDepthPolicy(policy) => depth_policy = *policy,
                GpuCommand::SetViewport(rect) => viewport = Some(*rect),
                GpuCommand::SetUniforms(values) => uniforms = Some(**values),
                cmd if cmd.is_draw() => draws.push(RecordedDraw {
                    program,
                    geometry,
                    polygon_mode,
                    polygon_offset,
                    depth_policy,
                    viewport,
                    uniforms,
                    command: cmd.clone(),
                }),
                _ => {}
            }
        }
        draws
    }
}

impl GpuContext for CommandRecorder {
    fn create_program(&mut self, kind: ProgramKind) -> Result<ProgramHandle, GpuError> {
        self.next_program += 1;
        let handle = ProgramHandle(self.next_program);
        self.programs.insert(handle, kind);
        self.commands.push(GpuCommand::CreateProgram(handle, kind));
        Ok(handle)
    }

    fn release_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.commands.push(GpuCommand::ReleaseProgram(program));
    }

    fn create_buffer(&mut self, usage: BufferUsage, size: u64) -> Result<BufferHandle, GpuError> {
        self.next_buffer += 1;
        let handle = BufferHandle(self.next_buffer);
        self.buffers.insert(handle, vec![0; size as usize]);
        self.commands
            .push(GpuCommand::CreateBuffer(handle, usage, size));
        Ok(handle)
    }

    fn write_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GpuError> {
        let shadow = self
            .buffers
            .get_mut(&buffer)
            .ok_or(GpuError::UnknownBuffer(buffer))?;
        let size = shadow.len() as u64;
        let len = data.len() as u64;
        if offset + len > size {
            return Err(GpuError::BufferOverflow {
                buffer,
                offset,
                len,
                size,
            });
        }
        let start = offset as usize;
        shadow[start..start + data.len()].copy_from_slice(data);
        self.commands.push(GpuCommand::WriteBuffer {
            buffer,
            offset,
            len,
        });
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.commands.push(GpuCommand::ReleaseBuffer(buffer));
    }

    fn bind_attributes(
        &mut self,
        program: ProgramHandle,
        layout: &VertexLayout,
    ) -> Result<(), GpuError> {
        if !self.programs.contains_key(&program) {
            return Err(GpuError::UnknownProgram(program));
        }
        self.commands
            .push(GpuCommand::BindAttributes(program, *layout));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(GpuCommand::SetViewport(viewport));
    }

    fn clear_depth(&mut self) {
        self.commands.push(GpuCommand::ClearDepth);
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.commands.push(GpuCommand::SetPolygonMode(mode));
    }

    fn set_polygon_offset(&mut self, offset: Option<PolygonOffset>) {
        self.commands.push(GpuCommand::SetPolygonOffset(offset));
    }

    fn set_depth_policy(&mut self, policy: DepthPolicy) {
        self.commands.push(GpuCommand::SetDepthPolicy(policy));
    }

    fn bind_program(&mut self, program: ProgramHandle, geometry: &GeometryBuffers) {
        self.commands
            .push(GpuCommand::BindProgram(program, *geometry));
    }

    fn unbind_program(&mut self) {
        self.commands.push(GpuCommand::UnbindProgram);
    }

    fn set_uniforms(&mut self, uniforms: &DrawUniforms) {
        self.commands
            .push(GpuCommand::SetUniforms(Box::new(*uniforms)));
    }

    fn draw_arrays(&mut self, topology: Topology, first: u32, count: u32) {
        self.commands.push(GpuCommand::DrawArrays {
            topology,
            first,
            count,
        });
    }

    fn draw_elements(&mut self, topology: Topology, count: u32) {
        self.commands
            .push(GpuCommand::DrawElements { topology, count });
    }

    fn begin_frame(&mut self, timed: bool) -> Result<(), GpuError> {
        self.timed = timed;
        self.commands.push(GpuCommand::BeginFrame { timed });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<Option<f64>, GpuError> {
        self.commands.push(GpuCommand::EndFrame);
        Ok(if std::mem::take(&mut self.timed) {
            Some(0.0)
        } else {
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_land_in_the_shadow_copy() {
        let mut gpu = CommandRecorder::new();
        let buffer = gpu.create_buffer(BufferUsage::Vertex, 16).unwrap();
        gpu.write_buffer(buffer, 8, bytemuck::cast_slice(&[1.5f32, 2.5]))
            .unwrap();

        assert_eq!(gpu.buffer_floats(buffer, 0, 4), vec![0.0, 0.0, 1.5, 2.5]);
    }

    #[test]
    fn out_of_range_writes_are_rejected() {
        let mut gpu = CommandRecorder::new();
        let buffer = gpu.create_buffer(BufferUsage::Vertex, 8).unwrap();
        let result = gpu.write_buffer(buffer, 4, &[0u8; 8]);
        assert!(matches!(result, Err(GpuError::BufferOverflow { .. })));

        gpu.release_buffer(buffer);
        assert_eq!(
            gpu.write_buffer(buffer, 0, &[0u8; 4]),
            Err(GpuError::UnknownBuffer(buffer))
        );
    }

    #[test]
    fn draws_capture_current_state() {
        let mut gpu = CommandRecorder::new();
        let program = gpu.create_program(ProgramKind::Phong).unwrap();
        let buffer = gpu.create_buffer(BufferUsage::Vertex, 36).unwrap();
        let geometry = GeometryBuffers {
            vertex_buffer: buffer,
            index_buffer: None,
            layout: VertexLayout {
                vertex_count: 3,
                ..Default::default()
            },
            index_count: 0,
        };

        gpu.set_polygon_mode(PolygonMode::Line);
        gpu.bind_program(program, &geometry);
        gpu.draw_multi_arrays(Topology::LineStrip, &[0, 2], &[2, 1]);

        let draws = gpu.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].program, Some(ProgramKind::Phong));
        assert_eq!(draws[1].polygon_mode, PolygonMode::Line);
        assert_eq!(
            draws[1].command,
            GpuCommand::DrawArrays {
                topology: Topology::LineStrip,
                first: 2,
                count: 1
            }
        );
    }

    #[test]
    fn timed_frames_report_a_gpu_time() {
        let mut gpu = CommandRecorder::new();
        gpu.begin_frame(true).unwrap();
        assert_eq!(gpu.end_frame().unwrap(), Some(0.0));
        gpu.begin_frame(false).unwrap();
        assert_eq!(gpu.end_frame().unwrap(), None);
    }
}
