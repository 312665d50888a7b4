//! Crate-level error types.
//!
//! GPU failures are collected in [`GpuError`]; everything the viewer can
//! report to an application is wrapped by [`ViewerError`].

use thiserror::Error;

use crate::gfx::gpu::{BufferHandle, ProgramHandle};

/// Failures raised by a [`GpuContext`](crate::gfx::gpu::GpuContext) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GpuError {
    #[error("no suitable GPU adapter found: {0}")]
    AdapterUnavailable(String),
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(String),
    #[error("surface error: {0}")]
    Surface(String),
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferHandle),
    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramHandle),
    #[error("write of {len} bytes at offset {offset} overflows buffer {buffer:?} of {size} bytes")]
    BufferOverflow {
        buffer: BufferHandle,
        offset: u64,
        len: u64,
        size: u64,
    },
    #[error("timer query failed: {0}")]
    TimerQuery(String),
}

/// Errors produced by the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("event loop error: {0}")]
    EventLoop(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        Self::EventLoop(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_message_names_the_buffer() {
        let err = GpuError::BufferOverflow {
            buffer: BufferHandle(3),
            offset: 16,
            len: 32,
            size: 24,
        };
        let text = err.to_string();
        assert!(text.contains("BufferHandle(3)"));
        assert!(text.contains("32 bytes"));
    }

    #[test]
    fn gpu_errors_convert_into_viewer_errors() {
        let err: ViewerError = GpuError::Surface("lost".into()).into();
        assert!(matches!(err, ViewerError::Gpu(GpuError::Surface(_))));
        assert_eq!(err.to_string(), "GPU error: surface error: lost");
    }
}
