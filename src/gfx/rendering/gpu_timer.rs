//! GPU frame timing with timestamp queries
//!
//! The first render pass of a frame writes a timestamp when it begins and the
//! last one when it ends. After submission the two values are copied into a
//! mappable buffer and read back with a blocking poll, so measuring stalls
//! the CPU until the GPU has finished the frame.

use crate::error::GpuError;

const TIMESTAMP_BYTES: u64 = 2 * std::mem::size_of::<u64>() as u64;

/// Converts a pair of raw timestamps into milliseconds
pub fn ticks_to_ms(start: u64, end: u64, period_ns: f32) -> f64 {
    end.saturating_sub(start) as f64 * period_ns as f64 / 1_000_000.0
}

pub struct GpuTimer {
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    readback_buffer: wgpu::Buffer,
    period_ns: f32,
}

impl GpuTimer {
    /// Creates the timer when the device was created with `TIMESTAMP_QUERY`
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Option<Self> {
        if !device.features().contains(wgpu::Features::TIMESTAMP_QUERY) {
            log::warn!("Timestamp queries are not supported, GPU times will not be reported");
            return None;
        }

        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("Frame Timer"),
            ty: wgpu::QueryType::Timestamp,
            count: 2,
        });
        let resolve_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Timer Resolve"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Timer Readback"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Some(Self {
            query_set,
            resolve_buffer,
            readback_buffer,
            period_ns: queue.get_timestamp_period(),
        })
    }

    /// Timestamp writes for the pass at `index` of `count` passes
    pub fn pass_writes(&self, index: usize, count: usize) -> Option<wgpu::RenderPassTimestampWrites> {
        let first = index == 0;
        let last = index + 1 == count;
        if !first && !last {
            return None;
        }
        Some(wgpu::RenderPassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: first.then_some(0),
            end_of_pass_write_index: last.then_some(1),
        })
    }

    /// Copies the timestamps into the readback buffer; record after the last pass
    pub fn resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.resolve_query_set(&self.query_set, 0..2, &self.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(
            &self.resolve_buffer,
            0,
            &self.readback_buffer,
            0,
            TIMESTAMP_BYTES,
        );
    }

    /// Waits for the submitted frame and returns its GPU time in milliseconds
    pub fn read_ms(&self, device: &wgpu::Device) -> Result<f64, GpuError> {
        let slice = self.readback_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| GpuError::TimerQuery(e.to_string()))?;

        receiver
            .recv()
            .map_err(|e| GpuError::TimerQuery(e.to_string()))?
            .map_err(|e| GpuError::TimerQuery(e.to_string()))?;

        let ms = {
            let data = slice.get_mapped_range();
            let mut timestamps = data
                .chunks_exact(8)
                .map(|chunk| chunk.try_into().map(u64::from_le_bytes).unwrap_or(0));
            let start = timestamps.next().unwrap_or(0);
            let end = timestamps.next().unwrap_or(0);
            ticks_to_ms(start, end, self.period_ns)
        };
        self.readback_buffer.unmap();
        Ok(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_scale_by_the_period() {
        assert_eq!(ticks_to_ms(1_000, 3_001_000, 1.0), 3.0);
        assert_eq!(ticks_to_ms(0, 500_000, 2.0), 1.0);
    }

    #[test]
    fn reversed_timestamps_read_as_zero() {
        assert_eq!(ticks_to_ms(10, 5, 1.0), 0.0);
    }
}
