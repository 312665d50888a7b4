// src/wgpu_utils/uniform_buffer.rs - Per-draw uniforms behind a dynamic offset
use std::marker::PhantomData;
use std::num::NonZeroU64;

/// Rounds `value` up to the next multiple of `alignment`
pub fn align_to(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

/// Uniform buffer holding one `Content` per draw, addressed by dynamic offset
///
/// Contents are staged on the CPU while a frame is recorded and uploaded in
/// one write before the frame is submitted. The buffer grows (by doubling)
/// when a frame needs more slots than it has.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        let pos = type_name.rfind(':').unwrap_or(0);
        if pos > 0 {
            &type_name[(pos + 1)..]
        } else {
            type_name
        }
    }

    fn create_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", Self::name())),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create a buffer with room for `capacity` slots
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(std::mem::size_of::<Content>() as u64, alignment);
        let capacity = capacity.max(1);

        DynamicUniformBuffer {
            buffer: Self::create_buffer(device, stride, capacity),
            content_type: PhantomData,
            stride,
            capacity,
            staging: Vec::with_capacity(stride as usize * capacity),
        }
    }

    /// Stages one slot and returns its dynamic offset
    pub fn push(&mut self, content: &Content) -> u32 {
        let offset = self.staging.len();
        self.staging.extend_from_slice(bytemuck::bytes_of(content));
        self.staging.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    /// Drops everything staged for the previous frame
    pub fn clear(&mut self) {
        self.staging.clear();
    }

    /// Writes the staged slots, reallocating first if they do not fit
    ///
    /// Returns `true` when the buffer was recreated, in which case bind
    /// groups referring to it have to be rebuilt.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let mut recreated = false;
        let needed = self.len();
        if needed > self.capacity {
            let mut capacity = self.capacity;
            while capacity < needed {
                capacity *= 2;
            }
            log::debug!(
                "Growing {} uniform buffer from {} to {} slots",
                Self::name(),
                self.capacity,
                capacity
            );
            self.buffer = Self::create_buffer(device, self.stride, capacity);
            self.capacity = capacity;
            recreated = true;
        }

        if !self.staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.staging);
        }
        recreated
    }

    /// Binding covering a single slot, to be combined with a dynamic offset
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: NonZeroU64::new(std::mem::size_of::<Content>() as u64),
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Distance between two slots in bytes
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Number of staged slots
    pub fn len(&self) -> usize {
        self.staging.len() / self.stride as usize
    }

    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_to_rounds_up_to_the_alignment() {
        assert_eq!(align_to(416, 256), 512);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(1, 4), 4);
        assert_eq!(align_to(0, 256), 0);
        assert_eq!(align_to(13, 0), 13);
    }
}
