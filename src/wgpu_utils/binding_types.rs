// src/wgpu_utils/binding_types.rs
//! WGPU binding type utilities

use std::num::NonZeroU64;

/// Uniform buffer binding, optionally addressed through a dynamic offset
pub fn uniform(has_dynamic_offset: bool, min_binding_size: u64) -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset,
        min_binding_size: NonZeroU64::new(min_binding_size),
    }
}

/// Layout with a single uniform at binding 0
pub fn single_uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    ty: wgpu::BindingType,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty,
            count: None,
        }],
    })
}
