//! Render target management for wgpu
//!
//! Creates the window-sized depth buffer and the optional multisampled colour
//! target that is resolved into the surface texture.

/// GPU texture together with its default view
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the viewer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Sample count used when antialiasing is enabled
    pub const MSAA_SAMPLES: u32 = 4;

    fn create(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        sample_count: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    /// Creates a depth buffer matching the surface size and sample count
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `width` - Surface width in pixels
    /// * `height` - Surface height in pixels
    /// * `sample_count` - 1, or the MSAA sample count of the colour target
    pub fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        Self::create(
            device,
            "depth_texture",
            width,
            height,
            sample_count,
            Self::DEPTH_FORMAT,
        )
    }

    /// Multisampled colour target resolved into the surface every pass
    pub fn create_msaa_target(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        Self::create(device, "msaa_target", width, height, sample_count, format)
    }
}

/// Largest supported sample count not above `requested`, falling back to 1
pub fn supported_sample_count(
    flags: wgpu::TextureFormatFeatureFlags,
    requested: u32,
) -> u32 {
    [16, 8, 4, 2]
        .into_iter()
        .filter(|&count| count <= requested)
        .find(|&count| flags.sample_count_supported(count))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_falls_back_when_unsupported() {
        let four = wgpu::TextureFormatFeatureFlags::MULTISAMPLE_X4;
        assert_eq!(supported_sample_count(four, 4), 4);
        assert_eq!(supported_sample_count(four, 1), 1);

        let two = wgpu::TextureFormatFeatureFlags::MULTISAMPLE_X2;
        assert_eq!(supported_sample_count(two, 4), 2);
        assert_eq!(
            supported_sample_count(wgpu::TextureFormatFeatureFlags::empty(), 4),
            1
        );
    }
}
