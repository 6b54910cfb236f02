//! Texture + view + sampler bundle used for every image the pipeline
//! touches.

use crate::compression::{
    Extent, FilterMode, FrameImage, ImageDesc, ImageFormat,
};
use crate::error::CodecError;
use crate::gpu::pipeline_helpers::sampler_for;

/// Format of previous-frame history images and of kernel destinations.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Format of motion-field history images.
pub const MOTION_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba16Float;

/// A 2D texture, its default view, and the sampler used to read it.
pub struct GpuImage {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Sampler matching the image's filter mode.
    pub sampler: wgpu::Sampler,
}

impl GpuImage {
    /// Allocate a history image.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Allocation`] if the extent exceeds the device's
    /// 2D texture limit.
    pub fn new(
        device: &wgpu::Device,
        desc: &ImageDesc,
    ) -> Result<Self, CodecError> {
        let max = device.limits().max_texture_dimension_2d;
        if desc.extent.width > max || desc.extent.height > max {
            return Err(CodecError::Allocation(format!(
                "{} at {} exceeds the {max}px texture limit",
                desc.label, desc.extent
            )));
        }

        let format = match desc.format {
            ImageFormat::Color => COLOR_FORMAT,
            ImageFormat::Motion => MOTION_FORMAT,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.extent.width,
                height: desc.extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Ok(Self::from_texture(device, texture, desc.filter))
    }

    /// Wrap a host-owned texture (source, destination, motion vectors).
    ///
    /// Kernel destinations need `STORAGE_BINDING | TEXTURE_BINDING` usage
    /// and [`COLOR_FORMAT`]; everything read must be filterable.
    #[must_use]
    pub fn from_texture(
        device: &wgpu::Device,
        texture: wgpu::Texture,
        filter: FilterMode,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = sampler_for(device, filter);
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Allocate a destination texture the kernel can write and the bypass
    /// pass can read.
    #[must_use]
    pub fn destination(
        device: &wgpu::Device,
        extent: Extent,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: extent.width,
                height: extent.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        Self::from_texture(device, texture, FilterMode::Bilinear)
    }
}

impl FrameImage for GpuImage {
    fn extent(&self) -> Extent {
        let size = self.texture.size();
        Extent::new(size.width, size.height)
    }
}
