//! [`FrameBackend`] over a single wgpu command encoder.

use crate::compression::{FrameBackend, ImageDesc};
use crate::error::CodecError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::GpuImage;
use crate::postprocess::resample::ResamplePasses;

/// One frame's command stream. Every pass the pipeline records lands in the
/// same encoder, and [`WgpuFrame::submit`] sends it as one command buffer,
/// so later passes observe earlier ones.
///
/// `'a` borrows the context and resample passes, which must outlive the
/// [`CompressionPass`](crate::compression::CompressionPass) built over this
/// backend; the encoder itself is per frame.
pub struct WgpuFrame<'a> {
    context: &'a RenderContext,
    passes: &'a ResamplePasses,
    encoder: wgpu::CommandEncoder,
}

impl<'a> WgpuFrame<'a> {
    /// Start recording a frame.
    #[must_use]
    pub fn new(context: &'a RenderContext, passes: &'a ResamplePasses) -> Self {
        let encoder = context.create_encoder("Compression Encoder");
        Self {
            context,
            passes,
            encoder,
        }
    }

    /// Record into an encoder the host already started, e.g. right after
    /// its own scene passes. Take it back with [`WgpuFrame::into_encoder`].
    #[must_use]
    pub fn with_encoder(
        context: &'a RenderContext,
        passes: &'a ResamplePasses,
        encoder: wgpu::CommandEncoder,
    ) -> Self {
        Self {
            context,
            passes,
            encoder,
        }
    }

    /// The device/queue this frame records for.
    #[must_use]
    pub fn context(&self) -> &'a RenderContext {
        self.context
    }

    /// The encoder passes are recorded into.
    pub fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        &mut self.encoder
    }

    /// Hand the encoder back without submitting.
    #[must_use]
    pub fn into_encoder(self) -> wgpu::CommandEncoder {
        self.encoder
    }

    /// Finish and submit everything recorded this frame.
    pub fn submit(self) {
        self.context.submit(self.encoder);
    }
}

impl FrameBackend for WgpuFrame<'_> {
    type Image = GpuImage;

    fn create_image(
        &mut self,
        desc: &ImageDesc,
    ) -> Result<GpuImage, CodecError> {
        GpuImage::new(&self.context.device, desc)
    }

    fn render_motion(&mut self, source: &GpuImage, target: &GpuImage) {
        self.passes.render_motion(
            &self.context.device,
            &mut self.encoder,
            source,
            target,
        );
    }

    fn copy_bypass(&mut self, source: &GpuImage, target: &GpuImage) {
        self.passes.copy_bypass(
            &self.context.device,
            &mut self.encoder,
            source,
            target,
        );
    }
}
