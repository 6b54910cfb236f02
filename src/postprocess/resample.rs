//! Fullscreen resampling passes: motion refresh and the bypass copy that
//! writes each frame's output back into the history.
//!
//! Both draw one triangle into the target, sampling the source with the
//! source image's sampler, so the history can sit at a lower resolution
//! than the render target.

use crate::error::CodecError;
use crate::gpu::{
    pipeline_helpers::{
        create_screen_space_pipeline, filtering_sampler, texture_2d,
    },
    render_context::RenderContext,
    shader_composer::ShaderComposer,
    texture::{GpuImage, COLOR_FORMAT, MOTION_FORMAT},
};

/// Motion-refresh and bypass-copy pipelines sharing one bind group layout.
pub struct ResamplePasses {
    bind_group_layout: wgpu::BindGroupLayout,
    motion_pipeline: wgpu::RenderPipeline,
    bypass_pipeline: wgpu::RenderPipeline,
}

impl ResamplePasses {
    /// Build both pipelines.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Shader`] if either shader fails to compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, CodecError> {
        let bind_group_layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Resample Bind Group Layout"),
                entries: &[
                    // binding 0: source texture
                    texture_2d(0, wgpu::ShaderStages::FRAGMENT),
                    // binding 1: source sampler
                    filtering_sampler(1, wgpu::ShaderStages::FRAGMENT),
                ],
            },
        );

        let motion_shader = shader_composer.compose(
            &context.device,
            "Motion Refresh Shader",
            include_str!("../../assets/shaders/screen/motion.wgsl"),
            "motion.wgsl",
        )?;
        let bypass_shader = shader_composer.compose(
            &context.device,
            "Bypass Shader",
            include_str!("../../assets/shaders/screen/bypass.wgsl"),
            "bypass.wgsl",
        )?;

        let motion_pipeline = create_screen_space_pipeline(
            &context.device,
            "Motion Refresh",
            &motion_shader,
            MOTION_FORMAT,
            &[&bind_group_layout],
        );
        let bypass_pipeline = create_screen_space_pipeline(
            &context.device,
            "Bypass",
            &bypass_shader,
            COLOR_FORMAT,
            &[&bind_group_layout],
        );

        Ok(Self {
            bind_group_layout,
            motion_pipeline,
            bypass_pipeline,
        })
    }

    /// Record the motion refresh: `source` motion vectors into the motion
    /// field `target`.
    pub fn render_motion(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &GpuImage,
        target: &GpuImage,
    ) {
        self.draw(
            device,
            encoder,
            "Motion Refresh Pass",
            &self.motion_pipeline,
            source,
            target,
        );
    }

    /// Record the bypass copy of `source` into `target`.
    pub fn copy_bypass(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &GpuImage,
        target: &GpuImage,
    ) {
        self.draw(
            device,
            encoder,
            "Bypass Pass",
            &self.bypass_pipeline,
            source,
            target,
        );
    }

    fn draw(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        pipeline: &wgpu::RenderPipeline,
        source: &GpuImage,
        target: &GpuImage,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&source.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
