//! Compute-shader compression kernel.
//!
//! Any WGSL module with a `cs_main` compute entry point and this binding
//! layout can be bound:
//!
//! | binding | name | type |
//! |---|---|---|
//! | 0 | `Input` | `texture_2d<f32>` |
//! | 1 | `Result` | `texture_storage_2d<rgba8unorm, write>` |
//! | 2 | `Last` | `texture_2d<f32>` |
//! | 3 | `Motion` | `texture_2d<f32>` |
//! | 4 | history sampler | `sampler` |
//! | 5 | parameters | `uniform` [`KernelUniform`] |
//!
//! [`KernelUniform`]: crate::compression::KernelUniform

use wgpu::util::DeviceExt;

use crate::compression::{
    CompressionKernel, DispatchParameters, GroupCount, GroupSize,
    KernelBindings,
};
use crate::error::CodecError;
use crate::gpu::{
    frame::WgpuFrame,
    pipeline_helpers::{
        filtering_sampler, storage_texture_2d, texture_2d, uniform_buffer,
    },
    render_context::RenderContext,
    shader_composer::{
        compose_error, create_module, workgroup_size, ShaderComposer,
    },
    texture::{GpuImage, COLOR_FORMAT},
};

/// Fixed compute entry point every kernel must export.
pub const ENTRY_POINT: &str = "cs_main";

/// A compiled kernel and the workgroup size it declares.
pub struct WgpuKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    group_size: GroupSize,
}

impl WgpuKernel {
    /// Compile the bundled reference kernel.
    ///
    /// # Errors
    ///
    /// See [`WgpuKernel::from_wgsl`].
    pub fn reference(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, CodecError> {
        Self::from_wgsl(
            context,
            shader_composer,
            include_str!("../../assets/shaders/compute/compression.wgsl"),
            "compression.wgsl",
        )
    }

    /// Compile a kernel from WGSL source.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Shader`] if the source fails to compose,
    /// [`CodecError::MissingEntryPoint`] without a `cs_main` compute entry
    /// point, and [`CodecError::InvalidWorkgroupSize`] if its declared size
    /// has a zero dimension.
    pub fn from_wgsl(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        source: &str,
        file_path: &str,
    ) -> Result<Self, CodecError> {
        let module = shader_composer
            .compose_naga(source, file_path)
            .map_err(|e| compose_error(file_path, &e))?;
        let group_size =
            GroupSize::from_array(workgroup_size(&module, ENTRY_POINT)?);
        let shader =
            create_module(&context.device, "Compression Kernel", module);

        let bind_group_layout = context.device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                label: Some("Compression Kernel Bind Group Layout"),
                entries: &[
                    texture_2d(0, wgpu::ShaderStages::COMPUTE),
                    storage_texture_2d(1, COLOR_FORMAT),
                    texture_2d(2, wgpu::ShaderStages::COMPUTE),
                    texture_2d(3, wgpu::ShaderStages::COMPUTE),
                    filtering_sampler(4, wgpu::ShaderStages::COMPUTE),
                    uniform_buffer(5, wgpu::ShaderStages::COMPUTE),
                ],
            },
        );

        let pipeline_layout = context.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Compression Kernel Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            },
        );

        let pipeline = context.device.create_compute_pipeline(
            &wgpu::ComputePipelineDescriptor {
                label: Some("Compression Kernel Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some(ENTRY_POINT),
                compilation_options: Default::default(),
                cache: None,
            },
        );

        log::info!(
            "compression kernel '{file_path}' ready, workgroup {}x{}x{}",
            group_size.x,
            group_size.y,
            group_size.z
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            group_size,
        })
    }
}

impl CompressionKernel<WgpuFrame<'_>> for WgpuKernel {
    fn preferred_group_size(&self) -> GroupSize {
        self.group_size
    }

    fn dispatch(
        &self,
        backend: &mut WgpuFrame<'_>,
        bindings: &KernelBindings<'_, GpuImage>,
        params: &DispatchParameters,
        groups: GroupCount,
    ) {
        let device = &backend.context().device;
        // One buffer per dispatch, contents fixed at creation.
        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Compression Kernel Params"),
                contents: bytemuck::bytes_of(&params.uniform()),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Compression Kernel Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(
                        &bindings.input.view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        &bindings.result.view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(
                        &bindings.last.view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(
                        &bindings.motion.view,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(
                        &bindings.last.sampler,
                    ),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let mut pass =
            backend
                .encoder()
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Compression Kernel Pass"),
                    timestamp_writes: None,
                });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(groups.x, groups.y, groups.z);
    }
}
