use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, ComposerError, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};
use std::borrow::Cow;

use crate::error::CodecError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Consuming shaders
/// use `#import codec::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, which is also what the kernel's
/// workgroup size is read from.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

const SHARED_MODULES: &[ModuleDef] = &[ModuleDef {
    source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
    file_path: "modules/fullscreen.wgsl",
}];

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, CodecError> {
        let mut composer = Composer::default();

        for m in SHARED_MODULES {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    CodecError::Shader(format!(
                        "failed to register shader module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose a shader source string (which may contain `#import` directives)
    /// into a `wgpu::ShaderModule` ready for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        source: &str,
        file_path: &str,
    ) -> Result<wgpu::ShaderModule, CodecError> {
        let naga_module = self
            .compose_naga(source, file_path)
            .map_err(|e| compose_error(file_path, &e))?;
        Ok(create_module(device, label, naga_module))
    }

    /// Compose a shader source into a `naga::Module` without creating a wgpu
    /// shader module. Useful for inspecting entry points, and for testing
    /// shader composition without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns the composer error if the source or one of its imports fails.
    pub fn compose_naga(
        &mut self,
        source: &str,
        file_path: &str,
    ) -> Result<naga::Module, Box<ComposerError>> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(Box::new)
    }
}

/// Hand composed IR to wgpu without re-parsing WGSL.
pub fn create_module(
    device: &wgpu::Device,
    label: &str,
    module: naga::Module,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
    })
}

/// Map a composition failure to the crate error.
pub fn compose_error(file_path: &str, e: &ComposerError) -> CodecError {
    CodecError::Shader(format!("failed to compose shader '{file_path}': {e}"))
}

/// Workgroup size declared by the compute entry point `entry_point`.
///
/// # Errors
///
/// Returns [`CodecError::MissingEntryPoint`] if the module has no compute
/// entry point of that name, and [`CodecError::InvalidWorkgroupSize`] if any
/// dimension is zero (e.g. sized by an unresolved override).
pub fn workgroup_size(
    module: &naga::Module,
    entry_point: &str,
) -> Result<[u32; 3], CodecError> {
    let entry = module
        .entry_points
        .iter()
        .find(|ep| {
            ep.name == entry_point && ep.stage == naga::ShaderStage::Compute
        })
        .ok_or_else(|| CodecError::MissingEntryPoint(entry_point.to_owned()))?;
    if entry.workgroup_size.contains(&0) {
        return Err(CodecError::InvalidWorkgroupSize(entry.workgroup_size));
    }
    Ok(entry.workgroup_size)
}
