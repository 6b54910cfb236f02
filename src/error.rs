//! Crate-level error types.

use std::fmt;

use crate::compression::Extent;
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the codec-artifacts crate.
///
/// Every variant is a setup-time failure. Steady-state frame processing has
/// no error branch beyond re-initializing the history on a resize.
#[derive(Debug)]
pub enum CodecError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// The render target has zero area.
    EmptyResolution(Extent),
    /// The render target is non-empty, but downsampling leaves nothing to
    /// allocate.
    EmptyHistory {
        /// Native render-target resolution.
        resolution: Extent,
        /// Downsample divisor that was applied.
        downsample: u32,
    },
    /// The backend refused to allocate a history image.
    Allocation(String),
    /// WGSL composition or validation failure.
    Shader(String),
    /// The kernel module has no compute entry point with the expected name.
    MissingEntryPoint(String),
    /// The kernel declares a workgroup size with a zero dimension (usually
    /// an override constant that was never resolved).
    InvalidWorkgroupSize([u32; 3]),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::EmptyResolution(extent) => {
                write!(f, "render target {extent} has zero area")
            }
            Self::EmptyHistory {
                resolution,
                downsample,
            } => write!(
                f,
                "render target {resolution} downsampled by {downsample} has \
                 zero area"
            ),
            Self::Allocation(msg) => {
                write!(f, "history allocation failed: {msg}")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::MissingEntryPoint(name) => {
                write!(f, "kernel has no compute entry point '{name}'")
            }
            Self::InvalidWorkgroupSize(size) => write!(
                f,
                "kernel workgroup size {}x{}x{} has a zero dimension",
                size[0], size[1], size[2]
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for CodecError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
