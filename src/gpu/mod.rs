//! GPU resource management utilities.
//!
//! Provides wgpu device initialization, the image type shared by every
//! pass, shader composition, and the per-frame command stream.

/// [`FrameBackend`](crate::compression::FrameBackend) over a wgpu encoder.
pub mod frame;
/// Shared wgpu boilerplate helpers for fullscreen and compute pipelines.
pub mod pipeline_helpers;
/// wgpu device and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Texture, view and sampler bundle.
pub mod texture;
