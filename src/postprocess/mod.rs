//! wgpu passes for the compression post-process.
//!
//! Provides the motion-refresh and bypass resampling passes and the
//! compute-shader compression kernel.

pub mod kernel;
pub mod resample;
