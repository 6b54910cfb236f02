//! Per-frame compression control: cadence classification, frame history
//! lifecycle, and pass sequencing around an opaque kernel.
//!
//! Everything here is backend-agnostic. The wgpu implementation of
//! [`FrameBackend`] and [`CompressionKernel`] lives in [`crate::gpu`] and
//! [`crate::postprocess`].

mod backend;
pub mod cadence;
mod config;
mod history;
mod params;
mod pass;
#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{
    CompressionKernel, Extent, FrameBackend, FrameImage, ImageDesc,
    ImageFormat, KernelBindings,
};
pub use cadence::{
    classify, CadenceState, FrameClassification, FrameKind, PlaybackMode,
};
pub use config::{CompressionConfig, FilterMode, PerformanceMode};
pub use history::{FrameHistory, HistorySlot};
pub use params::{DispatchParameters, GroupCount, GroupSize, KernelUniform};
pub use pass::{CompressionPass, FrameInput, FrameOutcome, FrameReport};
