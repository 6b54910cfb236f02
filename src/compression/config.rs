use std::num::NonZeroU32;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kernel speed/quality trade-off.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    /// Full-quality kernel path.
    #[default]
    Quality,
    /// Cheaper kernel path.
    Fast,
}

impl PerformanceMode {
    /// Integer flag handed to the kernel (`0` or `1`).
    #[must_use]
    pub const fn as_flag(self) -> i32 {
        match self {
            Self::Quality => 0,
            Self::Fast => 1,
        }
    }
}

/// Sampling filter for the history images.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Linear interpolation between texels.
    #[default]
    Bilinear,
    /// Nearest texel; keeps downsampled blocks hard-edged.
    Point,
}

/// Compression parameters for one frame. Immutable while a frame is being
/// processed; every downstream stage reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionConfig {
    /// Enable spatial (block quantization) compression.
    pub use_spatial: bool,
    /// Enable motion-compensated temporal prediction.
    pub use_temporal: bool,
    /// Count down towards periodic I-frames. When off, every frame after the
    /// first is predicted.
    pub use_iframes: bool,
    /// Spatial compression threshold, in `[0, 2]`.
    pub spatial_threshold: f32,
    /// Kernel performance mode.
    pub performance_mode: PerformanceMode,
    /// Number of predicted frames between I-frames.
    pub cadence_length: u32,
    /// Bitrate, in `[0, 1]`.
    pub bitrate: f32,
    /// Bitrate artifact floor, in `[0, 0.95]`.
    pub bitrate_artifacts: f32,
    /// Integer divisor applied to the render resolution for history images.
    pub downsample: NonZeroU32,
    /// Sampling filter for history images.
    pub filter: FilterMode,
}

impl CompressionConfig {
    /// Upper bound of [`Self::spatial_threshold`].
    pub const MAX_SPATIAL_THRESHOLD: f32 = 2.0;
    /// Upper bound of [`Self::bitrate_artifacts`].
    pub const MAX_BITRATE_ARTIFACTS: f32 = 0.95;

    /// `true` if switching from `self` to `other` invalidates the history
    /// images (their size or sampling changes).
    #[must_use]
    pub fn history_layout_differs(&self, other: &Self) -> bool {
        self.downsample != other.downsample || self.filter != other.filter
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            use_spatial: true,
            use_temporal: false,
            use_iframes: true,
            spatial_threshold: 0.0,
            performance_mode: PerformanceMode::Quality,
            cadence_length: 8,
            bitrate: 1.0,
            bitrate_artifacts: 0.0,
            downsample: NonZeroU32::MIN,
            filter: FilterMode::Bilinear,
        }
    }
}
