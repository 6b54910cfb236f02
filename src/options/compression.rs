use std::num::NonZeroU32;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compression::{CompressionConfig, FilterMode, PerformanceMode};

/// User-tunable codec emulation settings, as stored in presets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Compression", inline)]
#[serde(default)]
pub struct CompressionOptions {
    /// Block quantization on/off.
    #[schemars(title = "Spatial Compression")]
    pub use_spatial: bool,
    /// Spatial compression threshold.
    #[schemars(
        title = "Compression Threshold",
        range(min = 0.0, max = 2.0),
        extend("step" = 0.05)
    )]
    pub spatial_threshold: f32,
    /// Kernel speed/quality trade-off.
    #[schemars(title = "Performance Mode")]
    pub performance_mode: PerformanceMode,
    /// Resolution divisor for the history images. Applied at setup.
    #[schemars(
        title = "Downsampling",
        range(min = 1, max = 16),
        extend("step" = 1)
    )]
    pub downsample: NonZeroU32,
    /// Sampling filter for the history images. Applied at setup.
    #[schemars(title = "Filtering")]
    pub filter: FilterMode,
    /// Motion-compensated prediction on/off.
    #[schemars(title = "Temporal Compression")]
    pub use_temporal: bool,
    /// Insert periodic I-frames.
    #[schemars(title = "Use I-Frames")]
    pub use_iframes: bool,
    /// Predicted frames between I-frames.
    #[schemars(
        title = "Predicted Frames",
        range(min = 0, max = 120),
        extend("step" = 1)
    )]
    pub cadence_length: u32,
    /// Bitrate.
    #[schemars(
        title = "Bitrate",
        range(min = 0.0, max = 1.0),
        extend("step" = 0.01)
    )]
    pub bitrate: f32,
    /// Bitrate artifact floor.
    #[schemars(
        title = "Bitrate Artifacts",
        range(min = 0.0, max = 0.95),
        extend("step" = 0.01)
    )]
    pub bitrate_artifacts: f32,
}

impl CompressionOptions {
    /// Clamp into the per-frame configuration.
    #[must_use]
    pub fn to_config(&self) -> CompressionConfig {
        CompressionConfig {
            use_spatial: self.use_spatial,
            use_temporal: self.use_temporal,
            use_iframes: self.use_iframes,
            spatial_threshold: clamp_unit(
                self.spatial_threshold,
                CompressionConfig::MAX_SPATIAL_THRESHOLD,
            ),
            performance_mode: self.performance_mode,
            cadence_length: self.cadence_length,
            bitrate: clamp_unit(self.bitrate, 1.0),
            bitrate_artifacts: clamp_unit(
                self.bitrate_artifacts,
                CompressionConfig::MAX_BITRATE_ARTIFACTS,
            ),
            downsample: self.downsample,
            filter: self.filter,
        }
    }
}

/// Clamp to `[0, max]`, mapping NaN to zero.
fn clamp_unit(value: f32, max: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        let config = CompressionConfig::default();
        Self {
            use_spatial: config.use_spatial,
            spatial_threshold: config.spatial_threshold,
            performance_mode: config.performance_mode,
            downsample: config.downsample,
            filter: config.filter,
            use_temporal: config.use_temporal,
            use_iframes: config.use_iframes,
            cadence_length: config.cadence_length,
            bitrate: config.bitrate,
            bitrate_artifacts: config.bitrate_artifacts,
        }
    }
}
