//! Per-dispatch kernel parameters and grid sizing.

use bytemuck::{Pod, Zeroable};

use super::backend::Extent;
use super::cadence::FrameClassification;
use super::config::CompressionConfig;

/// Thread-group footprint declared by a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSize {
    /// Threads along x.
    pub x: u32,
    /// Threads along y.
    pub y: u32,
    /// Threads along z.
    pub z: u32,
}

impl GroupSize {
    /// Build a group size from a `[x, y, z]` triple, as declared by
    /// `@workgroup_size`.
    #[must_use]
    pub const fn from_array(size: [u32; 3]) -> Self {
        Self {
            x: size[0],
            y: size[1],
            z: size[2],
        }
    }
}

/// Number of thread groups in one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCount {
    /// Groups along x.
    pub x: u32,
    /// Groups along y.
    pub y: u32,
    /// Groups along z (always 1 for image kernels).
    pub z: u32,
}

impl GroupCount {
    /// Smallest 2D grid that covers `extent` with groups of `size`.
    /// Zero group dimensions are treated as one.
    #[must_use]
    pub fn covering(extent: Extent, size: GroupSize) -> Self {
        Self {
            x: extent.width.div_ceil(size.x.max(1)),
            y: extent.height.div_ceil(size.y.max(1)),
            z: 1,
        }
    }
}

/// Scalar parameters for one kernel dispatch. Built fresh each frame from
/// the configuration, the frame's classification and the destination size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchParameters {
    /// `FastPerformanceMode`.
    pub fast_performance_mode: i32,
    /// `CompressionThreshold`.
    pub compression_threshold: f32,
    /// `UseSpatial`.
    pub use_spatial: i32,
    /// `UseTemporal`.
    pub use_temporal: i32,
    /// `Bitrate`.
    pub bitrate: f32,
    /// `BitrateArtifacts`.
    pub bitrate_artifacts: f32,
    /// `ResultWidth`.
    pub result_width: i32,
    /// `ResultHeight`.
    pub result_height: i32,
    /// `IsIFrame`: the kernel ignores `Last` when set.
    pub is_iframe: i32,
}

impl DispatchParameters {
    /// Flatten configuration and frame state into kernel scalars.
    #[must_use]
    pub fn new(
        config: &CompressionConfig,
        classification: &FrameClassification,
        destination: Extent,
    ) -> Self {
        Self {
            fast_performance_mode: config.performance_mode.as_flag(),
            compression_threshold: config.spatial_threshold,
            use_spatial: i32::from(config.use_spatial),
            use_temporal: i32::from(config.use_temporal),
            bitrate: config.bitrate,
            bitrate_artifacts: config.bitrate_artifacts,
            result_width: destination.width as i32,
            result_height: destination.height as i32,
            is_iframe: i32::from(classification.is_iframe()),
        }
    }

    /// GPU uniform layout of these parameters.
    #[must_use]
    pub fn uniform(&self) -> KernelUniform {
        KernelUniform {
            fast_performance_mode: self.fast_performance_mode,
            compression_threshold: self.compression_threshold,
            use_spatial: self.use_spatial,
            use_temporal: self.use_temporal,
            bitrate: self.bitrate,
            bitrate_artifacts: self.bitrate_artifacts,
            result_width: self.result_width,
            result_height: self.result_height,
            is_iframe: self.is_iframe,
            _pad: [0; 3],
        }
    }
}

/// `KernelParams` uniform block as laid out in WGSL (48 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct KernelUniform {
    /// `FastPerformanceMode`.
    pub fast_performance_mode: i32,
    /// `CompressionThreshold`.
    pub compression_threshold: f32,
    /// `UseSpatial`.
    pub use_spatial: i32,
    /// `UseTemporal`.
    pub use_temporal: i32,
    /// `Bitrate`.
    pub bitrate: f32,
    /// `BitrateArtifacts`.
    pub bitrate_artifacts: f32,
    /// `ResultWidth`.
    pub result_width: i32,
    /// `ResultHeight`.
    pub result_height: i32,
    /// `IsIFrame`.
    pub is_iframe: i32,
    _pad: [i32; 3],
}
