//! Device seam: the command stream the sequencer records into and the
//! kernel capability it dispatches.

use std::fmt;

use super::config::FilterMode;
use super::params::{DispatchParameters, GroupCount, GroupSize};
use crate::error::CodecError;

/// Width and height of a 2D image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Construct an extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` if either dimension is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Integer-divide both dimensions (flooring). A zero divisor is treated
    /// as one.
    #[must_use]
    pub const fn downsampled(self, factor: u32) -> Self {
        let factor = if factor == 0 { 1 } else { factor };
        Self {
            width: self.width / factor,
            height: self.height / factor,
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel payload of a history image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// 8-bit RGBA color (previous compressed frame).
    Color,
    /// Signed per-pixel displacement (motion field).
    Motion,
}

/// Allocation request for a history image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    /// Debug label.
    pub label: &'static str,
    /// Size in pixels.
    pub extent: Extent,
    /// Pixel payload.
    pub format: ImageFormat,
    /// Sampling filter used whenever the image is read.
    pub filter: FilterMode,
}

/// An image handle owned by a backend.
pub trait FrameImage {
    /// Size of the image in pixels.
    fn extent(&self) -> Extent;
}

/// A single, ordered command stream. Commands recorded later observe the
/// side effects of commands recorded earlier.
pub trait FrameBackend {
    /// Image handle type. Dropping a handle releases the image.
    type Image: FrameImage;

    /// Allocate a cleared image.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Allocation`] if the device cannot provide it.
    fn create_image(&mut self, desc: &ImageDesc)
        -> Result<Self::Image, CodecError>;

    /// Record a pass that renders the motion-vector `source` into `target`,
    /// rescaling to the target's extent.
    fn render_motion(&mut self, source: &Self::Image, target: &Self::Image);

    /// Record a straight blit of `source` into `target`, rescaling to the
    /// target's extent.
    fn copy_bypass(&mut self, source: &Self::Image, target: &Self::Image);
}

/// Images bound to one kernel dispatch.
#[derive(Debug, Clone, Copy)]
pub struct KernelBindings<'a, I> {
    /// Current source image (`Input`, read).
    pub input: &'a I,
    /// Destination image (`Result`, write).
    pub result: &'a I,
    /// Previous compressed frame (`Last`, read).
    pub last: &'a I,
    /// Motion field (`Motion`, read).
    pub motion: &'a I,
}

/// The opaque per-pixel compression kernel.
///
/// The kernel declares its own thread-group footprint; the sequencer sizes
/// the dispatch grid from it.
pub trait CompressionKernel<B: FrameBackend> {
    /// Thread-group footprint declared by the kernel.
    fn preferred_group_size(&self) -> GroupSize;

    /// Record one dispatch into `backend`.
    fn dispatch(
        &self,
        backend: &mut B,
        bindings: &KernelBindings<'_, B::Image>,
        params: &DispatchParameters,
        groups: GroupCount,
    );
}
