//! Persistent images carried from one frame to the next.

use std::num::NonZeroU32;
use std::ops::Index;

use super::backend::{Extent, FrameBackend, FrameImage, ImageDesc, ImageFormat};
use super::config::FilterMode;
use crate::error::CodecError;

/// Index into [`FrameHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySlot {
    /// Last frame's compressed output.
    PreviousFrame = 0,
    /// Motion vectors for the current frame, at history resolution.
    MotionField = 1,
}

/// The previous compressed frame and the motion field, always the same size.
///
/// Both images are allocated together and dropped together; dropping the
/// history (or calling [`FrameHistory::release`]) releases each image
/// exactly once. Nothing outside the owning pass holds them across frames.
pub struct FrameHistory<I> {
    slots: [I; 2],
    resolution: Extent,
    extent: Extent,
    primed: bool,
}

impl<I: FrameImage> FrameHistory<I> {
    /// Allocate both images at `resolution / downsample` (floored).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EmptyResolution`] if `resolution` has zero
    /// area, [`CodecError::EmptyHistory`] if downsampling leaves zero area,
    /// and any allocation error from the backend.
    pub fn initialize<B>(
        backend: &mut B,
        resolution: Extent,
        downsample: NonZeroU32,
        filter: FilterMode,
    ) -> Result<Self, CodecError>
    where
        B: FrameBackend<Image = I>,
    {
        if resolution.is_empty() {
            return Err(CodecError::EmptyResolution(resolution));
        }
        let extent = resolution.downsampled(downsample.get());
        if extent.is_empty() {
            return Err(CodecError::EmptyHistory {
                resolution,
                downsample: downsample.get(),
            });
        }

        let previous = backend.create_image(&ImageDesc {
            label: "Previous Frame",
            extent,
            format: ImageFormat::Color,
            filter,
        })?;
        let motion = backend.create_image(&ImageDesc {
            label: "Motion Field",
            extent,
            format: ImageFormat::Motion,
            filter,
        })?;

        log::info!(
            "frame history allocated at {extent} (render target {resolution}, \
             downsample {downsample}, {filter:?} filtering)"
        );

        Ok(Self {
            slots: [previous, motion],
            resolution,
            extent,
            primed: false,
        })
    }

    /// Record the copy of this frame's output into the previous-frame slot.
    /// Must follow the kernel dispatch that produced `new_frame`.
    pub fn update_previous<B>(&mut self, backend: &mut B, new_frame: &I)
    where
        B: FrameBackend<Image = I>,
    {
        backend.copy_bypass(
            new_frame,
            &self.slots[HistorySlot::PreviousFrame as usize],
        );
        self.primed = true;
    }

    /// Record the motion refresh from the renderer's motion-vector image.
    pub(crate) fn refresh_motion<B>(&mut self, backend: &mut B, source: &I)
    where
        B: FrameBackend<Image = I>,
    {
        backend.render_motion(
            source,
            &self.slots[HistorySlot::MotionField as usize],
        );
    }

    /// Release both images.
    pub fn release(self) {
        log::debug!("frame history released ({})", self.extent);
    }

    /// `true` if the history was built for a render target of `resolution`.
    #[must_use]
    pub fn matches(&self, resolution: Extent) -> bool {
        self.resolution == resolution
    }

    /// Render-target resolution the history was built for.
    #[must_use]
    pub fn resolution(&self) -> Extent {
        self.resolution
    }

    /// Size of both history images.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// `false` until the first previous-frame update after allocation.
    #[must_use]
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// The previous compressed frame.
    #[must_use]
    pub fn previous_frame(&self) -> &I {
        &self[HistorySlot::PreviousFrame]
    }

    /// The motion field.
    #[must_use]
    pub fn motion_field(&self) -> &I {
        &self[HistorySlot::MotionField]
    }
}

impl<I> Index<HistorySlot> for FrameHistory<I> {
    type Output = I;

    fn index(&self, slot: HistorySlot) -> &I {
        &self.slots[slot as usize]
    }
}
