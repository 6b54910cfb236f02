//! I-frame / predicted-frame cadence.
//!
//! Classification is a pure function of the previous [`CadenceState`], the
//! configuration and the playback mode. The caller owns the state and hands
//! it to every [`CompressionPass::process_frame`] call.
//!
//! Two behaviors look odd but are kept on purpose:
//!
//! - Outside live playback (paused, editor preview) every frame is an
//!   I-frame and the countdown is re-armed each time.
//! - With `use_iframes` off the countdown never moves, so after the first
//!   I-frame the stream stays predicted for as long as playback is live.
//!
//! [`CompressionPass::process_frame`]: super::CompressionPass::process_frame

use super::config::CompressionConfig;

/// Whether playback is running. Temporal prediction only accumulates while
/// live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Frames are advancing in real time.
    #[default]
    Live,
    /// Paused, editor preview, or any other non-playing context.
    Preview,
}

/// Compression type of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Compressed independently of history.
    IFrame,
    /// Predicted from the previous frame and the motion field.
    Predicted,
}

/// Countdown carried from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CadenceState {
    /// Predicted frames left before the next I-frame. Zero forces an
    /// I-frame, which is why the default state starts the stream on one.
    pub remaining: u32,
}

/// Per-frame classification result. Not persisted past the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClassification {
    /// I-frame or predicted.
    pub kind: FrameKind,
    /// Countdown value after this frame.
    pub frames_until_next_iframe: u32,
}

impl FrameClassification {
    /// `true` for I-frames.
    #[must_use]
    pub fn is_iframe(&self) -> bool {
        self.kind == FrameKind::IFrame
    }
}

/// Classify the next frame and advance the countdown.
#[must_use]
pub fn classify(
    state: CadenceState,
    config: &CompressionConfig,
    playback: PlaybackMode,
) -> (CadenceState, FrameClassification) {
    let (kind, remaining) =
        if state.remaining == 0 || playback != PlaybackMode::Live {
            (FrameKind::IFrame, config.cadence_length)
        } else if config.use_iframes {
            (FrameKind::Predicted, state.remaining - 1)
        } else {
            (FrameKind::Predicted, state.remaining)
        };

    (
        CadenceState { remaining },
        FrameClassification {
            kind,
            frames_until_next_iframe: remaining,
        },
    )
}
