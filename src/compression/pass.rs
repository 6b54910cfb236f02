//! Per-frame pass sequencing: motion refresh, kernel dispatch, history
//! update, all recorded into one command stream.

use super::backend::{
    CompressionKernel, Extent, FrameBackend, FrameImage, KernelBindings,
};
use super::cadence::{
    classify, CadenceState, FrameClassification, FrameKind, PlaybackMode,
};
use super::config::CompressionConfig;
use super::history::FrameHistory;
use super::params::{DispatchParameters, GroupCount};
use crate::error::CodecError;

/// Images supplied by the renderer for one frame.
pub struct FrameInput<'a, I> {
    /// Rendered color image (`Input`).
    pub source: &'a I,
    /// Kernel write target (`Result`), also the frame's final output.
    pub destination: &'a I,
    /// Per-pixel motion vectors for the current camera.
    pub motion_vectors: &'a I,
    /// Live playback or preview.
    pub playback: PlaybackMode,
}

/// What happened to a processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// I-frame or predicted, plus the countdown after this frame.
    pub classification: FrameClassification,
    /// Dispatch grid used for the kernel.
    pub groups: GroupCount,
    /// Size of the history images read and written this frame.
    pub history_extent: Extent,
    /// `true` if the history was (re)allocated before this frame's
    /// dispatch.
    pub history_rebuilt: bool,
}

/// Result of [`CompressionPass::process_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No kernel is bound; nothing was recorded.
    Inactive,
    /// All three passes were recorded.
    Processed(FrameReport),
}

/// The codec-artifact post-process.
///
/// Owns the configuration, the optional kernel and the frame history. The
/// history is the single writer of its two images: the kernel only ever
/// sees shared borrows of them, and the previous-frame update needs the
/// history mutably, so the two cannot overlap within a frame.
pub struct CompressionPass<B: FrameBackend, K> {
    config: CompressionConfig,
    kernel: Option<K>,
    history: Option<FrameHistory<B::Image>>,
}

impl<B, K> CompressionPass<B, K>
where
    B: FrameBackend,
    K: CompressionKernel<B>,
{
    /// Create an unbound pass. It stays inactive until a kernel is set.
    #[must_use]
    pub fn new(config: CompressionConfig) -> Self {
        Self {
            config,
            kernel: None,
            history: None,
        }
    }

    /// Create a pass with a kernel bound.
    #[must_use]
    pub fn with_kernel(config: CompressionConfig, kernel: K) -> Self {
        Self {
            config,
            kernel: Some(kernel),
            history: None,
        }
    }

    /// `true` when a kernel is bound. An inactive pass records nothing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.kernel.is_some()
    }

    /// Bind or unbind the kernel.
    pub fn set_kernel(&mut self, kernel: Option<K>) {
        self.kernel = kernel;
    }

    /// The bound kernel, if any.
    #[must_use]
    pub fn kernel(&self) -> Option<&K> {
        self.kernel.as_ref()
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Replace the configuration between frames. A changed downsample
    /// factor or filter mode drops the history; it is rebuilt on the next
    /// frame.
    pub fn set_config(&mut self, config: CompressionConfig) {
        if self.config.history_layout_differs(&config) {
            self.teardown();
        }
        self.config = config;
    }

    /// Frame history, once allocated.
    #[must_use]
    pub fn history(&self) -> Option<&FrameHistory<B::Image>> {
        self.history.as_ref()
    }

    /// Allocate the frame history for a render target of `resolution`,
    /// dropping any previous history first.
    ///
    /// # Errors
    ///
    /// On a zero-area resolution or allocation failure the pass is left
    /// without history and the error is returned.
    pub fn setup(
        &mut self,
        backend: &mut B,
        resolution: Extent,
    ) -> Result<(), CodecError> {
        self.teardown();
        match FrameHistory::initialize(
            backend,
            resolution,
            self.config.downsample,
            self.config.filter,
        ) {
            Ok(history) => {
                self.history = Some(history);
                Ok(())
            }
            Err(e) => {
                log::warn!("compression setup failed: {e}");
                Err(e)
            }
        }
    }

    /// Release the frame history. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(history) = self.history.take() {
            history.release();
        }
    }

    /// Run one frame through the pipeline.
    ///
    /// Records, in order: motion refresh into the motion field, the kernel
    /// dispatch, and the bypass copy of the destination into the previous
    /// frame. `cadence` is advanced only for processed frames. The first
    /// frame on a fresh history is dispatched as an I-frame; the countdown
    /// in `cadence` is left as classified.
    ///
    /// # Errors
    ///
    /// Only when the source resolution changed (or no history exists yet)
    /// and re-allocating the history fails. Nothing is recorded in that
    /// case.
    pub fn process_frame(
        &mut self,
        backend: &mut B,
        cadence: &mut CadenceState,
        frame: &FrameInput<'_, B::Image>,
    ) -> Result<FrameOutcome, CodecError> {
        let Some(kernel) = self.kernel.as_ref() else {
            return Ok(FrameOutcome::Inactive);
        };

        let resolution = frame.source.extent();
        let stale = self
            .history
            .as_ref()
            .is_none_or(|history| !history.matches(resolution));
        if stale {
            if let Some(old) = self.history.take() {
                log::info!(
                    "render target resized {} -> {resolution}, dropping \
                     frame history",
                    old.resolution()
                );
                old.release();
            }
            self.history = Some(FrameHistory::initialize(
                backend,
                resolution,
                self.config.downsample,
                self.config.filter,
            )?);
        }
        let Some(history) = self.history.as_mut() else {
            return Ok(FrameOutcome::Inactive);
        };

        // 1. Motion refresh.
        history.refresh_motion(backend, frame.motion_vectors);

        // 2. Parameters.
        let (next, mut classification) =
            classify(*cadence, &self.config, frame.playback);
        *cadence = next;
        // A fresh history has no previous frame to predict from.
        if !history.is_primed() {
            classification.kind = FrameKind::IFrame;
        }
        let destination = frame.destination.extent();
        let params =
            DispatchParameters::new(&self.config, &classification, destination);
        let groups =
            GroupCount::covering(destination, kernel.preferred_group_size());

        // 3. Kernel dispatch. History images are only borrowed shared here.
        let bindings = KernelBindings {
            input: frame.source,
            result: frame.destination,
            last: history.previous_frame(),
            motion: history.motion_field(),
        };
        kernel.dispatch(backend, &bindings, &params, groups);

        // 4. Close the loop for the next frame.
        history.update_previous(backend, frame.destination);

        log::debug!(
            "frame {:?} ({} until next I-frame), {}x{} groups",
            classification.kind,
            classification.frames_until_next_iframe,
            groups.x,
            groups.y
        );

        Ok(FrameOutcome::Processed(FrameReport {
            classification,
            groups,
            history_extent: history.extent(),
            history_rebuilt: stale,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::compression::test_support::{
        Command, RecordingBackend, StubKernel, TestImage,
    };

    struct Frame {
        source: TestImage,
        destination: TestImage,
        motion: TestImage,
    }

    impl Frame {
        fn new(backend: &RecordingBackend, extent: Extent) -> Self {
            Self {
                source: backend.image_filled(extent, 100),
                destination: backend.image_filled(extent, 0),
                motion: backend.image_filled(extent, 5),
            }
        }

        fn input(&self, playback: PlaybackMode) -> FrameInput<'_, TestImage> {
            FrameInput {
                source: &self.source,
                destination: &self.destination,
                motion_vectors: &self.motion,
                playback,
            }
        }
    }

    fn processed(outcome: FrameOutcome) -> FrameReport {
        match outcome {
            FrameOutcome::Processed(report) => report,
            FrameOutcome::Inactive => panic!("frame was not processed"),
        }
    }

    fn pass(
        config: CompressionConfig,
    ) -> CompressionPass<RecordingBackend, StubKernel> {
        CompressionPass::with_kernel(config, StubKernel::new([8, 8, 1]))
    }

    #[test]
    fn inactive_without_kernel_records_nothing() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(32, 32));
        let mut pass: CompressionPass<RecordingBackend, StubKernel> =
            CompressionPass::new(CompressionConfig::default());
        let mut cadence = CadenceState { remaining: 3 };

        assert!(!pass.is_active());
        let outcome = pass
            .process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap();

        assert_eq!(outcome, FrameOutcome::Inactive);
        assert!(backend.commands.is_empty());
        assert_eq!(cadence.remaining, 3);
        assert!(pass.history().is_none());
    }

    #[test]
    fn passes_are_recorded_in_order() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(32, 16));
        let mut pass = pass(CompressionConfig::default());
        pass.setup(&mut backend, Extent::new(32, 16)).unwrap();
        backend.clear_log();

        let mut cadence = CadenceState::default();
        let _ = pass
            .process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap();

        let history = pass.history().unwrap();
        let previous = history.previous_frame().id();
        let motion = history.motion_field().id();
        assert_eq!(
            backend.commands,
            vec![
                Command::RenderMotion {
                    source: frame.motion.id(),
                    target: motion,
                },
                Command::Dispatch {
                    result: frame.destination.id(),
                    last: previous,
                    motion,
                },
                Command::CopyBypass {
                    source: frame.destination.id(),
                    target: previous,
                },
            ]
        );
    }

    #[test]
    fn previous_frame_holds_this_frames_output() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(24, 24));
        let mut pass = pass(CompressionConfig {
            use_temporal: true,
            ..CompressionConfig::default()
        });
        let mut cadence = CadenceState::default();

        for n in 1..=5u32 {
            let _ = pass
                .process_frame(
                    &mut backend,
                    &mut cadence,
                    &frame.input(PlaybackMode::Live),
                )
                .unwrap();
            let previous = pass.history().unwrap().previous_frame();
            assert_eq!(backend.pixel(previous, 0, 0), n);
            assert_eq!(backend.pixel(previous, 23, 23), n);
        }

        // Each dispatch read the output of the frame before it.
        let records = pass.kernel().unwrap().records.borrow();
        let seen: Vec<u32> = records.iter().map(|r| r.last_seen).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn dispatch_grid_uses_kernel_group_size() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(100, 30));
        let mut pass: CompressionPass<RecordingBackend, StubKernel> =
            CompressionPass::with_kernel(
                CompressionConfig::default(),
                StubKernel::new([16, 4, 1]),
            );
        let mut cadence = CadenceState::default();

        let report = processed(
            pass.process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap(),
        );
        assert_eq!(report.groups, GroupCount { x: 7, y: 8, z: 1 });

        let records = pass.kernel().unwrap().records.borrow();
        assert_eq!(records[0].params.result_width, 100);
        assert_eq!(records[0].params.result_height, 30);
        assert_eq!(records[0].groups, report.groups);
        assert_eq!(records[0].written, 1);
    }

    #[test]
    fn cadence_drives_iframe_flag() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(8, 8));
        let mut pass = pass(CompressionConfig {
            cadence_length: 2,
            ..CompressionConfig::default()
        });
        let mut cadence = CadenceState::default();

        let kinds: Vec<FrameKind> = (0..6)
            .map(|_| {
                processed(
                    pass.process_frame(
                        &mut backend,
                        &mut cadence,
                        &frame.input(PlaybackMode::Live),
                    )
                    .unwrap(),
                )
                .classification
                .kind
            })
            .collect();
        use FrameKind::{IFrame as I, Predicted as P};
        assert_eq!(kinds, vec![I, P, P, I, P, P]);

        let flags: Vec<i32> = pass
            .kernel()
            .unwrap()
            .records
            .borrow()
            .iter()
            .map(|r| r.params.is_iframe)
            .collect();
        assert_eq!(flags, vec![1, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn preview_frames_are_all_iframes() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(8, 8));
        let mut pass = pass(CompressionConfig::default());
        let mut cadence = CadenceState::default();

        for _ in 0..4 {
            let report = processed(
                pass.process_frame(
                    &mut backend,
                    &mut cadence,
                    &frame.input(PlaybackMode::Preview),
                )
                .unwrap(),
            );
            assert!(report.classification.is_iframe());
            assert_eq!(cadence.remaining, 8);
        }
    }

    #[test]
    fn resize_rebuilds_history_and_keeps_cadence() {
        let mut backend = RecordingBackend::default();
        let config = CompressionConfig {
            downsample: NonZeroU32::new(2).unwrap(),
            cadence_length: 4,
            ..CompressionConfig::default()
        };
        let mut pass = pass(config);
        let mut cadence = CadenceState::default();

        let small = Frame::new(&backend, Extent::new(64, 48));
        for _ in 0..2 {
            let _ = pass
                .process_frame(
                    &mut backend,
                    &mut cadence,
                    &small.input(PlaybackMode::Live),
                )
                .unwrap();
        }
        assert_eq!(pass.history().unwrap().extent(), Extent::new(32, 24));
        assert_eq!(cadence.remaining, 3);

        let large = Frame::new(&backend, Extent::new(101, 77));
        let report = processed(
            pass.process_frame(
                &mut backend,
                &mut cadence,
                &large.input(PlaybackMode::Live),
            )
            .unwrap(),
        );

        assert!(report.history_rebuilt);
        assert_eq!(report.history_extent, Extent::new(50, 38));
        let history = pass.history().unwrap();
        assert_eq!(history.previous_frame().extent(), Extent::new(50, 38));
        assert_eq!(history.motion_field().extent(), Extent::new(50, 38));
        assert_eq!(report.classification.kind, FrameKind::IFrame);
        assert_eq!(report.classification.frames_until_next_iframe, 2);
        assert_eq!(cadence.remaining, 2);

        // The rebuilt history is cleared, so the kernel must not predict
        // from it.
        let records = pass.kernel().unwrap().records.borrow();
        assert_eq!(records[2].last_seen, 0);
        assert_eq!(records[2].params.is_iframe, 1);
        drop(records);

        // Primed again by that frame: the cadence takes over.
        let report = processed(
            pass.process_frame(
                &mut backend,
                &mut cadence,
                &large.input(PlaybackMode::Live),
            )
            .unwrap(),
        );
        assert_eq!(report.classification.kind, FrameKind::Predicted);
        assert_eq!(cadence.remaining, 1);
    }

    #[test]
    fn first_frame_after_setup_is_an_iframe() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(16, 16));
        let mut pass = pass(CompressionConfig {
            use_temporal: true,
            ..CompressionConfig::default()
        });
        pass.setup(&mut backend, Extent::new(16, 16)).unwrap();
        let mut cadence = CadenceState::default();

        for _ in 0..2 {
            let _ = pass
                .process_frame(
                    &mut backend,
                    &mut cadence,
                    &frame.input(PlaybackMode::Live),
                )
                .unwrap();
        }
        assert!(pass.history().unwrap().is_primed());

        pass.teardown();
        pass.setup(&mut backend, Extent::new(16, 16)).unwrap();
        assert!(!pass.history().unwrap().is_primed());

        let report = processed(
            pass.process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap(),
        );
        assert!(report.classification.is_iframe());
        assert!(!report.history_rebuilt);
        assert_eq!(cadence.remaining, 6);

        let records = pass.kernel().unwrap().records.borrow();
        assert_eq!(records[2].last_seen, 0);
        assert_eq!(records[2].params.is_iframe, 1);
    }

    #[test]
    fn steady_state_does_not_reallocate() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(16, 16));
        let mut pass = pass(CompressionConfig::default());
        let mut cadence = CadenceState::default();

        let first = processed(
            pass.process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap(),
        );
        let second = processed(
            pass.process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap(),
        );
        assert!(first.history_rebuilt);
        assert!(!second.history_rebuilt);
        let creates = backend
            .commands
            .iter()
            .filter(|c| matches!(c, Command::Create { .. }))
            .count();
        assert_eq!(creates, 2);
    }

    #[test]
    fn failed_setup_leaves_pass_without_history() {
        let mut backend = RecordingBackend::default();
        let mut pass = pass(CompressionConfig::default());
        pass.setup(&mut backend, Extent::new(16, 16)).unwrap();

        let err = pass.setup(&mut backend, Extent::new(0, 16)).unwrap_err();
        assert!(matches!(err, CodecError::EmptyResolution(_)));
        assert!(pass.history().is_none());
        assert_eq!(backend.live_images(), 0);
    }

    #[test]
    fn allocation_failure_during_frame_records_nothing() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(16, 16));
        backend.fail_allocations = true;
        let mut pass = pass(CompressionConfig::default());
        let mut cadence = CadenceState::default();

        let err = pass
            .process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap_err();
        assert!(matches!(err, CodecError::Allocation(_)));
        assert!(backend.commands.is_empty());
        assert!(pass.kernel().unwrap().records.borrow().is_empty());
    }

    #[test]
    fn layout_change_drops_history() {
        let mut backend = RecordingBackend::default();
        let mut pass = pass(CompressionConfig::default());
        pass.setup(&mut backend, Extent::new(16, 16)).unwrap();

        pass.set_config(CompressionConfig {
            bitrate: 0.5,
            ..CompressionConfig::default()
        });
        assert!(pass.history().is_some());

        pass.set_config(CompressionConfig {
            downsample: NonZeroU32::new(4).unwrap(),
            ..CompressionConfig::default()
        });
        assert!(pass.history().is_none());
        assert_eq!(backend.live_images(), 0);
    }

    #[test]
    fn teardown_and_drop_release_once() {
        let mut backend = RecordingBackend::default();
        let mut pass = pass(CompressionConfig::default());
        pass.setup(&mut backend, Extent::new(16, 16)).unwrap();
        pass.teardown();
        pass.teardown();
        assert_eq!(backend.released_images(), 2);

        pass.setup(&mut backend, Extent::new(16, 16)).unwrap();
        drop(pass);
        assert_eq!(backend.released_images(), 4);
        assert_eq!(backend.live_images(), 0);
    }

    #[test]
    fn unbinding_kernel_deactivates() {
        let mut backend = RecordingBackend::default();
        let frame = Frame::new(&backend, Extent::new(8, 8));
        let mut pass = pass(CompressionConfig::default());
        assert!(pass.is_active());
        pass.set_kernel(None);
        let mut cadence = CadenceState::default();
        let outcome = pass
            .process_frame(
                &mut backend,
                &mut cadence,
                &frame.input(PlaybackMode::Live),
            )
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Inactive);
    }
}
