//! In-memory backend and stub kernel for exercising the sequencer without a
//! GPU. Images are `u32` grids; every recorded command is also logged.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::backend::{
    CompressionKernel, Extent, FrameBackend, FrameImage, ImageDesc,
    KernelBindings,
};
use super::params::{DispatchParameters, GroupCount, GroupSize};
use crate::error::CodecError;

#[derive(Default)]
struct ImageStore {
    pixels: HashMap<usize, Vec<u32>>,
    next_id: usize,
    released: usize,
}

pub(crate) struct TestImage {
    id: usize,
    extent: Extent,
    store: Rc<RefCell<ImageStore>>,
}

impl TestImage {
    pub(crate) fn id(&self) -> usize {
        self.id
    }
}

impl FrameImage for TestImage {
    fn extent(&self) -> Extent {
        self.extent
    }
}

impl Drop for TestImage {
    fn drop(&mut self) {
        let mut store = self.store.borrow_mut();
        if store.pixels.remove(&self.id).is_some() {
            store.released += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Create { label: &'static str, extent: Extent },
    RenderMotion { source: usize, target: usize },
    CopyBypass { source: usize, target: usize },
    Dispatch { result: usize, last: usize, motion: usize },
}

#[derive(Default)]
pub(crate) struct RecordingBackend {
    store: Rc<RefCell<ImageStore>>,
    pub(crate) commands: Vec<Command>,
    pub(crate) fail_allocations: bool,
}

impl RecordingBackend {
    fn allocate(&self, extent: Extent, value: u32) -> TestImage {
        let mut store = self.store.borrow_mut();
        let id = store.next_id;
        store.next_id += 1;
        let len = (extent.width * extent.height) as usize;
        let _ = store.pixels.insert(id, vec![value; len]);
        TestImage {
            id,
            extent,
            store: Rc::clone(&self.store),
        }
    }

    pub(crate) fn image_filled(&self, extent: Extent, value: u32) -> TestImage {
        self.allocate(extent, value)
    }

    pub(crate) fn fill(&self, image: &TestImage, value: u32) {
        if let Some(pixels) = self.store.borrow_mut().pixels.get_mut(&image.id)
        {
            pixels.fill(value);
        }
    }

    pub(crate) fn pixel(&self, image: &TestImage, x: u32, y: u32) -> u32 {
        let store = self.store.borrow();
        store.pixels[&image.id][(y * image.extent.width + x) as usize]
    }

    pub(crate) fn live_images(&self) -> usize {
        self.store.borrow().pixels.len()
    }

    pub(crate) fn released_images(&self) -> usize {
        self.store.borrow().released
    }

    pub(crate) fn clear_log(&mut self) {
        self.commands.clear();
    }

    /// Nearest-neighbour resample of `source` into `target`.
    fn resample(&self, source: &TestImage, target: &TestImage) {
        let mut store = self.store.borrow_mut();
        let src = store.pixels[&source.id].clone();
        let (sw, sh) = (source.extent.width, source.extent.height);
        let (tw, th) = (target.extent.width, target.extent.height);
        if let Some(dst) = store.pixels.get_mut(&target.id) {
            for y in 0..th {
                for x in 0..tw {
                    let sx = x * sw / tw;
                    let sy = y * sh / th;
                    dst[(y * tw + x) as usize] = src[(sy * sw + sx) as usize];
                }
            }
        }
    }
}

impl FrameBackend for RecordingBackend {
    type Image = TestImage;

    fn create_image(
        &mut self,
        desc: &ImageDesc,
    ) -> Result<TestImage, CodecError> {
        if self.fail_allocations {
            return Err(CodecError::Allocation(format!(
                "{} refused",
                desc.label
            )));
        }
        self.commands.push(Command::Create {
            label: desc.label,
            extent: desc.extent,
        });
        Ok(self.allocate(desc.extent, 0))
    }

    fn render_motion(&mut self, source: &TestImage, target: &TestImage) {
        self.commands.push(Command::RenderMotion {
            source: source.id,
            target: target.id,
        });
        self.resample(source, target);
    }

    fn copy_bypass(&mut self, source: &TestImage, target: &TestImage) {
        self.commands.push(Command::CopyBypass {
            source: source.id,
            target: target.id,
        });
        self.resample(source, target);
    }
}

/// What the stub kernel saw on one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DispatchRecord {
    pub(crate) params: DispatchParameters,
    pub(crate) groups: GroupCount,
    /// Top-left pixel of `Last` at dispatch time.
    pub(crate) last_seen: u32,
    /// Value written into every pixel of `Result`.
    pub(crate) written: u32,
}

/// Writes a running frame counter (starting at 1) into `Result`.
pub(crate) struct StubKernel {
    group_size: GroupSize,
    counter: Cell<u32>,
    pub(crate) records: RefCell<Vec<DispatchRecord>>,
}

impl StubKernel {
    pub(crate) fn new(group_size: [u32; 3]) -> Self {
        Self {
            group_size: GroupSize::from_array(group_size),
            counter: Cell::new(0),
            records: RefCell::new(Vec::new()),
        }
    }
}

impl CompressionKernel<RecordingBackend> for StubKernel {
    fn preferred_group_size(&self) -> GroupSize {
        self.group_size
    }

    fn dispatch(
        &self,
        backend: &mut RecordingBackend,
        bindings: &KernelBindings<'_, TestImage>,
        params: &DispatchParameters,
        groups: GroupCount,
    ) {
        backend.commands.push(Command::Dispatch {
            result: bindings.result.id,
            last: bindings.last.id,
            motion: bindings.motion.id,
        });
        let last_seen = backend.pixel(bindings.last, 0, 0);
        let written = self.counter.get() + 1;
        self.counter.set(written);
        backend.fill(bindings.result, written);
        self.records.borrow_mut().push(DispatchRecord {
            params: *params,
            groups,
            last_seen,
            written,
        });
    }
}
