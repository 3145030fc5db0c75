use alloc::collections::BTreeMap;

use crate::{FrameHandle, FrameJob};

/// The host's frame clock, injected into [`crate::Scheduler`].
///
/// A pacer only stores jobs and hands them back: when the tick for a handle arrives, the host
/// passes `(handle, job)` to [`crate::Scheduler::run_frame`]. The frame source may be an
/// animation-frame callback, a timer, or a game loop.
///
/// Contract:
/// - Every `request_tick` returns a handle distinct from all handles still pending.
/// - A handle passed to `cancel_tick` must never be delivered afterwards.
/// - A job requested while a frame is being processed belongs to a later frame.
pub trait FramePacer {
    fn request_tick(&mut self, job: FrameJob) -> FrameHandle;

    /// Cancels a pending tick. Returns `false` if the handle is unknown or already delivered.
    fn cancel_tick(&mut self, handle: FrameHandle) -> bool;
}

/// An in-memory pacer with animation-frame semantics.
///
/// [`FrameQueue::begin_frame`] marks every job requested so far as due; [`FrameQueue::pop_due`]
/// then yields them in request order. Jobs requested while a frame is being drained wait for the
/// next frame, and cancelling a due job that has not been popped yet still prevents it.
#[derive(Clone, Debug, Default)]
pub struct FrameQueue {
    next_handle: u64,
    due_until: u64,
    frame: u64,
    // Handles are allocated monotonically, so key order is request order.
    queued: BTreeMap<FrameHandle, FrameJob>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn contains(&self, handle: FrameHandle) -> bool {
        self.queued.contains_key(&handle)
    }

    /// Iterates queued jobs in the order they will be delivered.
    pub fn iter(&self) -> impl Iterator<Item = (FrameHandle, FrameJob)> + '_ {
        self.queued.iter().map(|(&handle, &job)| (handle, job))
    }

    /// Starts a new frame: every job queued so far becomes due.
    pub fn begin_frame(&mut self) {
        self.frame = self.frame.saturating_add(1);
        self.due_until = self.next_handle;
    }

    /// Pops the oldest job that is due in the current frame.
    pub fn pop_due(&mut self) -> Option<(FrameHandle, FrameJob)> {
        let (&handle, _) = self.queued.first_key_value()?;
        if handle.get() > self.due_until {
            return None;
        }
        self.queued.pop_first()
    }
}

impl FramePacer for FrameQueue {
    fn request_tick(&mut self, job: FrameJob) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle::new(self.next_handle);
        self.queued.insert(handle, job);
        handle
    }

    fn cancel_tick(&mut self, handle: FrameHandle) -> bool {
        self.queued.remove(&handle).is_some()
    }
}
