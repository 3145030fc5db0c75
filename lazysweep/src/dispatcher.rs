use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::{
    BufferWindow, Direction, FrameHandle, FrameJob, FramePacer, ScheduledTask, SweepId,
    TaskIndex, TaskRegistry,
};

#[derive(Clone, Debug)]
struct Sweep {
    direction: Direction,
    window: BufferWindow,
    // Registered indices at sweep start, ascending.
    indices: Vec<TaskIndex>,
    cursor: usize,
    pending: Option<FrameHandle>,
}

/// Walks the registry in fixed-size chunks, one chunk per frame, and queues each task on a frame
/// of its own.
///
/// Holds every in-flight [`ScheduledTask`] (at most one per index) and every sweep that still has
/// a chunk pending.
#[derive(Clone, Debug, Default)]
pub struct BatchDispatcher {
    sweeps: BTreeMap<SweepId, Sweep>,
    scheduled: BTreeMap<TaskIndex, ScheduledTask>,
    next_sweep: u64,
}

impl BatchDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a sweep over a snapshot of `registry` and runs its first chunk immediately.
    pub(crate) fn start<P: FramePacer + ?Sized>(
        &mut self,
        direction: Direction,
        window: BufferWindow,
        registry: &TaskRegistry,
        pacer: &mut P,
        chunk_size: usize,
    ) -> SweepId {
        self.next_sweep = self.next_sweep.wrapping_add(1);
        let id = SweepId::new(self.next_sweep);
        let sweep = Sweep {
            direction,
            window,
            indices: registry.indices().collect(),
            cursor: 0,
            pending: None,
        };
        sdebug!(
            sweep = id.get(),
            ?direction,
            window_start = window.start,
            window_end = window.end,
            tasks = sweep.indices.len(),
            "sweep started"
        );
        self.sweeps.insert(id, sweep);
        self.process_chunk(id, registry, pacer, chunk_size);
        id
    }

    /// Runs the chunk a pacer delivered for `handle`. Stale or cancelled handles are ignored.
    pub(crate) fn resume<P: FramePacer + ?Sized>(
        &mut self,
        id: SweepId,
        handle: FrameHandle,
        registry: &TaskRegistry,
        pacer: &mut P,
        chunk_size: usize,
    ) -> bool {
        match self.sweeps.get(&id) {
            Some(sweep) if sweep.pending == Some(handle) => {}
            _ => return false,
        }
        self.process_chunk(id, registry, pacer, chunk_size);
        true
    }

    fn process_chunk<P: FramePacer + ?Sized>(
        &mut self,
        id: SweepId,
        registry: &TaskRegistry,
        pacer: &mut P,
        chunk_size: usize,
    ) {
        let Some(mut sweep) = self.sweeps.remove(&id) else {
            return;
        };
        sweep.pending = None;

        let end = sweep.cursor.saturating_add(chunk_size).min(sweep.indices.len());
        strace!(sweep = id.get(), from = sweep.cursor, to = end, "sweep chunk");
        for &index in &sweep.indices[sweep.cursor..end] {
            self.visit(index, id, sweep.window, sweep.direction, registry, pacer);
        }
        sweep.cursor = end;

        if sweep.cursor < sweep.indices.len() {
            sweep.pending = Some(pacer.request_tick(FrameJob::Chunk(id)));
            self.sweeps.insert(id, sweep);
        } else {
            sdebug!(sweep = id.get(), "sweep finished");
        }
    }

    fn visit<P: FramePacer + ?Sized>(
        &mut self,
        index: TaskIndex,
        sweep: SweepId,
        window: BufferWindow,
        direction: Direction,
        registry: &TaskRegistry,
        pacer: &mut P,
    ) {
        let in_buffer = window.contains(index);

        // Out-of-buffer work already in flight is dropped, not re-queued.
        if let Some(prev) = self.scheduled.remove(&index) {
            pacer.cancel_tick(prev.handle);
            if !in_buffer {
                strace!(index, "cancelled out-of-buffer task");
                return;
            }
        }

        if !registry.contains(index) {
            return;
        }

        let handle = pacer.request_tick(FrameJob::Fire(index));
        self.scheduled.insert(
            index,
            ScheduledTask {
                index,
                handle,
                in_buffer,
                direction,
                sweep,
            },
        );
    }

    /// Claims the in-flight entry a pacer delivered for `handle`, if it is still current.
    pub(crate) fn claim(&mut self, index: TaskIndex, handle: FrameHandle) -> Option<ScheduledTask> {
        match self.scheduled.get(&index) {
            Some(task) if task.handle == handle => self.scheduled.remove(&index),
            _ => None,
        }
    }

    /// Cancels the in-flight dispatch for `index`, if any.
    pub(crate) fn cancel<P: FramePacer + ?Sized>(&mut self, index: TaskIndex, pacer: &mut P) -> bool {
        let Some(prev) = self.scheduled.remove(&index) else {
            return false;
        };
        pacer.cancel_tick(prev.handle);
        true
    }

    /// Cancels the pending chunk frames of every active sweep.
    pub(crate) fn cancel_sweeps<P: FramePacer + ?Sized>(&mut self, pacer: &mut P) -> usize {
        let cancelled = self.sweeps.len();
        for (_, sweep) in core::mem::take(&mut self.sweeps) {
            if let Some(handle) = sweep.pending {
                pacer.cancel_tick(handle);
            }
        }
        cancelled
    }

    /// Cancels every pending frame: sweep chunks and in-flight tasks.
    pub(crate) fn cancel_all<P: FramePacer + ?Sized>(&mut self, pacer: &mut P) {
        self.cancel_sweeps(pacer);
        for (_, task) in core::mem::take(&mut self.scheduled) {
            pacer.cancel_tick(task.handle);
        }
    }

    pub fn scheduled(&self, index: TaskIndex) -> Option<&ScheduledTask> {
        self.scheduled.get(&index)
    }

    /// In-flight tasks, ascending by index.
    pub fn in_flight(&self) -> impl Iterator<Item = &ScheduledTask> + '_ {
        self.scheduled.values()
    }

    pub fn in_flight_len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn active_sweeps(&self) -> usize {
        self.sweeps.len()
    }

    pub fn is_sweep_active(&self, id: SweepId) -> bool {
        self.sweeps.contains_key(&id)
    }
}
