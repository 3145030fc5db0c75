use alloc::sync::Arc;

use crate::key::HandleKey;
use crate::{
    BatchDispatcher, BufferWindow, Direction, FrameHandle, FrameJob, FramePacer, FrameQueue,
    ScheduleState, ScheduledTask, SchedulerOptions, SchedulerStats, SweepId, SweepOverlap,
    Task, TaskIndex, TaskRegistry, VisibilityTracker,
};

/// A viewport-aware lazy task scheduler.
///
/// The host binds element handles to task indices, registers per-index tasks, and reports
/// intersection transitions. Whenever the visible index range grows past its previous extremes,
/// the scheduler sweeps every registered index, queueing each task on the frame pacer with
/// `(is_in_buffer, direction)`.
///
/// This type is UI-agnostic. Every entry point takes `&mut self`; multi-threaded hosts put it
/// behind a mutex or an actor.
pub struct Scheduler<H, P = FrameQueue> {
    options: SchedulerOptions,
    pacer: P,
    registry: TaskRegistry,
    tracker: VisibilityTracker<H>,
    state: ScheduleState,
    dispatcher: BatchDispatcher,
}

impl<H: HandleKey> Scheduler<H, FrameQueue> {
    /// Creates a scheduler paced by an in-memory [`FrameQueue`]; drive it with [`Self::tick`].
    pub fn new(options: SchedulerOptions) -> Self {
        Self::with_pacer(options, FrameQueue::new())
    }

    /// Runs one frame: every job queued before this call, in request order.
    ///
    /// Returns how many jobs ran. If a task panics, the jobs after it stay queued and run on the
    /// next tick.
    pub fn tick(&mut self) -> usize {
        self.pacer.begin_frame();
        let mut ran = 0;
        while let Some((handle, job)) = self.pacer.pop_due() {
            if self.run_frame(handle, job) {
                ran += 1;
            }
        }
        ran
    }
}

impl<H: HandleKey, P: FramePacer> Scheduler<H, P> {
    pub fn with_pacer(options: SchedulerOptions, pacer: P) -> Self {
        sdebug!(
            buffer_size = options.buffer_size,
            chunk_size = options.chunk_size,
            viewport_margin = options.viewport_margin,
            "Scheduler::new"
        );
        Self {
            options,
            pacer,
            registry: TaskRegistry::new(),
            tracker: VisibilityTracker::new(),
            state: ScheduleState::new(),
            dispatcher: BatchDispatcher::new(),
        }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Replaces the options. Sweeps already running keep their buffer window and direction.
    pub fn set_options(&mut self, options: SchedulerOptions) {
        strace!(?options, "Scheduler::set_options");
        self.options = options;
    }

    pub fn update_options(&mut self, f: impl FnOnce(&mut SchedulerOptions)) {
        let mut next = self.options;
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.options.buffer_size = buffer_size;
    }

    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.options.chunk_size = chunk_size;
    }

    pub fn set_viewport_margin(&mut self, viewport_margin: u32) {
        self.options.viewport_margin = viewport_margin;
    }

    pub fn set_sweep_overlap(&mut self, sweep_overlap: SweepOverlap) {
        self.options.sweep_overlap = sweep_overlap;
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut P {
        &mut self.pacer
    }

    /// Binds `handle` to `index`. A handle that is already observed is rebound, as if it had been
    /// unobserved first.
    pub fn observe(&mut self, handle: H, index: TaskIndex) {
        if self.tracker.index_of(&handle).is_some() {
            self.unobserve(&handle);
        }
        strace!(index, "observe");
        self.tracker.bind(handle, index);
    }

    /// Stops tracking `handle`. Its index leaves the visible set and any in-flight dispatch for it
    /// is cancelled; no sweep is triggered.
    ///
    /// Returns the index the handle was bound to, or `None` if it was not observed.
    pub fn unobserve(&mut self, handle: &H) -> Option<TaskIndex> {
        let index = self.tracker.unbind(handle)?;
        strace!(index, "unobserve");
        self.dispatcher.cancel(index, &mut self.pacer);
        Some(index)
    }

    /// Registers work for `index`. Returns `false` (and keeps the existing task) if `index`
    /// already has one.
    pub fn add_task(
        &mut self,
        index: TaskIndex,
        task: impl Fn(bool, Direction) + Send + Sync + 'static,
    ) -> bool {
        self.add_shared_task(index, Arc::new(task))
    }

    pub fn add_shared_task(&mut self, index: TaskIndex, task: Task) -> bool {
        let added = self.registry.insert(index, task);
        if !added {
            strace!(index, "add_task: index already registered");
        }
        added
    }

    /// Unregisters the task for `index` and cancels its in-flight dispatch, if any.
    pub fn remove_task(&mut self, index: TaskIndex) -> bool {
        let removed = self.registry.remove(index).is_some();
        self.dispatcher.cancel(index, &mut self.pacer);
        removed
    }

    /// Applies one batch of intersection transitions.
    ///
    /// Leaving indices have their in-flight dispatch cancelled. If anything is still visible
    /// afterwards and the visible range grew past its previous extremes, one sweep starts and its
    /// direction is returned.
    pub fn apply_intersections<I>(&mut self, entries: I) -> Option<Direction>
    where
        I: IntoIterator<Item = (H, bool)>,
    {
        let dispatcher = &mut self.dispatcher;
        let pacer = &mut self.pacer;
        self.tracker.apply(entries, |index| {
            if dispatcher.cancel(index, pacer) {
                strace!(index, "cancelled task for leaving index");
            }
        });

        let (min, max) = self.tracker.extremes()?;
        let direction = self.state.advance(min, max)?;
        self.sweep(direction);
        Some(direction)
    }

    /// Starts a sweep in `direction` using the current visible range.
    ///
    /// Returns `None` without doing anything when nothing is visible.
    pub fn sweep(&mut self, direction: Direction) -> Option<SweepId> {
        let (min, max) = self.tracker.extremes()?;
        if self.options.sweep_overlap == SweepOverlap::Supersede {
            let superseded = self.dispatcher.cancel_sweeps(&mut self.pacer);
            if superseded > 0 {
                sdebug!(superseded, "superseded running sweeps");
            }
        }
        let window = BufferWindow::around(min, max, self.options.buffer_size);
        Some(self.dispatcher.start(
            direction,
            window,
            &self.registry,
            &mut self.pacer,
            self.options.effective_chunk_size(),
        ))
    }

    /// Executes a job delivered by the pacer for `handle`.
    ///
    /// Returns `false` when the handle is stale (cancelled, superseded, or disposed). A panicking
    /// task propagates out of this call; its in-flight entry is already gone by then.
    pub fn run_frame(&mut self, handle: FrameHandle, job: FrameJob) -> bool {
        match job {
            FrameJob::Chunk(sweep) => self.dispatcher.resume(
                sweep,
                handle,
                &self.registry,
                &mut self.pacer,
                self.options.effective_chunk_size(),
            ),
            FrameJob::Fire(index) => {
                let Some(scheduled) = self.dispatcher.claim(index, handle) else {
                    return false;
                };
                let Some(task) = self.registry.get(index) else {
                    swarn!(index, "in-flight task without a registration");
                    return false;
                };
                task(scheduled.in_buffer, scheduled.direction);
                true
            }
        }
    }

    /// Unobserves every element, cancels every pending frame, and forgets all tasks and state.
    ///
    /// The scheduler can be reused afterwards.
    pub fn dispose(&mut self) {
        sdebug!(
            observed = self.tracker.observed_len(),
            registered = self.registry.len(),
            in_flight = self.dispatcher.in_flight_len(),
            "Scheduler::dispose"
        );
        self.dispatcher.cancel_all(&mut self.pacer);
        self.tracker.clear();
        self.registry.clear();
        self.state.reset();
    }

    pub fn schedule_state(&self) -> ScheduleState {
        self.state
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &VisibilityTracker<H> {
        &self.tracker
    }

    pub fn dispatcher(&self) -> &BatchDispatcher {
        &self.dispatcher
    }

    pub fn has_task(&self, index: TaskIndex) -> bool {
        self.registry.contains(index)
    }

    pub fn is_visible(&self, index: TaskIndex) -> bool {
        self.tracker.is_visible(index)
    }

    pub fn is_scheduled(&self, index: TaskIndex) -> bool {
        self.dispatcher.scheduled(index).is_some()
    }

    pub fn scheduled(&self, index: TaskIndex) -> Option<ScheduledTask> {
        self.dispatcher.scheduled(index).copied()
    }

    /// Visible indices, ascending.
    pub fn visible_indices(&self) -> impl Iterator<Item = TaskIndex> + '_ {
        self.tracker.visible()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            registered: self.registry.len(),
            observed: self.tracker.observed_len(),
            visible: self.tracker.visible_len(),
            in_flight: self.dispatcher.in_flight_len(),
            active_sweeps: self.dispatcher.active_sweeps(),
        }
    }
}

impl<H, P: core::fmt::Debug> core::fmt::Debug for Scheduler<H, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("options", &self.options)
            .field("pacer", &self.pacer)
            .field("registry", &self.registry)
            .field("state", &self.state)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
