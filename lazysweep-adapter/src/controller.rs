use lazysweep::{Direction, FrameQueue, Scheduler, SchedulerOptions, SchedulerStats, TaskIndex};

use crate::{AdapterKey, Extent, IntersectionTracker, Viewport};

/// A framework-neutral controller that pairs a [`Scheduler`] with a geometry-based
/// [`IntersectionTracker`].
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `observe` / `set_extent` / `unobserve` when rows mount, move, or unmount
/// - `on_scroll` / `on_viewport_size` when UI events occur
/// - `tick()` once per frame
///
/// Geometry changes are collected and delivered to the scheduler as one batch at the start of the
/// next `tick()` (or an explicit `flush()`), the way an intersection observer reports once per
/// frame.
pub struct Controller<H> {
    scheduler: Scheduler<H, FrameQueue>,
    intersections: IntersectionTracker<H>,
}

impl<H: AdapterKey> Controller<H> {
    pub fn new(options: SchedulerOptions) -> Self {
        Self {
            intersections: IntersectionTracker::new(options.viewport_margin),
            scheduler: Scheduler::new(options),
        }
    }

    pub fn scheduler(&self) -> &Scheduler<H, FrameQueue> {
        &self.scheduler
    }

    pub fn intersections(&self) -> &IntersectionTracker<H> {
        &self.intersections
    }

    pub fn options(&self) -> &SchedulerOptions {
        self.scheduler.options()
    }

    /// Clones the current options, applies `f`, and keeps the tracker's margin in sync.
    pub fn update_options(&mut self, f: impl FnOnce(&mut SchedulerOptions)) {
        self.scheduler.update_options(f);
        self.intersections.set_margin(self.scheduler.options().viewport_margin);
    }

    pub fn viewport(&self) -> Viewport {
        self.intersections.viewport()
    }

    pub fn on_viewport(&mut self, viewport: Viewport) {
        self.intersections.set_viewport(viewport);
    }

    pub fn on_viewport_size(&mut self, size: u32) {
        self.intersections.set_size(size);
    }

    /// Call this when the UI reports a scroll offset change.
    pub fn on_scroll(&mut self, offset: u64) {
        self.intersections.set_offset(offset);
    }

    /// Starts tracking a row. Re-observing a handle rebinds it to `index` and `extent`.
    pub fn observe(&mut self, handle: H, index: TaskIndex, extent: Extent) {
        self.scheduler.observe(handle.clone(), index);
        self.intersections.observe(handle, extent);
    }

    pub fn set_extent(&mut self, handle: &H, extent: Extent) -> bool {
        self.intersections.set_extent(handle, extent)
    }

    /// Stops tracking a row; its pending task dispatch is cancelled.
    pub fn unobserve(&mut self, handle: &H) -> Option<TaskIndex> {
        self.intersections.unobserve(handle);
        self.scheduler.unobserve(handle)
    }

    pub fn add_task(
        &mut self,
        index: TaskIndex,
        task: impl Fn(bool, Direction) + Send + Sync + 'static,
    ) -> bool {
        self.scheduler.add_task(index, task)
    }

    pub fn remove_task(&mut self, index: TaskIndex) -> bool {
        self.scheduler.remove_task(index)
    }

    /// Delivers pending intersection changes to the scheduler as a single batch.
    ///
    /// Returns the direction of the sweep this started, if any.
    pub fn flush(&mut self) -> Option<Direction> {
        let changes = self.intersections.take_changes();
        if changes.is_empty() {
            return None;
        }
        atrace!(changes = changes.len(), "flush intersections");
        self.scheduler.apply_intersections(changes)
    }

    /// Advances one frame: flushes geometry changes, then runs every due job.
    ///
    /// Returns how many jobs ran.
    pub fn tick(&mut self) -> usize {
        self.flush();
        self.scheduler.tick()
    }

    /// `true` while frames are queued.
    pub fn is_busy(&self) -> bool {
        !self.scheduler.pacer().is_empty()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Stops tracking every row and cancels all pending work. The viewport is kept.
    pub fn dispose(&mut self) {
        self.intersections.clear();
        self.scheduler.dispose();
    }
}

impl<H> core::fmt::Debug for Controller<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
