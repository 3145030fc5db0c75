use alloc::sync::Arc;

/// Caller-owned position of an item in the list.
pub type TaskIndex = usize;

/// Deferred per-item work.
///
/// Invoked as `task(is_in_buffer, direction)` on the frame after a sweep queued it.
pub type Task = Arc<dyn Fn(bool, Direction) + Send + Sync>;

/// Scroll direction inferred from the visible index range growing past its previous extremes.
///
/// "No movement past the extremes" is expressed as `Option::<Direction>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
}

/// Inclusive index range that counts as "near the viewport" for one sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferWindow {
    pub start: TaskIndex,
    pub end: TaskIndex, // inclusive
}

impl BufferWindow {
    /// Builds `[min_visible - buffer, max_visible + buffer]`, saturating at both ends.
    pub fn around(min_visible: TaskIndex, max_visible: TaskIndex, buffer: usize) -> Self {
        Self {
            start: min_visible.saturating_sub(buffer),
            end: max_visible.saturating_add(buffer),
        }
    }

    pub fn contains(&self, index: TaskIndex) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Opaque handle returned by a [`crate::FramePacer`] for one requested tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifies one sweep over the task registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepId(u64);

impl SweepId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Work a pacer hands back to [`crate::Scheduler::run_frame`] when its tick arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameJob {
    /// Process the next chunk of a sweep.
    Chunk(SweepId),
    /// Invoke the task registered for an index.
    Fire(TaskIndex),
}

/// An in-flight dispatch of a task that has not executed yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledTask {
    pub index: TaskIndex,
    pub handle: FrameHandle,
    pub in_buffer: bool,
    pub direction: Direction,
    pub sweep: SweepId,
}
