/// How a new sweep treats sweeps that are still walking the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SweepOverlap {
    /// Older sweeps keep running; their chunks interleave with the new one on the frame queue.
    #[default]
    Interleave,
    /// Starting a sweep cancels the pending chunk frames of every older sweep.
    ///
    /// Tasks an older sweep already queued stay queued.
    Supersede,
}

/// Configuration for [`crate::Scheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerOptions {
    /// Index distance beyond the visible range that still counts as in-buffer.
    pub buffer_size: usize,
    /// Registered indices processed per frame tick. `0` behaves like `1`.
    pub chunk_size: usize,
    /// Pre-trigger distance (in scroll-axis units) before an element is reported as intersecting.
    ///
    /// The scheduler itself never measures geometry; this value is read by the intersection
    /// primitive feeding it (see the `lazysweep-adapter` crate).
    pub viewport_margin: u32,
    pub sweep_overlap: SweepOverlap,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            buffer_size: 20,
            chunk_size: 10,
            viewport_margin: 200,
            sweep_overlap: SweepOverlap::Interleave,
        }
    }
}

impl SchedulerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_viewport_margin(mut self, viewport_margin: u32) -> Self {
        self.viewport_margin = viewport_margin;
        self
    }

    pub fn with_sweep_overlap(mut self, sweep_overlap: SweepOverlap) -> Self {
        self.sweep_overlap = sweep_overlap;
        self
    }

    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
