use alloc::collections::{BTreeMap, BTreeSet};

use crate::TaskIndex;
use crate::key::{HandleKey, HandleMap};

/// Maps element handles to task indices and tracks which indices are currently intersecting.
///
/// The tracker does not compute intersections itself: the host's intersection primitive reports
/// transitions through [`VisibilityTracker::apply`].
#[derive(Clone, Debug)]
pub struct VisibilityTracker<H> {
    observed: HandleMap<H, TaskIndex>,
    // Number of handles bound to each index; more than one is a caller bug.
    bound: BTreeMap<TaskIndex, usize>,
    visible: BTreeSet<TaskIndex>,
}

impl<H: HandleKey> Default for VisibilityTracker<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HandleKey> VisibilityTracker<H> {
    pub fn new() -> Self {
        Self {
            observed: HandleMap::new(),
            bound: BTreeMap::new(),
            visible: BTreeSet::new(),
        }
    }

    /// Binds `handle` to `index`. The handle must not be bound already.
    pub(crate) fn bind(&mut self, handle: H, index: TaskIndex) {
        let count = self.bound.entry(index).or_insert(0);
        *count += 1;
        if *count > 1 {
            swarn!(index, handles = *count, "VisibilityTracker: index bound to several handles");
        }
        self.observed.insert(handle, index);
    }

    /// Unbinds `handle` and drops its index from the visible set.
    ///
    /// Returns the index it was bound to, or `None` if the handle was not observed.
    pub(crate) fn unbind(&mut self, handle: &H) -> Option<TaskIndex> {
        let index = self.observed.remove(handle)?;
        if let Some(count) = self.bound.get_mut(&index) {
            *count -= 1;
            if *count == 0 {
                self.bound.remove(&index);
            }
        }
        self.visible.remove(&index);
        Some(index)
    }

    /// Applies one batch of `(handle, is_intersecting)` transitions.
    ///
    /// Entries for unknown handles are dropped. `on_leave` is called for every leave transition,
    /// whether or not the index was visible before.
    pub fn apply<I>(&mut self, entries: I, mut on_leave: impl FnMut(TaskIndex))
    where
        I: IntoIterator<Item = (H, bool)>,
    {
        for (handle, is_intersecting) in entries {
            let Some(&index) = self.observed.get(&handle) else {
                strace!(is_intersecting, "VisibilityTracker: transition for unobserved handle");
                continue;
            };
            if is_intersecting {
                self.visible.insert(index);
            } else {
                self.visible.remove(&index);
                on_leave(index);
            }
        }
    }

    /// `(min, max)` of the visible set, or `None` when nothing is visible.
    pub fn extremes(&self) -> Option<(TaskIndex, TaskIndex)> {
        let min = *self.visible.first()?;
        let max = *self.visible.last()?;
        Some((min, max))
    }

    pub fn index_of(&self, handle: &H) -> Option<TaskIndex> {
        self.observed.get(handle).copied()
    }

    pub fn is_visible(&self, index: TaskIndex) -> bool {
        self.visible.contains(&index)
    }

    /// Visible indices, ascending.
    pub fn visible(&self) -> impl Iterator<Item = TaskIndex> + '_ {
        self.visible.iter().copied()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn observed_len(&self) -> usize {
        self.observed.len()
    }

    pub(crate) fn clear(&mut self) {
        self.observed.clear();
        self.bound.clear();
        self.visible.clear();
    }
}
