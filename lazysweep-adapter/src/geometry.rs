use alloc::vec::Vec;

use crate::AdapterKey;
use crate::key::HandleMap;

/// An element's span on the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub start: u64,
    pub size: u32,
}

impl Extent {
    pub fn new(start: u64, size: u32) -> Self {
        Self { start, size }
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// The scroll container's visible span on the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub offset: u64,
    pub size: u32,
}

impl Viewport {
    pub fn new(offset: u64, size: u32) -> Self {
        Self { offset, size }
    }

    /// `[start, end)` of the viewport grown by `margin` on both sides.
    pub fn expanded(&self, margin: u32) -> (u64, u64) {
        let start = self.offset.saturating_sub(margin as u64);
        let end = self
            .offset
            .saturating_add(self.size as u64)
            .saturating_add(margin as u64);
        (start, end)
    }
}

fn overlaps(extent: Extent, (start, end): (u64, u64)) -> bool {
    extent.size > 0 && extent.start < end && extent.end() > start
}

#[derive(Clone, Copy, Debug)]
struct Tracked {
    extent: Extent,
    // Last state handed out by `take_changes`; `None` until the first report.
    reported: Option<bool>,
}

/// A geometry-based intersection primitive.
///
/// Holds element extents and the viewport, and reports which elements crossed the
/// `viewport ± margin` boundary since the last call to [`IntersectionTracker::take_changes`].
/// Like a DOM intersection observer, the first report after `observe` is always delivered.
#[derive(Clone, Debug)]
pub struct IntersectionTracker<H> {
    elements: HandleMap<H, Tracked>,
    viewport: Viewport,
    margin: u32,
}

impl<H: AdapterKey> IntersectionTracker<H> {
    pub fn new(margin: u32) -> Self {
        Self {
            elements: HandleMap::new(),
            viewport: Viewport::default(),
            margin,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.viewport.offset = offset;
    }

    pub fn set_size(&mut self, size: u32) {
        self.viewport.size = size;
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn set_margin(&mut self, margin: u32) {
        self.margin = margin;
    }

    /// Starts (or restarts) tracking `handle`. Its state is reported on the next
    /// `take_changes`, whatever it is.
    pub fn observe(&mut self, handle: H, extent: Extent) {
        self.elements.insert(
            handle,
            Tracked {
                extent,
                reported: None,
            },
        );
    }

    pub fn unobserve(&mut self, handle: &H) -> bool {
        self.elements.remove(handle).is_some()
    }

    /// Updates the extent of a tracked element. Returns `false` if `handle` is not tracked.
    pub fn set_extent(&mut self, handle: &H, extent: Extent) -> bool {
        match self.elements.get_mut(handle) {
            Some(tracked) => {
                tracked.extent = extent;
                true
            }
            None => false,
        }
    }

    pub fn extent(&self, handle: &H) -> Option<Extent> {
        self.elements.get(handle).map(|t| t.extent)
    }

    /// The last reported state of `handle`, or `None` if it was never reported.
    pub fn is_intersecting(&self, handle: &H) -> Option<bool> {
        self.elements.get(handle).and_then(|t| t.reported)
    }

    /// Zero-size extents never intersect.
    pub fn intersects(&self, extent: Extent) -> bool {
        overlaps(extent, self.viewport.expanded(self.margin))
    }

    /// Returns `(handle, is_intersecting)` for every element whose state changed since it was
    /// last reported, and records the new states.
    pub fn take_changes(&mut self) -> Vec<(H, bool)> {
        let bounds = self.viewport.expanded(self.margin);
        let mut changes = Vec::new();
        for (handle, tracked) in self.elements.iter_mut() {
            let now = overlaps(tracked.extent, bounds);
            if tracked.reported != Some(now) {
                tracked.reported = Some(now);
                changes.push((handle.clone(), now));
            }
        }
        changes
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}
