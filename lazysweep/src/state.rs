use crate::{Direction, TaskIndex};

/// Running extremes of the visible index set, used to infer scroll direction.
///
/// `None` stands for "never observed": `-inf` for the maximum and `+inf` for the minimum.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleState {
    pub max_visible: Option<TaskIndex>,
    pub min_visible: Option<TaskIndex>,
}

impl ScheduleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Infers a direction from the extremes of a non-empty visible set, then records them.
    ///
    /// `Down` wins over `Up` when the range grew both ways. The extremes are overwritten even when
    /// the range narrowed, so only growth past the previous bounds yields a direction.
    pub fn advance(&mut self, min: TaskIndex, max: TaskIndex) -> Option<Direction> {
        debug_assert!(min <= max, "ScheduleState::advance: min > max ({min} > {max})");
        let direction = if self.max_visible.is_none_or(|prev| max > prev) {
            Some(Direction::Down)
        } else if self.min_visible.is_none_or(|prev| min < prev) {
            Some(Direction::Up)
        } else {
            None
        };
        self.max_visible = Some(max);
        self.min_visible = Some(min);
        direction
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A point-in-time summary of scheduler bookkeeping.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerStats {
    pub registered: usize,
    pub observed: usize,
    pub visible: usize,
    pub in_flight: usize,
    pub active_sweeps: usize,
}
