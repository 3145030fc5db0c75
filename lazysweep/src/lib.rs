//! A headless, frame-paced scheduler for viewport-aware lazy per-item work.
//!
//! For geometry-driven intersection tracking and a ready-made frame loop, see the
//! `lazysweep-adapter` crate.
//!
//! Long lists often carry expensive per-row work (measuring, highlighting, chart drawing). This
//! crate defers that work until a row is near the viewport and spreads it across frames:
//! - a [`VisibilityTracker`] maps element handles to task indices and records enter/leave
//!   transitions,
//! - a [`ScheduleState`] infers the scroll direction from the visible index range,
//! - a [`BatchDispatcher`] sweeps the [`TaskRegistry`] in fixed-size chunks, one chunk per frame,
//!   telling every task whether it is inside the buffer window around the viewport.
//!
//! It is UI-agnostic. The host is expected to provide:
//! - intersection transitions for observed elements
//! - a frame clock, either the bundled [`FrameQueue`] or any [`FramePacer`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

#[macro_use]
mod macros;

mod dispatcher;
mod key;
mod options;
mod pacer;
mod registry;
mod scheduler;
mod state;
mod tracker;
mod types;

#[cfg(test)]
mod tests;

pub use dispatcher::BatchDispatcher;
pub use options::{SchedulerOptions, SweepOverlap};
pub use pacer::{FramePacer, FrameQueue};
pub use registry::TaskRegistry;
pub use scheduler::Scheduler;
pub use state::{ScheduleState, SchedulerStats};
pub use tracker::VisibilityTracker;
pub use types::{
    BufferWindow, Direction, FrameHandle, FrameJob, ScheduledTask, SweepId, Task, TaskIndex,
};

#[doc(hidden)]
pub use key::HandleKey;
