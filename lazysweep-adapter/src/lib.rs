//! Adapter utilities for the `lazysweep` crate.
//!
//! The `lazysweep` crate is UI-agnostic: it consumes intersection transitions and a frame clock.
//! This crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - Geometry-based intersection tracking (element extents against a margin-expanded viewport)
//! - A `Controller` that owns the scheduler and its frame queue and advances one frame per `tick`
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod geometry;
mod key;


pub use controller::Controller;
pub use geometry::{Extent, IntersectionTracker, Viewport};
pub use key::AdapterKey;
