//! Core systems for Horizon Collapse.
//!
//! This crate provides the reactive and scheduling primitives a collapsible
//! panel is built on:
//!
//! - **Signal/Slot System**: Change notification between a group and its items
//! - **Property System**: Change-detecting properties and cached bindings
//! - **Frame Scheduling**: Microtask, next-frame and frame-after-next deferral
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Example
//!
//! ```
//! use horizon_collapse_core::{FrameQueue, FrameScheduler, Property, Signal};
//! use std::sync::Arc;
//!
//! let expanded = Property::new(false);
//! let changed = Signal::<bool>::new();
//! let frames = Arc::new(FrameQueue::new());
//!
//! let frames_clone = frames.clone();
//! changed.connect(move |&now| {
//!     frames_clone.run_on_next_frame(Box::new(move || {
//!         println!("expanded is now {now}");
//!     }));
//! });
//!
//! if let Some(was) = expanded.replace(true) {
//!     changed.emit(!was);
//! }
//! frames.advance_frame();
//! ```

pub mod frame;
pub mod logging;
pub mod property;
pub mod signal;

pub use frame::{FrameQueue, FrameScheduler, FrameTask, ImmediateScheduler};
pub use logging::PerfSpan;
pub use property::{Binding, Property};
pub use signal::{ConnectionId, Signal};
