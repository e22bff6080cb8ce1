//! PDF Highlighter Scheduler Library
//!
//! Cancellable timers for a single-threaded, event-driven viewer.
//!
//! Hover delays, grace periods, flash expiry and resize debouncing are all
//! expressed as timers on a [`TimerQueue`] whose clock only moves when the owner
//! advances it. Hosts advance it from a [`MonotonicClock`]; tests advance it by
//! hand.
//!
//! # Example
//!
//! ```
//! use pdf_highlighter_scheduler::KeyedTimers;
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Timer {
//!     HoverShow,
//! }
//!
//! let mut timers = KeyedTimers::new();
//! timers.schedule(Timer::HoverShow, Duration::from_millis(200));
//!
//! // A second pointer-enter supersedes the first timer.
//! timers.schedule(Timer::HoverShow, Duration::from_millis(200));
//! assert_eq!(timers.pending(), 1);
//!
//! assert_eq!(timers.pop_due(Duration::from_millis(200)), Some(Timer::HoverShow));
//! ```

mod cancel;
mod timer;

pub use cancel::CancellationToken;
pub use timer::{Expired, KeyedTimers, MonotonicClock, TimerHandle, TimerId, TimerQueue};
