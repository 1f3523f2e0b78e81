#![forbid(unsafe_code)]

//! Monotonic frame clocks.
//!
//! The settle animation samples a [`FrameClock`] on every `tick`. Production
//! hosts use [`SystemClock`]; tests drive a [`ManualClock`] so animation
//! frames are fully deterministic.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Monotonic time source for the settle animation.
pub trait FrameClock {
    /// Elapsed time since an unspecified epoch, monotonically increasing.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`web_time::Instant`] (works on wasm too).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Move time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time. Going backwards is ignored.
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: FrameClock + ?Sized> FrameClock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
