//! Timer-free debouncing for layout recomputes.
//!
//! Collapses bursts of requests into one immediate (leading) fire and one
//! deferred (trailing) fire. Poll-based: the owner calls [`Debouncer::poll`]
//! from its pump loop instead of scheduling timers.

use std::time::{Duration, Instant};

/// Default coalescing window for layout recomputes.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// Leading + trailing burst coalescer.
pub struct Debouncer {
    window: Duration,
    last_fire: Option<Instant>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
            deadline: None,
        }
    }

    /// Records a request. Returns true when the caller should fire
    /// immediately (leading edge). Requests landing inside the window
    /// schedule a trailing fire instead.
    pub fn request(&mut self, now: Instant) -> bool {
        match self.last_fire {
            Some(last) if now.duration_since(last) < self.window => {
                self.deadline = Some(now + self.window);
                false
            }
            _ => {
                self.last_fire = Some(now);
                self.deadline = None;
                true
            }
        }
    }

    /// Returns true when a deferred trailing fire is due. Consumes the
    /// pending fire.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.last_fire = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Returns true when a trailing fire is scheduled.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
