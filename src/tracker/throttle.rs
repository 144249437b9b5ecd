//! Trailing-edge rate limiter.
//!
//! The first call in an idle period opens a window; calls inside the window
//! replace the pending item; when the window closes the latest item is
//! released once. Nothing runs on the leading edge.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    window_end: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_end: None,
            pending: None,
        }
    }

    /// Queue `item`, replacing anything already pending in this window.
    pub fn schedule(&mut self, item: T, now: Instant) {
        if self.window_end.is_none() {
            self.window_end = Some(now + self.interval);
        }
        self.pending = Some(item);
    }

    /// Drop the pending item and close the window. Returns whether anything
    /// was pending.
    pub fn cancel(&mut self) -> bool {
        self.window_end = None;
        self.pending.take().is_some()
    }

    /// Release the pending item if its window has closed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.window_end {
            Some(end) if end <= now => {
                self.window_end = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// When the current window closes, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.window_end
    }
}
