//! Scroll-driven active heading tracking.
//!
//! This module turns scroll events into an `(active index, progress)` pair
//! and drives animated navigation between headings.
//!
//! # Module Structure
//!
//! - `geometry` - [`Geometry`] capability trait and clamping helpers
//! - `throttle` - Trailing-edge rate limiter for scroll recomputation
//! - `resolver` - Pure mapping from scroll sample to [`ScrollState`]
//! - `spring` - Damped spring animation for scroll offsets
//! - `navigator` - Animate, settle, then pin a heading
//! - `subscription` - Channel-backed scroll events with drop-to-unsubscribe
//! - `state` - [`OutlineTracker`], which owns and coordinates all of the above
//!
//! Everything here runs on the caller's event loop. Time is passed in as
//! `tokio::time::Instant`, and [`OutlineTracker::next_deadline`] tells the
//! loop when to poll next.

mod geometry;
mod navigator;
mod resolver;
mod spring;
mod state;
mod subscription;
mod throttle;

#[cfg(test)]
mod testing;

pub use geometry::{clamp_unit, sanitize, Geometry, ListViewport};
pub use navigator::{NavigateError, Navigator, NavigatorEvent};
pub use resolver::{reading_offset, resolve, ActivePosition, ScrollSample, ScrollState};
pub use spring::{SpringParams, SpringScroll, SpringStep, FRAME_INTERVAL};
pub use state::{ItemStatus, OutlineTracker};
pub use subscription::{ContainerId, ScrollEmitter, ScrollEvent, ScrollSubscription};
pub use throttle::Throttle;
