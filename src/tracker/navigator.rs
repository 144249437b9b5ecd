//! Animated jump to a heading.
//!
//! A navigation runs in two phases. While animating, each poll steps a
//! spring and writes the container's scroll offset. Once the spring
//! settles, a short quiet window follows in which scroll events are treated
//! as stale; when it ends the caller pins the active heading.

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use super::geometry::{sanitize, Geometry};
use super::spring::{SpringParams, SpringScroll, SpringStep, FRAME_INTERVAL};
use crate::outline::NodeId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigateError {
    #[error("No scroll container attached")]
    Detached,

    #[error("No heading at index {0}")]
    UnknownHeading(usize),

    #[error("Heading {0} is no longer in the document")]
    TargetDetached(usize),
}

/// What a navigator poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorEvent {
    /// The animation moved the container.
    Moved,
    /// The animation came to rest; the quiet window has started.
    Settled { index: usize },
    /// The quiet window ended; heading `index` should become active.
    Landed { index: usize },
    /// The target left the layout mid-animation.
    Abandoned { index: usize },
}

#[derive(Debug)]
enum Phase {
    Idle,
    Animating {
        index: usize,
        node: NodeId,
        spring: SpringScroll,
        next_frame: Instant,
    },
    Settling {
        index: usize,
        until: Instant,
    },
}

#[derive(Debug)]
pub struct Navigator {
    phase: Phase,
    offset: f64,
    settle_delay: Duration,
    spring: SpringParams,
}

impl Navigator {
    pub fn new(offset: f64, settle_delay: Duration, spring: SpringParams) -> Self {
        Self {
            phase: Phase::Idle,
            offset,
            settle_delay,
            spring,
        }
    }

    /// Begin animating toward heading `index`, replacing any navigation in
    /// progress.
    pub fn start<G: Geometry + ?Sized>(
        &mut self,
        index: usize,
        node: NodeId,
        geometry: &G,
        now: Instant,
    ) -> Result<(), NavigateError> {
        self.cancel();

        let top = geometry
            .element_top(node)
            .ok_or(NavigateError::TargetDetached(index))?;
        let max = sanitize(geometry.max_scroll_top());
        let target = (sanitize(top) + self.offset).clamp(0.0, max);
        let from = sanitize(geometry.scroll_top());

        tracing::debug!(index, from, target, "Navigating to heading");
        self.phase = Phase::Animating {
            index,
            node,
            spring: SpringScroll::new(from, target, self.spring, now),
            next_frame: now,
        };
        Ok(())
    }

    /// Abandon any navigation, including a pending quiet window.
    pub fn cancel(&mut self) {
        if !matches!(self.phase, Phase::Idle) {
            tracing::trace!("Cancelled navigation");
        }
        self.phase = Phase::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Inside the post-settle window where scroll events are stale.
    pub fn is_quiet(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }

    /// End of the quiet window, while one is running.
    pub fn quiet_until(&self) -> Option<Instant> {
        match self.phase {
            Phase::Settling { until, .. } => Some(until),
            _ => None,
        }
    }

    /// When the navigator next needs a poll.
    pub fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Idle => None,
            Phase::Animating { next_frame, .. } => Some(next_frame),
            Phase::Settling { until, .. } => Some(until),
        }
    }

    pub fn poll<G: Geometry + ?Sized>(
        &mut self,
        geometry: &mut G,
        now: Instant,
    ) -> Option<NavigatorEvent> {
        match &mut self.phase {
            Phase::Idle => None,
            Phase::Animating {
                index,
                node,
                spring,
                next_frame,
            } => {
                if now < *next_frame {
                    return None;
                }
                let index = *index;
                if geometry.element_top(*node).is_none() {
                    tracing::warn!(index, "Navigation target detached, abandoning scroll");
                    self.phase = Phase::Idle;
                    return Some(NavigatorEvent::Abandoned { index });
                }

                let step = spring.step(now);
                geometry.set_scroll_top(step.position());
                match step {
                    SpringStep::Moving(_) => {
                        *next_frame = now + FRAME_INTERVAL;
                        Some(NavigatorEvent::Moved)
                    }
                    SpringStep::Settled(top) => {
                        tracing::debug!(index, top, "Navigation settled");
                        self.phase = Phase::Settling {
                            index,
                            until: now + self.settle_delay,
                        };
                        Some(NavigatorEvent::Settled { index })
                    }
                }
            }
            Phase::Settling { index, until } => {
                if now < *until {
                    return None;
                }
                let index = *index;
                self.phase = Phase::Idle;
                Some(NavigatorEvent::Landed { index })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::Outline;
    use crate::tracker::testing::{sample_document, TestGeometry};

    fn navigator() -> Navigator {
        Navigator::new(-100.0, Duration::from_millis(36), SpringParams::default())
    }

    fn geometry() -> (Outline, TestGeometry) {
        let outline = Outline::extract(Some(&sample_document()));
        let geometry = TestGeometry::new(&outline, &[0.0, 1000.0, 2000.0, 3000.0]);
        (outline, geometry)
    }

    /// Poll every frame until the navigator reports something other than
    /// `Moved`, returning that event and when it happened.
    fn run_frames(
        nav: &mut Navigator,
        geometry: &mut TestGeometry,
        mut now: Instant,
    ) -> (Option<NavigatorEvent>, Instant) {
        for _ in 0..1000 {
            match nav.poll(geometry, now) {
                Some(NavigatorEvent::Moved) | None => {}
                other => return (other, now),
            }
            now = nav.deadline().unwrap_or(now);
        }
        panic!("navigation never settled");
    }

    #[test]
    fn test_target_includes_offset() {
        let (outline, mut geo) = geometry();
        let mut nav = navigator();
        let now = Instant::now();
        nav.start(2, outline.entries()[2].node, &geo, now).unwrap();
        assert!(!nav.is_idle());

        let (event, settled_at) = run_frames(&mut nav, &mut geo, now);
        assert_eq!(event, Some(NavigatorEvent::Settled { index: 2 }));
        assert_eq!(geo.scroll_top, 1900.0);
        assert!(nav.is_quiet());
        assert_eq!(nav.deadline(), Some(settled_at + Duration::from_millis(36)));
    }

    #[test]
    fn test_lands_after_quiet_window() {
        let (outline, mut geo) = geometry();
        let mut nav = navigator();
        let now = Instant::now();
        nav.start(1, outline.entries()[1].node, &geo, now).unwrap();
        let (_, settled_at) = run_frames(&mut nav, &mut geo, now);

        assert_eq!(nav.poll(&mut geo, settled_at + Duration::from_millis(20)), None);
        assert_eq!(
            nav.poll(&mut geo, settled_at + Duration::from_millis(36)),
            Some(NavigatorEvent::Landed { index: 1 })
        );
        assert!(nav.is_idle());
        assert_eq!(nav.deadline(), None);
    }

    #[test]
    fn test_target_clamped_to_scroll_range() {
        let (outline, mut geo) = geometry();
        let mut nav = navigator();
        let now = Instant::now();
        nav.start(0, outline.entries()[0].node, &geo, now).unwrap();
        let _ = run_frames(&mut nav, &mut geo, now);
        assert_eq!(geo.scroll_top, 0.0);

        // Content is 5000 tall with an 800 viewport
        geo.tops.insert(outline.entries()[3].node, 4900.0);
        nav.start(3, outline.entries()[3].node, &geo, now).unwrap();
        let _ = run_frames(&mut nav, &mut geo, now);
        assert_eq!(geo.scroll_top, 4200.0);
    }

    #[test]
    fn test_start_on_missing_element_fails() {
        let (_, geo) = geometry();
        let mut nav = navigator();
        let err = nav.start(1, NodeId(99), &geo, Instant::now()).unwrap_err();
        assert_eq!(err, NavigateError::TargetDetached(1));
        assert!(nav.is_idle());
    }

    #[test]
    fn test_cancel_clears_quiet_window() {
        let (outline, mut geo) = geometry();
        let mut nav = navigator();
        let now = Instant::now();
        nav.start(1, outline.entries()[1].node, &geo, now).unwrap();
        let _ = run_frames(&mut nav, &mut geo, now);
        assert!(nav.is_quiet());
        nav.cancel();
        assert!(!nav.is_quiet());
        assert!(nav.is_idle());
        assert_eq!(nav.quiet_until(), None);
    }
}
