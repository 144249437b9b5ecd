use tokio::time::Instant;

use super::geometry::{Geometry, ListViewport};
use super::navigator::{NavigateError, Navigator, NavigatorEvent};
use super::resolver::{resolve, ScrollSample, ScrollState};
use super::subscription::ScrollSubscription;
use super::throttle::Throttle;
use crate::config::TrackerConfig;
use crate::outline::{Document, OffsetCache, Outline, OutlineEntry, RangeIndex};

/// Display status of one outline item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStatus {
    /// Entirely above the active section.
    pub past: bool,
    /// The active section, already entered.
    pub active: bool,
    /// Live progress for the active item, 0 otherwise.
    pub progress: f64,
    /// Indentation relative to the root heading level.
    pub indent: u16,
}

/// Work deferred until the host's next low-priority point.
#[derive(Debug, Default)]
struct PendingRebuild {
    pending: bool,
    headings_changed: bool,
    container_height: Option<f64>,
}

/// Owns the outline, range table and scroll state for one document in one
/// scroll container.
///
/// The host drives it from its event loop:
///
/// 1. [`set_document`](Self::set_document) when content changes,
///    [`observe_container`](Self::observe_container) after layout
/// 2. [`attach`](Self::attach) a subscription once the container exists
/// 3. [`poll`](Self::poll) whenever [`next_deadline`](Self::next_deadline)
///    passes or input arrives
/// 4. [`run_deferred`](Self::run_deferred) at idle points to rebuild ranges
#[derive(Debug)]
pub struct OutlineTracker {
    config: TrackerConfig,
    outline: Outline,
    ranges: RangeIndex,
    offsets: OffsetCache,
    rebuild: PendingRebuild,
    throttle: Throttle<Instant>,
    navigator: Navigator,
    subscription: Option<ScrollSubscription>,
    state: ScrollState,
    list: ListViewport,
}

impl OutlineTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            throttle: Throttle::new(config.throttle_interval()),
            navigator: Navigator::new(
                config.navigate_offset,
                config.settle_delay(),
                config.spring(),
            ),
            config,
            outline: Outline::default(),
            ranges: RangeIndex::default(),
            offsets: OffsetCache::default(),
            rebuild: PendingRebuild::default(),
            subscription: None,
            state: ScrollState::INITIAL,
            list: ListViewport::default(),
        }
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn ranges(&self) -> &RangeIndex {
        &self.ranges
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn list(&self) -> &ListViewport {
        &self.list
    }

    /// Size the outline list viewport. Keeps its scroll offset.
    pub fn set_list_viewport(&mut self, height: f64, item_height: f64) {
        let scroll_top = self.list.scroll_top;
        self.list = ListViewport::new(height, item_height);
        self.list.scroll_top = scroll_top;
    }

    /// Scroll the outline list so item `index` is visible.
    pub fn reveal_item(&mut self, index: usize) -> bool {
        self.list.reveal(index)
    }

    pub fn is_navigating(&self) -> bool {
        !self.navigator.is_idle()
    }

    // ------------------------------------------------------------------------
    // Content and layout
    // ------------------------------------------------------------------------

    /// Replace the tracked document and re-extract its outline.
    ///
    /// Scroll state resets and any navigation is dropped, since indexes from
    /// the previous outline mean nothing now. Ranges are rebuilt on the next
    /// [`run_deferred`](Self::run_deferred).
    pub fn set_document(&mut self, root: Option<&Document>) {
        self.outline = Outline::extract(root);
        self.ranges = RangeIndex::default();
        self.state = ScrollState::INITIAL;
        self.list.scroll_top = 0.0;
        self.navigator.cancel();
        self.throttle.cancel();
        self.rebuild.pending = true;
        self.rebuild.headings_changed = true;
    }

    /// Report the container's measured content height; a change schedules a
    /// range rebuild.
    pub fn observe_container(&mut self, height: f64) {
        if self.rebuild.container_height != Some(height) {
            tracing::trace!(height, "Container height changed");
            self.rebuild.container_height = Some(height);
            self.rebuild.pending = true;
        }
    }

    pub fn needs_rebuild(&self) -> bool {
        self.rebuild.pending
    }

    /// Rebuild the range table if anything asked for it. All requests since
    /// the last rebuild collapse into this one. Returns whether it ran.
    pub fn run_deferred<G: Geometry + ?Sized>(&mut self, geometry: &G) -> bool {
        if !self.rebuild.pending {
            return false;
        }
        if self.rebuild.headings_changed {
            self.offsets.invalidate();
        }
        self.ranges = RangeIndex::build(&self.outline, geometry, &mut self.offsets);
        self.rebuild.container_height = Some(geometry.container_height());
        self.rebuild.pending = false;
        self.rebuild.headings_changed = false;
        tracing::debug!(
            headings = self.outline.len(),
            ranges = self.ranges.len(),
            "Rebuilt heading ranges"
        );
        true
    }

    // ------------------------------------------------------------------------
    // Container lifecycle
    // ------------------------------------------------------------------------

    /// Start listening to a scroll container, replacing any previous one.
    pub fn attach(&mut self, subscription: ScrollSubscription) {
        self.detach();
        tracing::debug!(container = ?subscription.container(), "Tracker attached");
        self.subscription = Some(subscription);
    }

    /// Stop listening and cancel all pending work. The tracker stays inert
    /// until attached again.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!(container = ?subscription.container(), "Tracker detached");
        }
        self.throttle.cancel();
        self.navigator.cancel();
    }

    // ------------------------------------------------------------------------
    // Scrolling and navigation
    // ------------------------------------------------------------------------

    /// Record a scroll of the attached container at `at`.
    ///
    /// Ignored while detached, and during the quiet window after a
    /// navigation settles.
    pub fn on_scroll(&mut self, at: Instant) {
        if self.subscription.is_none() {
            return;
        }
        if self.navigator.is_quiet() {
            tracing::trace!("Dropping scroll event inside settle window");
            return;
        }
        self.throttle.schedule(at, at);
    }

    /// Animate to heading `index`.
    pub fn navigate_to<G: Geometry + ?Sized>(
        &mut self,
        index: usize,
        geometry: &G,
        now: Instant,
    ) -> Result<(), NavigateError> {
        if self.subscription.is_none() {
            return Err(NavigateError::Detached);
        }
        let node = self
            .outline
            .get(index)
            .map(|entry| entry.node)
            .ok_or(NavigateError::UnknownHeading(index))?;
        self.navigator.start(index, node, geometry, now)
    }

    /// Advance animation, timers and queued scroll events to `now`.
    ///
    /// Returns whether anything visible changed (scroll offset, active
    /// heading or progress).
    pub fn poll<G: Geometry + ?Sized>(&mut self, geometry: &mut G, now: Instant) -> bool {
        if self.subscription.is_none() {
            return false;
        }
        let mut changed = false;
        // Events stamped inside a quiet window stay stale even when the
        // window closes before they are drained
        let quiet_until = self.navigator.quiet_until();

        if let Some(event) = self.navigator.poll(geometry, now) {
            changed = true;
            match event {
                NavigatorEvent::Moved | NavigatorEvent::Abandoned { .. } => {}
                NavigatorEvent::Settled { .. } => {
                    self.throttle.cancel();
                }
                NavigatorEvent::Landed { index } => {
                    self.throttle.cancel();
                    self.set_state(ScrollState::jumped_to(index, self.ranges.len()));
                }
            }
        }

        self.drain_events(quiet_until);

        if let Some(scrolled_at) = self.throttle.poll(now) {
            tracing::trace!(lag = ?now.saturating_duration_since(scrolled_at), "Resolving scroll");
            let sample = ScrollSample::read(&*geometry);
            changed |= self.set_state(resolve(&sample, &self.ranges));
        }

        changed
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.throttle.deadline(), self.navigator.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn drain_events(&mut self, quiet_until: Option<Instant>) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        let container = subscription.container();
        let quiet = self.navigator.is_quiet();
        let mut dropped = 0usize;
        while let Some(event) = subscription.try_next() {
            if event.container != container {
                continue;
            }
            if quiet || quiet_until.is_some_and(|until| event.at < until) {
                dropped += 1;
            } else {
                self.throttle.schedule(event.at, event.at);
            }
        }
        if dropped > 0 {
            tracing::trace!(dropped, "Dropped scroll events inside settle window");
        }
    }

    /// Publish a new state, revealing the active item in the outline list
    /// when it has just become active.
    fn set_state(&mut self, next: ScrollState) -> bool {
        if next == self.state {
            return false;
        }
        if let Some(index) = next.position.index() {
            if next.is_active(index) && !self.state.is_active(index) {
                self.list.reveal(index);
            }
        }
        tracing::trace!(
            active = next.active_index(),
            progress = next.progress,
            "Scroll state updated"
        );
        self.state = next;
        true
    }

    // ------------------------------------------------------------------------
    // Item views
    // ------------------------------------------------------------------------

    pub fn item_status(&self, index: usize) -> ItemStatus {
        let indent = self
            .outline
            .get(index)
            .map_or(0, |entry| self.outline.indent(entry, self.config.indent_step));
        ItemStatus {
            past: self.state.is_past(index),
            active: self.state.is_active(index),
            progress: self.state.progress_of(index),
            indent,
        }
    }

    /// Outline entries paired with their display status.
    pub fn items(&self) -> impl Iterator<Item = (&OutlineEntry, ItemStatus)> + '_ {
        self.outline
            .entries()
            .iter()
            .map(move |entry| (entry, self.item_status(entry.index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::testing::{sample_document, TestGeometry};
    use crate::tracker::ActivePosition;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Tracker over four headings at 0/500/1200/2000, attached and rebuilt.
    fn setup() -> (OutlineTracker, TestGeometry) {
        let doc = sample_document();
        let mut tracker = OutlineTracker::new(TrackerConfig::default());
        tracker.set_document(Some(&doc));
        let mut geometry = TestGeometry::new(tracker.outline(), &[0.0, 500.0, 1200.0, 2000.0]);
        tracker.attach(geometry.emitter.subscribe());
        tracker.observe_container(geometry.content_height);
        tracker.run_deferred(&geometry);
        (tracker, geometry)
    }

    #[test]
    fn test_setup_builds_ranges() {
        let (tracker, _geometry) = setup();
        assert_eq!(tracker.outline().len(), 4);
        assert_eq!(tracker.ranges().len(), 3);
        assert_eq!(tracker.state(), ScrollState::INITIAL);
        assert!(!tracker.needs_rebuild());
    }

    #[test]
    fn test_scroll_resolves_after_throttle_window() {
        let (mut tracker, mut geometry) = setup();
        let t0 = geometry.clock;

        geometry.scroll_to(300.0, t0);
        assert!(!tracker.poll(&mut geometry, t0));
        assert_eq!(tracker.state(), ScrollState::INITIAL);

        assert!(tracker.poll(&mut geometry, t0 + ms(100)));
        // actual_top = 600, inside [500, 1200]
        assert_eq!(tracker.state().position, ActivePosition::Section(1));
        assert!(tracker.item_status(0).past);
        assert!(tracker.item_status(1).active);
    }

    #[test]
    fn test_burst_of_scrolls_recomputes_once() {
        let (mut tracker, mut geometry) = setup();
        let t0 = geometry.clock;
        let mut recomputations = 0;

        for i in 0..10u64 {
            let now = t0 + ms(i * 5);
            geometry.scroll_to(100.0 + i as f64 * 30.0, now);
            if tracker.poll(&mut geometry, now) {
                recomputations += 1;
            }
        }
        assert_eq!(recomputations, 0);
        assert!(tracker.poll(&mut geometry, t0 + ms(100)));
        assert!(!tracker.poll(&mut geometry, t0 + ms(200)));
    }

    #[test]
    fn test_detached_tracker_is_inert() {
        let (mut tracker, mut geometry) = setup();
        let t0 = geometry.clock;
        tracker.detach();

        geometry.scroll_to(900.0, t0);
        tracker.on_scroll(t0);
        assert!(!tracker.poll(&mut geometry, t0 + ms(500)));
        assert_eq!(tracker.state(), ScrollState::INITIAL);
        assert_eq!(
            tracker.navigate_to(1, &geometry, t0),
            Err(NavigateError::Detached)
        );
        assert_eq!(geometry.emitter.listener_count(), 0);
    }

    #[test]
    fn test_detach_cancels_pending_scroll() {
        let (mut tracker, mut geometry) = setup();
        let t0 = geometry.clock;
        geometry.scroll_to(900.0, t0);
        tracker.poll(&mut geometry, t0);
        assert!(tracker.next_deadline().is_some());

        tracker.detach();
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn test_attach_replaces_previous_container() {
        let (mut tracker, mut geometry) = setup();
        let mut other = crate::tracker::ScrollEmitter::new();
        tracker.attach(other.subscribe());

        assert_eq!(geometry.emitter.listener_count(), 0);
        assert_eq!(other.listener_count(), 1);
    }

    #[test]
    fn test_unknown_heading_is_error() {
        let (mut tracker, geometry) = setup();
        assert_eq!(
            tracker.navigate_to(9, &geometry, geometry.clock),
            Err(NavigateError::UnknownHeading(9))
        );
    }

    #[test]
    fn test_navigation_settles_then_pins_target() {
        let (mut tracker, mut geometry) = setup();
        let mut now = geometry.clock;
        tracker.navigate_to(2, &geometry, now).unwrap();

        // Run frames until the spring settles
        while !tracker.navigator.is_quiet() {
            now += ms(16);
            geometry.clock = now;
            tracker.poll(&mut geometry, now);
            assert!(tracker.is_navigating());
        }
        // 1200 - 100
        assert_eq!(geometry.scroll_top, 1100.0);

        // A stale scroll inside the quiet window must not win
        geometry.clock = now + ms(10);
        geometry.scroll_to(400.0, now + ms(10));
        tracker.poll(&mut geometry, now + ms(10));
        tracker.poll(&mut geometry, now + ms(36));
        assert_eq!(tracker.state(), ScrollState::jumped_to(2, 3));

        // Nothing left to overwrite it later
        assert!(!tracker.poll(&mut geometry, now + ms(500)));
        assert_eq!(tracker.state().active_index(), 2);
        assert!(!tracker.is_navigating());
    }

    /// Run animation frames until the navigator enters its quiet window.
    fn settle(tracker: &mut OutlineTracker, geometry: &mut TestGeometry, mut now: Instant) -> Instant {
        while !tracker.navigator.is_quiet() {
            now += ms(16);
            geometry.clock = now;
            tracker.poll(geometry, now);
        }
        now
    }

    #[test]
    fn test_stale_scroll_drained_after_window_is_dropped() {
        let (mut tracker, mut geometry) = setup();
        let start = geometry.clock;
        tracker.navigate_to(2, &geometry, start).unwrap();
        let settled = settle(&mut tracker, &mut geometry, start);
        assert_eq!(geometry.scroll_top, 1100.0);

        // Scrolled inside the window, but nobody polls until the deadline
        geometry.scroll_to(100.0, settled + ms(10));
        let mut actives = Vec::new();
        while let Some(deadline) = tracker.next_deadline() {
            geometry.clock = deadline;
            tracker.poll(&mut geometry, deadline);
            actives.push(tracker.state().active_index());
        }

        assert_eq!(actives, vec![2]);
        assert_eq!(tracker.state(), ScrollState::jumped_to(2, 3));
    }

    #[test]
    fn test_scroll_after_window_survives_late_poll() {
        let (mut tracker, mut geometry) = setup();
        let start = geometry.clock;
        tracker.navigate_to(2, &geometry, start).unwrap();
        let settled = settle(&mut tracker, &mut geometry, start);

        // A real scroll after the window closes, first seen by a late poll
        geometry.scroll_to(100.0, settled + ms(50));
        tracker.poll(&mut geometry, settled + ms(80));
        assert_eq!(tracker.state(), ScrollState::jumped_to(2, 3));
        assert_eq!(tracker.next_deadline(), Some(settled + ms(150)));

        assert!(tracker.poll(&mut geometry, settled + ms(150)));
        // actual_top = 200, inside [0, 500]
        assert_eq!(tracker.state().position, ActivePosition::Section(0));
    }

    #[test]
    fn test_navigation_to_last_heading_is_past_end() {
        let (mut tracker, mut geometry) = setup();
        let mut now = geometry.clock;
        tracker.navigate_to(3, &geometry, now).unwrap();
        while tracker.is_navigating() {
            now += ms(16);
            geometry.clock = now;
            tracker.poll(&mut geometry, now);
        }
        assert_eq!(tracker.state().position, ActivePosition::PastEnd(3));
        assert_eq!(tracker.state().progress, 1.0);
    }

    #[test]
    fn test_detached_target_abandons_navigation() {
        let (mut tracker, mut geometry) = setup();
        let now = geometry.clock;
        tracker.navigate_to(1, &geometry, now).unwrap();

        let target = tracker.outline().entries()[1].node;
        geometry.tops.remove(&target);
        assert!(tracker.poll(&mut geometry, now + ms(16)));
        assert!(!tracker.is_navigating());
        assert_eq!(tracker.state(), ScrollState::INITIAL);
    }

    #[test]
    fn test_set_document_resets_state_and_defers_rebuild() {
        let (mut tracker, mut geometry) = setup();
        let t0 = geometry.clock;
        geometry.scroll_to(300.0, t0);
        tracker.poll(&mut geometry, t0 + ms(100));
        assert_ne!(tracker.state(), ScrollState::INITIAL);

        let doc = crate::outline::render_markdown("# Only one");
        tracker.set_document(Some(&doc));
        assert_eq!(tracker.state(), ScrollState::INITIAL);
        assert!(tracker.needs_rebuild());
        assert!(tracker.ranges().is_empty());
    }

    #[test]
    fn test_rebuild_requests_coalesce() {
        let (mut tracker, geometry) = setup();
        tracker.observe_container(6000.0);
        tracker.observe_container(7000.0);
        assert!(tracker.needs_rebuild());
        assert!(tracker.run_deferred(&geometry));
        assert!(!tracker.run_deferred(&geometry));
    }

    #[test]
    fn test_same_height_does_not_rebuild() {
        let (mut tracker, geometry) = setup();
        tracker.observe_container(geometry.content_height);
        assert!(!tracker.needs_rebuild());
    }

    #[test]
    fn test_becoming_active_reveals_list_item() {
        let (mut tracker, mut geometry) = setup();
        tracker.set_list_viewport(2.0, 1.0);
        let t0 = geometry.clock;

        // actual_top = 2000 + 800 lands past the end: last heading active
        geometry.scroll_to(2000.0, t0);
        tracker.poll(&mut geometry, t0 + ms(100));
        assert_eq!(tracker.state().active_index(), 3);
        // Item 3 centered in a two-row list: 3 - 1 + 0.5
        assert_eq!(tracker.list().scroll_top, 2.5);
    }

    #[test]
    fn test_items_carry_indent() {
        let doc = crate::outline::render_markdown("# A\n\n## B\n\n### C");
        let mut tracker = OutlineTracker::new(TrackerConfig::default());
        tracker.set_document(Some(&doc));
        let indents: Vec<_> = tracker.items().map(|(_, s)| s.indent).collect();
        assert_eq!(indents, vec![0, 12, 24]);
    }
}
