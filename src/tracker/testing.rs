//! Synthetic geometry shared by the tracker's unit tests.

use std::collections::HashMap;

use super::geometry::Geometry;
use super::subscription::ScrollEmitter;
use crate::outline::{render_markdown, Document, NodeId, Outline};
use tokio::time::Instant;

/// A scroll container with fixed heading offsets that emits a scroll event
/// whenever its offset changes, like a browser container would.
pub(crate) struct TestGeometry {
    pub scroll_top: f64,
    pub viewport: f64,
    pub content_height: f64,
    pub tops: HashMap<NodeId, f64>,
    pub emitter: ScrollEmitter,
    pub clock: Instant,
}

impl TestGeometry {
    pub fn new(outline: &Outline, tops: &[f64]) -> Self {
        Self {
            scroll_top: 0.0,
            viewport: 800.0,
            content_height: 5000.0,
            tops: outline.nodes().into_iter().zip(tops.iter().copied()).collect(),
            emitter: ScrollEmitter::new(),
            clock: Instant::now(),
        }
    }

    /// User-initiated scroll at `at`.
    pub fn scroll_to(&mut self, top: f64, at: Instant) {
        self.clock = at;
        self.set_scroll_top(top);
    }
}

impl Geometry for TestGeometry {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn set_scroll_top(&mut self, top: f64) {
        let top = top.clamp(0.0, self.max_scroll_top());
        if top != self.scroll_top {
            self.scroll_top = top;
            self.emitter.emit(self.clock);
        }
    }

    fn max_scroll_top(&self) -> f64 {
        (self.content_height - self.viewport).max(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport
    }

    fn container_height(&self) -> f64 {
        self.content_height
    }

    fn content_offset(&self) -> f64 {
        0.0
    }

    fn element_top(&self, node: NodeId) -> Option<f64> {
        self.tops.get(&node).copied()
    }
}

/// Four top-level sections.
pub(crate) fn sample_document() -> Document {
    render_markdown("# One\n\na\n\n# Two\n\nb\n\n# Three\n\nc\n\n# Four\n\nd")
}
