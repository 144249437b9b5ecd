//! Geometry capability consumed by the tracker.
//!
//! Implementations answer layout questions about one scroll container and
//! the document inside it. Units are up to the implementation (pixels in a
//! browser, rows in a terminal) but must be consistent across methods.

use crate::outline::NodeId;

/// Layout queries for a scroll container and its tracked content.
pub trait Geometry {
    /// Current scroll offset of the container.
    fn scroll_top(&self) -> f64;

    /// Move the container. Implementations should clamp to their own bounds
    /// and emit a scroll event when the offset actually changes.
    fn set_scroll_top(&mut self, top: f64);

    /// Largest reachable scroll offset.
    fn max_scroll_top(&self) -> f64;

    /// Height of the visible viewport.
    fn viewport_height(&self) -> f64;

    /// Total measured height of the container's content.
    fn container_height(&self) -> f64;

    /// Vertical offset of the tracked content relative to the viewport.
    fn content_offset(&self) -> f64;

    /// Offset of a node from the container's origin, or `None` when the node
    /// is no longer part of the layout.
    fn element_top(&self, node: NodeId) -> Option<f64>;
}

/// Clamp a measured length or offset: non-finite and negative become 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Clamp a fraction into `[0, 1]`; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Scroll viewport of the outline list itself (the sidebar).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListViewport {
    pub scroll_top: f64,
    pub height: f64,
    /// Height of one list item.
    pub item_height: f64,
}

impl ListViewport {
    pub fn new(height: f64, item_height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            height: sanitize(height),
            item_height: sanitize(item_height),
        }
    }

    /// Bring item `index` into view, centering it when any part of it is
    /// outside the viewport. Returns whether the viewport moved.
    pub fn reveal(&mut self, index: usize) -> bool {
        let item_top = index as f64 * self.item_height;
        let visible_top = item_top - self.scroll_top;
        let visible_bottom = visible_top + self.item_height;
        if visible_top >= 0.0 && visible_bottom <= self.height {
            return false;
        }

        let centered = sanitize(item_top - self.height / 2.0 + self.item_height / 2.0);
        let moved = centered != self.scroll_top;
        self.scroll_top = centered;
        moved
    }

    /// Index of the first item with any visible part.
    pub fn first_visible(&self) -> usize {
        if self.item_height <= 0.0 {
            return 0;
        }
        (self.scroll_top / self.item_height).floor() as usize
    }
}
