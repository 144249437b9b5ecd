//! Scroll offset to active heading.

use super::geometry::{clamp_unit, Geometry};
use crate::outline::RangeIndex;

/// Scroll measurements taken at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Container scroll offset.
    pub scroll_top: f64,
    /// Offset of the tracked content relative to the viewport (`y`).
    pub content_offset: f64,
    pub viewport_height: f64,
}

impl ScrollSample {
    pub fn read<G: Geometry + ?Sized>(geometry: &G) -> Self {
        Self {
            scroll_top: geometry.scroll_top(),
            content_offset: geometry.content_offset(),
            viewport_height: geometry.viewport_height(),
        }
    }
}

/// Which heading section the reader is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePosition {
    /// No heading reached yet.
    BeforeStart,
    /// Inside the range after heading `i`.
    Section(usize),
    /// Beyond the last range; the index is the range count, which is the
    /// last heading.
    PastEnd(usize),
}

impl ActivePosition {
    pub fn index(self) -> Option<usize> {
        match self {
            Self::BeforeStart => None,
            Self::Section(i) | Self::PastEnd(i) => Some(i),
        }
    }
}

/// Published `(active index, progress)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    pub position: ActivePosition,
    /// Fraction of the active range already scrolled through, in `[0, 1]`.
    pub progress: f64,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl ScrollState {
    /// State before any scroll has been resolved.
    pub const INITIAL: Self = Self {
        position: ActivePosition::BeforeStart,
        progress: 0.0,
    };

    /// State forced after navigating to heading `index`.
    pub fn jumped_to(index: usize, range_count: usize) -> Self {
        let position = if index < range_count {
            ActivePosition::Section(index)
        } else {
            ActivePosition::PastEnd(index)
        };
        Self {
            position,
            progress: 1.0,
        }
    }

    /// Active index with -1 standing for "before the first heading".
    pub fn active_index(&self) -> isize {
        self.position.index().map_or(-1, |i| i as isize)
    }

    /// Item `index` lies entirely above the active section.
    pub fn is_past(&self, index: usize) -> bool {
        (index as isize) < self.active_index()
    }

    /// Item `index` is the active section and has been entered.
    pub fn is_active(&self, index: usize) -> bool {
        self.position.index() == Some(index) && self.progress > 0.0
    }

    /// Progress to display for item `index`: the live value for the active
    /// item, 0 for the rest.
    pub fn progress_of(&self, index: usize) -> f64 {
        if self.position.index() == Some(index) {
            self.progress
        } else {
            0.0
        }
    }
}

/// Damped reading offset that a sample maps to in the range table.
///
/// Near the top of the content the viewport-height lookahead shrinks in
/// proportion to how far the reader has scrolled.
pub fn reading_offset(sample: &ScrollSample) -> f64 {
    let y = sample.content_offset;
    let win = sample.viewport_height;
    let top = sample.scroll_top + y;
    let delta = if top >= win { win } else { (top / win) * win };
    let actual = (top - y + delta).max(0.0).floor();
    if actual.is_finite() {
        actual
    } else {
        0.0
    }
}

/// Map a scroll sample onto the range table.
pub fn resolve(sample: &ScrollSample, ranges: &RangeIndex) -> ScrollState {
    let actual_top = reading_offset(sample);

    if let Some((index, range)) = ranges.find(actual_top) {
        return ScrollState {
            position: ActivePosition::Section(index),
            progress: clamp_unit((actual_top - range.start) / range.height()),
        };
    }

    let top = sample.scroll_top + sample.content_offset;
    let win = sample.viewport_height;
    let last_end = ranges.last_end();
    if top + win > last_end {
        ScrollState {
            position: ActivePosition::PastEnd(ranges.len()),
            progress: clamp_unit(1.0 - (last_end - top) / win),
        }
    } else {
        ScrollState {
            position: ActivePosition::BeforeStart,
            progress: 1.0,
        }
    }
}
