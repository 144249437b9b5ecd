use std::collections::HashMap;

use super::document::NodeId;
use super::extract::Outline;
use crate::tracker::{sanitize, Geometry};

/// Vertical span owned by the heading that precedes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeEntry {
    pub start: f64,
    pub end: f64,
}

impl RangeEntry {
    pub fn contains(&self, offset: f64) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn height(&self) -> f64 {
        self.end - self.start
    }
}

/// Heading offsets measured once per layout.
///
/// Geometry queries can be expensive, so offsets are kept until either the
/// heading set or the container height changes.
#[derive(Debug, Clone, Default)]
pub struct OffsetCache {
    nodes: Vec<NodeId>,
    container_height: Option<f64>,
    offsets: HashMap<NodeId, f64>,
}

impl OffsetCache {
    /// Drop every cached offset.
    pub fn invalidate(&mut self) {
        self.nodes.clear();
        self.container_height = None;
        self.offsets.clear();
    }

    /// Key the cache to a heading set and container height, clearing it when
    /// either differs from what the cached offsets were measured against.
    pub fn prepare(&mut self, nodes: &[NodeId], container_height: f64) {
        let height = sanitize(container_height);
        if self.nodes != nodes {
            tracing::trace!(headings = nodes.len(), "Heading set changed, clearing offsets");
            self.offsets.clear();
            self.nodes = nodes.to_vec();
        } else if self.container_height != Some(height) {
            tracing::trace!(height, "Container height changed, clearing offsets");
            self.offsets.clear();
        }
        self.container_height = Some(height);
    }

    /// Offset of `node`, measuring it on a miss.
    ///
    /// Detached nodes measure as 0 and are not cached, so they are retried on
    /// the next build.
    pub fn offset_of<G: Geometry + ?Sized>(&mut self, node: NodeId, geometry: &G) -> f64 {
        if let Some(&top) = self.offsets.get(&node) {
            return top;
        }
        match geometry.element_top(node) {
            Some(top) => {
                let top = sanitize(top);
                self.offsets.insert(node, top);
                top
            }
            None => 0.0,
        }
    }

    pub fn cached(&self, node: NodeId) -> Option<f64> {
        self.offsets.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Ranges between consecutive headings, one fewer than there are headings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeIndex {
    ranges: Vec<RangeEntry>,
}

impl RangeIndex {
    /// Measure every heading of `outline` and pair consecutive offsets.
    pub fn build<G: Geometry + ?Sized>(
        outline: &Outline,
        geometry: &G,
        cache: &mut OffsetCache,
    ) -> Self {
        let nodes = outline.nodes();
        cache.prepare(&nodes, geometry.container_height());

        let offsets: Vec<f64> = nodes
            .iter()
            .map(|&node| cache.offset_of(node, geometry))
            .collect();
        let ranges = offsets
            .windows(2)
            .map(|pair| RangeEntry {
                start: pair[0],
                end: pair[1],
            })
            .collect();

        Self { ranges }
    }

    pub fn from_ranges(ranges: Vec<RangeEntry>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &[RangeEntry] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// End of the last range; 0 for an empty table.
    pub fn last_end(&self) -> f64 {
        self.ranges.last().map_or(0.0, |r| r.end)
    }

    /// First range containing `offset`, with its index.
    pub fn find(&self, offset: f64) -> Option<(usize, RangeEntry)> {
        self.ranges
            .iter()
            .position(|r| r.contains(offset))
            .map(|i| (i, self.ranges[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::render_markdown;
    use std::cell::Cell;

    /// Geometry with fixed heading offsets that counts measurements.
    struct FixedGeometry {
        tops: HashMap<NodeId, f64>,
        height: f64,
        queries: Cell<usize>,
    }

    impl FixedGeometry {
        fn new(outline: &Outline, tops: &[f64]) -> Self {
            Self {
                tops: outline.nodes().into_iter().zip(tops.iter().copied()).collect(),
                height: 2000.0,
                queries: Cell::new(0),
            }
        }
    }

    impl Geometry for FixedGeometry {
        fn scroll_top(&self) -> f64 {
            0.0
        }
        fn set_scroll_top(&mut self, _top: f64) {}
        fn max_scroll_top(&self) -> f64 {
            self.height
        }
        fn viewport_height(&self) -> f64 {
            800.0
        }
        fn container_height(&self) -> f64 {
            self.height
        }
        fn content_offset(&self) -> f64 {
            0.0
        }
        fn element_top(&self, node: NodeId) -> Option<f64> {
            self.queries.set(self.queries.get() + 1);
            self.tops.get(&node).copied()
        }
    }

    fn three_headings() -> Outline {
        let doc = render_markdown("# A\n\ntext\n\n## B\n\ntext\n\n## C");
        Outline::extract(Some(&doc))
    }

    #[test]
    fn test_ranges_pair_consecutive_headings() {
        let outline = three_headings();
        let geometry = FixedGeometry::new(&outline, &[0.0, 500.0, 1200.0]);
        let index = RangeIndex::build(&outline, &geometry, &mut OffsetCache::default());

        assert_eq!(
            index.ranges(),
            &[
                RangeEntry {
                    start: 0.0,
                    end: 500.0
                },
                RangeEntry {
                    start: 500.0,
                    end: 1200.0
                },
            ]
        );
        assert_eq!(index.last_end(), 1200.0);
    }

    #[test]
    fn test_single_heading_has_no_ranges() {
        let doc = render_markdown("# Only");
        let outline = Outline::extract(Some(&doc));
        let geometry = FixedGeometry::new(&outline, &[40.0]);
        let index = RangeIndex::build(&outline, &geometry, &mut OffsetCache::default());
        assert!(index.is_empty());
        assert_eq!(index.last_end(), 0.0);
    }

    #[test]
    fn test_rebuild_reuses_cached_offsets() {
        let outline = three_headings();
        let geometry = FixedGeometry::new(&outline, &[0.0, 500.0, 1200.0]);
        let mut cache = OffsetCache::default();

        let first = RangeIndex::build(&outline, &geometry, &mut cache);
        assert_eq!(geometry.queries.get(), 3);
        let second = RangeIndex::build(&outline, &geometry, &mut cache);
        assert_eq!(geometry.queries.get(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_height_change_remeasures() {
        let outline = three_headings();
        let mut geometry = FixedGeometry::new(&outline, &[0.0, 500.0, 1200.0]);
        let mut cache = OffsetCache::default();

        RangeIndex::build(&outline, &geometry, &mut cache);
        geometry.height = 3000.0;
        for top in geometry.tops.values_mut() {
            *top *= 2.0;
        }
        let index = RangeIndex::build(&outline, &geometry, &mut cache);

        assert_eq!(geometry.queries.get(), 6);
        assert_eq!(index.last_end(), 2400.0);
    }

    #[test]
    fn test_heading_set_change_remeasures() {
        let outline = three_headings();
        let geometry = FixedGeometry::new(&outline, &[0.0, 500.0, 1200.0]);
        let mut cache = OffsetCache::default();
        RangeIndex::build(&outline, &geometry, &mut cache);

        let doc = render_markdown("# A\n\n## B");
        let smaller = Outline::extract(Some(&doc));
        RangeIndex::build(&smaller, &geometry, &mut cache);
        assert_eq!(geometry.queries.get(), 5);
        // NodeId(1) is a paragraph in the first document, so it never measured
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_bad_geometry_clamps_to_zero() {
        let outline = three_headings();
        let geometry = FixedGeometry::new(&outline, &[f64::NAN, -40.0, 300.0]);
        let index = RangeIndex::build(&outline, &geometry, &mut OffsetCache::default());
        assert_eq!(index.ranges()[0], RangeEntry { start: 0.0, end: 0.0 });
        assert_eq!(index.ranges()[1], RangeEntry { start: 0.0, end: 300.0 });
    }

    #[test]
    fn test_detached_node_is_not_cached() {
        let outline = three_headings();
        let mut geometry = FixedGeometry::new(&outline, &[0.0, 500.0, 1200.0]);
        let missing = outline.entries()[1].node;
        geometry.tops.remove(&missing);

        let mut cache = OffsetCache::default();
        let index = RangeIndex::build(&outline, &geometry, &mut cache);
        assert_eq!(index.ranges()[0].end, 0.0);
        assert_eq!(cache.cached(missing), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_find_returns_first_match() {
        let index = RangeIndex::from_ranges(vec![
            RangeEntry { start: 0.0, end: 100.0 },
            RangeEntry { start: 100.0, end: 100.0 },
            RangeEntry { start: 100.0, end: 250.0 },
        ]);
        assert_eq!(index.find(100.0).map(|(i, _)| i), Some(0));
        assert_eq!(index.find(180.0).map(|(i, _)| i), Some(2));
        assert_eq!(index.find(300.0), None);
    }
}
