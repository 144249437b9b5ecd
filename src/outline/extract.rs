use super::document::{BlockNode, Document, NodeId, NodeSpan, SpanRole};
use crate::util::strip_control_chars;
use serde::Serialize;

/// One heading-derived navigation item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineEntry {
    /// Heading level, 1 through 6.
    pub depth: u8,
    /// Heading text with decoration removed.
    pub title: String,
    /// Deep-link identifier; empty when the heading has none.
    pub anchor_id: String,
    /// Position in document order.
    pub index: usize,
    /// Source heading node, used for measurement and as the scroll target.
    #[serde(skip)]
    pub node: NodeId,
}

/// Ordered headings of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    entries: Vec<OutlineEntry>,
    root_depth: u8,
}

/// Parse the level out of an `h1`..`h6` tag.
fn heading_depth(tag: &str) -> Option<u8> {
    let depth: u8 = tag.strip_prefix('h')?.parse().ok()?;
    (1..=6).contains(&depth).then_some(depth)
}

/// Read a heading's title from a detached copy of its spans.
fn heading_title(node: &BlockNode) -> String {
    let mut detached: Vec<NodeSpan> = node.spans.clone();
    detached.retain(|span| span.role == SpanRole::Text);
    let raw: String = detached.iter().map(|span| span.text.as_str()).collect();
    strip_control_chars(raw.trim()).into_owned()
}

impl Outline {
    /// Collect every heading of `root` in document order.
    ///
    /// A missing document yields an empty outline.
    pub fn extract(root: Option<&Document>) -> Self {
        let Some(document) = root else {
            return Self::default();
        };

        let entries: Vec<OutlineEntry> = document
            .nodes()
            .iter()
            .filter_map(|node| heading_depth(node.tag).map(|depth| (node, depth)))
            .enumerate()
            .map(|(index, (node, depth))| OutlineEntry {
                depth,
                title: heading_title(node),
                anchor_id: node.anchor.clone().unwrap_or_default(),
                index,
                node: node.id,
            })
            .collect();

        let root_depth = entries.iter().map(|e| e.depth).min().unwrap_or(0);
        tracing::debug!(headings = entries.len(), root_depth, "Extracted outline");

        Self {
            entries,
            root_depth,
        }
    }

    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&OutlineEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallowest heading level present; 0 for an empty outline.
    pub fn root_depth(&self) -> u8 {
        self.root_depth
    }

    /// Node handles in outline order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|e| e.node).collect()
    }

    /// Indentation of `entry` relative to the root level.
    pub fn indent(&self, entry: &OutlineEntry, step: u16) -> u16 {
        u16::from(entry.depth.saturating_sub(self.root_depth)).saturating_mul(step)
    }
}
