//! Document outline: rendering, heading extraction and range tables.
//!
//! # Module Structure
//!
//! - `document` - Markdown to styled lines plus a flat list of block nodes
//! - `extract` - Heading selection and title cleanup ([`Outline`])
//! - `ranges` - Per-heading offsets and the [`RangeIndex`] between them

mod document;
mod extract;
mod ranges;

pub use document::{render_markdown, BlockNode, Document, NodeId, NodeSpan, SpanRole};
pub use extract::{Outline, OutlineEntry};
pub use ranges::{OffsetCache, RangeEntry, RangeIndex};
