use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde::Serialize;

/// Handle to a block node inside a [`Document`].
///
/// Handles are positions in the document's node list, so they are only
/// meaningful for the document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// What a span contributes to its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRole {
    /// Readable text.
    Text,
    /// Markers and glyphs drawn around the text (heading hashes, code ticks,
    /// list bullets, image placeholders).
    Decoration,
}

/// Plain-text view of one rendered span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpan {
    pub text: String,
    pub role: SpanRole,
}

impl NodeSpan {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: SpanRole::Text,
        }
    }

    pub fn decoration(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: SpanRole::Decoration,
        }
    }
}

/// A top-level block of rendered content.
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub id: NodeId,
    /// Element-style tag: `p`, `pre`, `li`, or `h1`..`h6`.
    pub tag: &'static str,
    pub spans: Vec<NodeSpan>,
    /// Explicit id attribute (`# Title {#anchor}`), if any.
    pub anchor: Option<String>,
    /// Index of the first rendered line of this block.
    pub line: usize,
}

/// Rendered markdown: styled lines for display, plus the block nodes that
/// produced them.
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: Vec<Line<'static>>,
    nodes: Vec<BlockNode>,
}

impl Document {
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn nodes(&self) -> &[BlockNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&BlockNode> {
        self.nodes.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn decoration_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Accumulates lines and nodes while walking parser events.
///
/// Blocks nest (a paragraph inside a list item), but only the outermost one
/// becomes a node. Headings are the exception: a heading becomes a node at
/// any depth, so the outline sees headings inside list items too.
#[derive(Default)]
struct DocumentBuilder {
    lines: Vec<Line<'static>>,
    nodes: Vec<BlockNode>,
    current_spans: Vec<Span<'static>>,
    /// Nodes still receiving spans, with the depth each was opened at.
    open_nodes: Vec<(usize, usize)>,
    depth: usize,
}

impl DocumentBuilder {
    fn open(&mut self, tag: &'static str, anchor: Option<String>) {
        self.flush_line();
        if self.depth == 0 || is_heading(tag) {
            self.open_nodes.push((self.depth, self.nodes.len()));
            self.nodes.push(BlockNode {
                id: NodeId(self.nodes.len()),
                tag,
                spans: Vec::new(),
                anchor,
                line: self.lines.len(),
            });
        }
        self.depth += 1;
    }

    fn close(&mut self, blank_after: bool) {
        self.flush_line();
        self.depth = self.depth.saturating_sub(1);
        if self
            .open_nodes
            .last()
            .is_some_and(|&(depth, _)| depth == self.depth)
        {
            self.open_nodes.pop();
        }
        if self.depth == 0 && blank_after {
            self.lines.push(Line::from(""));
        }
    }

    fn push(&mut self, span: NodeSpan, style: Style) {
        self.current_spans
            .push(Span::styled(span.text.clone(), style));
        for &(_, index) in &self.open_nodes {
            if let Some(node) = self.nodes.get_mut(index) {
                node.spans.push(span.clone());
            }
        }
    }

    /// Push text that may contain newlines (code blocks), one line per segment.
    fn push_multiline(&mut self, text: &str, style: Style) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.break_line();
            }
            if !segment.is_empty() {
                self.push(NodeSpan::text(segment), style);
            }
        }
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            self.lines
                .push(Line::from(std::mem::take(&mut self.current_spans)));
        }
    }

    /// Like `flush_line`, but an empty line still produces a row.
    fn break_line(&mut self) {
        self.lines
            .push(Line::from(std::mem::take(&mut self.current_spans)));
    }

    fn finish(mut self) -> Document {
        self.flush_line();
        Document {
            lines: self.lines,
            nodes: self.nodes,
        }
    }
}

/// Convert markdown to styled lines and the block nodes behind them.
pub fn render_markdown(md: &str) -> Document {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    let parser = Parser::new_ext(md, options);

    let mut builder = DocumentBuilder::default();
    let mut in_code_block = false;
    let mut in_heading = false;
    let mut in_emphasis = false;
    let mut in_strong = false;
    let mut in_image = false;

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                builder.open(heading_tag(level), id.map(|id| id.into_string()));
                builder.push(
                    NodeSpan::decoration(format!("{} ", "#".repeat(level as usize))),
                    decoration_style(),
                );
                in_heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                builder.close(true);
            }
            Event::Start(Tag::Paragraph) => builder.open("p", None),
            Event::End(TagEnd::Paragraph) => builder.close(true),
            Event::Start(Tag::CodeBlock(_)) => {
                builder.open("pre", None);
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                builder.close(true);
            }
            Event::Start(Tag::Item) => {
                builder.open("li", None);
                builder.push(NodeSpan::decoration("• "), decoration_style());
            }
            Event::End(TagEnd::Item) => builder.close(false),
            Event::End(TagEnd::List(_)) => {
                if builder.depth == 0 {
                    builder.lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::Emphasis) => in_emphasis = true,
            Event::End(TagEnd::Emphasis) => in_emphasis = false,
            Event::Start(Tag::Strong) => in_strong = true,
            Event::End(TagEnd::Strong) => in_strong = false,
            Event::Start(Tag::Image { dest_url, .. }) => {
                in_image = true;
                builder.push(
                    NodeSpan::decoration(format!("[Image: {}]", dest_url)),
                    Style::default().fg(Color::Blue),
                );
            }
            Event::End(TagEnd::Image) => in_image = false,
            // Alt text is already represented by the placeholder
            Event::Text(_) if in_image => {}
            Event::Text(text) => {
                let style = if in_code_block {
                    Style::default().fg(Color::Yellow).bg(Color::Black)
                } else if in_heading {
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .fg(Color::Cyan)
                } else if in_strong {
                    Style::default().add_modifier(Modifier::BOLD)
                } else if in_emphasis {
                    Style::default().add_modifier(Modifier::ITALIC)
                } else {
                    Style::default()
                };
                if in_code_block {
                    builder.push_multiline(&text, style);
                } else {
                    builder.push(NodeSpan::text(text.into_string()), style);
                }
            }
            Event::Code(code) => {
                let style = Style::default().fg(Color::Yellow);
                builder.push(NodeSpan::decoration("`"), style);
                builder.push(NodeSpan::text(code.into_string()), style);
                builder.push(NodeSpan::decoration("`"), style);
            }
            Event::SoftBreak => builder.push(NodeSpan::text(" "), Style::default()),
            Event::HardBreak => builder.flush_line(),
            _ => {}
        }
    }

    builder.finish()
}
