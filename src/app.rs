use ratatui::text::{Line, Span};
use std::borrow::Cow;
use tokio::time::Instant;
use toc_tracker::config::Config;
use toc_tracker::outline::{render_markdown, Document, NodeId};
use toc_tracker::tracker::{Geometry, OutlineTracker, ScrollEmitter};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows above the document: title, source, blank line.
pub const HEADER_ROWS: usize = 3;

/// Maximum scroll offset for the reader view (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

// ============================================================================
// Reader Pane
// ============================================================================

/// The scrollable article view, measured in terminal rows.
///
/// Implements [`Geometry`] for the tracker: heading offsets come from the
/// wrapped row at which each heading's first line starts, below the header.
/// The pane wraps lines itself and draws exactly those rows, so measured
/// offsets match the screen.
pub struct ReaderPane {
    pub title: String,
    pub source: String,
    pub document: Document,
    scroll_offset: usize,
    visible_rows: usize,
    width: usize,
    /// Document lines wrapped to `width`, one entry per screen row.
    rows: Vec<Line<'static>>,
    /// Row at which each document line starts, plus the total as last entry.
    line_rows: Vec<usize>,
    emitter: ScrollEmitter,
}

impl ReaderPane {
    pub fn new(title: String, source: String, document: Document) -> Self {
        let mut pane = Self {
            title,
            source,
            document,
            scroll_offset: 0,
            visible_rows: 0,
            width: 0,
            rows: Vec::new(),
            line_rows: Vec::new(),
            emitter: ScrollEmitter::new(),
        };
        pane.relayout(80, 24);
        pane
    }

    pub fn emitter_mut(&mut self) -> &mut ScrollEmitter {
        &mut self.emitter
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Wrapped document rows as drawn below the header.
    pub fn rows(&self) -> &[Line<'static>] {
        &self.rows
    }

    /// Rows occupied by header and document at the current width.
    pub fn total_rows(&self) -> usize {
        HEADER_ROWS + self.line_rows.last().copied().unwrap_or(0)
    }

    /// Recompute wrapped rows for a new viewport. Returns whether the width
    /// changed, which moves every heading.
    pub fn relayout(&mut self, width: usize, visible_rows: usize) -> bool {
        let width = width.max(1);
        self.visible_rows = visible_rows;
        let reflowed = width != self.width || self.line_rows.is_empty();
        if reflowed {
            self.width = width;
            let mut rows = Vec::with_capacity(self.document.lines().len());
            let mut line_rows = Vec::with_capacity(self.document.lines().len() + 1);
            line_rows.push(0);
            for line in self.document.lines() {
                rows.extend(wrap_line(line, width));
                line_rows.push(rows.len());
            }
            self.rows = rows;
            self.line_rows = line_rows;
        }
        self.clamp_scroll();
        reflowed
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll_offset.saturating_add_signed(delta);
        self.set_scroll_top(target as f64);
    }

    fn max_scroll(&self) -> usize {
        self.total_rows()
            .saturating_sub(self.visible_rows)
            .min(MAX_SCROLL)
    }

    fn clamp_scroll(&mut self) {
        let clamped = self.scroll_offset.min(self.max_scroll());
        if clamped != self.scroll_offset {
            self.scroll_offset = clamped;
            self.emitter.emit(Instant::now());
        }
    }
}

/// Word-wrap a styled line to `width` columns.
///
/// Words move to the next row whole; a word wider than the row is split by
/// character. Whitespace at a break is dropped. An empty line is one row.
fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0;

    for span in &line.spans {
        for token in split_words(&span.content) {
            let token_width = token.width();
            if current_width + token_width <= width {
                current.push(Span::styled(token.to_string(), span.style));
                current_width += token_width;
                continue;
            }
            if token.starts_with(char::is_whitespace) {
                if current_width > 0 {
                    rows.push(Line::from(std::mem::take(&mut current)));
                    current_width = 0;
                }
                continue;
            }
            if current_width > 0 {
                rows.push(Line::from(std::mem::take(&mut current)));
                current_width = 0;
            }

            let mut chunk = String::new();
            for ch in token.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width + ch_width > width && current_width > 0 {
                    current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                    rows.push(Line::from(std::mem::take(&mut current)));
                    current_width = 0;
                }
                chunk.push(ch);
                current_width += ch_width;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, span.style));
            }
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(Line::from(current));
    }
    rows
}

/// Split text into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() != space)
            .map_or(rest.len(), |(i, _)| i);
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}

impl Geometry for ReaderPane {
    fn scroll_top(&self) -> f64 {
        self.scroll_offset as f64
    }

    fn set_scroll_top(&mut self, top: f64) {
        let top = if top.is_finite() { top.round().max(0.0) } else { 0.0 };
        let next = (top as usize).min(self.max_scroll());
        if next != self.scroll_offset {
            self.scroll_offset = next;
            self.emitter.emit(Instant::now());
        }
    }

    fn max_scroll_top(&self) -> f64 {
        self.max_scroll() as f64
    }

    fn viewport_height(&self) -> f64 {
        self.visible_rows as f64
    }

    fn container_height(&self) -> f64 {
        self.total_rows() as f64
    }

    fn content_offset(&self) -> f64 {
        HEADER_ROWS as f64 - self.scroll_offset as f64
    }

    fn element_top(&self, node: NodeId) -> Option<f64> {
        let node = self.document.node(node)?;
        let row = self.line_rows.get(node.line)?;
        Some((HEADER_ROWS + row) as f64)
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Reader,
    Toc,
}

pub struct App {
    pub config: Config,
    pub reader: ReaderPane,
    pub tracker: OutlineTracker,
    pub focus: Focus,
    pub show_toc: bool,
    /// Highlighted outline item while the sidebar has focus.
    pub toc_selected: usize,
    pub needs_redraw: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
}

impl App {
    pub fn new(config: Config, title: String, source: String, markdown: &str) -> Self {
        let document = render_markdown(markdown);
        let mut reader = ReaderPane::new(title, source, document);

        let mut tracker = OutlineTracker::new(config.toc.clone());
        tracker.set_document(Some(&reader.document));
        tracker.attach(reader.emitter_mut().subscribe());

        Self {
            show_toc: config.show_toc,
            config,
            reader,
            tracker,
            focus: Focus::Reader,
            toc_selected: 0,
            needs_redraw: true,
            status_message: None,
        }
    }

    /// Sidebar is enabled and has something to show.
    pub fn toc_visible(&self) -> bool {
        self.show_toc && !self.tracker.outline().is_empty()
    }

    pub fn toggle_toc(&mut self) {
        self.show_toc = !self.show_toc;
        if !self.toc_visible() {
            self.focus = Focus::Reader;
        }
    }

    /// Move focus to the sidebar, starting from the active heading.
    pub fn focus_toc(&mut self) {
        if !self.toc_visible() {
            return;
        }
        self.focus = Focus::Toc;
        self.toc_selected = self
            .tracker
            .state()
            .position
            .index()
            .unwrap_or(0)
            .min(self.tracker.outline().len().saturating_sub(1));
        self.tracker.reveal_item(self.toc_selected);
    }

    pub fn select_toc_item(&mut self, delta: isize) {
        let last = self.tracker.outline().len().saturating_sub(1);
        self.toc_selected = self.toc_selected.saturating_add_signed(delta).min(last);
        self.tracker.reveal_item(self.toc_selected);
    }

    /// Apply a new viewport size after layout.
    pub fn relayout(&mut self, width: usize, visible_rows: usize, toc_rows: usize) {
        self.reader.relayout(width, visible_rows);
        self.tracker
            .observe_container(self.reader.container_height());
        self.tracker.set_list_viewport(toc_rows as f64, 1.0);
    }

    /// Animate to outline item `index`, reporting failures in the status bar.
    pub fn navigate_to(&mut self, index: usize) {
        match self
            .tracker
            .navigate_to(index, &self.reader, Instant::now())
        {
            Ok(()) => {
                if let Some(entry) = self.tracker.outline().get(index) {
                    tracing::debug!(index, title = %entry.title, "Jumping to heading");
                }
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Navigation failed");
                self.set_status(format!("Cannot jump: {}", e));
            }
        }
    }

    /// Jump to the heading after (`delta > 0`) or before the active one.
    pub fn navigate_relative(&mut self, delta: isize) {
        let len = self.tracker.outline().len();
        if len == 0 {
            return;
        }
        let target = match self.tracker.state().position.index() {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None if delta > 0 => 0,
            None => return,
        };
        self.navigate_to(target);
    }

    /// Advance tracker timers and animation to now.
    pub fn poll_tracker(&mut self) -> bool {
        self.tracker.poll(&mut self.reader, Instant::now())
    }

    /// Deferred work that must not delay input handling.
    pub fn run_deferred(&mut self) -> bool {
        self.tracker.run_deferred(&self.reader)
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
