//! Render functions for the TUI.
//!
//! Layout is computed here and fed back into the app before any widget is
//! drawn, so the tracker always measures the geometry that is on screen.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{reader, status, toc};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let (reader_area, toc_area) = if app.toc_visible() {
        // Keep at least half the width for the document
        let toc_width = app.config.toc_width.min(rows[0].width / 2);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(toc_width)])
            .split(rows[0]);
        (columns[0], Some(columns[1]))
    } else {
        (rows[0], None)
    };

    // Borders take one row/column on each side
    app.relayout(
        reader_area.width.saturating_sub(2) as usize,
        reader_area.height.saturating_sub(2) as usize,
        toc_area.map_or(0, |a| a.height.saturating_sub(2) as usize),
    );

    reader::render(f, app, reader_area);
    if let Some(toc_area) = toc_area {
        toc::render(f, app, toc_area);
    }
    status::render(f, app, rows[1]);
}
