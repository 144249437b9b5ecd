use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use toc_tracker::tracker::ItemStatus;
use toc_tracker::util::truncate_to_width;

/// Gutter glyphs for reading progress, empty to full.
const PROGRESS_GLYPHS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

/// Glyph showing how far the reader is through a section.
pub(super) fn progress_glyph(progress: f64) -> &'static str {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let step = (progress * (PROGRESS_GLYPHS.len() - 1) as f64).round() as usize;
    PROGRESS_GLYPHS[step.min(PROGRESS_GLYPHS.len() - 1)]
}

fn item_style(status: &ItemStatus, selected: bool) -> Style {
    let style = if status.active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if status.past {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    if selected {
        style.bg(Color::DarkGray).fg(Color::White)
    } else {
        style
    }
}

/// Render the outline sidebar.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Toc;
    let inner_width = area.width.saturating_sub(2) as usize;
    let rows = area.height.saturating_sub(2) as usize;
    let first = app.tracker.list().first_visible();

    let lines: Vec<Line> = app
        .tracker
        .items()
        .skip(first)
        .take(rows)
        .map(|(entry, status)| {
            let badge = format!(" H{}", entry.depth);
            let indent = status.indent as usize;
            // Gutter (1) + indent + title + badge
            let title_width = inner_width
                .saturating_sub(1 + indent + badge.len())
                .max(1);
            let title = truncate_to_width(&entry.title, title_width).into_owned();
            let selected = is_focused && entry.index == app.toc_selected;

            let gutter_style = if status.active {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            Line::from(vec![
                Span::styled(progress_glyph(status.progress), gutter_style),
                Span::raw(" ".repeat(indent)),
                Span::styled(title, item_style(&status, selected)),
                Span::styled(badge, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = format!("Contents ({})", app.tracker.outline().len());
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_glyph_bounds() {
        assert_eq!(progress_glyph(0.0), " ");
        assert_eq!(progress_glyph(1.0), "█");
        assert_eq!(progress_glyph(0.5), "▄");
        assert_eq!(progress_glyph(7.0), "█");
        assert_eq!(progress_glyph(f64::NAN), " ");
    }

    #[test]
    fn test_selected_overrides_colors() {
        let status = ItemStatus {
            past: true,
            active: false,
            progress: 0.0,
            indent: 0,
        };
        assert_eq!(item_style(&status, true).bg, Some(Color::DarkGray));
        assert_eq!(item_style(&status, false).fg, Some(Color::DarkGray));
    }
}
