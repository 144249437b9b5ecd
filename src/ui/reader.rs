use crate::app::{App, Focus, MAX_SCROLL};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use toc_tracker::util::truncate_to_width;

/// Render the document reader.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let reader = &app.reader;

    // Rows are pre-wrapped by the pane; header rows are truncated to one row each
    let header = [
        Line::from(Span::styled(
            truncate_to_width(&reader.title, inner_width).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_to_width(&reader.source, inner_width).into_owned(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let text = Text::from_iter(
        header
            .into_iter()
            .chain(reader.rows().iter().cloned()),
    );

    let border_style = if app.focus == Focus::Reader {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Document"),
        )
        .scroll((reader.scroll_offset().min(MAX_SCROLL) as u16, 0));

    f.render_widget(paragraph, area);
}
