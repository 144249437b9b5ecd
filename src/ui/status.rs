use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;
use toc_tracker::tracker::ActivePosition;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else {
        let hints = match app.focus {
            Focus::Reader => "[j/k]scroll [Ctrl+d/u]page [[ ]]heading [t]oc [Tab]contents [q]uit",
            Focus::Toc => "[j/k]select [Enter]jump [Tab]reader [t]oc [q]uit",
        };
        match position_label(app) {
            Some(label) => Cow::Owned(format!("{} | {}", label, hints)),
            None => Cow::Borrowed(hints),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

/// Section counter for the active heading, e.g. `§ 2/5 40%`.
fn position_label(app: &App) -> Option<String> {
    let total = app.tracker.outline().len();
    if total == 0 {
        return None;
    }
    let state = app.tracker.state();
    match state.position {
        ActivePosition::BeforeStart => Some(format!("§ -/{}", total)),
        ActivePosition::Section(i) | ActivePosition::PastEnd(i) => Some(format!(
            "§ {}/{} {:.0}%",
            (i + 1).min(total),
            total,
            state.progress * 100.0
        )),
    }
}
