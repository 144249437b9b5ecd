//! Input handling for the TUI.
//!
//! Keys are dispatched on which pane has focus. Scrolling the reader moves
//! the container directly; the tracker hears about it through the scroll
//! subscription like any other scroll.

use crate::app::{App, Focus};
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match app.focus {
        Focus::Reader => handle_reader_input(app, code, modifiers),
        Focus::Toc => handle_toc_input(app, code, modifiers),
    }
}

/// Keys shared by both panes.
fn handle_common_input(app: &mut App, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('t') => {
            app.toggle_toc();
            Some(Action::Continue)
        }
        KeyCode::Char(']') => {
            app.navigate_relative(1);
            Some(Action::Continue)
        }
        KeyCode::Char('[') => {
            app.navigate_relative(-1);
            Some(Action::Continue)
        }
        _ => None,
    }
}

fn half_page(app: &App) -> isize {
    (app.reader.visible_rows() / 2).max(1) as isize
}

fn handle_reader_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if let Some(action) = handle_common_input(app, code) {
        return action;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Char('d') if ctrl => app.reader.scroll_by(half_page(app)),
        KeyCode::Char('u') if ctrl => app.reader.scroll_by(-half_page(app)),
        KeyCode::Char('j') | KeyCode::Down => app.reader.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.reader.scroll_by(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => {
            let page = app.reader.visible_rows().max(1) as isize;
            app.reader.scroll_by(page);
        }
        KeyCode::PageUp => {
            let page = app.reader.visible_rows().max(1) as isize;
            app.reader.scroll_by(-page);
        }
        KeyCode::Char('g') | KeyCode::Home => app.reader.scroll_by(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.reader.scroll_by(isize::MAX),
        KeyCode::Tab => app.focus_toc(),
        _ => {}
    }
    Action::Continue
}

fn handle_toc_input(app: &mut App, code: KeyCode, _modifiers: KeyModifiers) -> Action {
    if let Some(action) = handle_common_input(app, code) {
        return action;
    }

    match code {
        KeyCode::Tab | KeyCode::Esc => app.focus = Focus::Reader,
        KeyCode::Char('j') | KeyCode::Down => app.select_toc_item(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_toc_item(-1),
        KeyCode::Char('g') | KeyCode::Home => app.select_toc_item(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.select_toc_item(isize::MAX),
        KeyCode::Enter | KeyCode::Char('l') => {
            let index = app.toc_selected;
            app.navigate_to(index);
        }
        _ => {}
    }
    Action::Continue
}
