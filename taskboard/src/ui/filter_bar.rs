//! Filter input rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, Focus};
use crate::cache::PersistedCache;

/// Render the filter bar above the task list.
pub fn render<C: PersistedCache>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let is_focused = app.focus == Focus::Filter && app.editor.is_none();
    let filter = app.store.filter();

    let line = if filter.is_empty() && !is_focused {
        Line::from(Span::styled("Press / to filter", theme::dimmed()))
    } else {
        let mut text = filter.to_string();
        if is_focused {
            text.push('█');
        }
        Line::from(Span::styled(text, theme::normal()))
    };

    let block = Block::default()
        .title("Filter")
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(Paragraph::new(line).block(block), area);
}
