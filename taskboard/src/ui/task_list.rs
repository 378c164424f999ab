//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use super::theme;
use crate::app::{App, Focus};
use crate::cache::PersistedCache;

/// Render the filtered task list with the selection highlighted.
pub fn render<C: PersistedCache>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let visible = app.store.visible_tasks();
    let is_focused = app.focus == Focus::List && app.editor.is_none();

    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| {
            let checkbox = if task.completed { "[✓]" } else { "[ ]" };
            let text_style = if task.completed {
                theme::completed()
            } else {
                theme::normal()
            };

            ListItem::new(Line::from(vec![
                Span::styled(checkbox, theme::dimmed()),
                Span::raw(" "),
                Span::styled("● ", theme::priority(task.priority)),
                Span::styled(task.text.as_str(), text_style),
            ]))
        })
        .collect();

    let title = if visible.len() == app.store.tasks().len() {
        format!("Tasks ({})", visible.len())
    } else {
        format!("Tasks ({}/{})", visible.len(), app.store.tasks().len())
    };

    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::TASKS_TITLE)))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    if items.is_empty() {
        let hint = if app.store.tasks().is_empty() {
            "No tasks yet. Press a to add one."
        } else {
            "No tasks match the filter."
        };
        let list = List::new([ListItem::new(Span::styled(hint, theme::dimmed()))]).block(block);
        frame.render_widget(list, area);
        return;
    }

    let list = List::new(items).block(block).highlight_style(if is_focused {
        theme::selected()
    } else {
        theme::highlighted()
    });
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
