//! Modal editor for creating and editing tasks.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use taskboard_proto::task::Priority;

use super::theme;
use crate::app::EditorState;
use crate::tasks::Mode;

const WIDTH: u16 = 60;
const HEIGHT: u16 = 7;

/// Render the editor as a centered modal over the rest of the UI.
pub fn render(frame: &mut Frame, mode: &Mode, state: &EditorState) {
    let area = centered(frame.area(), WIDTH, HEIGHT);
    let title = match mode {
        Mode::Editing(_) => "Edit task",
        _ => "New task",
    };

    let mut text = state.text.clone();
    let at = text
        .char_indices()
        .nth(state.cursor)
        .map_or(text.len(), |(i, _)| i);
    text.insert(at, '█');

    let mut priorities = vec![Span::styled("Priority: ", theme::dimmed())];
    for priority in Priority::ALL {
        let label = format!(" {} ", priority.label().to_uppercase());
        let style = if priority == state.priority {
            theme::priority(priority).add_modifier(ratatui::style::Modifier::REVERSED)
        } else {
            theme::priority(priority)
        };
        priorities.push(Span::styled(label, style));
        priorities.push(Span::raw(" "));
    }

    let lines = vec![
        Line::from(Span::styled(text, theme::normal())),
        Line::from(""),
        Line::from(priorities),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: save | Tab: priority | Esc: cancel",
            theme::dimmed(),
        )),
    ];

    let block = Block::default()
        .title(Span::styled(title, theme::bold()))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// A `width` x `height` rectangle centered in `outer`, shrunk to fit.
fn centered(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}
