//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::api::BackendKind;
use crate::app::{App, Focus};
use crate::cache::PersistedCache;
use crate::tasks::{Source, StoreError};

/// Render the status bar at the bottom of the screen.
pub fn render<C: PersistedCache>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let help_text = if app.editor.is_some() {
        "Enter: save | Tab: priority | Esc: cancel"
    } else if app.focus == Focus::Filter {
        "Type to filter | Enter/Esc: back to list"
    } else {
        "a: add | e: edit | Space: done | d: delete | /: filter | r: reload | q: quit"
    };

    let unreachable = app.store.last_error().is_some_and(StoreError::is_network);
    let (dot_color, source_text) = match (app.backend, app.store.source()) {
        (BackendKind::InMemory, _) => (theme::OFFLINE, "offline"),
        _ if unreachable => (theme::ERROR, "unreachable"),
        (_, Source::Remote) => (theme::SUCCESS, "synced"),
        (_, Source::Cache) => (theme::WARNING, "cached"),
        (_, Source::Empty) => (theme::WARNING, "loading"),
    };

    let mut spans = vec![
        Span::styled("Taskboard", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {} {source_text}", app.backend)),
    ];
    if app.is_syncing() {
        spans.push(Span::styled(" ⟳", theme::normal().fg(theme::WARNING)));
    }
    spans.push(Span::raw(" | "));

    if let Some(error) = app.store.last_error() {
        spans.push(Span::styled(format!(" ✗ {error} "), theme::error_badge()));
        spans.push(Span::styled(" x: dismiss", theme::dimmed()));
    } else if let Some(notice) = &app.notice {
        spans.push(Span::styled(notice.timestamp.clone(), theme::timestamp()));
        spans.push(Span::raw(format!(" {} | ", notice.text)));
        spans.push(Span::styled(help_text, theme::dimmed()));
    } else {
        spans.push(Span::styled(help_text, theme::dimmed()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
