//! Priority color legend.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use taskboard_proto::task::Priority;

use super::theme;

/// Render one line mapping each priority to its color.
pub fn render(frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(" Priority: ", theme::dimmed())];
    for priority in Priority::ALL {
        spans.push(Span::styled("■ ", theme::priority(priority)));
        spans.push(Span::styled(priority.label().to_uppercase(), theme::normal()));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
