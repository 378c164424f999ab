//! Terminal UI rendering.
//!
//! Every view is a pure function of [`App`]: nothing here mutates state.

pub mod editor;
pub mod filter_bar;
pub mod legend;
pub mod status_bar;
pub mod task_list;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::App;
use crate::cache::PersistedCache;

/// Main draw function for the entire UI.
pub fn draw<C: PersistedCache>(frame: &mut Frame, app: &App<C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter
            Constraint::Min(3),    // Tasks
            Constraint::Length(1), // Legend
            Constraint::Length(1), // Status
        ])
        .split(frame.area());

    filter_bar::render(frame, chunks[0], app);
    task_list::render(frame, chunks[1], app);
    legend::render(frame, chunks[2]);
    status_bar::render(frame, chunks[3], app);

    // Modal goes last so it paints over the list.
    if let Some(state) = &app.editor {
        editor::render(frame, app.store.mode(), state);
    }
}
