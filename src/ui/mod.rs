pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::{draw_footer, draw_header};

/// Keep a list selection inside `0..len`; nothing is selected when empty.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    Some(_) => {}
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let screen = frame.area();
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(screen);

  let shortcuts = app.shortcuts();
  let user = app.user_name();
  draw_header(frame, chunks[0], app.title(), user.as_deref(), &shortcuts);

  let breadcrumb = app.breadcrumb();
  let status = app.status();
  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }
  draw_footer(frame, chunks[2], &breadcrumb, status.as_deref());

  app.command_input().render_overlay(frame, chunks[1]);
  app.notifications().render_overlay(frame, screen);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_selection_clamped_to_len() {
    let mut state = ListState::default().with_selected(Some(7));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));
  }

  #[test]
  fn test_empty_list_clears_selection() {
    let mut state = ListState::default().with_selected(Some(0));
    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_missing_selection_starts_at_top() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 4);
    assert_eq!(state.selected(), Some(0));
  }
}
