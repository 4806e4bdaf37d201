use super::KeyResult;
use crate::api::types::OrderStatus;
use crate::ui::renderfns::{centered_rect, status_color};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by status picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPickerEvent {
  /// A status other than the current one was chosen
  Selected(OrderStatus),
  /// Picker cancelled, or the current status re-chosen
  Cancelled,
}

/// Picker for changing an order's status
#[derive(Debug, Clone, Default)]
pub struct StatusPicker {
  active: bool,
  current: OrderStatus,
  selected: usize,
  title: String,
}

impl StatusPicker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if picker is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker with the order's current status preselected
  pub fn show(&mut self, title: String, current: OrderStatus) {
    self.active = true;
    self.current = current;
    self.selected = OrderStatus::ALL
      .iter()
      .position(|s| *s == current)
      .unwrap_or(0);
    self.title = title;
  }

  /// Hide the picker
  pub fn hide(&mut self) {
    self.active = false;
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<StatusPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    let count = OrderStatus::ALL.len();
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(StatusPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let status = OrderStatus::ALL[self.selected];
        self.hide();
        if status == self.current {
          KeyResult::Event(StatusPickerEvent::Cancelled)
        } else {
          KeyResult::Event(StatusPickerEvent::Selected(status))
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.selected = (self.selected + 1) % count;
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.selected = (self.selected + count - 1) % count;
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the status picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (self.title.chars().count() as u16 + 6).max(24);
    let height = OrderStatus::ALL.len() as u16 + 2;
    let overlay_area = centered_rect(area, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = OrderStatus::ALL
      .iter()
      .map(|status| {
        let marker = if *status == self.current { " (current)" } else { "" };
        ListItem::new(Line::from(vec![
          Span::styled(status.label(), Style::default().fg(status_color(*status))),
          Span::styled(marker, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_current_status_preselected() {
    let mut picker = StatusPicker::new();
    picker.show("Order status".into(), OrderStatus::Canceled);
    // Re-choosing the current status changes nothing
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(StatusPickerEvent::Cancelled)
    );
  }

  #[test]
  fn test_select_other_status() {
    let mut picker = StatusPicker::new();
    picker.show("Order status".into(), OrderStatus::Pending);
    picker.handle_key(key(KeyCode::Char('k')));
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(StatusPickerEvent::Selected(OrderStatus::Completed))
    );
    assert!(!picker.is_active());
  }

  #[test]
  fn test_navigation_wraps() {
    let mut picker = StatusPicker::new();
    picker.show("Order status".into(), OrderStatus::Completed);
    picker.handle_key(key(KeyCode::Up));
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(StatusPickerEvent::Selected(OrderStatus::Canceled))
    );
  }

  #[test]
  fn test_inactive_passes_keys() {
    let mut picker = StatusPicker::new();
    assert_eq!(picker.handle_key(key(KeyCode::Enter)), KeyResult::NotHandled);
  }
}
