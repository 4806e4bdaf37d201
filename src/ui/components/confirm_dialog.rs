use super::KeyResult;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirm dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent<T> {
  /// The user accepted; here is what was pending
  Confirmed(T),
  Cancelled,
}

/// Yes/no question guarding a destructive action.
///
/// Holds the pending payload so the action cannot start before the answer.
#[derive(Debug, Clone)]
pub struct ConfirmDialog<T> {
  pending: Option<T>,
  title: String,
  message: String,
  /// Focus on "Yes"
  yes_focused: bool,
}

impl<T> Default for ConfirmDialog<T> {
  fn default() -> Self {
    Self {
      pending: None,
      title: String::new(),
      message: String::new(),
      yes_focused: false,
    }
  }
}

impl<T> ConfirmDialog<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.pending.is_some()
  }

  /// Ask; focus starts on "No"
  pub fn ask(&mut self, title: impl Into<String>, message: impl Into<String>, pending: T) {
    self.title = title.into();
    self.message = message.into();
    self.pending = Some(pending);
    self.yes_focused = false;
  }

  fn answer(&mut self, yes: bool) -> KeyResult<ConfirmEvent<T>> {
    match self.pending.take() {
      Some(pending) if yes => KeyResult::Event(ConfirmEvent::Confirmed(pending)),
      _ => KeyResult::Event(ConfirmEvent::Cancelled),
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent<T>> {
    if !self.is_active() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') => self.answer(true),
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
        self.answer(false)
      }
      KeyCode::Enter => {
        let yes = self.yes_focused;
        self.answer(yes)
      }
      KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
        self.yes_focused = !self.yes_focused;
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.is_active() {
      return;
    }

    let overlay_area = centered_rect(area, 50, 7);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(format!(" {} ", self.title))
      .title_alignment(Alignment::Center);

    let button = |label: &'static str, focused: bool| {
      if focused {
        Span::styled(
          format!(" {} ", label),
          Style::default().bg(Color::Red).fg(Color::White).bold(),
        )
      } else {
        Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
      }
    };

    let text = vec![
      Line::from(self.message.as_str()),
      Line::from(""),
      Line::from(vec![
        button("Yes, delete", self.yes_focused),
        Span::raw("   "),
        button("Cancel", !self.yes_focused),
      ])
      .alignment(Alignment::Center),
    ];

    let paragraph = Paragraph::new(text)
      .block(block)
      .wrap(Wrap { trim: true })
      .alignment(Alignment::Center);
    frame.render_widget(paragraph, overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn asked() -> ConfirmDialog<String> {
    let mut dialog = ConfirmDialog::new();
    dialog.ask("Delete client", "Do you want to delete this client?", "c1".to_string());
    dialog
  }

  #[test]
  fn test_y_confirms_with_payload() {
    let mut dialog = asked();
    assert_eq!(
      dialog.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Confirmed("c1".to_string()))
    );
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_enter_defaults_to_cancel() {
    let mut dialog = asked();
    assert_eq!(
      dialog.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
  }

  #[test]
  fn test_move_focus_then_enter_confirms() {
    let mut dialog = asked();
    dialog.handle_key(key(KeyCode::Left));
    assert_eq!(
      dialog.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ConfirmEvent::Confirmed("c1".to_string()))
    );
  }

  #[test]
  fn test_other_keys_swallowed_while_open() {
    let mut dialog = asked();
    assert_eq!(dialog.handle_key(key(KeyCode::Char('d'))), KeyResult::Handled);
    assert!(dialog.is_active());
  }

  #[test]
  fn test_inactive_passes_keys() {
    let mut dialog: ConfirmDialog<String> = ConfirmDialog::new();
    assert_eq!(dialog.handle_key(key(KeyCode::Char('y'))), KeyResult::NotHandled);
  }
}
