use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

const MAX_SUGGESTIONS: usize = 8;

/// What the palette resolved on Enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  Run(&'static Command),
  /// Nothing matched; the trimmed text as typed
  Unknown(String),
  Cancelled,
}

/// `:` command palette.
///
/// Enter runs, in order: an exact name or alias, the highlighted
/// suggestion, or reports the text as unknown. Tab completes the input to
/// the highlighted suggestion.
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  highlighted: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
    self.highlighted = 0;
  }

  fn close(&mut self) {
    self.active = false;
    self.input.clear();
    self.highlighted = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  fn resolve(&self) -> CommandEvent {
    let typed = self.input.value().trim();
    if let Some(command) = commands::find(typed) {
      return CommandEvent::Run(command);
    }
    match self.suggestions().get(self.highlighted) {
      Some(command) => CommandEvent::Run(command),
      None => CommandEvent::Unknown(typed.to_string()),
    }
  }

  fn move_highlight(&mut self, forward: bool) {
    let count = self.suggestions().len().min(MAX_SUGGESTIONS);
    if count == 0 {
      return;
    }
    self.highlighted = if forward {
      (self.highlighted + 1) % count
    } else {
      (self.highlighted + count - 1) % count
    };
  }

  /// Handles activation too, so call it whether or not the palette is open
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.close();
        return KeyResult::Event(CommandEvent::Cancelled);
      }
      KeyCode::Enter => {
        let event = self.resolve();
        self.close();
        return KeyResult::Event(event);
      }
      KeyCode::Tab => {
        if let Some(command) = self.suggestions().get(self.highlighted) {
          self.input = TextInput::with_value(command.name);
          self.highlighted = 0;
        }
        return KeyResult::Handled;
      }
      KeyCode::Down => {
        self.move_highlight(true);
        return KeyResult::Handled;
      }
      KeyCode::Up | KeyCode::BackTab => {
        self.move_highlight(false);
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.input.handle_key(key) {
      InputResult::Consumed => {
        self.highlighted = 0;
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::NotHandled,
      // Enter and Esc are taken above
      InputResult::Submitted(_) | InputResult::Cancelled => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS) as u16;
    let width = (area.width * 60 / 100).clamp(30, 64).min(area.width);
    let height = (3 + shown).min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);

    frame.render_widget(Clear, overlay_area);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    let [prompt_area, list_area] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    frame.render_widget(
      Paragraph::new(Line::from(vec![
        Span::styled(":", Style::default().fg(Color::Yellow)),
        Span::raw(self.input.value()),
      ])),
      prompt_area,
    );
    let cursor_x = prompt_area.x + 1 + self.input.cursor_position() as u16;
    if cursor_x < prompt_area.right() {
      frame.set_cursor_position((cursor_x, prompt_area.y));
    }

    if suggestions.is_empty() || list_area.height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|command| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<13}", command.name), Style::default().fg(Color::Cyan)),
          Span::styled(
            format!("{:<12}", command.aliases.join(",")),
            Style::default().fg(Color::Yellow),
          ),
          Span::styled(command.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default().with_selected(Some(self.highlighted));
    frame.render_stateful_widget(list, list_area, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(input: &mut CommandInput, text: &str) {
    for c in text.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn run_name(result: KeyResult<CommandEvent>) -> Option<&'static str> {
    match result {
      KeyResult::Event(CommandEvent::Run(command)) => Some(command.name),
      _ => None,
    }
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut input = CommandInput::new();
    assert_eq!(input.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
    assert_eq!(input.handle_key(key(KeyCode::Char(':'))), KeyResult::Handled);
    assert!(input.is_active());
  }

  #[test]
  fn test_alias_runs_its_command() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "nc");
    assert_eq!(run_name(input.handle_key(key(KeyCode::Enter))), Some("new-client"));
    assert!(!input.is_active());
  }

  #[test]
  fn test_exact_alias_beats_highlighted_suggestion() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "o");
    input.handle_key(key(KeyCode::Down));
    assert_eq!(run_name(input.handle_key(key(KeyCode::Enter))), Some("orders"));
  }

  #[test]
  fn test_down_moves_highlight() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "top");
    input.handle_key(key(KeyCode::Down));
    assert_eq!(run_name(input.handle_key(key(KeyCode::Enter))), Some("top-clients"));
  }

  #[test]
  fn test_tab_completes_highlighted_name() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "new-p");
    assert_eq!(input.handle_key(key(KeyCode::Tab)), KeyResult::Handled);
    assert_eq!(input.input.value(), "new-product");
    assert!(input.is_active());
  }

  #[test]
  fn test_unmatched_text_is_unknown() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "Zzz ");
    assert_eq!(
      input.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Unknown("Zzz".to_string()))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "cl");
    assert_eq!(
      input.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(CommandEvent::Cancelled)
    );
    assert!(!input.is_active());
    assert_eq!(input.input.value(), "");
  }
}
