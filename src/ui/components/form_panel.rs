use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::form::{FormState, Schema};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Events emitted by a form panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Every field is valid; read the values from `state()`
  Submitted,
  Cancelled,
}

/// Editable form over a schema: one text input per field, focus moves with
/// Tab/arrows, leaving a field marks it touched.
#[derive(Debug, Clone)]
pub struct FormPanel {
  state: FormState,
  inputs: Vec<TextInput>,
  focus: usize,
  submit_label: &'static str,
}

impl FormPanel {
  pub fn new(schema: &'static Schema, submit_label: &'static str) -> Self {
    Self {
      state: FormState::new(schema),
      inputs: vec![TextInput::new(); schema.fields.len()],
      focus: 0,
      submit_label,
    }
  }

  pub fn state(&self) -> &FormState {
    &self.state
  }

  /// Load values (editing an existing record); touched state is cleared
  pub fn reset(&mut self, values: &[(&str, String)]) {
    self.state.reset(values);
    self.inputs = self
      .state
      .schema()
      .fields
      .iter()
      .map(|f| TextInput::with_value(self.state.value(f.name)))
      .collect();
    self.focus = 0;
  }

  fn field_name(&self, index: usize) -> &'static str {
    self.state.schema().fields[index].name
  }

  fn move_focus(&mut self, forward: bool) {
    let count = self.inputs.len();
    if count == 0 {
      return;
    }
    self.state.blur(self.field_name(self.focus));
    self.focus = if forward {
      (self.focus + 1) % count
    } else {
      (self.focus + count - 1) % count
    };
  }

  fn submit(&mut self) -> KeyResult<FormEvent> {
    if self.state.submit() {
      KeyResult::Event(FormEvent::Submitted)
    } else {
      // Jump to the first field with an error
      let errors = self.state.errors();
      if let Some(i) = self
        .state
        .schema()
        .fields
        .iter()
        .position(|f| errors.contains_key(f.name))
      {
        self.focus = i;
      }
      KeyResult::Handled
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    match key.code {
      KeyCode::Esc => return KeyResult::Event(FormEvent::Cancelled),
      KeyCode::Tab | KeyCode::Down => {
        self.move_focus(true);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.move_focus(false);
        return KeyResult::Handled;
      }
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        return self.submit();
      }
      KeyCode::Enter => {
        if self.focus + 1 == self.inputs.len() {
          return self.submit();
        }
        self.move_focus(true);
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(input) = self.inputs.get_mut(self.focus) else {
      return KeyResult::NotHandled;
    };
    match input.handle_key(key) {
      InputResult::Consumed => {
        let value = input.value().to_string();
        let name = self.field_name(self.focus);
        self.state.set_value(name, value);
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::NotHandled,
      // Enter and Esc are taken above
      InputResult::Submitted(_) | InputResult::Cancelled => KeyResult::Handled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, busy: bool) {
    let block = Block::default()
      .title(format!(" {} ", title))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = self.state.schema().fields;
    let mut lines = Vec::with_capacity(fields.len() * 3 + 2);

    for (i, (field, input)) in fields.iter().zip(&self.inputs).enumerate() {
      let focused = i == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Yellow).bold()
      } else {
        Style::default().fg(Color::Gray)
      };
      let required = if field.is_required() { " *" } else { "  " };

      let value_spans = vec![
        Span::styled(format!("{:>12}{} ", field.label, required), label_style),
        Span::raw(input.display_value(field.masked)),
      ];
      lines.push(Line::from(value_spans));

      // Label column is 12 wide plus the marker and a space
      if focused && !busy {
        let x = inner.x + 15 + input.cursor_position() as u16;
        let y = inner.y + (i * 2) as u16;
        if x < inner.right() && y < inner.bottom() {
          frame.set_cursor_position(Position::new(x, y));
        }
      }

      match self.state.visible_error(field.name) {
        Some(error) => lines.push(Line::from(Span::styled(
          format!("{:>15}{}", "", error),
          Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from("")),
      }
    }

    let footer = if busy {
      Span::styled("Saving...", Style::default().fg(Color::Yellow))
    } else {
      Span::styled(
        format!("[ {} ]  Enter on last field / Ctrl-S   Esc cancel", self.submit_label),
        Style::default().fg(Color::DarkGray),
      )
    };
    lines.push(Line::from(footer));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}
