use super::input::{InputResult, TextInput};
use super::record_panel::PanelRow;
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the search box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
  /// The filter changed (typing, or Esc clearing it)
  Changed,
  /// Enter closed the box; the filter stays applied
  Submitted,
}

/// `/` search over `PanelRow`s.
///
/// The query is split on whitespace and every term must appear, ignoring
/// case, in at least one of the row's search fields. "ana acme" finds Ana
/// at Acme but not Ana at Globex.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
  /// Lowercased terms of the applied query
  terms: Vec<String>,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn is_filtering(&self) -> bool {
    !self.terms.is_empty()
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Open the box on the current query so it can be refined
  pub fn activate(&mut self) {
    self.active = true;
  }

  fn apply(&mut self) {
    self.terms = self
      .input
      .value()
      .split_whitespace()
      .map(str::to_lowercase)
      .collect();
  }

  pub fn matches<T: PanelRow>(&self, row: &T) -> bool {
    if self.terms.is_empty() {
      return true;
    }
    let fields: Vec<String> = row
      .search_fields()
      .into_iter()
      .map(str::to_lowercase)
      .collect();
    self
      .terms
      .iter()
      .all(|term| fields.iter().any(|field| field.contains(term.as_str())))
  }

  /// Rows passing the filter, in their original order
  pub fn filter<'a, T: PanelRow>(&self, rows: &'a [T]) -> Vec<&'a T> {
    rows.iter().filter(|row| self.matches(*row)).collect()
  }

  /// Handles activation too, so call it whether or not the box is open
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        self.terms.clear();
        KeyResult::Event(SearchEvent::Changed)
      }
      InputResult::Consumed => {
        self.apply();
        KeyResult::Event(SearchEvent::Changed)
      }
      // Up/Down still reach the list
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Draw the box with how many rows the query currently keeps
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, matches: usize) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, 3u16.min(area.height));
    frame.render_widget(Clear, overlay_area);

    let title = match matches {
      1 => " Search (1 match) ".to_string(),
      n => format!(" Search ({} matches) ", n),
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);
    if inner.height == 0 {
      return;
    }

    frame.render_widget(
      Paragraph::new(Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(self.input.value()),
      ])),
      inner,
    );
    let cursor_x = inner.x + 1 + self.input.cursor_position() as u16;
    if cursor_x < inner.right() {
      frame.set_cursor_position((cursor_x, inner.y));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;
  use ratatui::widgets::ListItem;

  struct Contact {
    name: &'static str,
    company: &'static str,
  }

  impl PanelRow for Contact {
    fn search_fields(&self) -> Vec<&str> {
      vec![self.name, self.company]
    }

    fn list_item(&self, _width: u16) -> ListItem<'_> {
      ListItem::new(self.name)
    }
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn search_for(text: &str) -> SearchInput {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    for c in text.chars() {
      search.handle_key(key(KeyCode::Char(c)));
    }
    search
  }

  fn contacts() -> Vec<Contact> {
    vec![
      Contact { name: "Ana Ruiz", company: "Acme" },
      Contact { name: "Ana Gil", company: "Globex" },
      Contact { name: "Luis Paz", company: "ACME Labs" },
    ]
  }

  fn names(search: &SearchInput, rows: &[Contact]) -> Vec<&'static str> {
    search.filter(rows).iter().map(|c| c.name).collect()
  }

  #[test]
  fn test_typing_emits_changes() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a'))),
      KeyResult::Event(SearchEvent::Changed)
    );
    assert!(search.is_filtering());
  }

  #[test]
  fn test_every_term_must_match_some_field() {
    let rows = contacts();
    assert_eq!(names(&search_for("acme"), &rows), vec!["Ana Ruiz", "Luis Paz"]);
    assert_eq!(names(&search_for("ANA acme"), &rows), vec!["Ana Ruiz"]);
    assert!(names(&search_for("ana labs"), &rows).is_empty());
  }

  #[test]
  fn test_blank_query_keeps_everything() {
    let rows = contacts();
    assert_eq!(names(&SearchInput::new(), &rows).len(), 3);
    let search = search_for("   ");
    assert!(!search.is_filtering());
    assert_eq!(names(&search, &rows).len(), 3);
  }

  #[test]
  fn test_submit_keeps_filter_and_reopen_refines_it() {
    let rows = contacts();
    let mut search = search_for("ana");
    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());
    assert_eq!(names(&search, &rows), vec!["Ana Ruiz", "Ana Gil"]);

    search.handle_key(key(KeyCode::Char('/')));
    for c in " gl".chars() {
      search.handle_key(key(KeyCode::Char(c)));
    }
    assert_eq!(search.query(), "ana gl");
    assert_eq!(names(&search, &rows), vec!["Ana Gil"]);
  }

  #[test]
  fn test_escape_clears_filter() {
    let rows = contacts();
    let mut search = search_for("luis");
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed)
    );
    assert_eq!(search.query(), "");
    assert_eq!(names(&search, &rows).len(), 3);
  }
}
