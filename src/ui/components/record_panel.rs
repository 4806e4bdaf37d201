use super::key_result::KeyResult;
use super::search_input::{SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::view::{ShortcutInfo, ShortcutProvider};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// A record that can be listed and searched in a `RecordPanel`
pub trait PanelRow {
  /// Text fields the `/` search looks in
  fn search_fields(&self) -> Vec<&str>;

  /// One list entry; may span several lines
  fn list_item(&self, width: u16) -> ListItem<'_>;
}

/// Events emitted by RecordPanel that parent view needs to handle
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPanelEvent<T> {
  /// User pressed Enter on a record
  Selected(T),
  /// User requested a refresh (r key)
  RefreshRequested,
  /// User wants to go back (q/Esc)
  Back,
}

/// Reusable record list combining:
/// - Selection state management
/// - Search overlay
/// - Loading/error/empty states
#[derive(Debug, Default)]
pub struct RecordPanel {
  list_state: ListState,
  search: SearchInput,
  empty_message: &'static str,
}

impl RecordPanel {
  pub fn new(empty_message: &'static str) -> Self {
    Self {
      empty_message,
      ..Self::default()
    }
  }

  pub fn is_searching(&self) -> bool {
    self.search.is_active()
  }

  /// Reset selection to beginning
  fn reset_selection(&mut self) {
    self.list_state.select(Some(0));
  }

  /// Records matching the current search
  pub fn filtered_items<'a, T: PanelRow>(&self, items: &'a [T]) -> Vec<&'a T> {
    self.search.filter(items)
  }

  /// Get the currently selected record
  pub fn selected<'a, T: PanelRow>(&self, items: &'a [T]) -> Option<&'a T> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.filtered_items(items).get(idx).copied())
  }

  /// Handle key events, returning an event for the parent view
  pub fn handle_key<T: PanelRow + Clone>(
    &mut self,
    key: KeyEvent,
    items: &[T],
  ) -> KeyResult<RecordPanelEvent<T>> {
    // Search overlay first
    match self.search.handle_key(key) {
      KeyResult::Handled => return KeyResult::Handled,
      KeyResult::Event(SearchEvent::Changed) => {
        self.reset_selection();
        return KeyResult::Handled;
      }
      KeyResult::Event(SearchEvent::Submitted) => return KeyResult::Handled,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        KeyResult::Handled
      }
      KeyCode::Char('g') | KeyCode::Home => {
        self.list_state.select_first();
        KeyResult::Handled
      }
      KeyCode::Char('G') | KeyCode::End => {
        self.list_state.select_last();
        KeyResult::Handled
      }
      KeyCode::Char('r') => KeyResult::Event(RecordPanelEvent::RefreshRequested),
      KeyCode::Enter => match self.selected(items) {
        Some(item) => KeyResult::Event(RecordPanelEvent::Selected(item.clone())),
        None => KeyResult::Handled,
      },
      KeyCode::Char('q') | KeyCode::Esc => KeyResult::Event(RecordPanelEvent::Back),
      _ => KeyResult::NotHandled,
    }
  }

  /// Render the list. `error` is shown in the title; a failed load with no
  /// data shows a retry hint.
  pub fn render<T: PanelRow>(
    &mut self,
    frame: &mut Frame,
    area: Rect,
    items: &[T],
    title: &str,
    is_loading: bool,
    error: Option<&str>,
  ) {
    let filtered = self.filtered_items(items);
    let len = filtered.len();
    ensure_valid_selection(&mut self.list_state, len);

    let search_indicator = if self.search.is_filtering() {
      format!(" [/{}]", self.search.query().trim())
    } else {
      String::new()
    };

    let display_title = match (is_loading, error) {
      (true, _) => format!(" {} (loading...) ", title),
      (false, Some(e)) => format!(" {} (error: {}) ", title, e),
      (false, None) => format!(" {} ({}){} ", title, len, search_indicator),
    };

    let block = Block::default()
      .title(display_title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if items.is_empty() && !is_loading {
      let content = if error.is_some() {
        "Failed to load. Press 'r' to retry."
      } else {
        self.empty_message
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      self.search.render_overlay(frame, area, len);
      return;
    }

    let width = area.width.saturating_sub(4);
    let list_items: Vec<ListItem> = filtered.iter().map(|item| item.list_item(width)).collect();

    let list = List::new(list_items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
    self.search.render_overlay(frame, area, len);
  }
}

impl ShortcutProvider for RecordPanel {
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("r", "refresh").with_priority(100),
    ]
  }
}
