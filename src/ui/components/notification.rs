use super::KeyResult;
use crate::event::{Notice, NoticeKind};
use crate::ui::renderfns::centered_rect;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Modal notices, shown one at a time in arrival order.
///
/// Any key dismisses the visible notice. Failures also close on their own
/// once `failure_timeout` has passed.
#[derive(Debug)]
pub struct NotificationOverlay {
  queue: VecDeque<Notice>,
  shown_at: Option<Instant>,
  failure_timeout: Duration,
}

impl NotificationOverlay {
  pub fn new(failure_timeout: Duration) -> Self {
    Self {
      queue: VecDeque::new(),
      shown_at: None,
      failure_timeout,
    }
  }

  pub fn push(&mut self, notice: Notice) {
    if self.queue.is_empty() {
      self.shown_at = Some(Instant::now());
    }
    self.queue.push_back(notice);
  }

  pub fn current(&self) -> Option<&Notice> {
    self.queue.front()
  }

  pub fn is_active(&self) -> bool {
    !self.queue.is_empty()
  }

  fn dismiss(&mut self) {
    self.queue.pop_front();
    self.shown_at = self.current().map(|_| Instant::now());
  }

  /// Swallows the key that closes a notice
  pub fn handle_key(&mut self, _key: KeyEvent) -> KeyResult<()> {
    if !self.is_active() {
      return KeyResult::NotHandled;
    }
    self.dismiss();
    KeyResult::Handled
  }

  /// Expire a failure notice that has been up long enough
  pub fn tick(&mut self) {
    self.expire(Instant::now());
  }

  fn expire(&mut self, now: Instant) {
    let (Some(notice), Some(shown_at)) = (self.current(), self.shown_at) else {
      return;
    };
    if notice.kind == NoticeKind::Failure && now.duration_since(shown_at) >= self.failure_timeout {
      self.dismiss();
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let Some(notice) = self.current() else {
      return;
    };

    let (color, icon) = match notice.kind {
      NoticeKind::Success => (Color::Green, "✔"),
      NoticeKind::Failure => (Color::Red, "✖"),
    };

    let overlay_area = centered_rect(area, 56, 7);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color))
      .title(format!(" {} {} ", icon, notice.title))
      .title_alignment(Alignment::Center);

    let mut text = vec![Line::from(notice.message.as_str()), Line::from("")];
    text.push(
      Line::from(Span::styled(
        "press any key",
        Style::default().fg(Color::DarkGray),
      ))
      .alignment(Alignment::Center),
    );

    let paragraph = Paragraph::new(text)
      .block(block)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  fn any_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)
  }

  #[test]
  fn test_any_key_dismisses_in_order() {
    let mut overlay = NotificationOverlay::new(Duration::from_secs(3));
    overlay.push(Notice::success("Client created", "Saved"));
    overlay.push(Notice::failure("Error", "Network down"));

    assert_eq!(overlay.current().map(|n| n.title.as_str()), Some("Client created"));
    assert_eq!(overlay.handle_key(any_key()), KeyResult::Handled);
    assert_eq!(overlay.current().map(|n| n.title.as_str()), Some("Error"));
    overlay.handle_key(any_key());
    assert!(!overlay.is_active());
    assert_eq!(overlay.handle_key(any_key()), KeyResult::NotHandled);
  }

  #[test]
  fn test_failure_expires() {
    let mut overlay = NotificationOverlay::new(Duration::from_secs(3));
    overlay.push(Notice::failure("Error", "boom"));
    let shown = overlay.shown_at.unwrap();

    overlay.expire(shown + Duration::from_secs(2));
    assert!(overlay.is_active());
    overlay.expire(shown + Duration::from_secs(3));
    assert!(!overlay.is_active());
  }

  #[test]
  fn test_success_waits_for_key() {
    let mut overlay = NotificationOverlay::new(Duration::from_secs(3));
    overlay.push(Notice::success("Deleted", "Client deleted"));
    let shown = overlay.shown_at.unwrap();

    overlay.expire(shown + Duration::from_secs(60));
    assert!(overlay.is_active());
  }
}
