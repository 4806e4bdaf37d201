use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh and query polling
  Tick,
  /// Outcome of a background operation to show the user
  Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
  Success,
  Failure,
}

/// A modal message: what happened, and whether it worked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub kind: NoticeKind,
  pub title: String,
  pub message: String,
}

impl Notice {
  pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      kind: NoticeKind::Success,
      title: title.into(),
      message: message.into(),
    }
  }

  pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      kind: NoticeKind::Failure,
      title: title.into(),
      message: message.into(),
    }
  }
}

/// Handle for background tasks to post notices to the UI.
///
/// Posting after the UI has shut down is silently ignored.
#[derive(Debug, Clone)]
pub struct Notifier {
  tx: mpsc::UnboundedSender<Event>,
}

impl Notifier {
  pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
    Self { tx }
  }

  pub fn notify(&self, notice: Notice) {
    debug!(title = %notice.title, kind = ?notice.kind, "notice");
    let _ = self.tx.send(Event::Notice(notice));
  }

  /// Post a success or a failure notice for a finished operation.
  ///
  /// Failures carry the error's own message.
  pub fn report<T, E: std::fmt::Display>(
    &self,
    result: &Result<T, E>,
    success: (&str, &str),
    failure_title: &str,
  ) {
    match result {
      Ok(_) => self.notify(Notice::success(success.0, success.1)),
      Err(e) => self.notify(Notice::failure(failure_title, e.to_string())),
    }
  }
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Terminal polling blocks, keep it off the async workers
    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
      let event = if event::poll(tick_rate).unwrap_or(false) {
        match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
          // Resizes and other input just trigger a redraw
          Ok(_) => Event::Tick,
          Err(_) => continue,
        }
      } else {
        Event::Tick
      };

      if input_tx.send(event).is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  /// Sender for posting notices from background tasks
  pub fn notifier(&self) -> Notifier {
    Notifier::new(self.tx.clone())
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_report_success_and_failure() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = Notifier::new(tx);

    notifier.report(&Ok::<_, String>(()), ("Client created", "Saved"), "Error");
    notifier.report(&Err::<(), _>("Ese cliente ya existe"), ("ok", "ok"), "Error");

    match rx.try_recv().unwrap() {
      Event::Notice(notice) => assert_eq!(notice, Notice::success("Client created", "Saved")),
      other => panic!("unexpected event {:?}", other),
    }
    match rx.try_recv().unwrap() {
      Event::Notice(notice) => {
        assert_eq!(notice.kind, NoticeKind::Failure);
        assert_eq!(notice.message, "Ese cliente ya existe");
      }
      other => panic!("unexpected event {:?}", other),
    }
  }

  #[test]
  fn test_notify_after_receiver_dropped_is_ignored() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    Notifier::new(tx).notify(Notice::success("a", "b"));
  }
}
