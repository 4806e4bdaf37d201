use crate::api::types::User;
use crate::api::CachedCrmClient;
use crate::commands::Command;
use crate::config::Config;
use crate::event::{Event, EventHandler, Notice};
use crate::query::Query;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, NotificationOverlay};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crate::ui::views::{
  ClientFormView, ClientListView, LoginView, NewOrderView, OrderListView, ProductFormView,
  ProductListView, RankingView,
};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use tracing::{info, warn};

/// Main application state
pub struct App {
  ctx: ViewContext,
  title: String,

  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  command_input: CommandInput,
  notifications: NotificationOverlay,

  /// Signed-in salesperson; `None` once the server rejected the session
  user: Query<Option<User>>,

  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, ctx: ViewContext) -> Self {
    let signed_in = ctx.crm.session().is_signed_in();
    let root: Box<dyn View> = if signed_in {
      Box::new(ClientListView::new(ctx.clone()))
    } else {
      Box::new(LoginView::new(ctx.clone()))
    };

    let mut user = Self::user_query(&ctx.crm);
    if signed_in {
      user.fetch();
    }

    Self {
      title: config.title().to_string(),
      view_stack: vec![root],
      command_input: CommandInput::new(),
      notifications: NotificationOverlay::new(config.notification_timeout()),
      user,
      should_quit: false,
      ctx,
    }
  }

  fn user_query(crm: &CachedCrmClient) -> Query<Option<User>> {
    let crm = crm.clone();
    Query::new(move || {
      let crm = crm.clone();
      async move {
        match crm.current_user().await {
          Ok(user) => Ok(Some(user)),
          Err(e) if e.is_rejected() => {
            warn!(error = %e, "session rejected");
            Ok(None)
          }
          Err(e) => Err(e.to_string()),
        }
      }
    })
  }

  pub async fn run(&mut self, events: &mut EventHandler) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = self.event_loop(&mut terminal, events).await;
    restore_terminal()?;
    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Notice(notice) => self.notifications.push(notice),
    }
  }

  fn tick(&mut self) {
    self.notifications.tick();

    if self.user.poll() && matches!(self.user.data(), Some(None)) {
      self.end_session();
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.tick(),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn handle_key(&mut self, key: KeyEvent) {
    // A notification swallows the key that dismisses it
    if self.notifications.handle_key(key).is_consumed() {
      return;
    }

    if self.command_input.is_active() {
      match self.command_input.handle_key(key) {
        KeyResult::Event(CommandEvent::Run(command)) => self.execute_command(command),
        KeyResult::Event(CommandEvent::Unknown(text)) => self.notifications.push(Notice::failure(
          "Unknown command",
          format!("'{}' is not a command", text),
        )),
        _ => {}
      }
      return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      self.should_quit = true;
      return;
    }

    let captures_input = self
      .view_stack
      .last()
      .is_some_and(|view| view.captures_input());
    if !captures_input {
      match key.code {
        KeyCode::Char(':') => {
          self.command_input.activate();
          return;
        }
        KeyCode::Char('q') => {
          self.apply(ViewAction::Pop);
          return;
        }
        _ => {}
      }
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    self.apply(action);
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
          if let Some(view) = self.view_stack.last_mut() {
            view.on_resume();
          }
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::SignedIn => {
        self.set_root(Box::new(ClientListView::new(self.ctx.clone())));
        self.user.refetch();
      }
    }
  }

  fn set_root(&mut self, view: Box<dyn View>) {
    self.view_stack.clear();
    self.view_stack.push(view);
  }

  fn execute_command(&mut self, command: &Command) {
    let ctx = self.ctx.clone();
    match command.name {
      "quit" => self.should_quit = true,
      "logout" => self.end_session(),
      _ if !ctx.crm.session().is_signed_in() => {
        self
          .notifications
          .push(Notice::failure("Signed out", "Sign in first"));
      }
      "clients" => self.set_root(Box::new(ClientListView::new(ctx))),
      "products" => self.set_root(Box::new(ProductListView::new(ctx))),
      "orders" => self.set_root(Box::new(OrderListView::new(ctx))),
      "new-client" => self.apply(ViewAction::Push(Box::new(ClientFormView::new_client(ctx)))),
      "new-product" => self.apply(ViewAction::Push(Box::new(ProductFormView::new_product(ctx)))),
      "new-order" => self.apply(ViewAction::Push(Box::new(NewOrderView::new(ctx)))),
      "top-sellers" => self.apply(ViewAction::Push(Box::new(RankingView::top_sellers(ctx)))),
      "top-clients" => self.apply(ViewAction::Push(Box::new(RankingView::top_clients(ctx)))),
      other => warn!(command = other, "command has no handler"),
    }
  }

  /// Drop the token and everything cached under it, then ask for credentials
  fn end_session(&mut self) {
    if let Err(e) = self.ctx.crm.session().sign_out() {
      self
        .notifications
        .push(Notice::failure("Could not sign out", e.to_string()));
      return;
    }
    self.ctx.crm.clear_cache();
    self.user = Self::user_query(&self.ctx.crm);
    info!("signed out");
    self.set_root(Box::new(LoginView::new(self.ctx.clone())));
  }

  // Accessors for UI rendering
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn user_name(&self) -> Option<String> {
    self
      .user
      .data()
      .and_then(Option::as_ref)
      .map(User::full_name)
  }

  /// Right side of the footer
  pub fn status(&self) -> Option<String> {
    if self.user.is_loading() {
      return Some("connecting...".to_string());
    }
    self.user.error().map(|e| format!("offline: {}", e))
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|view| view.shortcuts())
      .unwrap_or_default()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn notifications(&self) -> &NotificationOverlay {
    &self.notifications
  }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
  enable_raw_mode()?;
  stdout().execute(EnterAlternateScreen)?;
  Ok(Terminal::new(CrosstermBackend::new(stdout()))?)
}

/// Leave raw mode and the alternate screen; also called from the panic hook
pub fn restore_terminal() -> Result<()> {
  disable_raw_mode()?;
  stdout().execute(LeaveAlternateScreen)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::Notifier;
  use crate::session::{LocalStorage, Session};
  use crossterm::event::KeyEvent;
  use tokio::sync::mpsc;

  fn app(token: Option<&str>) -> (App, mpsc::UnboundedReceiver<Event>) {
    let mut config = Config::default();
    config.api.url = "http://127.0.0.1:1".to_string();
    let session = Session::new(
      LocalStorage::open_in_memory().unwrap(),
      token.map(str::to_string),
    );
    let crm = CachedCrmClient::new(&config, session).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = ViewContext {
      crm,
      notifier: Notifier::new(tx),
    };
    (App::new(&config, ctx), rx)
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_command(app: &mut App, cmd: &str) {
    app.handle_key(key(KeyCode::Char(':')));
    for c in cmd.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
    app.handle_key(key(KeyCode::Enter));
  }

  #[tokio::test]
  async fn test_starts_on_login_without_token() {
    let (app, _rx) = app(None);
    assert_eq!(app.breadcrumb(), vec!["Sign in"]);
  }

  #[tokio::test]
  async fn test_starts_on_clients_with_token() {
    let (app, _rx) = app(Some("token"));
    assert_eq!(app.breadcrumb(), vec!["Clients"]);
  }

  #[tokio::test]
  async fn test_command_replaces_root() {
    let (mut app, _rx) = app(Some("token"));
    type_command(&mut app, "products");
    assert_eq!(app.breadcrumb(), vec!["Products"]);
  }

  #[tokio::test]
  async fn test_push_then_back_returns_to_list() {
    let (mut app, _rx) = app(Some("token"));
    type_command(&mut app, "top-sellers");
    assert_eq!(app.breadcrumb(), vec!["Clients", "Top sellers"]);

    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.breadcrumb(), vec!["Clients"]);
    assert!(!app.should_quit);

    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_q_types_into_forms() {
    let (mut app, _rx) = app(Some("token"));
    type_command(&mut app, "new-client");
    app.handle_key(key(KeyCode::Char('q')));
    assert_eq!(app.breadcrumb(), vec!["Clients", "New client"]);
  }

  #[tokio::test]
  async fn test_unknown_command_notifies() {
    let (mut app, _rx) = app(Some("token"));
    type_command(&mut app, "zzz");
    assert!(app.notifications().is_active());

    // Any key dismisses without reaching the view
    app.handle_key(key(KeyCode::Char('q')));
    assert!(!app.notifications().is_active());
    assert!(!app.should_quit);
  }

  #[tokio::test]
  async fn test_logout_shows_login_and_signs_out() {
    let (mut app, _rx) = app(Some("token"));
    type_command(&mut app, "logout");
    assert_eq!(app.breadcrumb(), vec!["Sign in"]);
    assert!(!app.ctx.crm.session().is_signed_in());
  }

  #[tokio::test]
  async fn test_ctrl_c_quits_from_login() {
    let (mut app, _rx) = app(None);
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }
}
