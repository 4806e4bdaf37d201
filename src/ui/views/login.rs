use crate::api::types::Credentials;
use crate::event::Notice;
use crate::form::LOGIN_SCHEMA;
use crate::query::Mutation;
use crate::ui::components::{FormEvent, FormPanel, KeyResult};
use crate::ui::renderfns::centered_rect;
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tracing::info;

/// Sign-in screen shown while there is no usable session
pub struct LoginView {
  ctx: ViewContext,
  form: FormPanel,
  sign_in: Mutation<()>,
  /// Last rejection, shown under the form
  error: Option<String>,
}

impl LoginView {
  pub fn new(ctx: ViewContext) -> Self {
    Self {
      ctx,
      form: FormPanel::new(&LOGIN_SCHEMA, "Sign in"),
      sign_in: Mutation::new(),
      error: None,
    }
  }

  fn start_sign_in(&mut self) {
    let credentials = Credentials {
      email: self.form.state().text("email"),
      password: self.form.state().value("password").to_string(),
    };
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();

    self.error = None;
    self.sign_in.run(async move {
      let token = crm
        .authenticate(&credentials)
        .await
        .map_err(|e| e.to_string())?;
      crm
        .session()
        .sign_in(&token)
        .map_err(|e| format!("Could not store session: {}", e))?;
      info!(email = %credentials.email, "signed in");
      notifier.notify(Notice::success(
        "Signed in",
        format!("Welcome, {}", credentials.email),
      ));
      Ok(())
    });
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.sign_in.is_pending() {
      return ViewAction::None;
    }
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => {
        self.start_sign_in();
        ViewAction::None
      }
      // Nothing to go back to; Ctrl-C still quits
      KeyResult::Event(FormEvent::Cancelled) => ViewAction::None,
      KeyResult::Handled | KeyResult::NotHandled => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let form_area = centered_rect(area, 60, 12);
    self
      .form
      .render(frame, form_area, "Sign in", self.sign_in.is_pending());

    if let Some(error) = &self.error {
      let below = Rect {
        y: form_area.bottom().min(area.bottom().saturating_sub(1)),
        height: 1,
        ..form_area
      };
      frame.render_widget(
        Paragraph::new(error.as_str())
          .style(Style::default().fg(Color::Red))
          .alignment(Alignment::Center),
        below,
      );
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Sign in".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    match self.sign_in.poll() {
      Some(Ok(())) => ViewAction::SignedIn,
      Some(Err(e)) => {
        self.error = Some(e);
        ViewAction::None
      }
      None => ViewAction::None,
    }
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(10),
      ShortcutInfo::new("Enter", "sign in").with_priority(20),
      ShortcutInfo::new("Ctrl-C", "quit").with_priority(30),
    ]
  }
}
