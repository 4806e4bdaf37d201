use crate::api::types::{Client, ClientInput};
use crate::form::{FormState, CLIENT_SCHEMA};
use crate::query::{Mutation, Query, QueryState};
use crate::ui::components::{FormEvent, FormPanel, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Create a client, or edit one loaded by id
pub struct ClientFormView {
  ctx: ViewContext,
  /// Present when editing
  record: Option<Query<Client>>,
  client_id: Option<String>,
  form: FormPanel,
  save: Mutation<Client>,
}

impl ClientFormView {
  pub fn new_client(ctx: ViewContext) -> Self {
    Self {
      ctx,
      record: None,
      client_id: None,
      form: FormPanel::new(&CLIENT_SCHEMA, "Register client"),
      save: Mutation::new(),
    }
  }

  pub fn edit(ctx: ViewContext, client_id: String) -> Self {
    let crm = ctx.crm.clone();
    let id = client_id.clone();
    let mut record = Query::new(move || {
      let crm = crm.clone();
      let id = id.clone();
      async move { crm.client(&id).await.map_err(|e| e.to_string()) }
    });
    record.fetch();

    Self {
      ctx,
      record: Some(record),
      client_id: Some(client_id),
      form: FormPanel::new(&CLIENT_SCHEMA, "Save client"),
      save: Mutation::new(),
    }
  }

  fn input(state: &FormState) -> ClientInput {
    ClientInput {
      first_name: state.text("first_name"),
      last_name: state.text("last_name"),
      company: state.text("company"),
      email: state.text("email"),
      phone: state.optional("phone"),
    }
  }

  fn start_save(&mut self) {
    let input = Self::input(self.form.state());
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    let client_id = self.client_id.clone();

    self.save.run(async move {
      let result = match &client_id {
        Some(id) => crm.update_client(id, &input).await,
        None => crm.create_client(&input).await,
      };
      let done = if client_id.is_some() {
        ("Client updated", "The client was updated")
      } else {
        ("Client created", "The client was registered")
      };
      notifier.report(&result, done, "Could not save client");
      result.map_err(|e| e.to_string())
    });
  }

  fn is_loading_record(&self) -> bool {
    self.record.as_ref().is_some_and(|q| q.is_loading())
  }
}

impl View for ClientFormView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.is_loading_record() {
      return match key.code {
        crossterm::event::KeyCode::Esc => ViewAction::Pop,
        _ => ViewAction::None,
      };
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted) => {
        self.start_save();
        ViewAction::None
      }
      KeyResult::Event(FormEvent::Cancelled) => ViewAction::Pop,
      KeyResult::Handled | KeyResult::NotHandled => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.client_id.is_some() {
      "Edit client"
    } else {
      "New client"
    };

    match self.record.as_ref().map(Query::state) {
      Some(QueryState::Loading) | Some(QueryState::Idle) => {
        let block = Block::default()
          .title(format!(" {} ", title))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue));
        frame.render_widget(Paragraph::new("Loading...").block(block), area);
      }
      Some(QueryState::Error(e)) => {
        let block = Block::default()
          .title(format!(" {} (error) ", title))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Red));
        frame.render_widget(
          Paragraph::new(format!("{}\n\nPress Esc to go back.", e)).block(block),
          area,
        );
      }
      _ => self.form.render(frame, area, title, self.save.is_pending()),
    }
  }

  fn breadcrumb_label(&self) -> String {
    match &self.client_id {
      Some(_) => "Edit client".to_string(),
      None => "New client".to_string(),
    }
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(record) = self.record.as_mut() {
      if record.poll() {
        if let Some(client) = record.data() {
          self.form.reset(&[
            ("first_name", client.first_name.clone()),
            ("last_name", client.last_name.clone()),
            ("company", client.company.clone()),
            ("email", client.email.clone()),
            ("phone", client.phone.clone().unwrap_or_default()),
          ]);
        }
      }
    }

    match self.save.poll() {
      Some(Ok(_)) => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("Tab", "next field").with_priority(10),
      ShortcutInfo::new("Ctrl-S", "save").with_priority(20),
      ShortcutInfo::new("Esc", "cancel").with_priority(30),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::CrmQueryKey;
  use crate::cache::CacheSource;
  use crate::event::NoticeKind;
  use crate::test_support::{client, crm_at, eventually, next_notice, view_context, MockGraphQl};
  use crate::ui::views::ClientListView;
  use crossterm::event::{KeyCode, KeyModifiers};
  use serde_json::json;

  fn save_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
  }

  #[tokio::test]
  async fn test_saved_client_pops_and_appears_in_cached_list() {
    let server = MockGraphQl::start().await;
    let crm = crm_at(&server.url());
    crm
      .seed_list(CrmQueryKey::Clients, vec![client("1", "Ana")])
      .await;
    let (ctx, mut rx) = view_context(crm);

    let mut list = ClientListView::new(ctx.clone());
    assert!(
      eventually(|| {
        list.tick();
        list.loaded_source().is_some()
      })
      .await
    );

    server.reply(json!({
      "nuevoCliente": {
        "id": "2",
        "nombre": "Eva",
        "apellido": "Diaz",
        "empresa": "Acme",
        "email": "eva@acme.com",
        "telefono": null
      }
    }));

    let mut form = ClientFormView::new_client(ctx);
    form.form.reset(&[
      ("first_name", "Eva".to_string()),
      ("last_name", "Diaz".to_string()),
      ("company", "Acme".to_string()),
      ("email", "eva@acme.com".to_string()),
    ]);
    assert!(matches!(form.handle_key(save_key()), ViewAction::None));
    assert!(form.save.is_pending());

    assert!(eventually(|| matches!(form.tick(), ViewAction::Pop)).await);
    let notice = next_notice(&mut rx).await;
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.title, "Client created");

    list.on_resume();
    assert!(
      eventually(|| {
        list.tick();
        list.loaded_source().is_some()
      })
      .await
    );
    let ids: Vec<_> = list.clients().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(list.loaded_source(), Some(CacheSource::Cache));
    assert_eq!(server.operations(), vec!["nuevoCliente"]);
  }

  #[tokio::test]
  async fn test_invalid_form_sends_nothing() {
    let server = MockGraphQl::start().await;
    let (ctx, _rx) = view_context(crm_at(&server.url()));

    let mut form = ClientFormView::new_client(ctx);
    form.form.reset(&[
      ("first_name", "Eva".to_string()),
      ("email", "not-an-email".to_string()),
    ]);
    form.handle_key(save_key());
    assert!(!form.save.is_pending());
    assert!(form.form.state().visible_error("email").is_some());
    assert!(server.operations().is_empty());
  }
}
