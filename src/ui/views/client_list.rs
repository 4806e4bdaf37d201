use crate::api::types::Client;
use crate::cache::CacheResult;
use crate::event::Notice;
use crate::query::{Mutation, Query};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, KeyResult, PanelRow, RecordPanel, RecordPanelEvent,
};
use crate::ui::renderfns::{list_title, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction, ViewContext};
use crate::ui::views::ClientFormView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

impl PanelRow for Client {
  fn search_fields(&self) -> Vec<&str> {
    vec![
      self.first_name.as_str(),
      self.last_name.as_str(),
      self.company.as_str(),
      self.email.as_str(),
    ]
  }

  fn list_item(&self, _width: u16) -> ListItem<'_> {
    ListItem::new(Line::from(vec![
      Span::styled(
        format!("{:<28}", truncate(&self.full_name(), 28)),
        Style::default().fg(Color::Cyan),
      ),
      Span::raw(" "),
      Span::raw(format!("{:<24}", truncate(&self.company, 24))),
      Span::raw(" "),
      Span::styled(self.email.as_str(), Style::default().fg(Color::Gray)),
    ]))
  }
}

/// The salesperson's clients; the root view
pub struct ClientListView {
  ctx: ViewContext,
  query: Query<CacheResult<Vec<Client>>>,
  panel: RecordPanel,
  confirm: ConfirmDialog<Client>,
  delete: Mutation<String>,
}

impl ClientListView {
  pub fn new(ctx: ViewContext) -> Self {
    let crm = ctx.crm.clone();
    let mut query = Query::new(move || {
      let crm = crm.clone();
      async move { crm.clients().await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      ctx,
      query,
      panel: RecordPanel::new("No clients yet. Press 'n' to add one."),
      confirm: ConfirmDialog::new(),
      delete: Mutation::new(),
    }
  }

  pub(crate) fn clients(&self) -> &[Client] {
    self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[])
  }

  /// Where the rows came from, once a load has finished
  #[cfg(test)]
  pub(crate) fn loaded_source(&self) -> Option<crate::cache::CacheSource> {
    if self.query.is_loading() {
      return None;
    }
    self.query.data().map(|r| r.source)
  }

  fn title(&self) -> String {
    list_title("Clients", self.query.data())
  }

  /// Runs only after the dialog was confirmed
  fn start_delete(&mut self, client: Client) {
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    self.delete.run(async move {
      let result = crm.delete_client(&client.id).await;
      match &result {
        Ok(message) => notifier.notify(Notice::success("Deleted", message.clone())),
        Err(e) => notifier.notify(Notice::failure("Could not delete client", e.to_string())),
      }
      result.map_err(|e| e.to_string())
    });
  }

  fn selected(&self) -> Option<Client> {
    self.panel.selected(self.clients()).cloned()
  }
}

impl View for ClientListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(client)) => {
        self.start_delete(client);
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    let clients = self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[]);
    match self.panel.handle_key(key, clients) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(RecordPanelEvent::Selected(client)) => {
        return ViewAction::Push(Box::new(ClientFormView::edit(self.ctx.clone(), client.id)));
      }
      KeyResult::Event(RecordPanelEvent::RefreshRequested) => {
        self.ctx.crm.invalidate(crate::api::CrmQueryKey::Clients);
        self.query.refetch();
        return ViewAction::None;
      }
      KeyResult::Event(RecordPanelEvent::Back) => return ViewAction::Pop,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('n') => ViewAction::Push(Box::new(ClientFormView::new_client(self.ctx.clone()))),
      KeyCode::Char('e') => match self.selected() {
        Some(client) => ViewAction::Push(Box::new(ClientFormView::edit(self.ctx.clone(), client.id))),
        None => ViewAction::None,
      },
      KeyCode::Char('d') if !self.delete.is_pending() => {
        if let Some(client) = self.selected() {
          self.confirm.ask(
            "Delete client",
            format!("Delete {}? This cannot be undone.", client.full_name()),
            client,
          );
        }
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = self.title();
    let is_loading = self.query.is_loading();
    let error = self.query.error().map(str::to_string);
    let clients = self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[]);

    self
      .panel
      .render(frame, area, clients, &title, is_loading, error.as_deref());
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Clients".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    if let Some(Ok(_)) = self.delete.poll() {
      // Synchronized in the cache; re-read without going to the network
      self.query.refetch();
    }
    ViewAction::None
  }

  fn on_resume(&mut self) {
    self.query.refetch();
  }

  fn captures_input(&self) -> bool {
    self.panel.is_searching() || self.confirm.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("n", "new").with_priority(40),
      ShortcutInfo::new("e", "edit").with_priority(41),
      ShortcutInfo::new("d", "delete").with_priority(42),
    ];
    shortcuts.extend(self.panel.shortcuts());
    shortcuts
  }
}
