use crate::api::types::{Order, OrderStatus};
use crate::api::CrmQueryKey;
use crate::cache::CacheResult;
use crate::event::Notice;
use crate::query::{Mutation, Query};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, KeyResult, PanelRow, RecordPanel, RecordPanelEvent, StatusPicker,
  StatusPickerEvent,
};
use crate::ui::renderfns::{format_price, list_title, status_color, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction, ViewContext};
use crate::ui::views::NewOrderView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

impl PanelRow for Order {
  fn search_fields(&self) -> Vec<&str> {
    let mut fields = vec![
      self.client.first_name.as_str(),
      self.client.last_name.as_str(),
      self.client.email.as_str(),
      self.status.label(),
    ];
    fields.extend(self.lines.iter().map(|line| line.name.as_str()));
    fields
  }

  fn list_item(&self, width: u16) -> ListItem<'_> {
    let status_style = Style::default()
      .fg(status_color(self.status))
      .add_modifier(Modifier::BOLD);
    let phone = self.client.phone.as_deref().unwrap_or("-");

    let mut lines = vec![
      Line::from(vec![
        Span::styled(
          format!("[{}]", self.status.label()),
          status_style,
        ),
        Span::raw(" "),
        Span::styled(self.client.full_name(), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
          format_price(self.total),
          Style::default().fg(Color::Green),
        ),
      ]),
      Line::from(Span::styled(
        format!("  {}  {}", self.client.email, phone),
        Style::default().fg(Color::Gray),
      )),
    ];

    let name_width = (width as usize).saturating_sub(12).max(8);
    for line in &self.lines {
      lines.push(Line::from(Span::styled(
        format!("    {:>4} x {}", line.quantity, truncate(&line.name, name_width)),
        Style::default().fg(Color::DarkGray),
      )));
    }
    lines.push(Line::raw(""));

    ListItem::new(lines)
  }
}

/// The salesperson's orders, with status changes and deletion
pub struct OrderListView {
  ctx: ViewContext,
  query: Query<CacheResult<Vec<Order>>>,
  panel: RecordPanel,
  status_picker: StatusPicker,
  /// Order the picker was opened for
  picking: Option<Order>,
  confirm: ConfirmDialog<Order>,
  write: Mutation<()>,
}

impl OrderListView {
  pub fn new(ctx: ViewContext) -> Self {
    let crm = ctx.crm.clone();
    let mut query = Query::new(move || {
      let crm = crm.clone();
      async move { crm.orders().await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      ctx,
      query,
      panel: RecordPanel::new("No orders yet. Press 'n' to create one."),
      status_picker: StatusPicker::new(),
      picking: None,
      confirm: ConfirmDialog::new(),
      write: Mutation::new(),
    }
  }

  fn orders(&self) -> &[Order] {
    self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[])
  }

  fn selected(&self) -> Option<Order> {
    self.panel.selected(self.orders()).cloned()
  }

  fn pick_status(&mut self, order: Order) {
    self
      .status_picker
      .show(format!(" Status: {} ", order.client.full_name()), order.status);
    self.picking = Some(order);
  }

  fn start_status_change(&mut self, order: Order, status: OrderStatus) {
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    self.write.run(async move {
      let result = crm.update_order_status(&order, status).await;
      notifier.report(
        &result,
        (
          "Status updated",
          format!("Order is now {}", status.label()).as_str(),
        ),
        "Could not update order",
      );
      result.map(|_| ()).map_err(|e| e.to_string())
    });
  }

  fn start_delete(&mut self, order: Order) {
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    self.write.run(async move {
      let result = crm.delete_order(&order.id).await;
      match &result {
        Ok(message) => notifier.notify(Notice::success("Deleted", message.clone())),
        Err(e) => notifier.notify(Notice::failure("Could not delete order", e.to_string())),
      }
      result.map(|_| ()).map_err(|e| e.to_string())
    });
  }
}

impl View for OrderListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.status_picker.handle_key(key) {
      KeyResult::Event(StatusPickerEvent::Selected(status)) => {
        if let Some(order) = self.picking.take() {
          self.start_status_change(order, status);
        }
        return ViewAction::None;
      }
      KeyResult::Event(StatusPickerEvent::Cancelled) => {
        self.picking = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(order)) => {
        self.start_delete(order);
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    let orders = self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[]);
    match self.panel.handle_key(key, orders) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(RecordPanelEvent::RefreshRequested) => {
        self.ctx.crm.invalidate(CrmQueryKey::Orders);
        self.query.refetch();
        return ViewAction::None;
      }
      KeyResult::Event(RecordPanelEvent::Back) => return ViewAction::Pop,
      // Orders are edited in place; Enter opens the status picker
      KeyResult::Event(RecordPanelEvent::Selected(order)) => {
        if !self.write.is_pending() {
          self.pick_status(order);
        }
        return ViewAction::None;
      }
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('n') => ViewAction::Push(Box::new(NewOrderView::new(self.ctx.clone()))),
      KeyCode::Char('s') if !self.write.is_pending() => {
        if let Some(order) = self.selected() {
          self.pick_status(order);
        }
        ViewAction::None
      }
      KeyCode::Char('d') if !self.write.is_pending() => {
        if let Some(order) = self.selected() {
          self.confirm.ask(
            "Delete order",
            format!(
              "Delete the order of {} ({})?",
              order.client.full_name(),
              format_price(order.total)
            ),
            order,
          );
        }
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = list_title("Orders", self.query.data());
    let is_loading = self.query.is_loading();
    let error = self.query.error().map(str::to_string);
    let orders = self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[]);

    self
      .panel
      .render(frame, area, orders, &title, is_loading, error.as_deref());
    self.status_picker.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Orders".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    if let Some(Ok(())) = self.write.poll() {
      self.query.refetch();
    }
    ViewAction::None
  }

  fn on_resume(&mut self) {
    self.query.refetch();
  }

  fn captures_input(&self) -> bool {
    self.panel.is_searching() || self.confirm.is_active() || self.status_picker.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("n", "new").with_priority(40),
      ShortcutInfo::new("s", "status").with_priority(41),
      ShortcutInfo::new("d", "delete").with_priority(42),
    ];
    shortcuts.extend(self.panel.shortcuts());
    shortcuts
  }
}
