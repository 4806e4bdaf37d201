use crate::api::types::Product;
use crate::api::CrmQueryKey;
use crate::cache::CacheResult;
use crate::event::Notice;
use crate::query::{Mutation, Query};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, KeyResult, PanelRow, RecordPanel, RecordPanelEvent,
};
use crate::ui::renderfns::{format_price, list_title, truncate};
use crate::ui::view::{ShortcutInfo, ShortcutProvider, View, ViewAction, ViewContext};
use crate::ui::views::ProductFormView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::ListItem;

impl PanelRow for Product {
  fn search_fields(&self) -> Vec<&str> {
    vec![self.name.as_str()]
  }

  fn list_item(&self, _width: u16) -> ListItem<'_> {
    let stock_color = if self.stock == 0 {
      Color::Red
    } else {
      Color::White
    };
    ListItem::new(Line::from(vec![
      Span::styled(
        format!("{:<36}", truncate(&self.name, 36)),
        Style::default().fg(Color::Cyan),
      ),
      Span::styled(
        format!("{:>8} pcs", self.stock),
        Style::default().fg(stock_color),
      ),
      Span::raw("   "),
      Span::styled(
        format!("{:>12}", format_price(self.price)),
        Style::default().fg(Color::Green),
      ),
    ]))
  }
}

/// Product catalogue with stock and price
pub struct ProductListView {
  ctx: ViewContext,
  query: Query<CacheResult<Vec<Product>>>,
  panel: RecordPanel,
  confirm: ConfirmDialog<Product>,
  delete: Mutation<String>,
}

impl ProductListView {
  pub fn new(ctx: ViewContext) -> Self {
    let crm = ctx.crm.clone();
    let mut query = Query::new(move || {
      let crm = crm.clone();
      async move { crm.products().await.map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      ctx,
      query,
      panel: RecordPanel::new("No products yet. Press 'n' to add one."),
      confirm: ConfirmDialog::new(),
      delete: Mutation::new(),
    }
  }

  fn products(&self) -> &[Product] {
    self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[])
  }

  fn selected(&self) -> Option<Product> {
    self.panel.selected(self.products()).cloned()
  }

  fn start_delete(&mut self, product: Product) {
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    self.delete.run(async move {
      let result = crm.delete_product(&product.id).await;
      match &result {
        Ok(message) => notifier.notify(Notice::success("Deleted", message.clone())),
        Err(e) => notifier.notify(Notice::failure("Could not delete product", e.to_string())),
      }
      result.map_err(|e| e.to_string())
    });
  }
}

impl View for ProductListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(product)) => {
        self.start_delete(product);
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    let products = self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[]);
    match self.panel.handle_key(key, products) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(RecordPanelEvent::Selected(product)) => {
        return ViewAction::Push(Box::new(ProductFormView::edit(self.ctx.clone(), product.id)));
      }
      KeyResult::Event(RecordPanelEvent::RefreshRequested) => {
        self.ctx.crm.invalidate(CrmQueryKey::Products);
        self.query.refetch();
        return ViewAction::None;
      }
      KeyResult::Event(RecordPanelEvent::Back) => return ViewAction::Pop,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('n') => {
        ViewAction::Push(Box::new(ProductFormView::new_product(self.ctx.clone())))
      }
      KeyCode::Char('e') => match self.selected() {
        Some(product) => {
          ViewAction::Push(Box::new(ProductFormView::edit(self.ctx.clone(), product.id)))
        }
        None => ViewAction::None,
      },
      KeyCode::Char('d') if !self.delete.is_pending() => {
        if let Some(product) = self.selected() {
          self.confirm.ask(
            "Delete product",
            format!("Delete {}? This cannot be undone.", product.name),
            product,
          );
        }
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = list_title("Products", self.query.data());
    let is_loading = self.query.is_loading();
    let error = self.query.error().map(str::to_string);
    let products = self.query.data().map(|r| r.data.as_slice()).unwrap_or(&[]);

    self
      .panel
      .render(frame, area, products, &title, is_loading, error.as_deref());
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Products".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    if let Some(Ok(_)) = self.delete.poll() {
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
