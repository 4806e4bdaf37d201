use crate::api::types::{Product, ProductInput};
use crate::form::{FormState, PRODUCT_SCHEMA};
use crate::query::{Mutation, Query, QueryState};
use crate::ui::components::{FormEvent, FormPanel, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::warn;

/// Create a product, or edit one loaded by id
pub struct ProductFormView {
  ctx: ViewContext,
  record: Option<Query<Product>>,
  product_id: Option<String>,
  form: FormPanel,
  save: Mutation<Product>,
}

impl ProductFormView {
  pub fn new_product(ctx: ViewContext) -> Self {
    Self {
      ctx,
      record: None,
      product_id: None,
      form: FormPanel::new(&PRODUCT_SCHEMA, "Add product"),
      save: Mutation::new(),
    }
  }

  pub fn edit(ctx: ViewContext, product_id: String) -> Self {
    let crm = ctx.crm.clone();
    let id = product_id.clone();
    let mut record = Query::new(move || {
      let crm = crm.clone();
      let id = id.clone();
      async move { crm.product(&id).await.map_err(|e| e.to_string()) }
    });
    record.fetch();

    Self {
      ctx,
      record: Some(record),
      product_id: Some(product_id),
      form: FormPanel::new(&PRODUCT_SCHEMA, "Save product"),
      save: Mutation::new(),
    }
  }

  /// `None` when stock or price does not parse; the schema rules reject
  /// those values before submit.
  fn input(state: &FormState) -> Option<ProductInput> {
    Some(ProductInput {
      name: state.text("name"),
      stock: state.unsigned("stock")?,
      price: state.number("price")?,
    })
  }

  fn start_save(&mut self) {
    let Some(input) = Self::input(self.form.state()) else {
      warn!("product form submitted with unparsable numbers");
      return;
    };
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    let product_id = self.product_id.clone();

    self.save.run(async move {
      let result = match &product_id {
        Some(id) => crm.update_product(id, &input).await,
        None => crm.create_product(&input).await,
      };
      let done = if product_id.is_some() {
        ("Product updated", "The product was updated")
      } else {
        ("Product created", "The product was added")
      };
      notifier.report(&result, done, "Could not save product");
      result.map_err(|e| e.to_string())
    });
  }
}

impl View for ProductFormView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.record.as_ref().is_some_and(|q| q.is_loading()) {
      return match key.code {
        KeyCode::Esc => ViewAction::Pop,
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
    let title = if self.product_id.is_some() {
      "Edit product"
    } else {
      "New product"
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
    match &self.product_id {
      Some(_) => "Edit product".to_string(),
      None => "New product".to_string(),
    }
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(record) = self.record.as_mut() {
      if record.poll() {
        if let Some(product) = record.data() {
          self.form.reset(&[
            ("name", product.name.clone()),
            ("stock", product.stock.to_string()),
            ("price", product.price.to_string()),
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
  use crossterm::event::KeyModifiers;

  fn save_key() -> KeyEvent {
    KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
  }

  fn filled(stock: &str) -> FormPanel {
    let mut form = FormPanel::new(&PRODUCT_SCHEMA, "Add product");
    form.reset(&[
      ("name", "Laptop".to_string()),
      ("stock", stock.to_string()),
      ("price", "10".to_string()),
    ]);
    form
  }

  #[test]
  fn test_stock_beyond_u32_blocks_submit() {
    let mut form = filled("5000000000");
    assert_eq!(form.handle_key(save_key()), KeyResult::Handled);
    assert_eq!(
      form.state().visible_error("stock").as_deref(),
      Some("Stock is too large")
    );
    assert!(ProductFormView::input(form.state()).is_none());
  }

  #[test]
  fn test_largest_stock_is_sent_unchanged() {
    let mut form = filled("4294967295");
    assert_eq!(
      form.handle_key(save_key()),
      KeyResult::Event(FormEvent::Submitted)
    );
    let input = ProductFormView::input(form.state()).unwrap();
    assert_eq!(input.stock, u32::MAX);
    assert_eq!(input.price, 10.0);
    assert_eq!(input.name, "Laptop");
  }
}
