use crate::api::types::{Client, Order, Product};
use crate::cache::CacheResult;
use crate::order_draft::OrderDraft;
use crate::query::{Mutation, Query};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_price, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use futures::future::try_join;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

type Catalog = (CacheResult<Vec<Client>>, CacheResult<Vec<Product>>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
  Clients,
  Products,
}

/// Assemble an order: pick a client, set product quantities, submit
pub struct NewOrderView {
  ctx: ViewContext,
  catalog: Query<Catalog>,
  draft: OrderDraft,
  pane: Pane,
  clients_state: ListState,
  products_state: ListState,
  /// Inline validation or stock message
  message: Option<String>,
  save: Mutation<Order>,
}

impl NewOrderView {
  pub fn new(ctx: ViewContext) -> Self {
    let crm = ctx.crm.clone();
    let mut catalog = Query::new(move || {
      let crm = crm.clone();
      async move {
        try_join(crm.clients(), crm.products())
          .await
          .map_err(|e| e.to_string())
      }
    });
    catalog.fetch();

    Self {
      ctx,
      catalog,
      draft: OrderDraft::new(),
      pane: Pane::Clients,
      clients_state: ListState::default().with_selected(Some(0)),
      products_state: ListState::default().with_selected(Some(0)),
      message: None,
      save: Mutation::new(),
    }
  }

  fn clients(&self) -> &[Client] {
    self
      .catalog
      .data()
      .map(|(clients, _)| clients.data.as_slice())
      .unwrap_or(&[])
  }

  fn products(&self) -> &[Product] {
    self
      .catalog
      .data()
      .map(|(_, products)| products.data.as_slice())
      .unwrap_or(&[])
  }

  fn move_selection(&mut self, down: bool) {
    let (len, state) = match self.pane {
      Pane::Clients => (self.clients().len(), &mut self.clients_state),
      Pane::Products => (self.products().len(), &mut self.products_state),
    };
    if len == 0 {
      return;
    }
    let current = state.selected().unwrap_or(0);
    let next = if down {
      (current + 1).min(len - 1)
    } else {
      current.saturating_sub(1)
    };
    state.select(Some(next));
  }

  fn select_client(&mut self) {
    let index = self.clients_state.selected().unwrap_or(0);
    if let Some(client) = self.clients().get(index).cloned() {
      self.draft.select_client(client);
      self.message = None;
      self.pane = Pane::Products;
    }
  }

  fn adjust_quantity(&mut self, increase: bool) {
    let index = self.products_state.selected().unwrap_or(0);
    let Some(product) = self.products().get(index).cloned() else {
      return;
    };

    let before = self.draft.quantity(&product.id);
    let after = if increase {
      self.draft.increment(&product)
    } else {
      self.draft.decrement(&product)
    };

    self.message = if increase && after == before {
      Some(format!(
        "Only {} of {} in stock",
        product.stock, product.name
      ))
    } else {
      None
    };
  }

  fn submit(&mut self) {
    if self.save.is_pending() {
      return;
    }
    let input = match self.draft.to_input() {
      Ok(input) => input,
      Err(e) => {
        self.message = Some(e.to_string());
        return;
      }
    };

    self.message = None;
    let crm = self.ctx.crm.clone();
    let notifier = self.ctx.notifier.clone();
    self.save.run(async move {
      let result = crm.create_order(&input).await;
      notifier.report(
        &result,
        ("Order created", "The order was registered"),
        "Could not create order",
      );
      result.map_err(|e| e.to_string())
    });
  }

  fn pane_block(&self, title: String, pane: Pane) -> Block<'static> {
    let color = if self.pane == pane {
      Color::Yellow
    } else {
      Color::Blue
    };
    Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color))
  }

  fn render_clients(&mut self, frame: &mut Frame, area: Rect) {
    let chosen = self.draft.client().map(|c| c.id.clone());
    let items: Vec<ListItem> = self
      .clients()
      .iter()
      .map(|client| {
        let marker = if chosen.as_deref() == Some(client.id.as_str()) {
          "* "
        } else {
          "  "
        };
        ListItem::new(Line::from(vec![
          Span::styled(marker, Style::default().fg(Color::Green)),
          Span::raw(truncate(&client.full_name(), 30)),
        ]))
      })
      .collect();

    let len = items.len();
    let list = List::new(items)
      .block(self.pane_block(format!(" Clients ({}) ", len), Pane::Clients))
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    ensure_valid_selection(&mut self.clients_state, len);
    frame.render_stateful_widget(list, area, &mut self.clients_state);
  }

  fn render_products(&mut self, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = self
      .products()
      .iter()
      .map(|product| {
        let quantity = self.draft.quantity(&product.id);
        let quantity_style = if quantity > 0 {
          Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
          Style::default().fg(Color::DarkGray)
        };
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:>3} ", quantity), quantity_style),
          Span::raw(format!("{:<28}", truncate(&product.name, 28))),
          Span::styled(
            format!("{:>10}", format_price(product.price)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            format!("  ({} left)", product.stock),
            Style::default().fg(Color::Gray),
          ),
        ]))
      })
      .collect();

    let len = items.len();
    let list = List::new(items)
      .block(self.pane_block(format!(" Products ({}) ", len), Pane::Products))
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    ensure_valid_selection(&mut self.products_state, len);
    frame.render_stateful_widget(list, area, &mut self.products_state);
  }

  fn render_summary(&self, frame: &mut Frame, area: Rect) {
    let client = self
      .draft
      .client()
      .map(Client::full_name)
      .unwrap_or_else(|| "none".to_string());
    let items: u32 = self.draft.lines().iter().map(|l| l.quantity).sum();

    let mut lines = vec![Line::from(vec![
      Span::styled("Client: ", Style::default().fg(Color::Gray)),
      Span::styled(client, Style::default().fg(Color::Cyan)),
      Span::raw("   "),
      Span::styled("Items: ", Style::default().fg(Color::Gray)),
      Span::raw(items.to_string()),
      Span::raw("   "),
      Span::styled("Total: ", Style::default().fg(Color::Gray)),
      Span::styled(
        format_price(self.draft.total()),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
      ),
    ])];

    if self.save.is_pending() {
      lines.push(Line::styled("Saving...", Style::default().fg(Color::Yellow)));
    } else if let Some(message) = &self.message {
      lines.push(Line::styled(message.as_str(), Style::default().fg(Color::Red)));
    }

    let block = Block::default()
      .title(" New order ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    frame.render_widget(Paragraph::new(lines).block(block), area);
  }
}

impl View for NewOrderView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
      self.submit();
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Esc => ViewAction::Pop,
      KeyCode::Tab | KeyCode::BackTab => {
        self.pane = match self.pane {
          Pane::Clients => Pane::Products,
          Pane::Products => Pane::Clients,
        };
        ViewAction::None
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.move_selection(true);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.move_selection(false);
        ViewAction::None
      }
      KeyCode::Enter | KeyCode::Char(' ') if self.pane == Pane::Clients => {
        self.select_client();
        ViewAction::None
      }
      KeyCode::Char('+') | KeyCode::Char('l') | KeyCode::Right
        if self.pane == Pane::Products =>
      {
        self.adjust_quantity(true);
        ViewAction::None
      }
      KeyCode::Char('-') | KeyCode::Char('h') | KeyCode::Left
        if self.pane == Pane::Products =>
      {
        self.adjust_quantity(false);
        ViewAction::None
      }
      KeyCode::Char('s') => {
        self.submit();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.catalog.refetch();
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    if self.catalog.is_loading() && self.catalog.data().is_none() {
      let block = Block::default()
        .title(" New order ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
      frame.render_widget(Paragraph::new("Loading clients and products...").block(block), area);
      return;
    }
    if let Some(error) = self.catalog.error() {
      let block = Block::default()
        .title(" New order (error) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
      frame.render_widget(
        Paragraph::new(format!("{}\n\nPress 'r' to retry or Esc to go back.", error)).block(block),
        area,
      );
      return;
    }

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(5), Constraint::Length(4)])
      .split(area);
    let panes = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(rows[0]);

    self.render_clients(frame, panes[0]);
    self.render_products(frame, panes[1]);
    self.render_summary(frame, rows[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "New order".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.catalog.poll();
    match self.save.poll() {
      Some(Ok(_)) => ViewAction::Pop,
      Some(Err(e)) => {
        self.message = Some(e);
        ViewAction::None
      }
      None => ViewAction::None,
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("Tab", "switch pane").with_priority(20),
      ShortcutInfo::new("Enter", "pick client").with_priority(21),
      ShortcutInfo::new("+/-", "quantity").with_priority(22),
      ShortcutInfo::new("s", "submit").with_priority(23),
      ShortcutInfo::new("Esc", "back").with_priority(30),
    ]
  }
}

