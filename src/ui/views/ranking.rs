use std::future::Future;

use crate::api::types::{TopClient, TopSeller};
use crate::api::ApiError;
use crate::query::Query;
use crate::ui::renderfns::{format_price, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Row, Table};

/// One bar of a ranking chart
pub trait RankEntry: Send + 'static {
  fn name(&self) -> &str;
  /// Secondary column: email or company
  fn detail(&self) -> &str;
  fn total(&self) -> f64;
}

impl RankEntry for TopSeller {
  fn name(&self) -> &str {
    &self.name
  }

  fn detail(&self) -> &str {
    &self.email
  }

  fn total(&self) -> f64 {
    self.total
  }
}

impl RankEntry for TopClient {
  fn name(&self) -> &str {
    &self.name
  }

  fn detail(&self) -> &str {
    &self.company
  }

  fn total(&self) -> f64 {
    self.total
  }
}

/// Bar chart plus table of totals; always read from the network
pub struct RankingView<T: RankEntry> {
  title: &'static str,
  detail_header: &'static str,
  query: Query<Vec<T>>,
}

impl<T: RankEntry> RankingView<T> {
  fn new<F, Fut>(title: &'static str, detail_header: &'static str, fetch: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
  {
    let mut query = Query::new(move || {
      let fut = fetch();
      async move {
        let mut entries = fut.await.map_err(|e| e.to_string())?;
        entries.sort_by(|a, b| b.total().total_cmp(&a.total()));
        Ok(entries)
      }
    });
    query.fetch();

    Self {
      title,
      detail_header,
      query,
    }
  }

  fn render_chart(&self, frame: &mut Frame, area: Rect, entries: &[T]) {
    let bars: Vec<Bar> = entries
      .iter()
      .map(|entry| {
        Bar::default()
          .label(Line::from(truncate(entry.name(), 12)))
          .value(entry.total().max(0.0).round() as u64)
          .text_value(format!("{:.0}", entry.total()))
      })
      .collect();

    let chart = BarChart::default()
      .block(
        Block::default()
          .title(format!(" {} ", self.title))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      )
      .data(BarGroup::default().bars(&bars))
      .bar_width(12)
      .bar_gap(2)
      .bar_style(Style::default().fg(Color::Cyan))
      .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, area);
  }

  fn render_table(&self, frame: &mut Frame, area: Rect, entries: &[T]) {
    let header = Row::new(vec!["#", "Name", self.detail_header, "Total"])
      .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = entries
      .iter()
      .enumerate()
      .map(|(i, entry)| {
        Row::new(vec![
          (i + 1).to_string(),
          entry.name().to_string(),
          entry.detail().to_string(),
          format_price(entry.total()),
        ])
      })
      .collect();

    let table = Table::new(
      rows,
      [
        Constraint::Length(3),
        Constraint::Percentage(35),
        Constraint::Percentage(40),
        Constraint::Min(12),
      ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)));
    frame.render_widget(table, area);
  }
}

impl RankingView<TopSeller> {
  pub fn top_sellers(ctx: ViewContext) -> Self {
    let crm = ctx.crm;
    Self::new("Top sellers", "Email", move || {
      let crm = crm.clone();
      async move { crm.top_sellers().await }
    })
  }
}

impl RankingView<TopClient> {
  pub fn top_clients(ctx: ViewContext) -> Self {
    let crm = ctx.crm;
    Self::new("Top clients", "Company", move || {
      let crm = crm.clone();
      async move { crm.top_clients().await }
    })
  }
}

impl<T: RankEntry> View for RankingView<T> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(format!(" {} ", self.title))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if let Some(error) = self.query.error() {
      frame.render_widget(
        Paragraph::new(format!("{}\n\nPress 'r' to retry.", error))
          .style(Style::default().fg(Color::Red))
          .block(block),
        area,
      );
      return;
    }

    let Some(entries) = self.query.data() else {
      frame.render_widget(Paragraph::new("Loading...").block(block), area);
      return;
    };
    if entries.is_empty() {
      frame.render_widget(
        Paragraph::new("No sales recorded yet.")
          .style(Style::default().fg(Color::DarkGray))
          .block(block),
        area,
      );
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
      .split(area);
    self.render_chart(frame, chunks[0], entries);
    self.render_table(frame, chunks[1], entries);
  }

  fn breadcrumb_label(&self) -> String {
    self.title.to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
