use chrono::{TimeDelta, Utc};
use ratatui::prelude::{Color, Rect};

use crate::api::types::OrderStatus;
use crate::cache::{CacheResult, CacheSource};

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for an order status
pub fn status_color(status: OrderStatus) -> Color {
  match status {
    OrderStatus::Completed => Color::Green,
    OrderStatus::Pending => Color::Yellow,
    OrderStatus::Canceled => Color::Red,
  }
}

/// Money with two decimals and a currency sign
pub fn format_price(amount: f64) -> String {
  format!("$ {:.2}", amount)
}

/// Compact age like "42s", "5m", "3h" or "2d"
pub fn format_age(age: TimeDelta) -> String {
  let secs = age.num_seconds().max(0);
  match secs {
    0..=59 => format!("{}s", secs),
    60..=3599 => format!("{}m", secs / 60),
    3600..=86_399 => format!("{}h", secs / 3600),
    _ => format!("{}d", secs / 86_400),
  }
}

/// List title with where the rows came from, e.g. "Clients [cached 2m ago]".
/// Fresh network data gets the bare name.
pub fn list_title<T>(name: &str, result: Option<&CacheResult<T>>) -> String {
  let Some(result) = result else {
    return name.to_string();
  };
  match (result.source, result.cached_at) {
    (CacheSource::Network, _) => name.to_string(),
    (source, Some(at)) => format!(
      "{} [{} {} ago]",
      name,
      source.label(),
      format_age(Utc::now() - at)
    ),
    (source, None) => format!("{} [{}]", name, source.label()),
  }
}

/// A rectangle of at most `width` x `height` centered in `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Muñoz García", 8), "Muñoz...");
  }

  #[test]
  fn test_status_colors() {
    assert_eq!(status_color(OrderStatus::Completed), Color::Green);
    assert_eq!(status_color(OrderStatus::Pending), Color::Yellow);
    assert_eq!(status_color(OrderStatus::Canceled), Color::Red);
  }

  #[test]
  fn test_format_price() {
    assert_eq!(format_price(1500.0), "$ 1500.00");
    assert_eq!(format_price(19.999), "$ 20.00");
  }

  #[test]
  fn test_format_age_units() {
    assert_eq!(format_age(TimeDelta::seconds(42)), "42s");
    assert_eq!(format_age(TimeDelta::seconds(150)), "2m");
    assert_eq!(format_age(TimeDelta::hours(3)), "3h");
    assert_eq!(format_age(TimeDelta::days(2)), "2d");
    assert_eq!(format_age(TimeDelta::seconds(-5)), "0s");
  }

  #[test]
  fn test_list_title_shows_source_and_age() {
    assert_eq!(list_title::<()>("Clients", None), "Clients");
    assert_eq!(
      list_title("Clients", Some(&CacheResult::from_network(()))),
      "Clients"
    );

    let five_minutes_ago = Utc::now() - TimeDelta::minutes(5);
    assert_eq!(
      list_title("Clients", Some(&CacheResult::from_cache((), five_minutes_ago))),
      "Clients [cached 5m ago]"
    );
    assert_eq!(
      list_title("Orders", Some(&CacheResult::offline((), five_minutes_ago))),
      "Orders [offline 5m ago]"
    );
  }

  #[test]
  fn test_centered_rect_clamps_to_area() {
    let area = Rect::new(0, 0, 20, 10);
    assert_eq!(centered_rect(area, 10, 4), Rect::new(5, 3, 10, 4));
    assert_eq!(centered_rect(area, 50, 50), area);
  }
}
