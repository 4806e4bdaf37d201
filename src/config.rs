use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://crm-graphql-backend.onrender.com";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to "CRM Clients")
  pub title: Option<String>,
  pub cache: CacheConfig,
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub url: String,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: DEFAULT_API_URL.to_string(),
      timeout_secs: 30,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Seconds before a cached list is refetched on read
  pub stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { stale_secs: 300 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
  /// Failure notifications close themselves after this many seconds
  pub notification_secs: u64,
  pub tick_ms: u64,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      notification_secs: 3,
      tick_ms: 100,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./crmtui.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/crmtui/config.yaml
  ///
  /// With no file anywhere the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("crmtui.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("crmtui").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("CRM Clients")
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }

  pub fn stale_time(&self) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(self.cache.stale_secs).unwrap_or(i64::MAX))
  }

  pub fn notification_timeout(&self) -> Duration {
    Duration::from_secs(self.ui.notification_secs)
  }

  pub fn tick_rate(&self) -> Duration {
    Duration::from_millis(self.ui.tick_ms.max(10))
  }

  /// Session token from the environment, if set.
  ///
  /// Checks CRMTUI_TOKEN; it takes precedence over the stored session.
  pub fn token_override() -> Option<String> {
    std::env::var("CRMTUI_TOKEN").ok().filter(|t| !t.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_file_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.ui.notification_secs, 3);
    assert_eq!(config.title(), "CRM Clients");
  }

  #[test]
  fn test_partial_file_keeps_other_defaults() {
    let config = Config::parse(
      "api:\n  url: http://localhost:4000\ntitle: Ventas\ncache:\n  stale_secs: 10\n",
    )
    .unwrap();
    assert_eq!(config.api.url, "http://localhost:4000");
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.title(), "Ventas");
    assert_eq!(config.stale_time(), chrono::Duration::seconds(10));
    assert_eq!(config.ui.tick_ms, 100);
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/nonexistent/crmtui.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_tick_rate_has_floor() {
    let mut config = Config::default();
    config.ui.tick_ms = 0;
    assert_eq!(config.tick_rate(), Duration::from_millis(10));
  }
}
