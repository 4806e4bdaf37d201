//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities that can be stored in the normalized cache.
///
/// Two values with the same `cache_key` are the same entity; the cache keeps
/// exactly one record per key and list queries refer to it by key.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Stable identifier of this entity (the API's `id`)
  fn cache_key(&self) -> &str;

  /// Entity type name for storage organization (e.g., "client", "order")
  fn entity_type() -> &'static str;
}

/// Identifies a cached list query.
pub trait QueryKey {
  /// Stable, fixed-length hash used as the storage key
  fn cache_hash(&self) -> String;

  /// Human-readable description, used in logs and errors
  fn description(&self) -> String;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data that is still fresh.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  /// Create a new cache result for offline mode.
  pub fn offline(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Offline,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Data from cache, still considered fresh
  Cache,
  /// Network unavailable, serving stale cached data
  Offline,
}

impl CacheSource {
  /// Short label for view titles
  pub fn label(&self) -> &'static str {
    match self {
      CacheSource::Network => "live",
      CacheSource::Cache => "cached",
      CacheSource::Offline => "offline",
    }
  }
}
