use thiserror::Error;

/// Errors raised by cache storage operations.
#[derive(Debug, Error)]
pub enum CacheError {
  /// The list query was never cached (or was cleared)
  #[error("query not cached: {description}")]
  NotCached { description: String },

  /// Another thread panicked while holding the store lock
  #[error("cache lock poisoned")]
  LockPoisoned,

  /// An entity could not be converted to or from its stored form
  #[error("failed to (de)serialize {entity_type} entity: {source}")]
  Serialization {
    entity_type: &'static str,
    #[source]
    source: serde_json::Error,
  },
}

impl CacheError {
  pub fn is_not_cached(&self) -> bool {
    matches!(self, CacheError::NotCached { .. })
  }
}
