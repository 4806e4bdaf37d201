//! Cache storage trait and the in-memory normalized implementation.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::error::CacheError;
use super::traits::Cacheable;

/// Result of a cached query lookup.
#[derive(Debug, Clone)]
pub struct CachedQueryResult<T> {
  /// The cached entities in order
  pub entities: Vec<T>,
  /// When the query result was fetched
  pub cached_at: DateTime<Utc>,
  /// Marked stale by an explicit refresh
  pub invalidated: bool,
}

/// A single cached entity.
#[derive(Debug, Clone)]
pub struct CachedEntity<T> {
  /// The cached entity
  pub entity: T,
  /// When the entity was cached
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Every method is one transaction: implementations must not let another
/// caller observe state between the read and the write of
/// `update_query_result`.
pub trait CacheStorage: Send + Sync {
  /// Store entities from a query result, replacing any previous result.
  fn store_query_result<T: Cacheable>(
    &self,
    key: &str,
    description: &str,
    entities: &[T],
  ) -> Result<(), CacheError>;

  /// Get cached entities for a query.
  fn get_query_result<T: Cacheable>(
    &self,
    key: &str,
  ) -> Result<Option<CachedQueryResult<T>>, CacheError>;

  /// Read a cached list, transform it and write it back.
  ///
  /// Fails with `CacheError::NotCached` when the query was never stored.
  fn update_query_result<T, F>(&self, key: &str, description: &str, f: F) -> Result<(), CacheError>
  where
    T: Cacheable,
    F: FnOnce(Vec<T>) -> Vec<T>;

  /// Get a single entity by key.
  fn get_entity<T: Cacheable>(&self, entity_key: &str) -> Result<Option<CachedEntity<T>>, CacheError>;

  /// Store a single entity. Lists referring to it see the new value.
  fn store_entity<T: Cacheable>(&self, entity: &T) -> Result<(), CacheError>;

  /// Remove an entity and every list reference to it.
  ///
  /// Returns the number of cached lists it was removed from.
  fn evict_entity<T: Cacheable>(&self, entity_key: &str) -> Result<usize, CacheError>;

  /// Force the next cache-first read of this query to go to the network.
  fn invalidate_query(&self, key: &str) -> Result<(), CacheError>;

  /// Drop everything.
  fn clear(&self) -> Result<(), CacheError>;
}

#[derive(Debug)]
struct StoredEntity {
  data: serde_json::Value,
  cached_at: DateTime<Utc>,
}

#[derive(Debug)]
struct StoredQuery {
  entity_type: &'static str,
  description: String,
  keys: Vec<String>,
  cached_at: DateTime<Utc>,
  invalidated: bool,
}

type EntityId = (&'static str, String);

#[derive(Debug, Default)]
struct CacheState {
  entities: HashMap<EntityId, StoredEntity>,
  queries: HashMap<String, StoredQuery>,
}

impl CacheState {
  fn put_entity<T: Cacheable>(&mut self, entity: &T) -> Result<String, CacheError> {
    let data = serde_json::to_value(entity).map_err(|source| CacheError::Serialization {
      entity_type: T::entity_type(),
      source,
    })?;
    let key = entity.cache_key().to_string();
    self.entities.insert(
      (T::entity_type(), key.clone()),
      StoredEntity {
        data,
        cached_at: Utc::now(),
      },
    );
    Ok(key)
  }

  fn read_entity<T: Cacheable>(&self, key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
    let Some(stored) = self.entities.get(&(T::entity_type(), key.to_string())) else {
      return Ok(None);
    };
    let entity = serde_json::from_value(stored.data.clone()).map_err(|source| {
      CacheError::Serialization {
        entity_type: T::entity_type(),
        source,
      }
    })?;
    Ok(Some(CachedEntity {
      entity,
      cached_at: stored.cached_at,
    }))
  }

  fn read_list<T: Cacheable>(&self, key: &str) -> Result<Option<CachedQueryResult<T>>, CacheError> {
    let Some(query) = self.queries.get(key) else {
      return Ok(None);
    };
    if query.entity_type != T::entity_type() {
      return Ok(None);
    }

    let mut entities = Vec::with_capacity(query.keys.len());
    for entity_key in &query.keys {
      if let Some(cached) = self.read_entity::<T>(entity_key)? {
        entities.push(cached.entity);
      }
    }

    Ok(Some(CachedQueryResult {
      entities,
      cached_at: query.cached_at,
      invalidated: query.invalidated,
    }))
  }

  fn write_list<T: Cacheable>(&mut self, entities: &[T]) -> Result<Vec<String>, CacheError> {
    entities.iter().map(|entity| self.put_entity(entity)).collect()
  }
}

/// In-memory normalized cache.
///
/// Entities are stored once per `(entity type, key)`; list queries hold
/// ordered keys. One mutex guards both tables, so each trait method is
/// atomic with respect to every other caller.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  state: Mutex<CacheState>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, CacheState>, CacheError> {
    self.state.lock().map_err(|_| CacheError::LockPoisoned)
  }
}

impl CacheStorage for MemoryStorage {
  fn store_query_result<T: Cacheable>(
    &self,
    key: &str,
    description: &str,
    entities: &[T],
  ) -> Result<(), CacheError> {
    let mut state = self.lock()?;
    let keys = state.write_list(entities)?;
    state.queries.insert(
      key.to_string(),
      StoredQuery {
        entity_type: T::entity_type(),
        description: description.to_string(),
        keys,
        cached_at: Utc::now(),
        invalidated: false,
      },
    );
    Ok(())
  }

  fn get_query_result<T: Cacheable>(
    &self,
    key: &str,
  ) -> Result<Option<CachedQueryResult<T>>, CacheError> {
    self.lock()?.read_list(key)
  }

  fn update_query_result<T, F>(&self, key: &str, description: &str, f: F) -> Result<(), CacheError>
  where
    T: Cacheable,
    F: FnOnce(Vec<T>) -> Vec<T>,
  {
    let mut state = self.lock()?;
    let current = state
      .read_list::<T>(key)?
      .ok_or_else(|| CacheError::NotCached {
        description: description.to_string(),
      })?;

    let updated = f(current.entities);
    let keys = state.write_list(&updated)?;

    // Fetch time and invalidation survive: a local edit is not a refetch
    if let Some(query) = state.queries.get_mut(key) {
      query.keys = keys;
    }
    Ok(())
  }

  fn get_entity<T: Cacheable>(&self, entity_key: &str) -> Result<Option<CachedEntity<T>>, CacheError> {
    self.lock()?.read_entity(entity_key)
  }

  fn store_entity<T: Cacheable>(&self, entity: &T) -> Result<(), CacheError> {
    self.lock()?.put_entity(entity)?;
    Ok(())
  }

  fn evict_entity<T: Cacheable>(&self, entity_key: &str) -> Result<usize, CacheError> {
    let mut state = self.lock()?;
    state
      .entities
      .remove(&(T::entity_type(), entity_key.to_string()));

    let mut touched = 0;
    for query in state.queries.values_mut() {
      if query.entity_type != T::entity_type() {
        continue;
      }
      let before = query.keys.len();
      query.keys.retain(|k| k != entity_key);
      if query.keys.len() != before {
        tracing::debug!(query = %query.description, key = entity_key, "evicted from cached list");
        touched += 1;
      }
    }
    Ok(touched)
  }

  fn invalidate_query(&self, key: &str) -> Result<(), CacheError> {
    if let Some(query) = self.lock()?.queries.get_mut(key) {
      query.invalidated = true;
    }
    Ok(())
  }

  fn clear(&self) -> Result<(), CacheError> {
    let mut state = self.lock()?;
    state.entities.clear();
    state.queries.clear();
    Ok(())
  }
}
