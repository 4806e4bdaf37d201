//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::CacheError;
use super::storage::CacheStorage;
use super::sync::{append_created, remove_deleted};
use super::traits::{CacheResult, Cacheable, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the network client. Reads are
/// cache-first; writes happen only after the network confirms them.
///
/// Storage failures never fail a read or a mutation: the remote API is the
/// source of truth and the cache only mirrors it, so a broken mirror is
/// logged and bypassed.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Check if cached data is stale based on cached_at timestamp.
  fn is_stale(&self, cached_at: chrono::DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.stale_time
  }

  /// Fetch a list with cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately
  /// 2. If stale/missing, fetch from network
  /// 3. On network failure, return stale cache (offline mode)
  /// 4. Update cache with new data
  pub async fn fetch_list<T, K, E, F, Fut>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<Vec<T>>, E>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let hash = key.cache_hash();
    let cached = self
      .storage
      .get_query_result::<T>(&hash)
      .unwrap_or_else(|e| {
        warn!(query = %key.description(), error = %e, "cache read failed");
        None
      });

    let Some(cached) = cached else {
      // No cache, must fetch from network
      let data = fetcher().await?;
      self.store_list(key, &hash, &data);
      return Ok(CacheResult::from_network(data));
    };

    if !cached.invalidated && !self.is_stale(cached.cached_at) {
      debug!(query = %key.description(), count = cached.entities.len(), "cache hit");
      return Ok(CacheResult::from_cache(cached.entities, cached.cached_at));
    }

    // Cache is stale, try to fetch from network
    match fetcher().await {
      Ok(data) => {
        self.store_list(key, &hash, &data);
        Ok(CacheResult::from_network(data))
      }
      Err(_) => {
        warn!(query = %key.description(), "network failed, serving stale cache");
        Ok(CacheResult::offline(cached.entities, cached.cached_at))
      }
    }
  }

  /// Fetch a single entity with caching.
  pub async fn fetch_one<T, E, F, Fut>(&self, entity_key: &str, fetcher: F) -> Result<CacheResult<T>, E>
  where
    T: Cacheable,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    let cached = self
      .storage
      .get_entity::<T>(entity_key)
      .unwrap_or_else(|e| {
        warn!(key = entity_key, error = %e, "cache read failed");
        None
      });

    let Some(cached) = cached else {
      let data = fetcher().await?;
      self.store_entity(&data);
      return Ok(CacheResult::from_network(data));
    };

    if !self.is_stale(cached.cached_at) {
      return Ok(CacheResult::from_cache(cached.entity, cached.cached_at));
    }

    match fetcher().await {
      Ok(data) => {
        self.store_entity(&data);
        Ok(CacheResult::from_network(data))
      }
      Err(_) => Ok(CacheResult::offline(cached.entity, cached.cached_at)),
    }
  }

  /// Run a mutation, then synchronize the cache with its result.
  ///
  /// The cache is touched only after the mutation succeeds. A failing
  /// synchronization (typically a list that was never fetched) is logged and
  /// does not turn the mutation into a failure; the list refetches later.
  pub async fn mutate<M, E, Fut, U>(&self, label: &str, mutation: Fut, sync: U) -> Result<M, E>
  where
    Fut: Future<Output = Result<M, E>>,
    U: FnOnce(&Self, &M) -> Result<(), CacheError>,
  {
    let result = mutation.await?;

    match sync(self, &result) {
      Ok(()) => debug!(mutation = label, "cache synchronized"),
      Err(e) if e.is_not_cached() => {
        warn!(mutation = label, error = %e, "list not cached, skipping synchronization")
      }
      Err(e) => warn!(mutation = label, error = %e, "cache synchronization failed"),
    }

    Ok(result)
  }

  /// Append a created entity to a cached list.
  pub fn sync_created<T, K>(&self, key: &K, created: &T) -> Result<(), CacheError>
  where
    T: Cacheable,
    K: QueryKey,
  {
    self.storage.update_query_result::<T, _>(
      &key.cache_hash(),
      &key.description(),
      |list| append_created(list, created.clone()),
    )
  }

  /// Remove a deleted entity from a cached list and from every other list.
  pub fn sync_deleted<T, K>(&self, key: &K, deleted_key: &str) -> Result<(), CacheError>
  where
    T: Cacheable,
    K: QueryKey,
  {
    let result = self.storage.update_query_result::<T, _>(
      &key.cache_hash(),
      &key.description(),
      |list| remove_deleted(list, deleted_key),
    );
    self.storage.evict_entity::<T>(deleted_key)?;
    result
  }

  /// Overwrite a single entity; every list referring to it sees the change.
  pub fn sync_updated<T: Cacheable>(&self, entity: &T) -> Result<(), CacheError> {
    self.storage.store_entity(entity)
  }

  /// Mark a list stale so the next read goes to the network.
  pub fn invalidate<K: QueryKey>(&self, key: &K) {
    if let Err(e) = self.storage.invalidate_query(&key.cache_hash()) {
      warn!(query = %key.description(), error = %e, "failed to invalidate query");
    }
  }

  /// Drop all cached data (e.g. on sign-out).
  pub fn clear(&self) {
    if let Err(e) = self.storage.clear() {
      warn!(error = %e, "failed to clear cache");
    }
  }

  fn store_list<T: Cacheable, K: QueryKey>(&self, key: &K, hash: &str, data: &[T]) {
    if let Err(e) = self
      .storage
      .store_query_result(hash, &key.description(), data)
    {
      warn!(query = %key.description(), error = %e, "cache write failed");
    }
  }

  fn store_entity<T: Cacheable>(&self, entity: &T) {
    if let Err(e) = self.storage.store_entity(entity) {
      warn!(key = entity.cache_key(), error = %e, "cache write failed");
    }
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      stale_time: self.stale_time,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::cache::sync::tests::Item;
  use crate::cache::CacheSource;
  use std::sync::atomic::{AtomicU32, Ordering};

  struct Key(&'static str);

  impl QueryKey for Key {
    fn cache_hash(&self) -> String {
      self.0.to_string()
    }

    fn description(&self) -> String {
      self.0.to_string()
    }
  }

  fn layer() -> CacheLayer<MemoryStorage> {
    CacheLayer::new(MemoryStorage::new())
  }

  async fn cached_list(layer: &CacheLayer<MemoryStorage>, key: &Key) -> Vec<Item> {
    layer
      .fetch_list(key, || async { Err::<Vec<Item>, String>("no network".into()) })
      .await
      .unwrap()
      .data
  }

  async fn prime(layer: &CacheLayer<MemoryStorage>, key: &Key, items: Vec<Item>) {
    layer
      .fetch_list(key, || async move { Ok::<_, String>(items) })
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_fetch_list_is_cache_first() {
    let layer = layer();
    let key = Key("items");
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
      layer
        .fetch_list(&key, || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok::<_, String>(vec![Item::new("1", "a")])
        })
        .await
        .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fetch_list_without_cache_propagates_error() {
    let layer = layer();
    let result = layer
      .fetch_list(&Key("items"), || async {
        Err::<Vec<Item>, String>("down".into())
      })
      .await;
    assert_eq!(result.unwrap_err(), "down");
  }

  #[tokio::test]
  async fn test_stale_cache_served_offline() {
    let layer = layer().with_stale_time(Duration::zero());
    let key = Key("items");
    prime(&layer, &key, vec![Item::new("1", "a")]).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let result = layer
      .fetch_list(&key, || async { Err::<Vec<Item>, String>("down".into()) })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Offline);
    assert_eq!(result.data, vec![Item::new("1", "a")]);
  }

  #[tokio::test]
  async fn test_invalidate_forces_network() {
    let layer = layer();
    let key = Key("items");
    prime(&layer, &key, vec![Item::new("1", "a")]).await;

    layer.invalidate(&key);
    let result = layer
      .fetch_list(&key, || async {
        Ok::<_, String>(vec![Item::new("1", "a"), Item::new("2", "b")])
      })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data.len(), 2);
  }

  #[tokio::test]
  async fn test_create_then_read_needs_no_network() {
    let layer = layer();
    let key = Key("items");
    prime(&layer, &key, vec![Item::new("1", "a")]).await;

    let created = layer
      .mutate(
        "create",
        async { Ok::<_, String>(Item::new("3", "c")) },
        |cache, item| cache.sync_created(&key, item),
      )
      .await
      .unwrap();
    assert_eq!(created.id, "3");

    let list = cached_list(&layer, &key).await;
    assert_eq!(list, vec![Item::new("1", "a"), Item::new("3", "c")]);
  }

  #[tokio::test]
  async fn test_delete_scenario() {
    let layer = layer();
    let key = Key("items");
    prime(&layer, &key, vec![Item::new("1", "a"), Item::new("2", "b")]).await;

    layer
      .mutate(
        "delete",
        async { Ok::<_, String>("2".to_string()) },
        |cache, id| cache.sync_deleted::<Item, _>(&key, id),
      )
      .await
      .unwrap();

    assert_eq!(cached_list(&layer, &key).await, vec![Item::new("1", "a")]);
  }

  #[tokio::test]
  async fn test_delete_absent_id_leaves_list_unchanged() {
    let layer = layer();
    let key = Key("items");
    let items = vec![Item::new("1", "a"), Item::new("2", "b")];
    prime(&layer, &key, items.clone()).await;

    layer
      .mutate(
        "delete",
        async { Ok::<_, String>("7".to_string()) },
        |cache, id| cache.sync_deleted::<Item, _>(&key, id),
      )
      .await
      .unwrap();

    assert_eq!(cached_list(&layer, &key).await, items);
  }

  #[tokio::test]
  async fn test_failed_mutation_leaves_cache_untouched() {
    let layer = layer();
    let key = Key("items");
    let items = vec![Item::new("1", "a")];
    prime(&layer, &key, items.clone()).await;
    let synced = AtomicU32::new(0);

    let result = layer
      .mutate(
        "create",
        async { Err::<Item, String>("network error".into()) },
        |cache, item| {
          synced.fetch_add(1, Ordering::SeqCst);
          cache.sync_created(&key, item)
        },
      )
      .await;

    assert_eq!(result.unwrap_err(), "network error");
    assert_eq!(synced.load(Ordering::SeqCst), 0);
    assert_eq!(cached_list(&layer, &key).await, items);
  }

  #[tokio::test]
  async fn test_sync_on_uncached_list_does_not_fail_mutation() {
    let layer = layer();
    let key = Key("never-fetched");

    let result = layer
      .mutate(
        "create",
        async { Ok::<_, String>(Item::new("1", "a")) },
        |cache, item| cache.sync_created(&key, item),
      )
      .await;

    assert!(result.is_ok());
  }

  #[tokio::test]
  async fn test_update_reflected_in_cached_list() {
    let layer = layer();
    let key = Key("items");
    prime(&layer, &key, vec![Item::new("1", "a"), Item::new("2", "b")]).await;

    layer.sync_updated(&Item::new("2", "bee")).unwrap();

    let list = cached_list(&layer, &key).await;
    assert_eq!(list[1].name, "bee");
  }
}
