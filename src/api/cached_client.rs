//! Cached CRM client that wraps CrmClient with transparent caching.

use color_eyre::Result;

use crate::cache::{CacheLayer, CacheResult, MemoryStorage};
#[cfg(test)]
use crate::cache::Cacheable;
use crate::config::Config;
use crate::session::Session;

use super::cache::CrmQueryKey;
use super::client::CrmClient;
use super::error::ApiError;
use super::types::{
  Client, ClientInput, Credentials, Order, OrderInput, OrderStatus, Product, ProductInput,
  TopClient, TopSeller, User,
};

/// CRM client with transparent caching support.
///
/// List reads are cache-first. Mutations go to the network and, once the
/// server confirms them, update the cached lists in place so views show the
/// change without refetching.
#[derive(Clone)]
pub struct CachedCrmClient {
  inner: CrmClient,
  cache: CacheLayer<MemoryStorage>,
}

impl CachedCrmClient {
  pub fn new(config: &Config, session: Session) -> Result<Self> {
    let inner = CrmClient::new(config, session)?;
    let cache = CacheLayer::new(MemoryStorage::new()).with_stale_time(config.stale_time());

    Ok(Self { inner, cache })
  }

  pub fn session(&self) -> &Session {
    self.inner.session()
  }

  /// Force the next read of a list to go to the network.
  pub fn invalidate(&self, key: CrmQueryKey) {
    self.cache.invalidate(&key);
  }

  /// Drop every cached record (sign-out).
  pub fn clear_cache(&self) {
    self.cache.clear();
  }

  /// Store a list as if it had just been read from the server
  #[cfg(test)]
  pub(crate) async fn seed_list<T: Cacheable>(&self, key: CrmQueryKey, items: Vec<T>) {
    let result = self
      .cache
      .fetch_list(&key, || async move { Ok::<_, ApiError>(items) })
      .await;
    assert!(result.is_ok(), "seeding {:?} failed", key);
  }

  // --------------------------------------------------------------------------
  // Session and statistics (not cached)
  // --------------------------------------------------------------------------

  pub async fn current_user(&self) -> Result<User, ApiError> {
    self.inner.current_user().await
  }

  pub async fn authenticate(&self, credentials: &Credentials) -> Result<String, ApiError> {
    self.inner.authenticate(credentials).await
  }

  pub async fn top_sellers(&self) -> Result<Vec<TopSeller>, ApiError> {
    self.inner.top_sellers().await
  }

  pub async fn top_clients(&self) -> Result<Vec<TopClient>, ApiError> {
    self.inner.top_clients().await
  }

  // --------------------------------------------------------------------------
  // Clients
  // --------------------------------------------------------------------------

  pub async fn clients(&self) -> Result<CacheResult<Vec<Client>>, ApiError> {
    self
      .cache
      .fetch_list(&CrmQueryKey::Clients, || self.inner.clients())
      .await
  }

  pub async fn client(&self, id: &str) -> Result<Client, ApiError> {
    let result = self.cache.fetch_one(id, || self.inner.client(id)).await?;
    Ok(result.data)
  }

  pub async fn create_client(&self, input: &ClientInput) -> Result<Client, ApiError> {
    self
      .cache
      .mutate(
        "nuevoCliente",
        self.inner.create_client(input),
        |cache, client| cache.sync_created(&CrmQueryKey::Clients, client),
      )
      .await
  }

  pub async fn update_client(&self, id: &str, input: &ClientInput) -> Result<Client, ApiError> {
    self
      .cache
      .mutate(
        "actualizarCliente",
        self.inner.update_client(id, input),
        |cache, client| cache.sync_updated(client),
      )
      .await
  }

  pub async fn delete_client(&self, id: &str) -> Result<String, ApiError> {
    self
      .cache
      .mutate(
        "eliminarCliente",
        self.inner.delete_client(id),
        |cache, _message| cache.sync_deleted::<Client, _>(&CrmQueryKey::Clients, id),
      )
      .await
  }

  // --------------------------------------------------------------------------
  // Products
  // --------------------------------------------------------------------------

  pub async fn products(&self) -> Result<CacheResult<Vec<Product>>, ApiError> {
    self
      .cache
      .fetch_list(&CrmQueryKey::Products, || self.inner.products())
      .await
  }

  pub async fn product(&self, id: &str) -> Result<Product, ApiError> {
    let result = self.cache.fetch_one(id, || self.inner.product(id)).await?;
    Ok(result.data)
  }

  pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
    self
      .cache
      .mutate(
        "nuevoProducto",
        self.inner.create_product(input),
        |cache, product| cache.sync_created(&CrmQueryKey::Products, product),
      )
      .await
  }

  pub async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product, ApiError> {
    self
      .cache
      .mutate(
        "actualizarProducto",
        self.inner.update_product(id, input),
        |cache, product| cache.sync_updated(product),
      )
      .await
  }

  pub async fn delete_product(&self, id: &str) -> Result<String, ApiError> {
    self
      .cache
      .mutate(
        "eliminarProducto",
        self.inner.delete_product(id),
        |cache, _message| cache.sync_deleted::<Product, _>(&CrmQueryKey::Products, id),
      )
      .await
  }

  // --------------------------------------------------------------------------
  // Orders
  // --------------------------------------------------------------------------

  pub async fn orders(&self) -> Result<CacheResult<Vec<Order>>, ApiError> {
    self
      .cache
      .fetch_list(&CrmQueryKey::Orders, || self.inner.orders())
      .await
  }

  pub async fn create_order(&self, input: &OrderInput) -> Result<Order, ApiError> {
    let order = self
      .cache
      .mutate(
        "nuevoPedido",
        self.inner.create_order(input),
        |cache, order| cache.sync_created(&CrmQueryKey::Orders, order),
      )
      .await?;

    // The server took the ordered quantities out of stock
    self.cache.invalidate(&CrmQueryKey::Products);
    Ok(order)
  }

  pub async fn update_order_status(
    &self,
    order: &Order,
    status: OrderStatus,
  ) -> Result<Order, ApiError> {
    self
      .cache
      .mutate(
        "actualizarPedido",
        self
          .inner
          .update_order_status(&order.id, &order.client.id, status),
        |cache, order| cache.sync_updated(order),
      )
      .await
  }

  pub async fn delete_order(&self, id: &str) -> Result<String, ApiError> {
    self
      .cache
      .mutate(
        "eliminarPedido",
        self.inner.delete_order(id),
        |cache, _message| cache.sync_deleted::<Order, _>(&CrmQueryKey::Orders, id),
      )
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use crate::session::LocalStorage;

  /// A client whose endpoint refuses every connection
  fn unreachable_client() -> CachedCrmClient {
    let mut config = Config::default();
    config.api.url = "http://127.0.0.1:1".to_string();
    config.api.timeout_secs = 2;
    let session = Session::new(LocalStorage::open_in_memory().unwrap(), None);
    CachedCrmClient::new(&config, session).unwrap()
  }

  fn client(id: &str, name: &str) -> Client {
    Client {
      id: id.to_string(),
      first_name: name.to_string(),
      last_name: "Test".to_string(),
      company: "Acme".to_string(),
      email: format!("{}@acme.com", name),
      phone: None,
    }
  }

  async fn prime_clients(crm: &CachedCrmClient, clients: Vec<Client>) {
    crm.seed_list(CrmQueryKey::Clients, clients).await;
  }

  #[tokio::test]
  async fn test_cached_clients_served_without_network() {
    let crm = unreachable_client();
    prime_clients(&crm, vec![client("1", "ana")]).await;

    let result = crm.clients().await.unwrap();
    assert_eq!(result.source, CacheSource::Cache);
    assert_eq!(result.data[0].id, "1");
  }

  #[tokio::test]
  async fn test_failed_delete_leaves_cached_list_untouched() {
    let crm = unreachable_client();
    let clients = vec![client("1", "ana"), client("2", "luis")];
    prime_clients(&crm, clients.clone()).await;

    let err = crm.delete_client("2").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(!err.is_rejected());

    assert_eq!(crm.clients().await.unwrap().data, clients);
  }

  #[tokio::test]
  async fn test_failed_create_leaves_cached_list_untouched() {
    let crm = unreachable_client();
    let clients = vec![client("1", "ana")];
    prime_clients(&crm, clients.clone()).await;

    let input = ClientInput {
      first_name: "Eva".into(),
      last_name: "Diaz".into(),
      company: "Acme".into(),
      email: "eva@acme.com".into(),
      phone: None,
    };
    assert!(crm.create_client(&input).await.is_err());
    assert_eq!(crm.clients().await.unwrap().data, clients);
  }

  #[tokio::test]
  async fn test_clear_cache_forces_network() {
    let crm = unreachable_client();
    prime_clients(&crm, vec![client("1", "ana")]).await;

    crm.clear_cache();
    assert!(crm.clients().await.is_err());
  }
}
