//! Caching implementations for CRM types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::{Client, Order, Product};

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for Client {
  fn cache_key(&self) -> &str {
    &self.id
  }

  fn entity_type() -> &'static str {
    "client"
  }
}

impl Cacheable for Product {
  fn cache_key(&self) -> &str {
    &self.id
  }

  fn entity_type() -> &'static str {
    "product"
  }
}

impl Cacheable for Order {
  fn cache_key(&self) -> &str {
    &self.id
  }

  fn entity_type() -> &'static str {
    "order"
  }
}

// ============================================================================
// Query key types
// ============================================================================

/// The list queries whose results are cached.
///
/// Lists are scoped to the signed-in salesperson by the server; the cache is
/// cleared on sign-out, so the key does not carry the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrmQueryKey {
  /// `obtenerClientesVendedor`
  Clients,
  /// `obtenerProductos`
  Products,
  /// `obtenerPedidosVendedor`
  Orders,
}

impl CrmQueryKey {
  fn operation(&self) -> &'static str {
    match self {
      Self::Clients => "obtenerClientesVendedor",
      Self::Products => "obtenerProductos",
      Self::Orders => "obtenerPedidosVendedor",
    }
  }
}

impl QueryKey for CrmQueryKey {
  fn cache_hash(&self) -> String {
    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(b"list:");
    hasher.update(self.operation().as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::Clients => "clients".to_string(),
      Self::Products => "products".to_string(),
      Self::Orders => "orders".to_string(),
    }
  }
}
