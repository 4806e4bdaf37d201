//! Normalized entity cache mirroring the remote API.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Stores each entity once, keyed by type and id
//! - Stores list query results as ordered references to those entities
//! - Serves list reads cache-first, falling back to stale data when offline
//! - Synchronizes cached lists after create/update/delete mutations

mod error;
mod layer;
mod storage;
mod sync;
mod traits;

pub use layer::CacheLayer;
pub use storage::MemoryStorage;
pub use traits::{CacheResult, CacheSource, Cacheable, QueryKey};
