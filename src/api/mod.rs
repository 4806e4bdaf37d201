//! Remote CRM API: GraphQL client, wire types and the cached wrapper the
//! views talk to.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod operations;
pub mod types;

pub use cache::CrmQueryKey;
pub use cached_client::CachedCrmClient;
pub use error::ApiError;
