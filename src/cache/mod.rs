//! Query cache for content lookups.
//!
//! Results are keyed by entity kind plus the validated query, kept for a
//! configurable freshness window and shared between concurrent callers while a
//! fetch is in flight.
//!
//! ```toml
//! [cache]
//! enabled = true
//! list_ttl_seconds = 60
//! post_ttl_seconds = 300
//! serve_stale = true
//! max_entries = 512
//! ```

mod config;
mod keys;
mod latest;
mod state;
mod store;

pub use config::CacheConfig;
pub use keys::{CacheKey, hash_value};
pub use latest::{LatestRequest, Ticket};
pub use state::QueryState;
pub use store::QueryCache;
pub(crate) use store::{METRIC_CACHE_HIT, METRIC_CACHE_JOIN, METRIC_CACHE_MISS, METRIC_CACHE_STALE};
