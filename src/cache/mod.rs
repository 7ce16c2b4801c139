//! Result caching
//!
//! Results are cached under keys bound to the calendar date, so a cached
//! "today" list never answers for tomorrow even before its TTL runs out.

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheEntry, CacheStats, CacheStore};
