// Cache module for fetched documentation.
// Keeps the last dataset in memory with a TTL and coalesces concurrent fetches.

pub mod documents;
pub mod paths;
pub mod store;

pub use documents::{CacheInfo, DEFAULT_FETCH_LATENCY, DocumentsCache};
pub use store::{CachedData, DEFAULT_TTL};
