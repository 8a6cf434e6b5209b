// In-memory cache entry.
// Pairs fetched data with the time it was stored and answers TTL checks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::time::Instant;

/// Default TTL for fetched documentation: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Wrapper for cached data with fetch metadata.
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: Arc<T>,
    /// Monotonic fetch time, used for expiry.
    pub fetched_at: Instant,
    /// Wall-clock fetch time, used for display.
    pub fetched_at_utc: DateTime<Utc>,
}

impl<T> Clone for CachedData<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            fetched_at: self.fetched_at,
            fetched_at_utc: self.fetched_at_utc,
        }
    }
}

impl<T> CachedData<T> {
    /// Create a new entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data: Arc::new(data),
            fetched_at: Instant::now(),
            fetched_at_utc: Utc::now(),
        }
    }

    /// Time since the data was stored.
    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.fetched_at)
    }

    /// Check if this cached data has expired based on TTL.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }

    /// Check if this cached data is still valid (not expired).
    pub fn is_valid(&self, ttl: Duration) -> bool {
        !self.is_expired(ttl)
    }

    /// Fetch time as an RFC 3339 UTC timestamp.
    pub fn fetched_at_rfc3339(&self) -> String {
        self.fetched_at_utc
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
