// Documentation cache with fetch coalescing.
// Holds the last fetched dataset, answers freshness, and lets concurrent callers share one fetch.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::docs::{DocumentSource, DocumentationData};
use crate::error::{DocsError, Result};

use super::store::{CachedData, DEFAULT_TTL};

/// Default simulated network latency for a fetch.
pub const DEFAULT_FETCH_LATENCY: Duration = Duration::from_millis(1500);

/// Resolved value of a fetch, broadcast to every waiter.
type FetchOutcome = std::result::Result<Arc<DocumentationData>, Arc<DocsError>>;

/// Read-only snapshot of the cache for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// A dataset is held, fresh or not.
    pub has_data: bool,
    /// A dataset is held and younger than the TTL.
    pub is_valid: bool,
    /// RFC 3339 time of the last successful fetch.
    pub last_fetch: Option<String>,
    /// A fetch is in flight.
    pub is_loading: bool,
}

/// The in-flight fetch slot. Waiters subscribe to `tx`.
struct InFlight {
    id: u64,
    tx: watch::Sender<Option<FetchOutcome>>,
}

#[derive(Default)]
struct CacheState {
    entry: Option<CachedData<DocumentationData>>,
    in_flight: Option<InFlight>,
    next_flight_id: u64,
}

impl CacheState {
    fn valid_data(&self, ttl: Duration) -> Option<Arc<DocumentationData>> {
        self.entry
            .as_ref()
            .filter(|entry| entry.is_valid(ttl))
            .map(|entry| Arc::clone(&entry.data))
    }

    fn open_flight(&mut self) -> u64 {
        let id = self.next_flight_id;
        self.next_flight_id += 1;
        let (tx, _) = watch::channel(None);
        self.in_flight = Some(InFlight { id, tx });
        id
    }

    /// Remove the slot if it still belongs to `id`.
    fn take_flight(&mut self, id: u64) -> Option<InFlight> {
        if self.in_flight.as_ref().is_some_and(|f| f.id == id) {
            self.in_flight.take()
        } else {
            None
        }
    }
}

/// What a `fetch_data` caller does after inspecting the cache.
enum Next {
    Hit(Arc<DocumentationData>),
    Wait(watch::Receiver<Option<FetchOutcome>>),
    Originate(u64),
}

/// Releases the in-flight slot on every exit path of an originating fetch.
struct FlightGuard<'a> {
    state: &'a Mutex<CacheState>,
    id: u64,
}

impl FlightGuard<'_> {
    /// Store a successful result and wake waiters with it.
    fn complete(self, data: DocumentationData) -> Arc<DocumentationData> {
        let entry = CachedData::new(data);
        let data = Arc::clone(&entry.data);
        let flight = {
            let mut state = self.state.lock();
            state.entry = Some(entry);
            state.take_flight(self.id)
        };
        if let Some(flight) = flight {
            flight.tx.send_replace(Some(Ok(Arc::clone(&data))));
        }
        data
    }

    /// Wake waiters with a failure. The cached entry is left as it was.
    fn fail(self, error: Arc<DocsError>) {
        let flight = self.state.lock().take_flight(self.id);
        if let Some(flight) = flight {
            flight.tx.send_replace(Some(Err(error)));
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        // Dropping the sender without a value tells waiters to re-check.
        let flight = self.state.lock().take_flight(self.id);
        drop(flight);
    }
}

/// Time-boxed cache over a documentation source.
///
/// One instance is meant to be shared (through `Arc`) by every store that
/// shows the same content, so they all observe the same dataset and loading flag.
pub struct DocumentsCache {
    source: Arc<dyn DocumentSource>,
    ttl: Duration,
    fetch_latency: Duration,
    state: Mutex<CacheState>,
}

impl DocumentsCache {
    /// Create a cache with explicit TTL and simulated latency.
    pub fn new(source: Arc<dyn DocumentSource>, ttl: Duration, fetch_latency: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_latency,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Create with the default 5 minute TTL and 1.5 s latency.
    pub fn with_defaults(source: Arc<dyn DocumentSource>) -> Self {
        Self::new(source, DEFAULT_TTL, DEFAULT_FETCH_LATENCY)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn fetch_latency(&self) -> Duration {
        self.fetch_latency
    }

    /// The held dataset, only while it is within the TTL.
    pub fn get_cached_data(&self) -> Option<Arc<DocumentationData>> {
        self.state.lock().valid_data(self.ttl)
    }

    /// Replace the held dataset and stamp the fetch time.
    pub fn set_data(&self, data: DocumentationData) {
        self.state.lock().entry = Some(CachedData::new(data));
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    /// Mark a fetch as in flight, or release the in-flight slot.
    ///
    /// Releasing wakes every waiting `fetch_data` caller, which then
    /// re-checks the cache and originates a fetch if it is still empty.
    pub fn set_loading(&self, loading: bool) {
        let mut state = self.state.lock();
        if loading {
            if state.in_flight.is_none() {
                state.open_flight();
            }
        } else {
            state.in_flight = None;
        }
    }

    /// Discard the dataset and its timestamp. The loading flag is untouched.
    pub fn clear_cache(&self) {
        info!("Clearing documentation cache");
        self.state.lock().entry = None;
    }

    /// Snapshot of the cache status.
    pub fn cache_info(&self) -> CacheInfo {
        let state = self.state.lock();
        CacheInfo {
            has_data: state.entry.is_some(),
            is_valid: state.valid_data(self.ttl).is_some(),
            last_fetch: state.entry.as_ref().map(CachedData::fetched_at_rfc3339),
            is_loading: state.in_flight.is_some(),
        }
    }

    /// Return fresh data, from memory if valid, otherwise from the source.
    ///
    /// At most one fetch runs at a time. Callers arriving while one is in flight
    /// wait for it and receive its result, success or failure.
    pub async fn fetch_data(&self) -> Result<Arc<DocumentationData>> {
        loop {
            let next = {
                let mut state = self.state.lock();
                if let Some(data) = state.valid_data(self.ttl) {
                    Next::Hit(data)
                } else if let Some(flight) = &state.in_flight {
                    Next::Wait(flight.tx.subscribe())
                } else {
                    Next::Originate(state.open_flight())
                }
            };

            match next {
                Next::Hit(data) => {
                    debug!("Returning cached documentation data");
                    return Ok(data);
                }
                Next::Originate(id) => return self.originate(id).await,
                Next::Wait(mut rx) => {
                    debug!("Waiting for in-flight fetch to complete");
                    let outcome = match rx.wait_for(Option::is_some).await {
                        Ok(outcome) => outcome.clone(),
                        Err(_) => None,
                    };
                    match outcome {
                        Some(Ok(data)) => return Ok(data),
                        Some(Err(error)) => return Err(DocsError::Shared(error)),
                        // Released without a result: re-check and possibly fetch ourselves
                        None => continue,
                    }
                }
            }
        }
    }

    async fn originate(&self, id: u64) -> Result<Arc<DocumentationData>> {
        let guard = FlightGuard {
            state: &self.state,
            id,
        };

        info!(source = %self.source.describe(), "Fetching fresh documentation data");
        tokio::time::sleep(self.fetch_latency).await;

        match self.source.load().await {
            Ok(data) => {
                let data = guard.complete(data);
                info!(
                    categories = data.categories.len(),
                    sections = data.section_count(),
                    "Documentation data fetched and cached"
                );
                Ok(data)
            }
            Err(e) => {
                warn!(error = %e, "Documentation fetch failed");
                let error = Arc::new(e);
                guard.fail(Arc::clone(&error));
                Err(DocsError::Shared(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::testing::{CountingSource, sample_data};
    use tokio::time::Instant;

    fn cache_over(source: &Arc<CountingSource>) -> Arc<DocumentsCache> {
        Arc::new(DocumentsCache::with_defaults(source.clone()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_incurs_latency_then_hits() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);

        let start = Instant::now();
        let first = cache.fetch_data().await.unwrap();
        assert!(start.elapsed() >= DEFAULT_FETCH_LATENCY);

        let start = Instant::now();
        let second = cache.fetch_data().await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.loads(), 1);
        assert!(!cache.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_boundary() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);
        cache.fetch_data().await.unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get_cached_data().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get_cached_data().is_none());

        // Stale bytes are still held until the next fetch overwrites them
        let info = cache.cache_info();
        assert!(info.has_data);
        assert!(!info.is_valid);

        cache.fetch_data().await.unwrap();
        assert_eq!(source.loads(), 2);
        assert!(cache.cache_info().is_valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_fetch() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);

        let (a, b, c) = tokio::join!(cache.fetch_data(), cache.fetch_data(), cache.fetch_data());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(source.loads(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_tasks_after_expiry() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);
        cache.fetch_data().await.unwrap();
        tokio::time::advance(DEFAULT_TTL).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.fetch_data().await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(source.loads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_leaves_cache_untouched() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);
        cache.fetch_data().await.unwrap();
        let before = cache.cache_info();

        tokio::time::advance(DEFAULT_TTL).await;
        source.set_failing(true);

        let err = cache.fetch_data().await.unwrap_err();
        assert_eq!(err.to_string(), "Content source unavailable: backend offline");

        let after = cache.cache_info();
        assert!(!after.is_loading);
        assert!(after.has_data);
        assert_eq!(after.last_fetch, before.last_fetch);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_share_failure() {
        let source = CountingSource::sample();
        source.set_failing(true);
        let cache = cache_over(&source);

        let (a, b) = tokio::join!(cache.fetch_data(), cache.fetch_data());
        let (a, b) = (a.unwrap_err(), b.unwrap_err());

        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(source.loads(), 1);
        assert!(!cache.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_leader_hands_over() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);

        let leader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.fetch_data().await })
        };
        tokio::task::yield_now().await;
        assert!(cache.is_loading());

        let waiter = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.fetch_data().await })
        };
        tokio::task::yield_now().await;

        leader.abort();
        assert!(leader.await.unwrap_err().is_cancelled());

        let data = waiter.await.unwrap().unwrap();
        assert_eq!(*data, sample_data());
        assert_eq!(source.loads(), 1);
        assert!(!cache.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_loading_flag_holds_callers() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);

        cache.set_loading(true);
        assert!(cache.cache_info().is_loading);

        let pending = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.fetch_data().await })
        };
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.loads(), 0);
        assert!(!pending.is_finished());

        cache.set_loading(false);
        pending.await.unwrap().unwrap();
        assert_eq!(source.loads(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_then_get_is_absent() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);
        cache.fetch_data().await.unwrap();
        assert!(cache.get_cached_data().is_some());

        cache.clear_cache();
        assert!(cache.get_cached_data().is_none());

        let info = cache.cache_info();
        assert_eq!(info, CacheInfo::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_does_not_touch_loading() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);
        cache.set_loading(true);
        cache.clear_cache();
        assert!(cache.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_data_stamps_time() {
        let source = CountingSource::sample();
        let cache = cache_over(&source);
        assert!(cache.cache_info().last_fetch.is_none());

        cache.set_data(sample_data());
        let info = cache.cache_info();
        assert!(info.is_valid);
        assert!(info.last_fetch.is_some());

        // Served from memory without touching the source
        cache.fetch_data().await.unwrap();
        assert_eq!(source.loads(), 0);
    }
}
