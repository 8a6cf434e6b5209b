// Documents store (view-model) over the shared cache.
// Derives UI-facing state from cache operations and publishes it to subscribers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::{CacheInfo, DocumentsCache};
use crate::docs::{DocumentationData, SelectedContent};
use crate::error::{DocsError, Result};

use super::navigation::{DEFAULT_ZOOM_LEVEL, ZoomOption, zoom_options};

/// Default period of the automatic cache info refresh.
pub const DEFAULT_CACHE_INFO_REFRESH: Duration = Duration::from_millis(1000);

/// Coarse lifecycle of a store, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Idle,
    InitialLoading,
    ContentLoading,
    Ready,
    Error,
}

/// Everything a front end renders from.
#[derive(Debug, Clone)]
pub struct StoreState {
    pub documentation_data: Option<Arc<DocumentationData>>,
    pub selected_content: Option<SelectedContent>,
    pub is_initial_loading: bool,
    pub is_content_loading: bool,
    pub cache_info: CacheInfo,
    pub error: Option<String>,
    /// Zoom level shown for `selected_content`.
    pub zoom_level: String,
    initial_loads: usize,
    content_loads: usize,
}

impl StoreState {
    fn new(cache_info: CacheInfo) -> Self {
        Self {
            documentation_data: None,
            selected_content: None,
            is_initial_loading: false,
            is_content_loading: false,
            cache_info,
            error: None,
            zoom_level: DEFAULT_ZOOM_LEVEL.to_string(),
            initial_loads: 0,
            content_loads: 0,
        }
    }

    fn sync_flags(&mut self) {
        self.is_initial_loading = self.initial_loads > 0;
        self.is_content_loading = self.content_loads > 0;
    }

    fn loads_mut(&mut self, kind: LoadKind) -> &mut usize {
        match kind {
            LoadKind::Initial => &mut self.initial_loads,
            LoadKind::Content => &mut self.content_loads,
        }
    }

    fn select(&mut self, content: Option<SelectedContent>) {
        self.selected_content = content;
        self.zoom_level = DEFAULT_ZOOM_LEVEL.to_string();
    }

    pub fn phase(&self) -> StorePhase {
        if self.is_initial_loading {
            StorePhase::InitialLoading
        } else if self.is_content_loading {
            StorePhase::ContentLoading
        } else if self.error.is_some() {
            StorePhase::Error
        } else if self.documentation_data.is_some() {
            StorePhase::Ready
        } else {
            StorePhase::Idle
        }
    }

    /// Zoom levels offered by the selected content.
    pub fn available_zoom_levels(&self) -> Vec<ZoomOption> {
        self.selected_content
            .as_ref()
            .map(zoom_options)
            .unwrap_or_default()
    }

    /// Text of the selected content at the current zoom level.
    pub fn current_text(&self) -> Option<&str> {
        self.selected_content
            .as_ref()?
            .text_for(&self.zoom_level)
    }
}

/// Which loading flag an operation holds.
#[derive(Debug, Clone, Copy)]
enum LoadKind {
    Initial,
    Content,
}

/// Holds one unit of a loading counter. Releases it when dropped, so an
/// operation abandoned mid-fetch does not leave its flag set.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreState>,
    kind: LoadKind,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    /// Raise the flag and clear the previous error.
    fn begin(state: &'a watch::Sender<StoreState>, kind: LoadKind) -> Self {
        state.send_modify(|s| {
            *s.loads_mut(kind) += 1;
            s.error = None;
            s.sync_flags();
        });
        Self {
            state,
            kind,
            armed: true,
        }
    }

    /// Release the flag and apply the operation's result in one update.
    fn finish(mut self, apply: impl FnOnce(&mut StoreState)) {
        self.armed = false;
        let kind = self.kind;
        self.state.send_modify(|s| {
            let loads = s.loads_mut(kind);
            *loads = loads.saturating_sub(1);
            apply(s);
            s.sync_flags();
        });
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let kind = self.kind;
            self.state.send_modify(|s| {
                let loads = s.loads_mut(kind);
                *loads = loads.saturating_sub(1);
                s.sync_flags();
            });
        }
    }
}

/// View-model wrapping a shared `DocumentsCache`.
///
/// Operations never fail; failures land in `StoreState::error`.
/// Operations that write the selection carry a generation number, and only
/// the most recently started one may apply its result.
pub struct DocumentsStore {
    cache: Arc<DocumentsCache>,
    state: watch::Sender<StoreState>,
    generation: AtomicU64,
    refresh_period: Duration,
}

impl DocumentsStore {
    pub fn new(cache: Arc<DocumentsCache>) -> Self {
        Self::with_refresh_period(cache, DEFAULT_CACHE_INFO_REFRESH)
    }

    pub fn with_refresh_period(cache: Arc<DocumentsCache>, refresh_period: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::new(cache.cache_info()));
        Self {
            cache,
            state,
            generation: AtomicU64::new(0),
            refresh_period,
        }
    }

    pub fn cache(&self) -> &Arc<DocumentsCache> {
        &self.cache
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    fn begin_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Fetch data and select the first section of the first category.
    pub async fn load_initial_data(&self) {
        info!("Starting initial data load");
        self.load_with_default_selection().await;
    }

    /// Clear the cache and load again, bypassing the TTL.
    pub async fn refresh_data(&self) {
        info!("Force refreshing documentation data");
        self.cache.clear_cache();
        self.load_with_default_selection().await;
    }

    async fn load_with_default_selection(&self) {
        let generation = self.begin_generation();
        let loading = LoadingGuard::begin(&self.state, LoadKind::Initial);
        debug!(cache = ?self.cache.cache_info(), "Cache info before fetch");

        let result = self.cache.fetch_data().await;
        let cache_info = self.cache.cache_info();
        let current = self.is_current(generation);

        loading.finish(|s| {
            match result {
                Ok(data) => {
                    // A newer selection keeps its section, but the dataset is still shown
                    if current {
                        s.select(data.default_selection());
                    } else {
                        debug!(generation, "Keeping newer selection over default");
                    }
                    s.documentation_data = Some(data);
                }
                Err(e) if current => {
                    warn!(error = %e, "Failed to load documentation data");
                    s.error = Some(e.to_string());
                }
                Err(_) => debug!(generation, "Discarding superseded load error"),
            }
            s.cache_info = cache_info;
        });
    }

    /// Show a section, fetching data first if the cache is not fresh.
    ///
    /// Titles match exactly and case-sensitively. A miss sets `error` and
    /// leaves the current selection alone.
    pub async fn select_section(&self, category: &str, section: &str) {
        let generation = self.begin_generation();
        debug!(category, section, "Loading section");
        let loading = LoadingGuard::begin(&self.state, LoadKind::Content);

        let result = self.cache.fetch_data().await.and_then(|data| {
            data.find_section(category, section)
                .ok_or_else(|| DocsError::SectionNotFound {
                    category: category.to_string(),
                    section: section.to_string(),
                })
        });
        let cache_info = self.cache.cache_info();
        let current = self.is_current(generation);

        loading.finish(|s| {
            match result {
                Ok(content) if current => s.select(Some(content)),
                Err(e) if current => {
                    warn!(error = %e, "Failed to load section");
                    s.error = Some(e.to_string());
                }
                _ => debug!(generation, category, section, "Discarding superseded selection"),
            }
            s.cache_info = cache_info;
        });
    }

    /// Clear the shared cache. Data and selection already shown stay as they are.
    pub fn clear_cache(&self) {
        self.cache.clear_cache();
        self.update_cache_info();
    }

    /// Recompute the cache info snapshot without fetching.
    pub fn update_cache_info(&self) {
        let info = self.cache.cache_info();
        self.state.send_if_modified(|s| {
            if s.cache_info == info {
                false
            } else {
                s.cache_info = info;
                true
            }
        });
    }

    /// Switch the zoom level of the selected content.
    pub fn set_zoom_level(&self, level: &str) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|s| {
            let available = s
                .selected_content
                .as_ref()
                .is_some_and(|c| c.text_for(level).is_some());
            if !available {
                outcome = Err(DocsError::UnknownZoomLevel(level.to_string()));
                return false;
            }
            if s.zoom_level == level {
                return false;
            }
            s.zoom_level = level.to_string();
            true
        });
        outcome
    }

    /// Refresh the cache info periodically until the returned handle is dropped.
    pub fn start_cache_info_refresh(self: &Arc<Self>) -> CacheInfoRefresh {
        let store: Weak<Self> = Arc::downgrade(self);
        let period = self.refresh_period;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match store.upgrade() {
                    Some(store) => store.update_cache_info(),
                    None => break,
                }
            }
        });
        CacheInfoRefresh { handle }
    }
}

/// Handle for the periodic cache info refresh. Stops the refresh when dropped.
#[derive(Debug)]
pub struct CacheInfoRefresh {
    handle: JoinHandle<()>,
}

impl Drop for CacheInfoRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
