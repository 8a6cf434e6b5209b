// App state and headless driver.
// Wires configuration, cache and store together and reports store state as text.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::cache::DocumentsCache;
use crate::config::Config;
use crate::error::Result;
use crate::state::{DocumentsStore, OutlineRow, SidebarState, StoreState, breadcrumb_text};

/// What the driver should do after the initial load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Category and section to show instead of the default.
    pub section: Option<(String, String)>,
    /// Zoom level to show.
    pub zoom_level: Option<String>,
    /// Force a refresh after loading.
    pub refresh: bool,
}

/// Main application state.
pub struct App {
    /// The documents view-model.
    pub store: Arc<DocumentsStore>,
    /// Sidebar expansion.
    pub sidebar: SidebarState,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let cache = Arc::new(DocumentsCache::new(
            config.source(),
            config.ttl,
            config.fetch_latency,
        ));
        let store = Arc::new(DocumentsStore::with_refresh_period(
            cache,
            config.cache_info_refresh,
        ));
        Self {
            store,
            sidebar: SidebarState::new(),
        }
    }

    /// Run a request against the store. Store failures end up in the state,
    /// only an unavailable zoom level is returned as an error.
    pub async fn run(&mut self, request: &Request) -> Result<StoreState> {
        let _refresh = self.store.start_cache_info_refresh();

        self.store.load_initial_data().await;
        if request.refresh {
            self.store.refresh_data().await;
        }
        if let Some((category, section)) = &request.section {
            self.store.select_section(category, section).await;
        }
        if let Some(level) = &request.zoom_level {
            self.store.set_zoom_level(level)?;
        }

        let state = self.store.snapshot();
        if let (Some(data), Some(selected)) = (&state.documentation_data, &state.selected_content)
        {
            self.sidebar.expand_title(data, &selected.category_title);
        }
        Ok(state)
    }

    /// Plain-text report of the state: breadcrumb, text, outline and cache status.
    pub fn report(&self, state: &StoreState) -> String {
        let mut out = String::new();

        if let Some(error) = &state.error {
            let _ = writeln!(out, "error: {}", error);
        }

        let trail = breadcrumb_text(state.selected_content.as_ref());
        if !trail.is_empty() {
            let levels: Vec<_> = state
                .available_zoom_levels()
                .into_iter()
                .map(|o| {
                    if o.value == state.zoom_level {
                        format!("[{}]", o.label)
                    } else {
                        o.label
                    }
                })
                .collect();
            let _ = writeln!(out, "{}    {}", trail, levels.join(" "));
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", state.current_text().unwrap_or_default());
            let _ = writeln!(out);
        }

        if let Some(data) = &state.documentation_data {
            for row in self.sidebar.outline(data) {
                match row {
                    OutlineRow::Category { title, expanded } => {
                        let marker = if expanded { "v" } else { ">" };
                        let _ = writeln!(out, "{} {}", marker, title);
                    }
                    OutlineRow::Section { title, .. } => {
                        let _ = writeln!(out, "    - {}", title);
                    }
                }
            }
            let _ = writeln!(out);
        }

        let info = &state.cache_info;
        let _ = writeln!(
            out,
            "cache: valid={} has_data={} loading={} last_fetch={}",
            info.is_valid,
            info.has_data,
            info.is_loading,
            info.last_fetch.as_deref().unwrap_or("never")
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentLocation;
    use std::time::Duration;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir) -> Config {
        let path = dir.path().join("content.json");
        std::fs::write(
            &path,
            r#"{"categories":[
                {"title":"Rust","sections":[
                    {"title":"Ownership","content":{"zoomLevels":[
                        {"level":"shallow","text":"One owner."},
                        {"level":"deep","text":"Moves transfer ownership."}]}},
                    {"title":"Borrowing","content":{"zoomLevels":[
                        {"level":"shallow","text":"References."}]}}]},
                {"title":"Tokio","sections":[]}]}"#,
        )
        .unwrap();
        Config {
            content: ContentLocation::File(path),
            fetch_latency: Duration::ZERO,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_default_run() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(&file_config(&dir));

        let state = app.run(&Request::default()).await.unwrap();
        let report = app.report(&state);

        assert!(report.starts_with("Rust / Ownership    [Shallow] Deep"));
        assert!(report.contains("One owner."));
        assert!(report.contains("v Rust\n    - Ownership\n    - Borrowing\n> Tokio"));
        assert!(report.contains("cache: valid=true has_data=true loading=false"));
    }

    #[tokio::test]
    async fn test_run_with_section_and_zoom() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(&file_config(&dir));
        let request = Request {
            section: Some(("Rust".to_string(), "Ownership".to_string())),
            zoom_level: Some("deep".to_string()),
            refresh: true,
        };

        let state = app.run(&request).await.unwrap();
        assert_eq!(state.current_text(), Some("Moves transfer ownership."));
        assert!(app.report(&state).contains("Shallow [Deep]"));
    }

    #[tokio::test]
    async fn test_run_missing_section_reports_error() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(&file_config(&dir));
        let request = Request {
            section: Some(("Tokio".to_string(), "Runtime".to_string())),
            ..Request::default()
        };

        let state = app.run(&request).await.unwrap();
        let report = app.report(&state);
        assert!(report.starts_with("error: Section not found: Tokio/Runtime"));
        assert!(report.contains("Rust / Ownership"));
    }

    #[tokio::test]
    async fn test_run_unknown_zoom_level() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(&file_config(&dir));
        let request = Request {
            section: Some(("Rust".to_string(), "Borrowing".to_string())),
            zoom_level: Some("deep".to_string()),
            ..Request::default()
        };

        assert!(app.run(&request).await.is_err());
    }
}
