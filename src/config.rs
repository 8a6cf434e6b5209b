// Runtime configuration.
// Resolves cache timings and the content location from defaults and environment variables.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DEFAULT_FETCH_LATENCY, DEFAULT_TTL, paths};
use crate::docs::{DocumentSource, EmbeddedSource, FileSource};
use crate::error::{DocsError, Result};
use crate::state::DEFAULT_CACHE_INFO_REFRESH;

pub const ENV_CONTENT: &str = "ZOOMDOCS_CONTENT";
pub const ENV_TTL_SECS: &str = "ZOOMDOCS_TTL_SECS";
pub const ENV_LATENCY_MS: &str = "ZOOMDOCS_LATENCY_MS";
pub const ENV_REFRESH_MS: &str = "ZOOMDOCS_REFRESH_MS";

/// Where content is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    /// Content bundled into the binary.
    Embedded,
    /// A JSON file on disk.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub content: ContentLocation,
    /// How long fetched content is reused.
    pub ttl: Duration,
    /// Simulated network latency of a fetch.
    pub fetch_latency: Duration,
    /// Period of the automatic cache info refresh.
    pub cache_info_refresh: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content: ContentLocation::Embedded,
            ttl: DEFAULT_TTL,
            fetch_latency: DEFAULT_FETCH_LATENCY,
            cache_info_refresh: DEFAULT_CACHE_INFO_REFRESH,
        }
    }
}

impl Config {
    /// Build configuration from the process environment.
    ///
    /// Without `ZOOMDOCS_CONTENT`, a content file in the user data directory
    /// is used when present, otherwise the embedded content.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        if config.content == ContentLocation::Embedded {
            if let Some(path) = paths::existing_content_path() {
                config.content = ContentLocation::File(path);
            }
        }
        Ok(config)
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_CONTENT).filter(|p| !p.trim().is_empty()) {
            config.content = ContentLocation::File(PathBuf::from(path));
        }
        if let Some(secs) = lookup(ENV_TTL_SECS) {
            config.ttl = Duration::from_secs(parse_number(ENV_TTL_SECS, &secs)?);
        }
        if let Some(ms) = lookup(ENV_LATENCY_MS) {
            config.fetch_latency = Duration::from_millis(parse_number(ENV_LATENCY_MS, &ms)?);
        }
        if let Some(ms) = lookup(ENV_REFRESH_MS) {
            let ms = parse_number(ENV_REFRESH_MS, &ms)?;
            if ms == 0 {
                return Err(DocsError::Config(format!("{} must be positive", ENV_REFRESH_MS)));
            }
            config.cache_info_refresh = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Instantiate the content source this configuration points at.
    pub fn source(&self) -> Arc<dyn DocumentSource> {
        match &self.content {
            ContentLocation::Embedded => Arc::new(EmbeddedSource),
            ContentLocation::File(path) => Arc::new(FileSource::new(path)),
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| DocsError::Config(format!("{} must be a whole number, got {:?}", key, value)))
}
