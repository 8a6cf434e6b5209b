// Error types for zoomdocs.
// Covers content source failures, lookups that miss, and configuration errors.

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Content source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Section not found: {category}/{section}")]
    SectionNotFound { category: String, section: String },

    #[error("Zoom level not available: {0}")]
    UnknownZoomLevel(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A fetch failure observed by every caller that waited on the same fetch.
    #[error(transparent)]
    Shared(#[from] Arc<DocsError>),
}

pub type Result<T> = std::result::Result<T, DocsError>;
