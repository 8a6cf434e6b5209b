// Content sources standing in for the documentation API.
// Parses the content JSON and abstracts where it is loaded from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{DocsError, Result};

use super::types::{Category, DocumentationData};

/// Mock content compiled into the binary.
const EMBEDDED_CONTENT: &str = include_str!("../../data/learning_content.json");

/// Accepted shapes of the content document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentDocument {
    Wrapped { categories: Vec<Category> },
    Bare(Vec<Category>),
}

/// Parse content JSON in either the `{ "categories": [...] }` or bare array form.
pub fn parse_content(json: &str) -> Result<DocumentationData> {
    let document: ContentDocument = serde_json::from_str(json)?;
    let categories = match document {
        ContentDocument::Wrapped { categories } => categories,
        ContentDocument::Bare(categories) => categories,
    };
    Ok(DocumentationData::new(categories))
}

/// Backing store for documentation content.
///
/// The cache calls `load` once per origination; implementations should not cache.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load the full content snapshot.
    async fn load(&self) -> Result<DocumentationData>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Serves the content bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

#[async_trait]
impl DocumentSource for EmbeddedSource {
    async fn load(&self) -> Result<DocumentationData> {
        parse_content(EMBEDDED_CONTENT)
    }

    fn describe(&self) -> String {
        "embedded content".to_string()
    }
}

/// Reads content from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn load(&self) -> Result<DocumentationData> {
        debug!(path = %self.path.display(), "Reading content file");
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DocsError::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        parse_content(&contents)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
