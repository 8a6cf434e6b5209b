// Test doubles for content sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{DocsError, Result};

use super::source::DocumentSource;
use super::types::{Category, DocumentationData, Section, SectionContent, ZoomLevel};

/// Build a section whose levels carry recognisable text.
pub fn section(title: &str) -> Section {
    Section {
        title: title.to_string(),
        content: SectionContent {
            zoom_levels: ["shallow", "medium", "deep"]
                .iter()
                .map(|level| ZoomLevel {
                    level: level.to_string(),
                    text: format!("{} ({})", title, level),
                })
                .collect(),
        },
    }
}

/// Categories `A` (sections `A1`, `A2`) and `B` (section `B2`).
pub fn sample_data() -> DocumentationData {
    DocumentationData::new(vec![
        Category {
            title: "A".to_string(),
            sections: vec![section("A1"), section("A2")],
        },
        Category {
            title: "B".to_string(),
            sections: vec![section("B2")],
        },
    ])
}

/// Source that counts loads and can be switched into a failing mode.
pub struct CountingSource {
    data: DocumentationData,
    loads: AtomicUsize,
    failing: AtomicBool,
}

impl CountingSource {
    pub fn new(data: DocumentationData) -> Arc<Self> {
        Arc::new(Self {
            data,
            loads: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        })
    }

    pub fn sample() -> Arc<Self> {
        Self::new(sample_data())
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentSource for CountingSource {
    async fn load(&self) -> Result<DocumentationData> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DocsError::SourceUnavailable("backend offline".to_string()));
        }
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        "counting test source".to_string()
    }
}
