// Documentation content types.
// Defines the category/section/zoom-level tree and lookups over it.

use serde::{Deserialize, Serialize};

/// Conventional zoom depths. Content may carry other level names too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDepth {
    Shallow,
    Medium,
    Deep,
}

impl ZoomDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoomDepth::Shallow => "shallow",
            ZoomDepth::Medium => "medium",
            ZoomDepth::Deep => "deep",
        }
    }

    pub fn parse(level: &str) -> Option<Self> {
        match level {
            "shallow" => Some(ZoomDepth::Shallow),
            "medium" => Some(ZoomDepth::Medium),
            "deep" => Some(ZoomDepth::Deep),
            _ => None,
        }
    }
}

/// Body text for one zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomLevel {
    pub level: String,
    pub text: String,
}

impl ZoomLevel {
    /// Display label: the level name with its first letter upper-cased.
    pub fn label(&self) -> String {
        let mut chars = self.level.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// The zoom levels of a section, in authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionContent {
    #[serde(default)]
    pub zoom_levels: Vec<ZoomLevel>,
}

impl SectionContent {
    /// Level names in order.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.zoom_levels.iter().map(|z| z.level.as_str())
    }

    /// Text for a level, first match wins.
    pub fn text_for(&self, level: &str) -> Option<&str> {
        self.zoom_levels
            .iter()
            .find(|z| z.level == level)
            .map(|z| z.text.as_str())
    }
}

/// A documentation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub content: SectionContent,
}

impl Section {
    pub fn text_for(&self, level: &str) -> Option<&str> {
        self.content.text_for(level)
    }
}

/// A sidebar category grouping sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// The full content snapshot served by a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationData {
    pub categories: Vec<Category>,
}

impl DocumentationData {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of sections across all categories.
    pub fn section_count(&self) -> usize {
        self.categories.iter().map(|c| c.sections.len()).sum()
    }

    /// Look up a section by exact, case-sensitive titles.
    /// The first category with a matching title is the only one searched.
    pub fn find_section(&self, category: &str, section: &str) -> Option<SelectedContent> {
        let cat = self.categories.iter().find(|c| c.title == category)?;
        let sec = cat.sections.iter().find(|s| s.title == section)?;
        Some(SelectedContent::from_section(&cat.title, sec))
    }

    /// First section of the first category, if any.
    pub fn default_selection(&self) -> Option<SelectedContent> {
        let cat = self.categories.first()?;
        let sec = cat.sections.first()?;
        Some(SelectedContent::from_section(&cat.title, sec))
    }
}

/// The section currently shown, copied out of the dataset at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedContent {
    pub category_title: String,
    pub section_title: String,
    pub content: SectionContent,
}

impl SelectedContent {
    fn from_section(category_title: &str, section: &Section) -> Self {
        Self {
            category_title: category_title.to_string(),
            section_title: section.title.clone(),
            content: section.content.clone(),
        }
    }

    pub fn text_for(&self, level: &str) -> Option<&str> {
        self.content.text_for(level)
    }
}
