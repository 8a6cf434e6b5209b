// Navigation state management.
// Handles sidebar expansion, the breadcrumb trail, and zoom level choices.

use crate::docs::{DocumentationData, SelectedContent};

/// Zoom level shown when new content is selected.
pub const DEFAULT_ZOOM_LEVEL: &str = "shallow";

/// A node in the breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbNode {
    /// Display label for the breadcrumb.
    pub label: String,
}

/// Breadcrumb trail for the current selection: category, then section.
pub fn breadcrumbs(selected: Option<&SelectedContent>) -> Vec<BreadcrumbNode> {
    match selected {
        Some(content) => vec![
            BreadcrumbNode {
                label: content.category_title.clone(),
            },
            BreadcrumbNode {
                label: content.section_title.clone(),
            },
        ],
        None => Vec::new(),
    }
}

/// Breadcrumb trail joined for display, e.g. `Caching / Time To Live`.
pub fn breadcrumb_text(selected: Option<&SelectedContent>) -> String {
    breadcrumbs(selected)
        .into_iter()
        .map(|node| node.label)
        .collect::<Vec<_>>()
        .join(" / ")
}

/// A selectable zoom level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomOption {
    pub value: String,
    pub label: String,
}

/// Zoom levels offered by the content, in authoring order.
pub fn zoom_options(content: &SelectedContent) -> Vec<ZoomOption> {
    content
        .content
        .zoom_levels
        .iter()
        .map(|z| ZoomOption {
            value: z.level.clone(),
            label: z.label(),
        })
        .collect()
}

/// Sidebar state: at most one category is expanded.
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    expanded: Option<usize>,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand a category, or collapse it if it is already expanded.
    pub fn toggle(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Expand the category with the given title, if present.
    pub fn expand_title(&mut self, data: &DocumentationData, title: &str) {
        if let Some(index) = data.categories.iter().position(|c| c.title == title) {
            self.expanded = Some(index);
        }
    }

    /// Outline rows: every category, plus the sections of the expanded one.
    pub fn outline(&self, data: &DocumentationData) -> Vec<OutlineRow> {
        let mut rows = Vec::new();
        for (index, category) in data.categories.iter().enumerate() {
            let expanded = self.is_expanded(index);
            rows.push(OutlineRow::Category {
                title: category.title.clone(),
                expanded,
            });
            if expanded {
                rows.extend(category.sections.iter().map(|s| OutlineRow::Section {
                    category: category.title.clone(),
                    title: s.title.clone(),
                }));
            }
        }
        rows
    }
}

/// One row of the sidebar outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineRow {
    Category { title: String, expanded: bool },
    Section { category: String, title: String },
}
