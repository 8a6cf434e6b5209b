// State management module.
// Handles the documents view-model and navigation state.

pub mod navigation;
pub mod store;

pub use navigation::{
    BreadcrumbNode, DEFAULT_ZOOM_LEVEL, OutlineRow, SidebarState, ZoomOption, breadcrumb_text,
};
pub use store::{CacheInfoRefresh, DEFAULT_CACHE_INFO_REFRESH, DocumentsStore, StorePhase, StoreState};
