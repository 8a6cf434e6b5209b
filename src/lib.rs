//! zoomdocs: a documentation browser core.
//!
//! Content is a list of categories, each holding sections whose text is
//! written at several zoom levels. [`cache::DocumentsCache`] serves it with a
//! TTL and coalesces concurrent fetches; [`state::DocumentsStore`] turns cache
//! operations into state a front end renders from.

pub mod app;
pub mod cache;
pub mod config;
pub mod docs;
pub mod error;
pub mod state;

pub use cache::{CacheInfo, DocumentsCache};
pub use config::Config;
pub use docs::{DocumentSource, DocumentationData, SelectedContent};
pub use error::{DocsError, Result};
pub use state::{DocumentsStore, StoreState};
