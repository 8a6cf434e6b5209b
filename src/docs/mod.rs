// Documentation content module.
// Provides the content tree types and the sources that load it.

pub mod source;
pub mod types;

pub use source::{DocumentSource, EmbeddedSource, FileSource, parse_content};
pub use types::*;

#[cfg(test)]
pub(crate) mod testing;
