//! Context store and document processing for ragchat.

pub mod chunker;
pub mod in_memory;

pub use chunker::TextChunker;
pub use in_memory::{InMemoryContextStore, Snippet};
