//! Retrieval collaborators — where retrieved context comes from and how it
//! is cut into chunks.
//!
//! - [`ContextProvider`]: a store that answers "what do you know about this
//!   query?" with raw text (or nothing).
//! - [`DocumentProcessor`]: turns that raw text into ordered [`ContextChunk`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// A unit of retrieved text injected into the prompt.
///
/// Chunks live for a single pipeline turn and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    /// The chunk text
    pub content: String,

    /// Position of this chunk in the processor's output (0-based)
    #[serde(default)]
    pub index: usize,

    /// Where the text came from (file name, store name), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ContextChunk {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            index: 0,
            source: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A memory or context store that can look up text relevant to a query.
///
/// Implementations: in-memory keyword store, test doubles.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// The store name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Return the text relevant to `query`, or `None` when nothing matches.
    async fn get_relevant_context(&self, query: &str) -> Result<Option<String>, RetrievalError>;
}

/// Converts raw text into an ordered sequence of chunks.
pub trait DocumentProcessor: Send + Sync {
    fn process_text(&self, text: &str) -> Result<Vec<ContextChunk>, RetrievalError>;
}
