//! Context retrieval.
//!
//! Holds an optional, externally owned context store plus the document
//! processor that cuts its answers into chunks. An unbound retriever is a
//! normal state and simply yields no chunks.

use std::sync::Arc;

use ragchat_core::context::{ContextChunk, ContextProvider, DocumentProcessor};
use ragchat_core::error::RetrievalError;
use tracing::debug;

pub struct ContextRetriever {
    store: Option<Arc<dyn ContextProvider>>,
    processor: Arc<dyn DocumentProcessor>,
}

impl ContextRetriever {
    /// Create an unbound retriever.
    pub fn new(processor: Arc<dyn DocumentProcessor>) -> Self {
        Self {
            store: None,
            processor,
        }
    }

    /// Bind a store, replacing any previous one.
    pub fn bind(&mut self, store: Arc<dyn ContextProvider>) {
        self.store = Some(store);
    }

    /// Drop the store reference. No-op when nothing is bound.
    pub fn unbind(&mut self) {
        self.store = None;
    }

    pub fn is_bound(&self) -> bool {
        self.store.is_some()
    }

    pub fn store_name(&self) -> Option<&str> {
        self.store.as_deref().map(|s| s.name())
    }

    pub fn set_processor(&mut self, processor: Arc<dyn DocumentProcessor>) {
        self.processor = processor;
    }

    /// Fetch and chunk the context relevant to `query`.
    ///
    /// Store and processor failures are returned to the caller; containing
    /// them is the pipeline's job.
    pub async fn retrieve_context(&self, query: &str) -> Result<Vec<ContextChunk>, RetrievalError> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };

        let text = match store.get_relevant_context(query).await? {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                debug!(store = %store.name(), "No relevant context");
                return Ok(Vec::new());
            }
        };

        let chunks = self
            .processor
            .process_text(&text)?
            .into_iter()
            .map(|chunk| match chunk.source {
                Some(_) => chunk,
                None => chunk.with_source(store.name()),
            })
            .collect::<Vec<_>>();

        debug!(store = %store.name(), chunks = chunks.len(), "Context retrieved");
        Ok(chunks)
    }
}
