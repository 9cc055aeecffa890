//! In-memory context store — keyword search over snippets held in a Vec.
//!
//! Useful for tests and for chat sessions seeded from a handful of local
//! documents where persistence isn't needed.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use ragchat_core::context::{ContextProvider, DocumentProcessor};
use ragchat_core::error::RetrievalError;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::chunker::TextChunker;

/// Shortest query word that takes part in matching.
const MIN_TERM_LEN: usize = 3;

/// One stored piece of text.
#[derive(Debug, Clone)]
pub struct Snippet {
    pub id: String,
    pub content: String,
    pub source: Option<String>,
}

pub struct InMemoryContextStore {
    snippets: Arc<RwLock<Vec<Snippet>>>,
    max_results: usize,
    chunker: TextChunker,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            snippets: Arc::new(RwLock::new(Vec::new())),
            max_results: 4,
            chunker: TextChunker::default(),
        }
    }

    /// Number of snippets joined into one `get_relevant_context` answer.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Chunker used by [`add_document`](Self::add_document).
    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    /// Store one snippet as-is and return its id.
    pub async fn add(&self, content: impl Into<String>, source: Option<String>) -> String {
        let id = Uuid::new_v4().to_string();
        self.snippets.write().await.push(Snippet {
            id: id.clone(),
            content: content.into(),
            source,
        });
        id
    }

    /// Chunk a whole document and store every chunk. Returns the chunk count.
    pub async fn add_document(&self, text: &str, source: &str) -> Result<usize, RetrievalError> {
        let chunks = self.chunker.process_text(text)?;
        let mut snippets = self.snippets.write().await;
        for chunk in &chunks {
            snippets.push(Snippet {
                id: Uuid::new_v4().to_string(),
                content: chunk.content.clone(),
                source: Some(source.to_string()),
            });
        }
        debug!(source, chunks = chunks.len(), "Document added to context store");
        Ok(chunks.len())
    }

    pub async fn len(&self) -> usize {
        self.snippets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snippets.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.snippets.write().await.clear();
    }

    /// Rank snippets by the share of distinct query terms they contain.
    ///
    /// Snippets that match no term are left out; equal scores keep
    /// insertion order.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<(f32, Snippet)> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let snippets = self.snippets.read().await;
        let mut results: Vec<(f32, Snippet)> = snippets
            .iter()
            .filter_map(|s| {
                let snippet_terms = terms(&s.content);
                let hits = query_terms.intersection(&snippet_terms).count();
                (hits > 0).then(|| (hits as f32 / query_terms.len() as f32, s.clone()))
            })
            .collect();

        results.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        results
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextProvider for InMemoryContextStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_relevant_context(&self, query: &str) -> Result<Option<String>, RetrievalError> {
        let results = self.search(query, self.max_results).await;
        debug!(matches = results.len(), "Context store searched");

        if results.is_empty() {
            return Ok(None);
        }

        let text = results
            .into_iter()
            .map(|(_, s)| s.content)
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(Some(text))
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_and_count() {
        let store = InMemoryContextStore::new();
        assert!(store.is_empty().await);

        let id = store.add("Rust is a systems language", None).await;
        assert!(!id.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn search_ranks_by_term_overlap() {
        let store = InMemoryContextStore::new();
        store.add("Python is great for scripting", None).await;
        store.add("Paris is the capital of France", None).await;
        store.add("Berlin is the capital of Germany", None).await;

        let results = store.search("What is the capital of France?", 10).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1.content, "Paris is the capital of France");
        assert!(results[0].0 > results[1].0);
    }

    #[tokio::test]
    async fn short_words_do_not_match() {
        let store = InMemoryContextStore::new();
        store.add("it is on", None).await;
        assert!(store.search("is it on", 10).await.is_empty());
    }

    #[tokio::test]
    async fn relevant_context_joins_top_results() {
        let store = InMemoryContextStore::new().with_max_results(2);
        store.add("rust ownership rules", None).await;
        store.add("rust borrowing rules", None).await;
        store.add("rust lifetimes", None).await;

        let context = store.get_relevant_context("rust rules").await.unwrap().unwrap();
        assert_eq!(context, "rust ownership rules\n\nrust borrowing rules");
    }

    #[tokio::test]
    async fn no_match_is_none() {
        let store = InMemoryContextStore::new();
        store.add("Paris is the capital of France", None).await;
        assert!(store.get_relevant_context("quantum chromodynamics").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_document_stores_each_chunk() {
        let store = InMemoryContextStore::new().with_chunker(TextChunker::new(20, 0));
        let added = store
            .add_document("alpha beta gamma\n\ndelta epsilon zeta", "greek.md")
            .await
            .unwrap();
        assert_eq!(added, 2);

        let results = store.search("epsilon", 5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1.source.as_deref(), Some("greek.md"));
    }

    #[tokio::test]
    async fn clear_all() {
        let store = InMemoryContextStore::new();
        store.add("Entry 1", None).await;
        store.add("Entry 2", None).await;
        store.clear().await;
        assert!(store.is_empty().await);
    }
}
