//! Shared test doubles for pipeline tests.

use async_trait::async_trait;
use ragchat_core::context::{ContextChunk, ContextProvider, DocumentProcessor};
use ragchat_core::error::{ProviderError, RetrievalError};
use ragchat_core::message::Message;
use ragchat_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted results and records
/// every request it receives.
///
/// Panics if more calls are made than results provided.
pub struct ScriptedProvider {
    results: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(results: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            results: Mutex::new(results),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that answers once with `text`.
    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    /// Create a provider whose only call fails with `err`.
    pub fn failing(err: ProviderError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let results = self.results.lock().unwrap();
        let call = requests.len();

        if call >= results.len() {
            panic!(
                "ScriptedProvider: no more responses (call #{}, have {})",
                call,
                results.len()
            );
        }

        requests.push(request);
        let text = results[call].clone()?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A context store that always returns the same answer.
pub struct StaticContext {
    text: Option<String>,
}

impl StaticContext {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn none() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl ContextProvider for StaticContext {
    fn name(&self) -> &str {
        "static"
    }

    async fn get_relevant_context(&self, _query: &str) -> Result<Option<String>, RetrievalError> {
        Ok(self.text.clone())
    }
}

/// A context store whose lookups always fail.
pub struct FailingContext;

#[async_trait]
impl ContextProvider for FailingContext {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get_relevant_context(&self, _query: &str) -> Result<Option<String>, RetrievalError> {
        Err(RetrievalError::Store("index unavailable".into()))
    }
}

/// A document processor that always fails.
pub struct FailingProcessor;

impl DocumentProcessor for FailingProcessor {
    fn process_text(&self, _text: &str) -> Result<Vec<ContextChunk>, RetrievalError> {
        Err(RetrievalError::Chunking("tokenizer crashed".into()))
    }
}
