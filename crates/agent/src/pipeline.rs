//! The message pipeline orchestrator.
//!
//! Owns the chat model adapter and the prompt assembler for its whole life,
//! and borrows a context store between [`MessagePipeline::initialize`] and
//! [`MessagePipeline::cleanup`].
//!
//! `process_message` never fails: provider errors turn into
//! [`FALLBACK_RESPONSE`], retrieval errors only drop the context for that
//! turn. The only error a caller ever sees is a [`ConfigError`] from
//! construction.
//!
//! `process_message` takes `&self` and writes no state, so one pipeline can
//! serve concurrent turns behind an `Arc` without locking.

use std::sync::Arc;

use ragchat_config::{AgentConfig, AppConfig, ConfigError};
use ragchat_core::context::{ContextChunk, ContextProvider, DocumentProcessor};
use ragchat_core::provider::Provider;
use ragchat_memory::TextChunker;
use ragchat_providers::{ChatModel, OpenAiCompatProvider};
use serde::Serialize;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::assembler::PromptAssembler;
use crate::retriever::ContextRetriever;

/// Reply used whenever a turn cannot produce a model response.
pub const FALLBACK_RESPONSE: &str = "I apologize, but I encountered an error processing your message. \
This might be due to API limits or connectivity issues. \
Please try again later or contact support if the issue persists.";

/// The outcome of one turn. Always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    /// The assistant's reply, or the fallback apology
    pub response: String,
    /// Chunks injected into the prompt, in prompt order
    pub source_chunks: Vec<ContextChunk>,
}

impl PipelineResult {
    pub fn fallback() -> Self {
        Self {
            response: FALLBACK_RESPONSE.to_string(),
            source_chunks: Vec::new(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.response == FALLBACK_RESPONSE && self.source_chunks.is_empty()
    }
}

/// Whether a context store is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Ready,
}

pub struct MessagePipeline {
    model: ChatModel,
    assembler: PromptAssembler,
    system_prompt: String,
    retriever: ContextRetriever,
    stop: Vec<String>,
    span: Span,
}

impl MessagePipeline {
    /// Build a pipeline around `provider`.
    ///
    /// Fails with [`ConfigError`] when the config has no usable API key or
    /// an out-of-range temperature; nothing is built in that case.
    pub fn new(config: &AgentConfig, provider: Arc<dyn Provider>) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            error!(error = %e, "Failed to initialize chat model");
            return Err(e);
        }

        let model = ChatModel::new(provider, &config.model, config.temperature);
        let span = info_span!("message_pipeline", model = %config.model);

        info!(
            parent: &span,
            provider = %model.provider_name(),
            model = %model.model(),
            "Successfully initialized chat model"
        );

        Ok(Self {
            model,
            assembler: PromptAssembler::new(),
            system_prompt: config.system_prompt.clone(),
            retriever: ContextRetriever::new(Arc::new(TextChunker::default())),
            stop: Vec::new(),
            span,
        })
    }

    /// Build a pipeline backed by the HTTP provider described in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.agent.validate()?;
        let provider = Arc::new(OpenAiCompatProvider::from_config(config)?);
        let mut pipeline = Self::new(&config.agent, provider)?;

        pipeline.model = pipeline.model.with_max_tokens(config.provider.max_tokens);
        pipeline.retriever.set_processor(Arc::new(TextChunker::new(
            config.memory.chunk_size,
            config.memory.chunk_overlap,
        )));
        Ok(pipeline)
    }

    /// Replace the document processor used on retrieved text.
    pub fn with_document_processor(mut self, processor: Arc<dyn DocumentProcessor>) -> Self {
        self.retriever.set_processor(processor);
        self
    }

    /// Stop sequences sent with every completion request.
    pub fn with_stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }

    /// Use `span` as the parent of every log line this pipeline emits.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Bind the context store. Calling again replaces the previous store.
    pub fn initialize(&mut self, store: Arc<dyn ContextProvider>) {
        let name = store.name().to_string();
        self.retriever.bind(store);
        info!(parent: &self.span, store = %name, "Chat agent initialized with context store");
    }

    /// Unbind the context store. Safe to call at any time, any number of times.
    pub fn cleanup(&mut self) {
        self.retriever.unbind();
        info!(parent: &self.span, "Chat agent cleanup completed");
    }

    pub fn state(&self) -> PipelineState {
        if self.retriever.is_bound() {
            PipelineState::Ready
        } else {
            PipelineState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == PipelineState::Ready
    }

    pub fn model(&self) -> &ChatModel {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Turn one user utterance into a reply.
    pub async fn process_message(&self, user_text: &str) -> PipelineResult {
        self.run_turn(user_text).instrument(self.span.clone()).await
    }

    async fn run_turn(&self, user_text: &str) -> PipelineResult {
        let chunks = match self.retriever.retrieve_context(user_text).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "Context retrieval failed, continuing without context");
                Vec::new()
            }
        };

        let messages = self.assembler.assemble(&self.system_prompt, &chunks, user_text);
        debug!(messages = messages.len(), chunks = chunks.len(), "Prompt assembled");

        let stop = (!self.stop.is_empty()).then_some(self.stop.as_slice());
        match self.model.generate(&messages, stop).await {
            Ok(reply) => {
                info!(chunks = chunks.len(), reply_len = reply.content().len(), "Turn completed");
                PipelineResult {
                    response: reply.into_content(),
                    source_chunks: chunks,
                }
            }
            Err(e) => {
                error!(error = %e, "Error processing message");
                PipelineResult::fallback()
            }
        }
    }
}
