//! The message pipeline — the heart of ragchat.
//!
//! One user utterance becomes one model response:
//!
//! 1. **Retrieve** relevant text from the bound context store, if any
//! 2. **Chunk** it with the document processor
//! 3. **Assemble** the prompt: persona, optional context block, user message
//! 4. **Generate** the reply through the chat model adapter
//!
//! Any per-turn failure degrades to a fixed apology; retrieval failures only
//! drop the context for that turn.

pub mod assembler;
pub mod pipeline;
pub mod retriever;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use assembler::{CONTEXT_LABEL, PromptAssembler};
pub use pipeline::{FALLBACK_RESPONSE, MessagePipeline, PipelineResult, PipelineState};
pub use retriever::ContextRetriever;
