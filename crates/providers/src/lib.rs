//! Model provider implementations for ragchat.
//!
//! - [`OpenAiCompatProvider`] implements `ragchat_core::Provider` over any
//!   OpenAI-compatible `/chat/completions` endpoint (Groq by default).
//! - [`ChatModel`] is the adapter the pipeline talks to: it turns an ordered
//!   message list into one provider call and returns the assistant reply.

pub mod chat_model;
pub mod openai_compat;

pub use chat_model::ChatModel;
pub use openai_compat::OpenAiCompatProvider;
