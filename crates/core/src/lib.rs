//! # ragchat core
//!
//! Domain types, traits, and error definitions for the ragchat message
//! pipeline. Every collaborator the pipeline talks to (the model provider,
//! the context store, the document processor) is defined as a trait here;
//! implementations live in their respective crates.

pub mod context;
pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use context::{ContextChunk, ContextProvider, DocumentProcessor};
pub use error::{ProviderError, RetrievalError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
