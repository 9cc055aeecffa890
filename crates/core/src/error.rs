//! Error types for the ragchat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum.

use thiserror::Error;

/// Failures talking to the model provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while fetching or chunking retrieved context.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Context store failed: {0}")]
    Store(String),

    #[error("Document processing failed: {0}")]
    Chunking(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn network_error_keeps_its_cause() {
        let err = ProviderError::Network("tcp connect error: Connection refused".into());
        assert_eq!(err.to_string(), "Network error: tcp connect error: Connection refused");
    }

    #[test]
    fn retrieval_error_names_the_stage() {
        let err = RetrievalError::Store("index offline".into());
        assert_eq!(err.to_string(), "Context store failed: index offline");
        let err = RetrievalError::Chunking("chunk_size must be > 0".into());
        assert!(err.to_string().starts_with("Document processing failed"));
    }
}
