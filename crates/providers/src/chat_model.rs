//! The chat model adapter.
//!
//! Wraps any [`Provider`] behind one contract: ordered messages in, one
//! assistant message out. The adapter is stateless per call and never
//! retries; retry policy belongs to the caller.

use std::sync::Arc;

use ragchat_core::error::ProviderError;
use ragchat_core::message::{Message, Role};
use ragchat_core::provider::{Provider, ProviderRequest};
use tracing::{debug, error};

pub struct ChatModel {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ChatModel {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Cap the number of generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate the assistant's reply to `messages`.
    ///
    /// `messages` should end with a user message; that is not checked here.
    /// Failures are logged and returned unchanged.
    pub async fn generate(
        &self,
        messages: &[Message],
        stop: Option<&[String]>,
    ) -> Result<Message, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: Self::provider_messages(messages),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: stop.map(<[String]>::to_vec).unwrap_or_default(),
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    provider = %self.provider.name(),
                    model = %response.model,
                    reply_len = response.message.content().len(),
                    "Completion received"
                );
                Ok(Message::assistant(response.message.into_content()))
            }
            Err(e) => {
                error!(
                    provider = %self.provider.name(),
                    model = %self.model,
                    error = %e,
                    "Error generating response"
                );
                Err(e)
            }
        }
    }

    /// Keep the messages a chat-completion provider has a slot for.
    fn provider_messages(messages: &[Message]) -> Vec<Message> {
        messages
            .iter()
            .filter(|m| match m.role() {
                Role::System | Role::User | Role::Assistant => true,
                // Chat completions have no slot for a bare tool result.
                Role::Tool => {
                    debug!(message_id = %m.id(), "Dropping tool message from provider request");
                    false
                }
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragchat_core::provider::ProviderResponse;
    use std::sync::Mutex;

    /// Records every request and answers from a fixed result.
    struct RecordingProvider {
        result: Result<String, ProviderError>,
        requests: Mutex<Vec<ProviderRequest>>,
    }

    impl RecordingProvider {
        fn replying(text: &str) -> Self {
            Self {
                result: Ok(text.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: ProviderError) -> Self {
            Self {
                result: Err(err),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> ProviderRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            self.requests.lock().unwrap().push(request);
            let text = self.result.clone()?;
            Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    #[tokio::test]
    async fn generate_forwards_model_settings() {
        let provider = Arc::new(RecordingProvider::replying("Hi there"));
        let model = ChatModel::new(provider.clone(), "mixtral-8x7b-32768", 0.3)
            .with_max_tokens(Some(512));

        let reply = model.generate(&[Message::user("Hello")], None).await.unwrap();
        assert_eq!(reply.role(), Role::Assistant);
        assert_eq!(reply.content(), "Hi there");

        let request = provider.last_request();
        assert_eq!(request.model, "mixtral-8x7b-32768");
        assert!((request.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, Some(512));
        assert!(request.stop.is_empty());
    }

    #[tokio::test]
    async fn stop_sequences_are_passed_through() {
        let provider = Arc::new(RecordingProvider::replying("ok"));
        let model = ChatModel::new(provider.clone(), "m", 0.7);
        let stop = vec!["###".to_string()];

        model.generate(&[Message::user("x")], Some(&stop)).await.unwrap();
        assert_eq!(provider.last_request().stop, stop);
    }

    #[tokio::test]
    async fn role_order_is_preserved() {
        let provider = Arc::new(RecordingProvider::replying("ok"));
        let model = ChatModel::new(provider.clone(), "m", 0.7);
        let messages = vec![
            Message::system("persona"),
            Message::user("first"),
            Message::assistant("answer"),
            Message::user("second"),
        ];

        model.generate(&messages, None).await.unwrap();
        let sent = provider.last_request().messages;
        assert_eq!(sent, messages);
    }

    // Tool results have no place in a chat-completion request. They are
    // filtered out rather than rejected; this pins that behavior.
    #[tokio::test]
    async fn tool_messages_are_dropped() {
        let provider = Arc::new(RecordingProvider::replying("ok"));
        let model = ChatModel::new(provider.clone(), "m", 0.7);
        let messages = vec![
            Message::system("persona"),
            Message::tool("{\"result\": 4}"),
            Message::user("what was it?"),
        ];

        model.generate(&messages, None).await.unwrap();
        let roles: Vec<Role> = provider.last_request().messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, [Role::System, Role::User]);
    }

    #[tokio::test]
    async fn provider_errors_propagate_unchanged() {
        let provider = Arc::new(RecordingProvider::failing(ProviderError::RateLimited {
            retry_after_secs: 30,
        }));
        let model = ChatModel::new(provider.clone(), "m", 0.7);

        let err = model.generate(&[Message::user("x")], None).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 30 }));
        // One call, no retry.
        assert_eq!(provider.requests.lock().unwrap().len(), 1);
    }
}
