//! Prompt assembly.
//!
//! Builds the ordered message list sent to the model:
//!
//! ```text
//! system   <persona>
//! system   Context:\n<chunk>\n<chunk>...     (only when chunks exist)
//! user     <user text>
//! ```

use ragchat_core::context::ContextChunk;
use ragchat_core::message::Message;

/// Label that opens the retrieved-context system message.
pub const CONTEXT_LABEL: &str = "Context:";

/// Pure, stateless prompt builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(
        &self,
        system_prompt: &str,
        context_chunks: &[ContextChunk],
        user_text: &str,
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(3);
        messages.push(Message::system(system_prompt));

        if let Some(block) = Self::context_block(context_chunks) {
            messages.push(Message::system(block));
        }

        messages.push(Message::user(user_text));
        messages
    }

    /// `Context:` followed by each chunk on its own line, or `None` if there
    /// are no chunks.
    pub fn context_block(context_chunks: &[ContextChunk]) -> Option<String> {
        if context_chunks.is_empty() {
            return None;
        }

        let joined = context_chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("{CONTEXT_LABEL}\n{joined}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_core::message::Role;

    fn shape(messages: &[Message]) -> Vec<(Role, &str)> {
        messages.iter().map(|m| (m.role(), m.content())).collect()
    }

    #[test]
    fn without_context_emits_system_then_user() {
        let messages = PromptAssembler::new().assemble("sp", &[], "hi");
        assert_eq!(shape(&messages), [(Role::System, "sp"), (Role::User, "hi")]);
    }

    #[test]
    fn context_chunks_become_one_system_message() {
        let chunks = [ContextChunk::new("a"), ContextChunk::new("b")];
        let messages = PromptAssembler::new().assemble("sp", &chunks, "hi");
        assert_eq!(
            shape(&messages),
            [
                (Role::System, "sp"),
                (Role::System, "Context:\na\nb"),
                (Role::User, "hi"),
            ]
        );
    }

    #[test]
    fn chunk_order_is_preserved() {
        let chunks = [
            ContextChunk::new("third").with_index(2),
            ContextChunk::new("first").with_index(0),
        ];
        let block = PromptAssembler::context_block(&chunks).unwrap();
        assert_eq!(block, "Context:\nthird\nfirst");
    }

    #[test]
    fn empty_user_text_is_still_sent() {
        let messages = PromptAssembler::new().assemble("sp", &[], "");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role(), Role::User);
        assert_eq!(messages[1].content(), "");
    }
}
