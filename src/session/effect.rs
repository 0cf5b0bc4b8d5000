//! Effects produced by state transitions

use crate::conversation::Role;

/// Effects to be executed, in order, after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the conversation
    AppendMessage { role: Role, content: String },
    /// Clear the pending input
    ClearInput,
    /// Send the whole conversation over the transport
    SendConversation,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn append_assistant(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
