//! Conversation model
//!
//! An append-only, chronologically ordered list of role-tagged messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a wire role. Anything that is not `user` is treated as an
    /// assistant turn.
    pub fn from_wire(role: &str) -> Self {
        if role == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message. Fields are private so a message cannot change once
/// it has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Wire form sent over the transport
    pub fn to_wire(&self) -> ChatMessage {
        ChatMessage {
            id: Some(self.id.clone()),
            role: self.role.as_str().to_string(),
            content: self.content.clone(),
        }
    }
}

/// Message as carried on the wire between client and relay.
///
/// `role` stays a free-form string so that unrecognised roles survive
/// decoding and are mapped by the request adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: role.as_str().to_string(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        Role::from_wire(&self.role)
    }
}

/// Ordered message history. There is no API to remove or reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to it
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Full history in wire form
    pub fn to_wire(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_wire).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut conv = Conversation::new();
        conv.push(Message::user("first"));
        conv.push(Message::assistant("second"));
        conv.push(Message::user("third"));

        let contents: Vec<_> = conv.iter().map(Message::content).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(conv.last().map(Message::role), Some(Role::User));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_unknown_wire_role_is_assistant() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"system","content":"hi"}"#).unwrap();
        assert_eq!(msg.role(), Role::Assistant);
        assert!(msg.id.is_none());
    }

    #[test]
    fn test_wire_form_round_trips_role() {
        let mut conv = Conversation::new();
        conv.push(Message::user("q"));
        conv.push(Message::assistant("a"));

        let wire = conv.to_wire();
        assert_eq!(wire[0].role, "user");
        assert_eq!(wire[1].role, "assistant");
        assert_eq!(wire[0].id.as_deref(), Some(conv.messages()[0].id()));
    }
}
