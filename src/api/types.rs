//! API request types and fixed response bodies

use crate::conversation::ChatMessage;
use serde::{Deserialize, Serialize};

/// 500 body when the relay has no provider credential
pub const CONFIGURATION_ERROR_BODY: &str = "API Key not found";

/// 500 body for every provider failure. Provider detail is never exposed.
pub const PROVIDER_ERROR_BODY: &str = "Internal Server Error";

/// Request to relay a conversation
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}
