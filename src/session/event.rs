//! Events that drive the session state machine

use super::state::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// User asked to send `text`
    Submit { text: String },
    /// Transport returned the assistant reply
    ReplyReceived { text: String },
    /// Transport failed, timed out, or was cancelled
    SendFailed { error: SessionError },
}
