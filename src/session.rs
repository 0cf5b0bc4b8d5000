//! Client chat session
//!
//! Implements the Elm Architecture pattern: a pure transition function
//! decides, the runtime executes effects against the transport.

mod effect;
pub mod event;
mod runtime;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use runtime::{ChatSession, SendOutcome};
pub use state::{FailureKind, SessionError, SessionState};
pub use transition::{transition, TransitionError};

use crate::conversation::Message;
use serde::Serialize;

/// Notifications for a rendering front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended { message: Message },
    StateChanged { state: SessionState },
}
