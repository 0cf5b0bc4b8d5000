//! Session state types

use crate::locale::{text, Locale, TranslationKey};
use crate::transport::TransportError;
use serde::Serialize;

/// Why a send failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Relay has no provider credential
    Configuration,
    /// Provider failed (quota, safety block, malformed response, ...)
    Provider,
    /// Network failure or the relay rejected the request
    Transport,
    /// No reply within the send timeout
    Timeout,
    /// The user cancelled the send
    Cancelled,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Provider => "provider",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::Cancelled => "cancelled",
        }
    }

    fn description_key(self) -> TranslationKey {
        match self {
            FailureKind::Timeout => TranslationKey::TimeoutDescription,
            FailureKind::Cancelled => TranslationKey::CancelledDescription,
            FailureKind::Configuration | FailureKind::Provider | FailureKind::Transport => {
                TranslationKey::ErrorDescription
            }
        }
    }
}

/// A failed send. `detail` is for logs only and is never rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionError {
    pub kind: FailureKind,
    #[serde(skip)]
    pub detail: String,
}

impl SessionError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(FailureKind::Timeout, "send timed out")
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "send cancelled")
    }

    /// Localized title and description
    pub fn render(&self, locale: Locale) -> (&'static str, &'static str) {
        (
            text(TranslationKey::ErrorTitle, locale),
            text(self.kind.description_key(), locale),
        )
    }
}

impl From<&TransportError> for SessionError {
    fn from(error: &TransportError) -> Self {
        let kind = match error {
            TransportError::Configuration => FailureKind::Configuration,
            TransportError::Provider(_) => FailureKind::Provider,
            TransportError::Rejected { .. } | TransportError::Network(_) => FailureKind::Transport,
            TransportError::Cancelled => FailureKind::Cancelled,
        };
        Self::new(kind, error.to_string())
    }
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Ready for input
    #[default]
    Idle,
    /// One send in flight; further submits are rejected
    Sending,
    /// Last send failed; resubmission allowed
    Error { error: SessionError },
}

impl SessionState {
    pub fn is_sending(&self) -> bool {
        matches!(self, SessionState::Sending)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Sending => "sending",
            SessionState::Error { .. } => "error",
        }
    }

    pub fn error(&self) -> Option<&SessionError> {
        match self {
            SessionState::Error { error } => Some(error),
            _ => None,
        }
    }
}
