//! Pure state transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O. The runtime executes the returned effects.

use super::{Effect, Event, SessionState};
use crate::locale::{text, Locale, TranslationKey};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("A message is already being sent")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Localized title and description for rejections the user should see
    pub fn render(&self, locale: Locale) -> Option<(&'static str, &'static str)> {
        match self {
            TransitionError::EmptyInput => Some((
                text(TranslationKey::EmptyInputTitle, locale),
                text(TranslationKey::EmptyInputDescription, locale),
            )),
            TransitionError::Busy | TransitionError::InvalidTransition(_) => None,
        }
    }
}

pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission
        // ============================================================

        // At most one send in flight
        (SessionState::Sending, Event::Submit { .. }) => Err(TransitionError::Busy),

        (SessionState::Idle | SessionState::Error { .. }, Event::Submit { text }) => {
            // Trimmed only for the emptiness check; the message keeps the text as typed
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            Ok(TransitionResult::new(SessionState::Sending)
                .with_effect(Effect::append_user(text))
                .with_effect(Effect::ClearInput)
                .with_effect(Effect::SendConversation))
        }

        // ============================================================
        // Transport outcome
        // ============================================================

        (SessionState::Sending, Event::ReplyReceived { text }) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::append_assistant(text)))
        }

        // The user message stays; no assistant message is produced
        (SessionState::Sending, Event::SendFailed { error }) => {
            Ok(TransitionResult::new(SessionState::Error { error }))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {:?}",
            state.name(),
            event
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::session::{FailureKind, SessionError};

    fn submit(text: &str) -> Event {
        Event::Submit {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_idle_submit_starts_send() {
        let result = transition(&SessionState::Idle, submit("  What are the pillars of Islam? ")).unwrap();

        assert_eq!(result.new_state, SessionState::Sending);
        assert_eq!(
            result.effects,
            vec![
                Effect::append_user("  What are the pillars of Islam? "),
                Effect::ClearInput,
                Effect::SendConversation,
            ]
        );
    }

    #[test]
    fn test_reject_message_while_sending() {
        let result = transition(&SessionState::Sending, submit("Hello"));
        assert!(matches!(result, Err(TransitionError::Busy)));
    }

    #[test]
    fn test_reject_blank_input() {
        for text in ["", "   ", "\n\t"] {
            let result = transition(&SessionState::Idle, submit(text));
            assert!(matches!(result, Err(TransitionError::EmptyInput)));
        }
    }

    #[test]
    fn test_error_recovery() {
        let state = SessionState::Error {
            error: SessionError::new(FailureKind::Provider, "Previous error"),
        };
        let result = transition(&state, submit("Try again")).unwrap();
        assert_eq!(result.new_state, SessionState::Sending);
    }

    #[test]
    fn test_reply_appends_assistant_and_idles() {
        let result = transition(
            &SessionState::Sending,
            Event::ReplyReceived {
                text: "Five pillars: ...".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state, SessionState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::AppendMessage {
                role: Role::Assistant,
                content: "Five pillars: ...".to_string()
            }]
        );
    }

    #[test]
    fn test_failure_enters_error_without_effects() {
        let result = transition(
            &SessionState::Sending,
            Event::SendFailed {
                error: SessionError::timeout(),
            },
        )
        .unwrap();

        assert_eq!(result.new_state.name(), "error");
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_stale_reply_rejected() {
        let result = transition(
            &SessionState::Idle,
            Event::ReplyReceived {
                text: "late".to_string(),
            },
        );
        assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    #[test]
    fn test_empty_input_renders_localized() {
        let (title, _) = TransitionError::EmptyInput.render(Locale::En).unwrap();
        assert_eq!(title, "Empty message");
        let (title_ar, _) = TransitionError::EmptyInput.render(Locale::Ar).unwrap();
        assert_eq!(title_ar, "رسالة فارغة");
        assert!(TransitionError::Busy.render(Locale::En).is_none());
    }
}
