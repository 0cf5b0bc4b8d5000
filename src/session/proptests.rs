//! Property-based tests for the session state machine

use super::transition::*;
use super::*;
use crate::conversation::Role;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_failure_kind() -> impl Strategy<Value = FailureKind> {
    prop_oneof![
        Just(FailureKind::Configuration),
        Just(FailureKind::Provider),
        Just(FailureKind::Transport),
        Just(FailureKind::Timeout),
        Just(FailureKind::Cancelled),
    ]
}

fn arb_session_error() -> impl Strategy<Value = SessionError> {
    (arb_failure_kind(), "[a-z ]{0,20}").prop_map(|(kind, detail)| SessionError::new(kind, detail))
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Idle),
        Just(SessionState::Sending),
        arb_session_error().prop_map(|error| SessionState::Error { error }),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z?، ]{1,30}",
        "[ \t\n]{0,5}",
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::Submit { text }),
        "[a-zA-Z ]{0,30}".prop_map(|text| Event::ReplyReceived { text }),
        arb_session_error().prop_map(|error| Event::SendFailed { error }),
    ]
}

// ============================================================================
// Simulation
// ============================================================================

/// Applies append effects to a plain message list
fn apply_appends(log: &mut Vec<(Role, String)>, effects: &[Effect]) {
    for effect in effects {
        if let Effect::AppendMessage { role, content } = effect {
            log.push((*role, content.clone()));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Conversation only grows, sends happen only on entering Sending, and
    // every accepted submit is answered by at most one reply
    #[test]
    fn prop_event_sequences_keep_invariants(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = SessionState::Idle;
        let mut log: Vec<(Role, String)> = Vec::new();

        for event in events {
            let before = log.len();
            match transition(&state, event) {
                Ok(result) => {
                    let sends = result.effects.iter().filter(|e| **e == Effect::SendConversation).count();
                    if sends > 0 {
                        prop_assert_eq!(sends, 1);
                        prop_assert_eq!(&result.new_state, &SessionState::Sending);
                        prop_assert!(!state.is_sending());
                    }
                    apply_appends(&mut log, &result.effects);
                    prop_assert!(log.len() - before <= 1);
                    state = result.new_state;
                }
                Err(_) => prop_assert_eq!(log.len(), before),
            }
        }

        // Every assistant message directly follows a user message
        for pair in log.windows(2) {
            if pair[1].0 == Role::Assistant {
                prop_assert_eq!(pair[0].0, Role::User);
            }
        }
        if let Some((Role::Assistant, _)) = log.first() {
            prop_assert!(false, "conversation starts with an assistant message");
        }
    }

    // At most one send in flight
    #[test]
    fn prop_busy_rejects_submits(text in arb_text()) {
        let result = transition(&SessionState::Sending, Event::Submit { text });
        prop_assert!(matches!(result, Err(TransitionError::Busy)));
    }

    // Idle and Error accept any non-blank submit
    #[test]
    fn prop_ready_states_accept_questions(
        state in arb_state().prop_filter("ready", |s| !s.is_sending()),
        text in "[a-zA-Z ]{0,10}[a-zA-Z][a-zA-Z ]{0,10}"
    ) {
        let result = transition(&state, Event::Submit { text: text.clone() }).unwrap();
        prop_assert_eq!(result.new_state, SessionState::Sending);
        prop_assert_eq!(&result.effects[0], &Effect::append_user(text));
    }

    // Blank input never changes anything
    #[test]
    fn prop_blank_input_rejected(
        state in arb_state().prop_filter("ready", |s| !s.is_sending()),
        text in "[ \t\n]{0,8}"
    ) {
        let result = transition(&state, Event::Submit { text });
        prop_assert!(matches!(result, Err(TransitionError::EmptyInput)));
    }

    // Outcomes outside Sending are stale and rejected
    #[test]
    fn prop_outcomes_require_sending(
        state in arb_state().prop_filter("not sending", |s| !s.is_sending()),
        event in arb_event().prop_filter("outcome", |e| !matches!(e, Event::Submit { .. }))
    ) {
        let result = transition(&state, event);
        prop_assert!(matches!(result, Err(TransitionError::InvalidTransition(_))));
    }

    // The transition function is deterministic
    #[test]
    fn prop_transition_deterministic(state in arb_state(), event in arb_event()) {
        let first = transition(&state, event.clone());
        let second = transition(&state, event);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
        }
    }
}
