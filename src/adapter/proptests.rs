//! Property-based tests for request building
//!
//! - N client messages always produce N+1 provider turns
//! - The directive is always first and always user-authored
//! - Roles map deterministically and content is preserved in order

use super::{map_role, policy, RequestAdapter};
use crate::conversation::{ChatMessage, Role};
use crate::llm::ProviderRole;
use proptest::prelude::*;

fn arb_role_string() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => Just("user".to_string()),
        4 => Just("assistant".to_string()),
        1 => "[a-z]{1,10}",
    ]
}

fn arb_message() -> impl Strategy<Value = ChatMessage> {
    (arb_role_string(), "[a-zA-Z0-9 ?.!]{0,60}").prop_map(|(role, content)| ChatMessage {
        id: None,
        role,
        content,
    })
}

fn arb_conversation() -> impl Strategy<Value = Vec<ChatMessage>> {
    proptest::collection::vec(arb_message(), 0..20)
}

proptest! {
    #[test]
    fn prop_build_adds_exactly_one_turn(messages in arb_conversation()) {
        let request = RequestAdapter::build(&messages);
        prop_assert_eq!(request.turns.len(), messages.len() + 1);
    }

    #[test]
    fn prop_directive_always_first(messages in arb_conversation()) {
        let request = RequestAdapter::build(&messages);
        prop_assert_eq!(request.turns[0].role, ProviderRole::User);
        prop_assert_eq!(request.turns[0].text.as_str(), policy::DIRECTIVE);
    }

    #[test]
    fn prop_roles_and_content_preserved(messages in arb_conversation()) {
        let request = RequestAdapter::build(&messages);

        for (msg, turn) in messages.iter().zip(request.conversation_turns()) {
            let expected = if msg.role == "user" {
                ProviderRole::User
            } else {
                ProviderRole::Model
            };
            prop_assert_eq!(turn.role, expected);
            prop_assert_eq!(turn.role, map_role(msg.role()));
            prop_assert_eq!(&turn.text, &msg.content);
        }
    }

    #[test]
    fn prop_policy_independent_of_conversation(
        a in arb_conversation(),
        b in arb_conversation(),
    ) {
        let ra = RequestAdapter::build(&a);
        let rb = RequestAdapter::build(&b);
        prop_assert_eq!(ra.safety_settings, rb.safety_settings);
        prop_assert_eq!(ra.generation, rb.generation);
    }
}

#[test]
fn test_role_mapping_is_total() {
    assert_eq!(map_role(Role::User), ProviderRole::User);
    assert_eq!(map_role(Role::Assistant), ProviderRole::Model);
}
