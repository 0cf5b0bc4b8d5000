//! Request adapter
//!
//! Turns a client conversation into a policy-constrained provider request
//! and invokes the provider. Holds no per-conversation state; every call
//! carries the full history.

pub mod policy;

#[cfg(test)]
mod proptests;

use crate::config::ProviderConfig;
use crate::conversation::{ChatMessage, Role};
use crate::llm::{
    GeminiService, LlmError, LlmService, LoggingService, ProviderRequest, ProviderRole, Turn,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Provider credential missing. Raised before any provider call.
    #[error("provider credential is not configured")]
    Configuration,
    #[error("conversation is empty")]
    EmptyConversation,
    #[error(transparent)]
    Provider(#[from] LlmError),
}

pub struct RequestAdapter {
    provider: Option<Arc<dyn LlmService>>,
}

impl RequestAdapter {
    pub fn new(provider: Option<Arc<dyn LlmService>>) -> Self {
        Self { provider }
    }

    /// Adapter with no provider; every invocation fails with
    /// [`RelayError::Configuration`].
    pub fn unconfigured() -> Self {
        Self { provider: None }
    }

    /// Create the production adapter. A missing or empty key yields an
    /// unconfigured adapter rather than an error so the server can still
    /// start and answer each request deterministically.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        let Some(api_key) = config.api_key.as_ref().filter(|k| !k.is_empty()) else {
            return Ok(Self::unconfigured());
        };

        let gemini = GeminiService::new(api_key.clone(), &config.model, &config.base_url)?;
        Ok(Self::new(Some(Arc::new(LoggingService::new(Arc::new(
            gemini,
        ))))))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model_id(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.model_id())
    }

    /// Build the provider request: directive first, then every client
    /// message in order with its role mapped.
    pub fn build(messages: &[ChatMessage]) -> ProviderRequest {
        // The provider requires a user-authored first turn, so the directive
        // travels as a user turn at index 0.
        let mut turns = Vec::with_capacity(messages.len() + 1);
        turns.push(Turn::new(ProviderRole::User, policy::DIRECTIVE));
        turns.extend(
            messages
                .iter()
                .map(|m| Turn::new(map_role(m.role()), m.content.clone())),
        );

        ProviderRequest {
            turns,
            safety_settings: policy::SAFETY_SETTINGS.to_vec(),
            generation: policy::GENERATION,
        }
    }

    /// Invoke the provider once. No retry.
    pub async fn invoke(&self, request: &ProviderRequest) -> Result<String, RelayError> {
        let provider = self.provider.as_ref().ok_or(RelayError::Configuration)?;
        let response = provider.complete(request).await?;
        Ok(response.text)
    }

    /// Build and invoke in one step
    pub async fn relay(&self, messages: &[ChatMessage]) -> Result<String, RelayError> {
        if messages.is_empty() {
            return Err(RelayError::EmptyConversation);
        }
        if !self.is_configured() {
            return Err(RelayError::Configuration);
        }
        let request = Self::build(messages);
        self.invoke(&request).await
    }
}

pub fn map_role(role: Role) -> ProviderRole {
    match role {
        Role::User => ProviderRole::User,
        Role::Assistant => ProviderRole::Model,
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockLlmService;
    use super::*;
    use crate::llm::{HarmBlockThreshold, LlmErrorKind};

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(Role::User, "What are the pillars of Islam?"),
            ChatMessage::new(Role::Assistant, "Five pillars: ..."),
            ChatMessage::new(Role::User, "Tell me about Zakat"),
        ]
    }

    #[test]
    fn test_build_prepends_directive() {
        let request = RequestAdapter::build(&conversation());

        assert_eq!(request.turns.len(), 4);
        assert_eq!(request.turns[0].role, ProviderRole::User);
        assert_eq!(request.turns[0].text, policy::DIRECTIVE);
        assert_eq!(request.turns[1].text, "What are the pillars of Islam?");
        assert_eq!(request.turns[2].role, ProviderRole::Model);
        assert_eq!(request.conversation_turns().len(), 3);
    }

    #[test]
    fn test_build_applies_fixed_policy() {
        let request = RequestAdapter::build(&conversation());

        assert_eq!(request.safety_settings.len(), 4);
        assert!(request
            .safety_settings
            .iter()
            .all(|s| s.threshold == HarmBlockThreshold::BlockMediumAndAbove));
        assert_eq!(request.generation.max_output_tokens, 1000);
        assert!((request.generation.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_unconfigured_adapter_fails_with_configuration_error() {
        let adapter = RequestAdapter::unconfigured();
        let result = adapter.relay(&conversation()).await;
        assert!(matches!(result, Err(RelayError::Configuration)));
    }

    #[test]
    fn test_from_config_empty_key_is_unconfigured() {
        let config = ProviderConfig {
            api_key: Some(String::new()),
            ..ProviderConfig::default()
        };
        let adapter = RequestAdapter::from_config(&config).unwrap();
        assert!(!adapter.is_configured());
        assert!(adapter.model_id().is_none());
    }

    #[tokio::test]
    async fn test_relay_returns_provider_text() {
        let mock = Arc::new(MockLlmService::replying("Five pillars: ..."));
        let adapter = RequestAdapter::new(Some(mock.clone()));

        let reply = adapter
            .relay(&[ChatMessage::new(Role::User, "What are the pillars of Islam?")])
            .await
            .unwrap();

        assert_eq!(reply, "Five pillars: ...");
        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].turns.len(), 2);
    }

    #[tokio::test]
    async fn test_relay_surfaces_provider_error_without_retry() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_error(LlmError::rate_limit("quota"));
        mock.queue_response("should not be reached");
        let adapter = RequestAdapter::new(Some(mock.clone()));

        let result = adapter.relay(&conversation()).await;

        match result {
            Err(RelayError::Provider(e)) => assert_eq!(e.kind, LlmErrorKind::RateLimit),
            other => panic!("Expected provider error, got {other:?}"),
        }
        assert_eq!(mock.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected_before_provider_call() {
        let mock = Arc::new(MockLlmService::replying("unused"));
        let adapter = RequestAdapter::new(Some(mock.clone()));

        let result = adapter.relay(&[]).await;

        assert!(matches!(result, Err(RelayError::EmptyConversation)));
        assert!(mock.recorded_requests().is_empty());
    }
}
