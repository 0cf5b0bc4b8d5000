//! Provider-facing request and response types

use serde::{Deserialize, Serialize};

/// Role of a turn as the provider sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    User,
    Model,
}

impl ProviderRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderRole::User => "user",
            ProviderRole::Model => "model",
        }
    }
}

/// One role-tagged unit of the provider conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: ProviderRole,
    pub text: String,
}

impl Turn {
    pub fn new(role: ProviderRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Harm categories covered by the safety policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

/// Blocking threshold for a harm category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Sampling bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Fully built request, ready for a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Index 0 is always the directive
    pub turns: Vec<Turn>,
    pub safety_settings: Vec<SafetySetting>,
    pub generation: GenerationConfig,
}

impl ProviderRequest {
    /// Turns that came from the client conversation
    pub fn conversation_turns(&self) -> &[Turn] {
        self.turns.get(1..).unwrap_or_default()
    }
}

/// Provider response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
