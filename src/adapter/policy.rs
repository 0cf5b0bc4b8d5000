//! Fixed response policy applied to every provider request

use crate::llm::{GenerationConfig, HarmBlockThreshold, HarmCategory, SafetySetting};

/// Persona and guidelines. Sent as the first turn of every request and
/// never shown to the user.
pub const DIRECTIVE: &str = r"You are Islamy, an Islamic knowledge assistant designed to provide accurate information about Islam.

Guidelines:
- Provide factual, respectful information about Islamic teachings, history, practices, and guidance
- Answer questions based on mainstream Islamic scholarship
- When appropriate, reference Quranic verses or Hadith
- Avoid political controversies or divisive sectarian issues
- Clarify when there are multiple scholarly opinions on a topic
- If unsure about an answer, acknowledge limitations rather than speculating
- Be respectful and helpful to all users regardless of their background
- If the user asks in Arabic, respond in Arabic. If they ask in English, respond in English.
- For other languages, respond in the same language if you can, otherwise default to English.";

pub const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: HarmCategory::HarmCategoryHarassment,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::HarmCategoryHateSpeech,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::HarmCategorySexuallyExplicit,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
    SafetySetting {
        category: HarmCategory::HarmCategoryDangerousContent,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    },
];

pub const GENERATION: GenerationConfig = GenerationConfig {
    max_output_tokens: 1000,
    temperature: 0.7,
};
