//! User-facing copy, keyed by locale

use super::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    WelcomeTitle,
    WelcomeSubtitle,
    ChatTitle,
    ChatWelcome,
    ChatPlaceholder,
    SendButton,
    LoadingMessage,
    EmptyMessage,
    EmptyInputTitle,
    EmptyInputDescription,
    ErrorTitle,
    ErrorDescription,
    TimeoutDescription,
    CancelledDescription,
    UserInitial,
    AssistantInitial,
}

impl TranslationKey {
    pub const ALL: [TranslationKey; 16] = [
        TranslationKey::WelcomeTitle,
        TranslationKey::WelcomeSubtitle,
        TranslationKey::ChatTitle,
        TranslationKey::ChatWelcome,
        TranslationKey::ChatPlaceholder,
        TranslationKey::SendButton,
        TranslationKey::LoadingMessage,
        TranslationKey::EmptyMessage,
        TranslationKey::EmptyInputTitle,
        TranslationKey::EmptyInputDescription,
        TranslationKey::ErrorTitle,
        TranslationKey::ErrorDescription,
        TranslationKey::TimeoutDescription,
        TranslationKey::CancelledDescription,
        TranslationKey::UserInitial,
        TranslationKey::AssistantInitial,
    ];
}

pub fn text(key: TranslationKey, locale: Locale) -> &'static str {
    let (en, ar) = match key {
        TranslationKey::WelcomeTitle => ("Islamy", "إسلامي"),
        TranslationKey::WelcomeSubtitle => (
            "Your companion for Islamic knowledge and guidance",
            "رفيقك للمعرفة والإرشاد الإسلامي",
        ),
        TranslationKey::ChatTitle => (
            "Ask about Islamic knowledge",
            "اسأل عن المعرفة الإسلامية",
        ),
        TranslationKey::ChatWelcome => ("Welcome to Islamy", "مرحبًا بك في إسلامي"),
        TranslationKey::ChatPlaceholder => (
            "Ask a question about Islam...",
            "اسأل سؤالاً عن الإسلام...",
        ),
        TranslationKey::SendButton => ("Send", "إرسال"),
        TranslationKey::LoadingMessage => ("Thinking...", "جاري التفكير..."),
        TranslationKey::EmptyMessage => (
            "Ask about Islamic teachings, history, practices, or guidance.",
            "اسأل عن التعاليم الإسلامية أو التاريخ أو الممارسات أو الإرشادات.",
        ),
        TranslationKey::EmptyInputTitle => ("Empty message", "رسالة فارغة"),
        TranslationKey::EmptyInputDescription => (
            "Please enter a question to ask Islamy.",
            "الرجاء إدخال سؤال لطرحه على إسلامي.",
        ),
        TranslationKey::ErrorTitle => ("Error", "خطأ"),
        TranslationKey::ErrorDescription => (
            "There was an error processing your request. Please try again.",
            "حدث خطأ أثناء معالجة طلبك. يرجى المحاولة مرة أخرى.",
        ),
        TranslationKey::TimeoutDescription => (
            "The request took too long. Please try again.",
            "استغرق الطلب وقتًا طويلاً. يرجى المحاولة مرة أخرى.",
        ),
        TranslationKey::CancelledDescription => (
            "The request was cancelled.",
            "تم إلغاء الطلب.",
        ),
        TranslationKey::UserInitial => ("U", "م"),
        TranslationKey::AssistantInitial => ("I", "إ"),
    };

    match locale {
        Locale::En => en,
        Locale::Ar => ar,
    }
}

/// Example questions offered while the conversation is empty
pub fn suggested_questions(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::En => &[
            "What are the five pillars of Islam?",
            "How do I perform Salah?",
            "What is the significance of Ramadan?",
        ],
        Locale::Ar => &[
            "ما هي أركان الإسلام الخمسة؟",
            "كيف أؤدي الصلاة؟",
            "ما هي أهمية شهر رمضان؟",
        ],
    }
}
