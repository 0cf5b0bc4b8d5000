//! Islamy - bilingual Islamic-knowledge chat assistant
//!
//! A stateless relay in front of the Gemini API plus the client-side chat
//! session and locale handling.

pub mod adapter;
pub mod api;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod locale;
pub mod session;
pub mod transport;
