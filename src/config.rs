//! Environment configuration for the relay server and the chat client

use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(45);

/// Provider settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `GEMINI_API_KEY`; absence is reported per request, not at startup
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Relay server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub provider: ProviderConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("ISLAMY_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            port,
            provider: ProviderConfig::from_env(),
        }
    }
}

/// Chat client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub send_timeout: Duration,
    pub prefs_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let server_url = std::env::var("ISLAMY_SERVER_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{DEFAULT_PORT}"));

        let send_timeout = std::env::var("ISLAMY_SEND_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_SEND_TIMEOUT, Duration::from_secs);

        let prefs_path = std::env::var("ISLAMY_PREFS_PATH").map_or_else(
            |_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(format!("{home}/.islamy/preferences.json"))
            },
            PathBuf::from,
        );

        Self {
            server_url,
            send_timeout,
            prefs_path,
        }
    }
}
