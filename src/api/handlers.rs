//! HTTP request handlers

use super::types::{ChatRequest, CONFIGURATION_ERROR_BODY, PROVIDER_ERROR_BODY};
use super::AppState;
use crate::adapter::RelayError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(relay_chat))
        // Path used by the web client
        .route("/api/chat", post(relay_chat))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat Relay
// ============================================================

async fn relay_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    tracing::debug!(messages = request.messages.len(), "Relaying conversation");

    state
        .adapter
        .relay(&request.messages)
        .await
        .map_err(AppError::from)
}

async fn health() -> &'static str {
    "ok"
}

async fn get_version() -> &'static str {
    concat!("islamy ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Configuration,
    Provider,
}

impl From<RelayError> for AppError {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::EmptyConversation => AppError::BadRequest(error.to_string()),
            RelayError::Configuration => {
                tracing::error!(kind = "configuration", "GEMINI_API_KEY is not set");
                AppError::Configuration
            }
            // Already logged by the provider decorator
            RelayError::Provider(_) => AppError::Provider,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Configuration => {
                (StatusCode::INTERNAL_SERVER_ERROR, CONFIGURATION_ERROR_BODY).into_response()
            }
            AppError::Provider => {
                (StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_ERROR_BODY).into_response()
            }
        }
    }
}
