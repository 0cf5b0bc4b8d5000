//! HTTP relay API
//!
//! Stateless: every request carries the whole conversation.

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::{ChatRequest, CONFIGURATION_ERROR_BODY, PROVIDER_ERROR_BODY};

use crate::adapter::RequestAdapter;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<RequestAdapter>,
}

impl AppState {
    pub fn new(adapter: RequestAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }
}
