//! Mock transports for session tests

use super::{Transport, TransportError};
use crate::conversation::ChatMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Mock transport that returns queued results, optionally after a delay
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<String, TransportError>>>,
    delay: Option<Duration>,
    /// Every conversation that was sent
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    /// Notified when a send starts
    pub request_started: Arc<Notify>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay: None,
            calls: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    /// Hold every response for `delay` before returning it
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn queue_reply(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<String, TransportError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.request_started.notify_one();

        if let Some(delay) = self.delay {
            tokio::select! {
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("No mock response queued".into())))
    }
}
