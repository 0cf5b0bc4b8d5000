//! Channel between the chat session and the request adapter
//!
//! Every call carries the whole conversation; the relay keeps no session
//! state between calls.

mod http;

#[cfg(test)]
pub mod testing;

pub use http::HttpTransport;

use crate::adapter::{RelayError, RequestAdapter};
use crate::conversation::ChatMessage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The relay has no provider credential
    #[error("relay is not configured")]
    Configuration,
    /// The relay reached the provider and the provider failed
    #[error("provider error: {0}")]
    Provider(String),
    /// The relay rejected the request
    #[error("relay rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request cancelled")]
    Cancelled,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the full conversation and wait for the assistant reply.
    ///
    /// Implementations must return promptly with
    /// [`TransportError::Cancelled`] once `cancel` fires.
    async fn send(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<String, TransportError> {
        (**self).send(messages, cancel).await
    }
}

/// In-process transport that calls the request adapter directly
pub struct DirectTransport {
    adapter: Arc<RequestAdapter>,
}

impl DirectTransport {
    pub fn new(adapter: Arc<RequestAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn send(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<String, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.adapter.relay(messages) => result.map_err(|e| match e {
                RelayError::Configuration => TransportError::Configuration,
                RelayError::EmptyConversation => TransportError::Rejected {
                    status: 400,
                    body: RelayError::EmptyConversation.to_string(),
                },
                RelayError::Provider(e) => TransportError::Provider(e.message),
            }),
        }
    }
}
