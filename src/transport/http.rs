//! HTTP transport to a remote relay (`POST /chat`)

use super::{Transport, TransportError};
use crate::api::{ChatRequest, CONFIGURATION_ERROR_BODY};
use crate::conversation::ChatMessage;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/chat", server_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, messages: &[ChatMessage]) -> Result<String, TransportError> {
        let body = ChatRequest {
            messages: messages.to_vec(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response: {e}")))?;

        classify(status, text)
    }
}

fn classify(status: StatusCode, body: String) -> Result<String, TransportError> {
    if status.is_success() {
        return Ok(body);
    }
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        return Err(if body == CONFIGURATION_ERROR_BODY {
            TransportError::Configuration
        } else {
            TransportError::Provider(body)
        });
    }
    Err(TransportError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<String, TransportError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.post(messages) => result,
        }
    }
}
