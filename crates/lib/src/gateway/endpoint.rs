//! Plain request/response chat endpoint with server-assigned conversation
//! correlation.
//!
//! The server keeps the conversation history itself, keyed by the
//! `conversation_id` it returns; the id is persisted in a single durable
//! slot and sent with every subsequent request.

use crate::gateway::{GatewayError, GatewayReply, InferenceGateway};
use crate::session::{ExchangePair, Source};
use crate::storage::CorrelationStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:8000";

/// Client for the `/api/chat` endpoint backend.
pub struct EndpointClient {
    base_url: String,
    client: reqwest::Client,
    store: Arc<dyn CorrelationStore>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
    conversation_id: String,
    #[serde(default)]
    sources: Option<Vec<Source>>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

impl EndpointClient {
    pub fn new(base_url: Option<String>, store: Arc<dyn CorrelationStore>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
            store,
        }
    }
}

#[async_trait]
impl InferenceGateway for EndpointClient {
    /// POST /api/chat with `{message, conversation_id?}`.
    ///
    /// Context pairs are not transmitted: the server reconstructs history
    /// from the persisted conversation id. The adapter still satisfies the
    /// uniform contract so the controller never special-cases it.
    async fn send(
        &self,
        message: &str,
        _context: &[ExchangePair],
    ) -> Result<GatewayReply, GatewayError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            message,
            conversation_id: self.store.load(),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GatewayError::Connection(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        if let Err(e) = self.store.save(&data.conversation_id) {
            log::warn!("endpoint: failed to persist conversation id: {}", e);
        }
        Ok(GatewayReply {
            text: data.response,
            sources: data.sources.unwrap_or_default(),
        })
    }

    /// GET /api/health — true when the backend reports itself healthy.
    async fn probe(&self) -> Result<bool, GatewayError> {
        let url = format!("{}/api/health", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            return Ok(false);
        }
        let data: HealthResponse = res.json().await?;
        Ok(data.status == "healthy")
    }
}
