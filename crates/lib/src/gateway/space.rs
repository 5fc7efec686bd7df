//! Hosted-space session client (gradio-style API).
//!
//! Connects lazily: the `/config` fetch runs at most once per client, and
//! concurrent first calls share the same in-flight setup instead of racing.
//! The predict reply is a `[status, history]` tuple; the reply text is the
//! second element of the last history pair.

use crate::gateway::{GatewayError, GatewayReply, InferenceGateway};
use crate::session::ExchangePair;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::OnceCell;

const DEFAULT_SPACE_URL: &str = "https://abdul8008-abdul-portfolio-chatbot-app.hf.space";

/// Client for a hosted inference space exposing the `respond` function.
pub struct SpaceClient {
    base_url: String,
    client: reqwest::Client,
    connected: OnceCell<()>,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    /// Positional arguments of the remote function: `(message, history)`.
    data: (&'a str, &'a [ExchangePair]),
}

impl SpaceClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SPACE_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
            connected: OnceCell::new(),
        }
    }

    /// GET /config — establish the session handle. Runs once per client;
    /// a failed attempt leaves the cell empty so the next call retries.
    async fn ensure_connected(&self) -> Result<(), GatewayError> {
        self.connected
            .get_or_try_init(|| async {
                let url = format!("{}/config", self.base_url);
                log::debug!("space: connecting to {}", url);
                let res = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| GatewayError::Connection(e.to_string()))?;
                if !res.status().is_success() {
                    let status = res.status();
                    let body = res.text().await.unwrap_or_default();
                    return Err(GatewayError::Connection(format!("{} {}", status, body)));
                }
                let _config: serde_json::Value = res
                    .json()
                    .await
                    .map_err(|e| GatewayError::Connection(e.to_string()))?;
                log::info!("space: connected to {}", self.base_url);
                Ok(())
            })
            .await
            .map(|_| ())
    }
}

/// Validate the raw predict reply and extract the assistant text.
fn extract_reply(body: &serde_json::Value) -> Result<GatewayReply, GatewayError> {
    let data = body
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| GatewayError::Protocol("reply is missing the data array".to_string()))?;
    if data.len() < 2 {
        return Err(GatewayError::Protocol(format!(
            "expected [status, history] tuple, got {} element(s)",
            data.len()
        )));
    }
    let history: Vec<ExchangePair> = serde_json::from_value(data[1].clone())
        .map_err(|e| GatewayError::Protocol(format!("history has unexpected shape: {}", e)))?;
    let last = history
        .last()
        .ok_or_else(|| GatewayError::Protocol("history in reply is empty".to_string()))?;
    Ok(GatewayReply {
        text: last.assistant().to_string(),
        sources: Vec::new(),
    })
}

#[async_trait]
impl InferenceGateway for SpaceClient {
    /// POST /api/respond/ with `{"data": [message, history]}`.
    async fn send(
        &self,
        message: &str,
        context: &[ExchangePair],
    ) -> Result<GatewayReply, GatewayError> {
        self.ensure_connected().await?;
        let url = format!("{}/api/respond/", self.base_url);
        let body = PredictRequest {
            data: (message, context),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GatewayError::Connection(format!("{} {}", status, body)));
        }
        let raw: serde_json::Value = res.json().await?;
        extract_reply(&raw)
    }

    /// Warm the session handle; healthy once the connect succeeds.
    async fn probe(&self) -> Result<bool, GatewayError> {
        self.ensure_connected().await?;
        Ok(true)
    }
}
