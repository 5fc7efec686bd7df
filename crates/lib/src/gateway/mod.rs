//! Remote inference gateway: the uniform contract the lifecycle controller
//! depends on, plus the two interchangeable backend adapters.

mod endpoint;
mod space;

pub use endpoint::EndpointClient;
pub use space::SpaceClient;

use crate::config::{BackendConfig, BackendKind};
use crate::session::{ExchangePair, Source};
use crate::storage::FileStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Errors a backend adapter can surface. The controller converts every one
/// of these into a fallback assistant message; they never reach the shell.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Remote service unreachable or failed to initialize.
    #[error("gateway connection failed: {0}")]
    Connection(String),
    /// Response arrived but did not match the expected shape.
    #[error("gateway protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Protocol(e.to_string())
        } else {
            GatewayError::Connection(e.to_string())
        }
    }
}

/// Reply from a backend: text plus any retrieval sources.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    pub text: String,
    pub sources: Vec<Source>,
}

/// Uniform contract over whichever remote service produces replies.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Send one message with its bounded context window; resolve to the
    /// assistant reply or fail with a connection/protocol error.
    async fn send(
        &self,
        message: &str,
        context: &[ExchangePair],
    ) -> Result<GatewayReply, GatewayError>;

    /// Probe backend reachability before the first exchange. The space
    /// adapter warms its session handle; the endpoint adapter asks the
    /// health route. Defaults to healthy for backends with nothing to check.
    async fn probe(&self) -> Result<bool, GatewayError> {
        Ok(true)
    }
}

/// Build the configured backend adapter. Selection is a deployment concern;
/// the controller only ever sees the trait.
pub fn from_config(backend: &BackendConfig) -> Arc<dyn InferenceGateway> {
    match backend.kind {
        BackendKind::Space => Arc::new(SpaceClient::new(backend.space_url.clone())),
        BackendKind::Endpoint => Arc::new(EndpointClient::new(
            backend.endpoint_url.clone(),
            Arc::new(FileStore::default()),
        )),
    }
}
