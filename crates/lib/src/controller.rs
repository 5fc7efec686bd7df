//! Request lifecycle: one send end to end.
//!
//! Optimistic user-message append, context captured from the log before the
//! append, gateway call, and a fallback assistant entry on failure. At most
//! one request is in flight; concurrent sends are rejected, not queued.

use crate::gateway::{GatewayError, InferenceGateway};
use crate::session::{ExchangePair, Message, MessageLog};
use std::sync::Arc;

/// Why a submission was refused. Refusals have no side effects on the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    /// Input was empty after trimming.
    Empty,
    /// A request is already in flight.
    Busy,
}

/// Result of a full send attempt as reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    RejectedEmpty,
    RejectedBusy,
}

/// A validated send whose user message is already in the log. The controller
/// stays in Sending until this is passed to [`ChatController::complete`].
#[derive(Debug)]
pub struct PreparedSend {
    text: String,
    context: Vec<ExchangePair>,
}

impl PreparedSend {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Context pairs captured before the user message was appended; the
    /// message being sent never appears in its own context.
    pub fn context(&self) -> &[ExchangePair] {
        &self.context
    }
}

/// Orchestrates sends for one session: Idle/Sending state, log appends, and
/// error-to-fallback conversion at the gateway boundary.
pub struct ChatController {
    log: MessageLog,
    gateway: Arc<dyn InferenceGateway>,
    max_history_pairs: usize,
    sending: bool,
}

impl ChatController {
    pub fn new(
        greeting: &str,
        gateway: Arc<dyn InferenceGateway>,
        max_history_pairs: usize,
    ) -> Self {
        Self {
            log: MessageLog::seeded(greeting),
            gateway,
            max_history_pairs,
            sending: false,
        }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// True while a request is in flight. The shell renders this as the
    /// typing indicator and disables submission off it.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Validate and stage one send: capture the bounded context from the log
    /// as it stood before this message, append the user message, enter
    /// Sending.
    pub fn prepare(&mut self, text: &str) -> Result<PreparedSend, SendRejected> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendRejected::Empty);
        }
        if self.sending {
            log::debug!("send rejected: request already in flight");
            return Err(SendRejected::Busy);
        }
        let context = self.log.recent_pairs(self.max_history_pairs);
        self.log.append(Message::user(text));
        self.sending = true;
        Ok(PreparedSend {
            text: text.to_string(),
            context,
        })
    }

    /// Run the staged send against the gateway. A failure becomes a fallback
    /// assistant entry; Sending clears on both paths, so the widget is always
    /// interactive afterwards.
    pub async fn complete(&mut self, prepared: PreparedSend) {
        let result = self
            .gateway
            .send(&prepared.text, &prepared.context)
            .await;
        match result {
            Ok(reply) => {
                self.log
                    .append(Message::assistant_with_sources(reply.text, reply.sources));
            }
            Err(e) => {
                log::warn!("gateway call failed: {}", e);
                self.log.append(Message::assistant(fallback_text(&e)));
            }
        }
        self.sending = false;
    }

    /// Prepare and complete in one call, for shells that do not publish an
    /// intermediate snapshot.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        match self.prepare(text) {
            Ok(prepared) => {
                self.complete(prepared).await;
                SendOutcome::Sent
            }
            Err(SendRejected::Empty) => SendOutcome::RejectedEmpty,
            Err(SendRejected::Busy) => SendOutcome::RejectedBusy,
        }
    }
}

fn fallback_text(e: &GatewayError) -> String {
    format!("Error: {}. The API might be loading, please try again.", e)
}
