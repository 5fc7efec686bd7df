//! Widget surface for the presentational shell.
//!
//! Owns open/closed visibility, the one-way suggestion latch, and publishes
//! immutable [`ChatSnapshot`]s over a watch channel; the rendering layer
//! subscribes to snapshots instead of reaching into mutable state. A change
//! in `log_revision` is the scroll-to-latest trigger.

use crate::config::WidgetConfig;
use crate::controller::{ChatController, SendOutcome, SendRejected};
use crate::gateway::InferenceGateway;
use crate::session::Message;
use std::sync::Arc;
use tokio::sync::watch;

/// Immutable view of the widget for rendering.
#[derive(Debug, Clone)]
pub struct ChatSnapshot {
    /// Full log, greeting included (tagged); the shell filters on `greeting`
    /// when it renders the transcript.
    pub messages: Vec<Message>,
    pub is_typing: bool,
    pub is_open: bool,
    pub suggestions_visible: bool,
    /// Increments on every log mutation; a change means scroll to latest.
    pub log_revision: u64,
}

/// One mounted widget instance: a fresh session per mount, discarded with it.
pub struct ChatWidget {
    session_id: String,
    controller: ChatController,
    suggestion_prompts: Vec<String>,
    is_open: bool,
    suggestions_visible: bool,
    log_revision: u64,
    tx: watch::Sender<ChatSnapshot>,
}

impl ChatWidget {
    /// Mount a fresh session: log seeded with the greeting, suggestions
    /// visible, widget closed.
    pub fn mount(config: WidgetConfig, gateway: Arc<dyn InferenceGateway>) -> Self {
        let session_id = format!("sess-{}", uuid::Uuid::new_v4());
        let controller =
            ChatController::new(&config.greeting, gateway, config.max_history_pairs);
        let initial = ChatSnapshot {
            messages: controller.log().messages().to_vec(),
            is_typing: false,
            is_open: false,
            suggestions_visible: true,
            log_revision: 0,
        };
        let (tx, _rx) = watch::channel(initial);
        log::debug!("widget mounted: {}", session_id);
        Self {
            session_id,
            controller,
            suggestion_prompts: config.suggestion_prompts,
            is_open: false,
            suggestions_visible: true,
            log_revision: 0,
            tx,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn suggestion_prompts(&self) -> &[String] {
        &self.suggestion_prompts
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
            self.publish();
        }
    }

    /// Closing hides the widget only; the log survives and reopening resumes
    /// the same in-memory session.
    pub fn close(&mut self) {
        if self.is_open {
            self.is_open = false;
            self.publish();
        }
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
        self.publish();
    }

    /// Current snapshot, without subscribing.
    pub fn snapshot(&self) -> ChatSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribe the rendering layer to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.tx.subscribe()
    }

    /// Submit one message. Publishes the optimistic snapshot (user message
    /// appended, typing indicator on) before awaiting the gateway, and the
    /// settled snapshot after.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        let prepared = match self.controller.prepare(text) {
            Ok(p) => p,
            Err(SendRejected::Empty) => return SendOutcome::RejectedEmpty,
            Err(SendRejected::Busy) => return SendOutcome::RejectedBusy,
        };
        self.log_revision += 1;
        self.publish();

        self.controller.complete(prepared).await;
        self.log_revision += 1;
        self.publish();
        SendOutcome::Sent
    }

    fn publish(&mut self) {
        // One-way latch: flips false on the first user message and stays
        // false for the life of this mount.
        if self.suggestions_visible && self.controller.log().has_user_message() {
            self.suggestions_visible = false;
        }
        self.tx.send_replace(ChatSnapshot {
            messages: self.controller.log().messages().to_vec(),
            is_typing: self.controller.is_sending(),
            is_open: self.is_open,
            suggestions_visible: self.suggestions_visible,
            log_revision: self.log_revision,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayError, GatewayReply};
    use crate::session::{ExchangePair, Role};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedGateway {
        script: Mutex<VecDeque<Result<GatewayReply, GatewayError>>>,
    }

    impl ScriptedGateway {
        fn replies(texts: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(
                    texts
                        .iter()
                        .map(|t| {
                            Ok(GatewayReply {
                                text: t.to_string(),
                                sources: Vec::new(),
                            })
                        })
                        .collect(),
                ),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(
                    vec![Err(GatewayError::Connection("unreachable".into()))].into(),
                ),
            })
        }
    }

    #[async_trait]
    impl InferenceGateway for ScriptedGateway {
        async fn send(
            &self,
            _message: &str,
            _context: &[ExchangePair],
        ) -> Result<GatewayReply, GatewayError> {
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Connection("script exhausted".into())))
        }
    }

    fn widget(gateway: Arc<ScriptedGateway>) -> ChatWidget {
        ChatWidget::mount(WidgetConfig::default(), gateway)
    }

    #[tokio::test]
    async fn mount_starts_closed_with_suggestions_and_greeting_only() {
        let w = widget(ScriptedGateway::replies(&[]));
        let snap = w.snapshot();
        assert!(!snap.is_open);
        assert!(!snap.is_typing);
        assert!(snap.suggestions_visible);
        assert_eq!(snap.messages.len(), 1);
        assert!(snap.messages[0].greeting);
        assert_eq!(snap.log_revision, 0);
        assert!(w.session_id().starts_with("sess-"));
    }

    #[tokio::test]
    async fn toggle_open_close_do_not_touch_the_log() {
        let mut w = widget(ScriptedGateway::replies(&["a1"]));
        w.toggle();
        assert!(w.snapshot().is_open);
        w.send_message("q1").await;
        w.close();
        let snap = w.snapshot();
        assert!(!snap.is_open);
        assert_eq!(snap.messages.len(), 3);
        w.open();
        assert_eq!(w.snapshot().messages.len(), 3);
    }

    #[tokio::test]
    async fn suggestions_latch_flips_once_and_never_reverts() {
        let mut w = widget(ScriptedGateway::replies(&["a1", "a2"]));
        assert!(w.snapshot().suggestions_visible);
        w.send_message("q1").await;
        assert!(!w.snapshot().suggestions_visible);
        w.send_message("q2").await;
        w.toggle();
        w.toggle();
        assert!(!w.snapshot().suggestions_visible);
    }

    #[tokio::test]
    async fn send_publishes_optimistic_then_settled_snapshots() {
        let mut w = widget(ScriptedGateway::replies(&["a1"]));
        let mut rx = w.subscribe();
        let before = w.snapshot().log_revision;

        assert_eq!(w.send_message("q1").await, SendOutcome::Sent);

        let snap = w.snapshot();
        assert_eq!(snap.log_revision, before + 2);
        assert!(!snap.is_typing);
        assert_eq!(snap.messages.last().unwrap().content, "a1");
        assert_eq!(snap.messages.last().unwrap().role, Role::Assistant);

        // Subscriber observes the settled snapshot.
        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.log_revision, before + 2);
    }

    #[tokio::test]
    async fn failure_leaves_widget_interactive() {
        let mut w = widget(ScriptedGateway::failing());
        assert_eq!(w.send_message("q1").await, SendOutcome::Sent);
        let snap = w.snapshot();
        assert!(!snap.is_typing);
        assert_eq!(snap.messages.len(), 3);
        assert!(snap.messages[2].content.starts_with("Error: "));
    }

    #[tokio::test]
    async fn empty_input_publishes_nothing() {
        let mut w = widget(ScriptedGateway::replies(&[]));
        let rev = w.snapshot().log_revision;
        assert_eq!(w.send_message("   ").await, SendOutcome::RejectedEmpty);
        assert_eq!(w.snapshot().log_revision, rev);
        assert!(w.snapshot().suggestions_visible);
    }
}
