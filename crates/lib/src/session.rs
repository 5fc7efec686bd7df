//! Message log and context window for one mounted widget session.
//!
//! The log is append-only and seeded with a tagged greeting. Exchange pairs
//! are derived on demand and bounded before each outbound request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A retrieval source attached to an assistant reply (endpoint backend only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
    pub relevance: f64,
}

/// A single message in a session. Immutable once appended to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    /// Set only on the seeded greeting. Greeting entries are excluded from
    /// pair extraction and from the visible slice, by tag rather than by
    /// position so a restored log keeps the same semantics.
    #[serde(default)]
    pub greeting: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            sources: Vec::new(),
            greeting: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            sources: Vec::new(),
            greeting: false,
        }
    }

    pub fn assistant_with_sources(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            sources,
            ..Self::assistant(content)
        }
    }

    fn greeting(content: impl Into<String>) -> Self {
        Self {
            greeting: true,
            ..Self::assistant(content)
        }
    }
}

/// One user message paired with its immediately following assistant reply.
/// Serialized on the wire as a two-element array `[user, assistant]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePair(pub String, pub String);

impl ExchangePair {
    pub fn user(&self) -> &str {
        &self.0
    }

    pub fn assistant(&self) -> &str {
        &self.1
    }
}

/// Append-only record of the messages exchanged in one mounted session.
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// New log holding only the tagged greeting.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::greeting(greeting)],
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Full log, greeting included.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages the shell renders: everything except greeting entries.
    pub fn visible(&self) -> Vec<&Message> {
        self.messages.iter().filter(|m| !m.greeting).collect()
    }

    /// True once any user message has been appended. Drives the
    /// suggestion-prompt latch.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    /// Derive complete exchange pairs from the log.
    ///
    /// Cursor scan over the full log: a user message immediately followed by
    /// an assistant message forms a pair; greeting entries and assistant
    /// messages without a preceding unconsumed user message are skipped; a
    /// trailing unanswered user message produces no pair.
    pub fn pairs(&self) -> Vec<ExchangePair> {
        let mut pairs = Vec::new();
        let mut i = 0;
        while i < self.messages.len() {
            let m = &self.messages[i];
            if m.greeting {
                i += 1;
                continue;
            }
            if m.role == Role::User {
                if let Some(next) = self.messages.get(i + 1) {
                    if next.role == Role::Assistant && !next.greeting {
                        pairs.push(ExchangePair(m.content.clone(), next.content.clone()));
                        i += 2;
                        continue;
                    }
                }
            }
            i += 1;
        }
        pairs
    }

    /// Last `max` exchange pairs, bounding outbound payload size regardless
    /// of total conversation length.
    pub fn recent_pairs(&self, max: usize) -> Vec<ExchangePair> {
        let pairs = self.pairs();
        let skip = pairs.len().saturating_sub(max);
        pairs.into_iter().skip(skip).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(u: &str, a: &str) -> ExchangePair {
        ExchangePair(u.to_string(), a.to_string())
    }

    #[test]
    fn seeded_log_has_tagged_greeting_and_no_visible_messages() {
        let log = MessageLog::seeded("hello");
        assert_eq!(log.len(), 1);
        assert!(log.messages()[0].greeting);
        assert_eq!(log.messages()[0].role, Role::Assistant);
        assert!(log.visible().is_empty());
        assert!(!log.has_user_message());
        assert!(log.pairs().is_empty());
    }

    #[test]
    fn pairs_exclude_greeting_and_collect_complete_exchanges() {
        let mut log = MessageLog::seeded("hello");
        log.append(Message::user("q1"));
        log.append(Message::assistant("a1"));
        log.append(Message::user("q2"));
        log.append(Message::assistant("a2"));
        assert_eq!(log.pairs(), vec![pair("q1", "a1"), pair("q2", "a2")]);
    }

    #[test]
    fn trailing_unanswered_user_message_produces_no_pair() {
        let mut log = MessageLog::seeded("hello");
        log.append(Message::user("q1"));
        log.append(Message::assistant("a1"));
        log.append(Message::user("pending"));
        assert_eq!(log.pairs(), vec![pair("q1", "a1")]);
    }

    #[test]
    fn standalone_assistant_message_is_skipped() {
        let mut log = MessageLog::seeded("hello");
        log.append(Message::assistant("unprompted"));
        log.append(Message::user("q1"));
        log.append(Message::assistant("a1"));
        assert_eq!(log.pairs(), vec![pair("q1", "a1")]);
    }

    #[test]
    fn recent_pairs_keep_only_the_last_max() {
        let mut log = MessageLog::seeded("hello");
        for n in 1..=3 {
            log.append(Message::user(format!("q{n}")));
            log.append(Message::assistant(format!("a{n}")));
        }
        assert_eq!(
            log.recent_pairs(2),
            vec![pair("q2", "a2"), pair("q3", "a3")]
        );
        assert_eq!(log.recent_pairs(10).len(), 3);
        assert!(log.recent_pairs(0).is_empty());
    }

    #[test]
    fn visible_excludes_only_greeting_entries() {
        let mut log = MessageLog::seeded("hello");
        log.append(Message::user("q1"));
        log.append(Message::assistant("a1"));
        let visible = log.visible();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content, "q1");
    }

    #[test]
    fn exchange_pair_serializes_as_two_element_array() {
        let json = serde_json::to_string(&pair("q", "a")).unwrap();
        assert_eq!(json, r#"["q","a"]"#);
        let back: ExchangePair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair("q", "a"));
    }
}
