//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.folio/config.json`) and
//! environment. A missing file means defaults, which match the deployed
//! portfolio widget.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Widget presentation values (greeting, suggestion prompts, context bound).
    #[serde(default)]
    pub widget: WidgetConfig,

    /// Backend adapter selection and base URLs.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Values the shell supplies to a mounted widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Assistant-authored greeting seeding every fresh session.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// "Try asking" prompts shown until the first user message.
    #[serde(default = "default_suggestion_prompts")]
    pub suggestion_prompts: Vec<String>,

    /// Exchange pairs retained per outbound request (default 2).
    #[serde(default = "default_max_history_pairs")]
    pub max_history_pairs: usize,
}

fn default_greeting() -> String {
    "Hi! I'm Sayed Abdul Karim. Ask me about my projects, experience, or tech stack!"
        .to_string()
}

fn default_suggestion_prompts() -> Vec<String> {
    [
        "Who are you?",
        "What's your favorite project?",
        "Tell me about PennyWise",
        "What tech stack do you use?",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_history_pairs() -> usize {
    2
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            suggestion_prompts: default_suggestion_prompts(),
            max_history_pairs: default_max_history_pairs(),
        }
    }
}

/// Which gateway adapter serves replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted inference space (managed session client). The deployed default.
    #[default]
    Space,

    /// Plain chat endpoint with server-assigned conversation correlation.
    Endpoint,
}

/// Backend adapter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Space base URL. When unset, the deployed portfolio space is used.
    pub space_url: Option<String>,

    /// Endpoint base URL (default http://127.0.0.1:8000).
    pub endpoint_url: Option<String>,
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("FOLIO_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".folio").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the default path (or FOLIO_CONFIG_PATH). Missing file =>
/// default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployed_widget() {
        let w = WidgetConfig::default();
        assert_eq!(w.max_history_pairs, 2);
        assert_eq!(w.suggestion_prompts.len(), 4);
        assert!(w.greeting.starts_with("Hi!"));
        assert_eq!(Config::default().backend.kind, BackendKind::Space);
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "widget": { "maxHistoryPairs": 5 } }"#).unwrap();
        assert_eq!(config.widget.max_history_pairs, 5);
        assert_eq!(config.widget.suggestion_prompts.len(), 4);
        assert_eq!(config.backend.kind, BackendKind::Space);
    }

    #[test]
    fn backend_kind_parses_lowercase() {
        let config: Config =
            serde_json::from_str(r#"{ "backend": { "kind": "endpoint", "endpointUrl": "http://localhost:9000" } }"#)
                .unwrap();
        assert_eq!(config.backend.kind, BackendKind::Endpoint);
        assert_eq!(
            config.backend.endpoint_url.as_deref(),
            Some("http://localhost:9000")
        );
    }
}
