//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::flow::gesture::DEFAULT_SWIPE_THRESHOLD;
use crate::policy::{DEFAULT_DISALLOWED_SUFFIXES, TargetPolicy};

/// Mini-app client configuration.
#[derive(Debug, Clone)]
pub struct MiniAppConfig {
    /// Backend base URL, e.g. `https://app.example.org`.
    pub api_url: String,
    /// Signed init data handed over by the chat host.
    pub init_data: SecretString,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Handle suffixes that cannot be rated.
    pub disallowed_suffixes: Vec<String>,
    /// Horizontal displacement (px) a swipe must exceed.
    pub swipe_threshold: f32,
    /// Launch URL; its `rate` parameter prefills the answer target.
    pub launch_url: Option<String>,
}

impl Default for MiniAppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".to_string(),
            init_data: SecretString::from(String::new()),
            request_timeout: Duration::from_secs(8),
            disallowed_suffixes: DEFAULT_DISALLOWED_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            launch_url: None,
        }
    }
}

impl MiniAppConfig {
    /// Build from `MINIAPP_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("MINIAPP_API_URL").unwrap_or(defaults.api_url);

        let init_data = std::env::var("MINIAPP_INIT_DATA")
            .map(SecretString::from)
            .unwrap_or(defaults.init_data);

        let request_timeout = std::env::var("MINIAPP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let disallowed_suffixes = std::env::var("MINIAPP_DISALLOWED_SUFFIXES")
            .map(|s| parse_list(&s))
            .unwrap_or(defaults.disallowed_suffixes);

        let swipe_threshold = std::env::var("MINIAPP_SWIPE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.swipe_threshold);

        let launch_url = std::env::var("MINIAPP_LAUNCH_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Self {
            api_url,
            init_data,
            request_timeout,
            disallowed_suffixes,
            swipe_threshold,
            launch_url,
        }
    }

    pub fn target_policy(&self) -> TargetPolicy {
        TargetPolicy::new(&self.disallowed_suffixes)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
