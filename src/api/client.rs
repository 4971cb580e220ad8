//! HTTP client for the mini-app backend.
//!
//! Every request carries the host bridge's init data in
//! `X-Telegram-Init-Data`; the backend authenticates with it. A response
//! is a failure when the status is not 2xx or the body says `"ok": false`.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Url};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{Insight, ProfileData, SubmitReceipt, TargetProfile};
use super::{FeedbackSubmitter, ProfileLookup};
use crate::config::MiniAppConfig;
use crate::error::{ApiError, ConfigError};
use crate::flow::FeedbackPayload;

/// Header carrying the signed init data from the chat host.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// Longest profile note the backend accepts.
pub const MAX_PROFILE_NOTE_CHARS: usize = 90;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@([A-Za-z0-9_]{3,32})$").expect("username pattern is valid")
});

/// Strict `@username` form accepted by the profile and insight endpoints.
pub fn normalize_username(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = if raw.starts_with('@') {
        raw.to_string()
    } else {
        format!("@{raw}")
    };
    USERNAME_RE
        .captures(&raw)
        .map(|caps| format!("@{}", caps[1].to_lowercase()))
}

/// Client-side check mirroring the backend's note rules.
pub fn validate_profile_note(note: &str) -> Result<String, ApiError> {
    let note = note.trim();
    if note.chars().count() > MAX_PROFILE_NOTE_CHARS {
        return Err(ApiError::InvalidInput(format!(
            "at most {MAX_PROFILE_NOTE_CHARS} characters"
        )));
    }
    let lowered = note.to_lowercase();
    if ["http://", "https://", "www.", "t.me/"]
        .iter()
        .any(|p| lowered.contains(p))
    {
        return Err(ApiError::InvalidInput(
            "links are not allowed in the note".to_string(),
        ));
    }
    Ok(note.to_string())
}

/// Avatar proxy path for a username.
pub fn avatar_proxy_url(username: &str) -> String {
    let name = username.trim().trim_start_matches('@').to_lowercase();
    format!("/api/miniapp/avatar?username={name}")
}

/// Target prefilled through the launch URL's `rate` parameter.
pub fn launch_target(launch_url: &str) -> Option<String> {
    let url = Url::parse(launch_url).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "rate")
        .and_then(|(_, v)| normalize_username(&v))
}

/// HTTP client for `/api/miniapp/*`.
pub struct MiniAppClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl MiniAppClient {
    pub fn new(config: &MiniAppConfig) -> Result<Self, ConfigError> {
        let mut init_data = HeaderValue::from_str(config.init_data.expose_secret()).map_err(|e| {
            ConfigError::InvalidValue {
                key: "MINIAPP_INIT_DATA".to_string(),
                message: e.to_string(),
            }
        })?;
        init_data.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(INIT_DATA_HEADER), init_data);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET /api/miniapp/me — the caller's own profile.
    pub async fn me(&self) -> Result<ProfileData, ApiError> {
        let path = "/api/miniapp/me";
        let body = self.send(path, self.client.get(self.url(path))).await?;
        parse_field(path, &body, "data")
    }

    /// GET /api/miniapp/profile — another user's profile.
    pub async fn profile(&self, target: &str) -> Result<ProfileData, ApiError> {
        let target = require_username(target)?;
        let path = "/api/miniapp/profile";
        let request = self
            .client
            .get(self.url(path))
            .query(&[("target", target.as_str())]);
        let body = self.send(path, request).await?;
        parse_field(path, &body, "data")
    }

    /// GET /api/miniapp/insight — aggregated advice about a target.
    pub async fn insight(&self, target: &str) -> Result<Insight, ApiError> {
        let target = require_username(target)?;
        let path = "/api/miniapp/insight";
        let request = self
            .client
            .get(self.url(path))
            .query(&[("target", target.as_str())]);
        let body = self.send(path, request).await?;
        parse(path, body)
    }

    /// POST /api/miniapp/feedback.
    pub async fn feedback(&self, payload: &FeedbackPayload) -> Result<SubmitReceipt, ApiError> {
        let path = "/api/miniapp/feedback";
        let request = self.client.post(self.url(path)).json(payload);
        let body = self.send(path, request).await?;
        let mut receipt: SubmitReceipt = parse(path, body)?;
        if receipt.message.is_empty() {
            receipt.message = "Sent".to_string();
        }
        Ok(receipt)
    }

    /// GET /api/miniapp/search-users — autocomplete suggestions.
    pub async fn search_users(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let path = "/api/miniapp/search-users";
        let request = self.client.get(self.url(path)).query(&[("q", query)]);
        let body = self.send(path, request).await?;
        parse_field(path, &body, "items")
    }

    /// GET /api/miniapp/recent-targets — handles the caller rated recently.
    pub async fn recent_targets(&self) -> Result<Vec<String>, ApiError> {
        let path = "/api/miniapp/recent-targets";
        let body = self.send(path, self.client.get(self.url(path))).await?;
        parse_field(path, &body, "items")
    }

    /// POST /api/miniapp/profile-note. Returns the stored note.
    pub async fn set_profile_note(&self, note: &str) -> Result<String, ApiError> {
        let note = validate_profile_note(note)?;
        let path = "/api/miniapp/profile-note";
        let request = self
            .client
            .post(self.url(path))
            .json(&serde_json::json!({ "note": note }));
        let body = self.send(path, request).await?;
        Ok(body
            .get("note")
            .and_then(Value::as_str)
            .unwrap_or(note.as_str())
            .to_string())
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        tracing::debug!(path, "Mini-app API request");

        let resp = request
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout {
                        path: path.to_string(),
                        timeout: self.timeout,
                    }
                } else {
                    ApiError::RequestFailed {
                        path: path.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        // Error pages are not always JSON; treat an unreadable body as empty.
        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(
                    path,
                    status = status.as_u16(),
                    error = %e,
                    "Mini-app API response body is not JSON"
                );
                serde_json::json!({})
            }
        };

        let refused = body.get("ok").and_then(Value::as_bool) == Some(false);
        if !status.is_success() || refused {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            let code = body.get("code").and_then(Value::as_str).map(str::to_string);
            tracing::warn!(path, status = status.as_u16(), %message, "Mini-app API rejected request");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
                code,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ProfileLookup for MiniAppClient {
    async fn lookup_profile(&self, target: &str) -> Result<TargetProfile, ApiError> {
        let data = self.profile(target).await?;
        Ok(data.into_target_profile(target))
    }
}

#[async_trait]
impl FeedbackSubmitter for MiniAppClient {
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<SubmitReceipt, ApiError> {
        self.feedback(payload).await
    }
}

fn require_username(target: &str) -> Result<String, ApiError> {
    normalize_username(target)
        .ok_or_else(|| ApiError::InvalidInput("a valid @username is required".to_string()))
}

fn parse<T: DeserializeOwned>(path: &str, body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::InvalidResponse {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn parse_field<T: DeserializeOwned>(path: &str, body: &Value, key: &str) -> Result<T, ApiError> {
    let value = body.get(key).cloned().ok_or_else(|| ApiError::InvalidResponse {
        path: path.to_string(),
        reason: format!("missing \"{key}\""),
    })?;
    parse(path, value)
}
