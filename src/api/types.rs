//! Response types for the mini-app backend.

use serde::{Deserialize, Serialize};

use super::client::avatar_proxy_url;
use crate::flow::AdaptiveQuestions;

/// Display metadata for a rated target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDisplay {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl TargetDisplay {
    /// Fallback when the lookup fails: the handle itself, no avatar.
    pub fn from_handle(handle: &str) -> Self {
        Self {
            name: handle.to_string(),
            avatar_url: None,
        }
    }
}

/// What the profile lookup yields for an answer flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProfile {
    pub display: TargetDisplay,
    pub adaptive_questions: AdaptiveQuestions,
}

/// Public user record embedded in profile responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicUser {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub app_user: bool,
}

impl PublicUser {
    /// "First Last", or `@username` when neither name is known.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            format!("@{}", self.username.trim_start_matches('@'))
        } else {
            full.to_string()
        }
    }
}

/// Majority picks across answers: `tone` easy|serious, `speed` fast|slow,
/// `format` text|live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tone: String,
    pub speed: String,
    pub format: String,
}

/// Aggregated profile data (own profile or another user's).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub viewed: u64,
    #[serde(default)]
    pub answers: u64,
    #[serde(default)]
    pub silent: u64,
    #[serde(default)]
    pub enough: bool,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
    #[serde(default)]
    pub caution_block: bool,
    #[serde(default)]
    pub uncertain_block: bool,
    #[serde(default)]
    pub adaptive_questions: AdaptiveQuestions,
    #[serde(default)]
    pub user: Option<PublicUser>,
    #[serde(default)]
    pub profile_note: Option<String>,
}

impl ProfileData {
    /// Reduce to what an answer flow needs.
    pub fn into_target_profile(self, fallback_handle: &str) -> TargetProfile {
        let display = match &self.user {
            Some(user) => TargetDisplay {
                name: user.display_name(),
                avatar_url: user.avatar_url.clone().or_else(|| {
                    (!user.username.trim().is_empty()).then(|| avatar_proxy_url(&user.username))
                }),
            },
            None => TargetDisplay::from_handle(fallback_handle),
        };
        TargetProfile {
            display,
            adaptive_questions: self.adaptive_questions,
        }
    }
}

/// Insight lookup result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(default)]
    pub enough: bool,
    #[serde(default)]
    pub text: Option<String>,
}

/// Successful feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// `inserted` or `updated`.
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_backend_shape() {
        let data: ProfileData = serde_json::from_value(serde_json::json!({
            "target": "@alice",
            "viewed": 14,
            "answers": 4,
            "silent": 10,
            "enough": true,
            "recommendation": {"tone": "easy", "speed": "slow", "format": "text"},
            "caution_block": true,
            "uncertain_block": false,
            "adaptive_questions": {"ask_tone_question": true, "ask_uncertainty_question": false},
            "user": {"id": 7, "username": "alice", "first_name": "Alice", "last_name": "",
                     "avatar_url": "/api/miniapp/avatar?username=alice", "app_user": true},
            "extra_hint": "ignored"
        }))
        .unwrap();

        assert!(data.enough);
        assert_eq!(data.recommendation.as_ref().unwrap().speed, "slow");

        let profile = data.into_target_profile("@alice");
        assert_eq!(profile.display.name, "Alice");
        assert!(profile.adaptive_questions.include_tone_nuance);
        assert!(!profile.adaptive_questions.include_uncertainty);
    }

    #[test]
    fn missing_user_falls_back_to_handle() {
        let data: ProfileData = serde_json::from_str("{}").unwrap();
        let profile = data.into_target_profile("@ghost");
        assert_eq!(profile.display, TargetDisplay::from_handle("@ghost"));
        assert_eq!(profile.adaptive_questions, AdaptiveQuestions::default());
    }

    #[test]
    fn user_without_avatar_gets_proxy_path() {
        let data: ProfileData = serde_json::from_value(serde_json::json!({
            "user": {"username": "Bob_B", "first_name": "Bob"}
        }))
        .unwrap();
        let profile = data.into_target_profile("@bob_b");
        assert_eq!(profile.display.name, "Bob");
        assert_eq!(
            profile.display.avatar_url.as_deref(),
            Some("/api/miniapp/avatar?username=bob_b")
        );
    }

    #[test]
    fn display_name_without_names() {
        let user = PublicUser {
            username: "bob".to_string(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "@bob");
    }
}
