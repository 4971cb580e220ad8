//! Backend collaborator for the mini-app.
//!
//! The backend is an opaque HTTP service. This module defines the two
//! seams the answer flow depends on (`ProfileLookup`, `FeedbackSubmitter`)
//! and a `reqwest` client that implements them along with the remaining
//! mini-app endpoints (own profile, insight, search, recent targets,
//! profile note).

pub mod client;
pub mod types;

pub use client::{
    INIT_DATA_HEADER, MAX_PROFILE_NOTE_CHARS, MiniAppClient, avatar_proxy_url, launch_target,
    normalize_username, validate_profile_note,
};
pub use types::{
    Insight, ProfileData, PublicUser, Recommendation, SubmitReceipt, TargetDisplay, TargetProfile,
};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::flow::FeedbackPayload;

/// Resolves display metadata and adaptive questions for a target.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup_profile(&self, target: &str) -> Result<TargetProfile, ApiError>;
}

/// Sends a completed answer flow. Called exactly once per submit attempt.
#[async_trait]
pub trait FeedbackSubmitter: Send + Sync {
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<SubmitReceipt, ApiError>;
}
