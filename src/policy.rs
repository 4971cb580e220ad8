//! Target policy — decides which handles may be rated at all.
//!
//! The only rule today is a suffix match on the handle (automated accounts
//! end in `bot`). The suffix list is configuration, not code.

use serde::{Deserialize, Serialize};

/// Default suffixes that mark a handle as not ratable.
pub const DEFAULT_DISALLOWED_SUFFIXES: &[&str] = &["bot"];

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Block { reason: String },
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Rules applied to a target before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetPolicy {
    /// Lowercase suffixes; a handle ending in any of them is blocked.
    pub disallowed_suffixes: Vec<String>,
}

impl TargetPolicy {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            disallowed_suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Check a (normalized or raw) target handle.
    pub fn check(&self, target: &str) -> PolicyDecision {
        let username = target.trim().trim_start_matches('@').to_lowercase();
        match self
            .disallowed_suffixes
            .iter()
            .find(|suffix| username.ends_with(suffix.as_str()))
        {
            Some(suffix) => PolicyDecision::Block {
                reason: format!("handles ending in \"{suffix}\" are automated accounts"),
            },
            None => PolicyDecision::Allow,
        }
    }
}

impl Default for TargetPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DISALLOWED_SUFFIXES.iter().copied())
    }
}
