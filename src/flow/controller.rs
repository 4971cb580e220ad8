//! AnswerFlow — drives a `FlowState` against the profile lookup and the
//! feedback submitter.
//!
//! Initialization is split in two so a UI event loop can interleave it:
//! `begin` decides synchronously whether a lookup is needed and hands out a
//! ticket; `resolve` applies the lookup result only if that ticket still
//! belongs to the current flow. `open` does both for callers that can
//! simply await.

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::field::{AdaptiveQuestions, Choice, Field};
use super::gesture::{SwipeOutcome, SwipeTracker};
use super::payload::FeedbackPayload;
use super::state::{AnswerOutcome, FlowPhase, FlowState, StartOutcome, normalize_target};
use crate::api::{FeedbackSubmitter, ProfileLookup, SubmitReceipt, TargetDisplay, TargetProfile};
use crate::error::{ApiError, ValidationError};
use crate::policy::TargetPolicy;

/// Identifies one pending profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub flow_id: Uuid,
    pub target: String,
}

/// Result of `AnswerFlow::begin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Begin {
    /// Target was empty; the flow is idle.
    Cleared,
    /// Target already in progress (or already being looked up).
    Unchanged,
    /// Look the target up, then pass the result to `resolve`.
    Lookup(LookupTicket),
}

/// Result of `AnswerFlow::submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(ValidationError),
    /// Backend accepted; the flow is back to idle.
    Sent(SubmitReceipt),
    /// Backend refused or was unreachable; answers are kept.
    Failed(String),
}

/// Answer-flow controller.
pub struct AnswerFlow {
    state: FlowState,
    policy: TargetPolicy,
    swipe: SwipeTracker,
    display: Option<TargetDisplay>,
    flow_id: Option<Uuid>,
    pending_target: Option<String>,
    status: Option<String>,
}

impl AnswerFlow {
    pub fn new(policy: TargetPolicy, swipe: SwipeTracker) -> Self {
        Self {
            state: FlowState::new(),
            policy,
            swipe,
            display: None,
            flow_id: None,
            pending_target: None,
            status: None,
        }
    }

    /// Decide whether `raw_target` needs a fresh flow.
    pub fn begin(&mut self, raw_target: &str) -> Begin {
        let Some(target) = normalize_target(raw_target) else {
            self.cancel();
            return Begin::Cleared;
        };

        let in_progress = self.state.target() == Some(target.as_str()) && self.state.cursor().is_some();
        let loading = self.pending_target.as_deref() == Some(target.as_str());
        if in_progress || loading {
            debug!(handle = %target, "Answer flow already open for target");
            return Begin::Unchanged;
        }

        self.cancel();
        let flow_id = Uuid::new_v4();
        self.flow_id = Some(flow_id);
        self.pending_target = Some(target.clone());
        self.status = Some("Loading…".to_string());
        debug!(handle = %target, %flow_id, "Looking up answer target");
        Begin::Lookup(LookupTicket { flow_id, target })
    }

    /// Apply a profile lookup. Returns false if the ticket is stale.
    ///
    /// A failed lookup is not fatal: the flow starts with the base questions
    /// and the handle as display name.
    pub fn resolve(
        &mut self,
        ticket: LookupTicket,
        result: Result<TargetProfile, ApiError>,
    ) -> bool {
        if self.flow_id != Some(ticket.flow_id) {
            debug!(handle = %ticket.target, "Discarding stale profile lookup");
            return false;
        }

        let (display, questions) = match result {
            Ok(profile) => (profile.display, profile.adaptive_questions),
            Err(e) => {
                warn!(handle = %ticket.target, error = %e, "Profile lookup failed, using handle");
                (
                    TargetDisplay::from_handle(&ticket.target),
                    AdaptiveQuestions::default(),
                )
            }
        };

        self.state.start(&ticket.target, &questions);
        self.display = Some(display);
        self.pending_target = None;
        self.status = None;
        info!(
            handle = %ticket.target,
            fields = self.state.fields().len(),
            "Answer flow started"
        );
        true
    }

    /// `begin` + lookup + `resolve`.
    pub async fn open(&mut self, raw_target: &str, lookup: &dyn ProfileLookup) -> StartOutcome {
        match self.begin(raw_target) {
            Begin::Cleared => StartOutcome::Cleared,
            Begin::Unchanged => StartOutcome::Unchanged,
            Begin::Lookup(ticket) => {
                let result = lookup.lookup_profile(&ticket.target).await;
                self.resolve(ticket, result);
                StartOutcome::Started
            }
        }
    }

    /// Tap input.
    pub fn answer(&mut self, field: Field, choice: Choice) -> AnswerOutcome {
        let outcome = self.state.answer(field, choice);
        match outcome {
            AnswerOutcome::Rejected => debug!(field = %field, "Answer rejected"),
            AnswerOutcome::Completed => {
                self.status = None;
                info!(handle = ?self.state.target(), "All questions answered");
            }
            _ => self.status = None,
        }
        outcome
    }

    /// Pointer down on the currently revealed question.
    pub fn swipe_start(&mut self, x: f32) -> bool {
        match self.state.current_field() {
            Some(field) => {
                self.swipe.begin(field, x);
                true
            }
            None => false,
        }
    }

    /// Pointer moved; returns the visual offset.
    pub fn swipe_move(&mut self, x: f32) -> f32 {
        self.swipe.drag(x)
    }

    /// Pointer up. `None` when the gesture was too short to count, or when
    /// the question it started on is no longer the revealed one.
    pub fn swipe_end(&mut self) -> Option<AnswerOutcome> {
        match self.swipe.release() {
            SwipeOutcome::Answer { field, choice } if self.state.current_field() == Some(field) => {
                Some(self.answer(field, choice))
            }
            SwipeOutcome::Answer { field, .. } => {
                debug!(field = %field, "Swipe ended on a question that moved on");
                None
            }
            SwipeOutcome::Cancelled => None,
        }
    }

    /// Validate and build the payload without sending it.
    pub fn try_submit(&self) -> Result<FeedbackPayload, ValidationError> {
        self.state.try_submit(&self.policy)
    }

    /// Validate, then send once through `submitter`.
    pub async fn submit(&mut self, submitter: &dyn FeedbackSubmitter) -> SubmitOutcome {
        let payload = match self.try_submit() {
            Ok(payload) => payload,
            Err(e) => {
                self.status = Some(e.to_string());
                return SubmitOutcome::Invalid(e);
            }
        };

        self.status = Some("Sending…".to_string());
        match submitter.submit_feedback(&payload).await {
            Ok(receipt) => {
                info!(handle = %payload.target, result = %receipt.result, "Feedback submitted");
                self.reset_flow();
                self.status = Some(receipt.message.clone());
                SubmitOutcome::Sent(receipt)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    handle = %payload.target,
                    error = %message,
                    code = ?e.code(),
                    "Feedback submission failed"
                );
                self.state.mark_submit_failed(message.clone());
                self.status = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Explicit cancellation; back to idle.
    pub fn cancel(&mut self) {
        self.reset_flow();
        self.status = None;
    }

    fn reset_flow(&mut self) {
        self.state.reset();
        self.swipe.cancel();
        self.display = None;
        self.flow_id = None;
        self.pending_target = None;
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn phase(&self) -> FlowPhase {
        self.state.phase()
    }

    pub fn display(&self) -> Option<&TargetDisplay> {
        self.display.as_ref()
    }

    pub fn swipe_threshold(&self) -> f32 {
        self.swipe.threshold()
    }

    pub fn policy(&self) -> &TargetPolicy {
        &self.policy
    }

    /// Inline status text for the presentation layer.
    pub fn status_line(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_target.is_some()
    }
}

impl Default for AnswerFlow {
    fn default() -> Self {
        Self::new(TargetPolicy::default(), SwipeTracker::default())
    }
}
