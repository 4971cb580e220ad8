//! Answer-flow state machine — which question is revealed, what has been
//! answered, and whether the flow can be submitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field::{AdaptiveQuestions, Choice, Field, build_field_list};
use super::payload::FeedbackPayload;
use crate::error::ValidationError;
use crate::policy::{PolicyDecision, TargetPolicy};

/// Where a flow currently is.
///
/// Idle → AwaitingField(0) → … → AwaitingField(n-1) → ReadyToSubmit, then
/// either back to Idle (submitted) or SubmitFailed (answers kept, retry or
/// edit allowed). Cancelling or changing target returns to Idle from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    #[default]
    Idle,
    AwaitingField(usize),
    ReadyToSubmit,
    SubmitFailed,
}

impl FlowPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FlowPhase) -> bool {
        use FlowPhase::*;
        match (*self, target) {
            // Cancel / submitted / target change.
            (_, Idle) => !matches!(*self, Idle),
            // A new target restarts from the first field.
            (_, AwaitingField(0)) => true,
            (AwaitingField(i), AwaitingField(j)) => j == i + 1,
            (AwaitingField(_), ReadyToSubmit) => true,
            (ReadyToSubmit, SubmitFailed) => true,
            (SubmitFailed, SubmitFailed) => true,
            (SubmitFailed, ReadyToSubmit) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingField(i) => write!(f, "awaiting_field:{i}"),
            Self::ReadyToSubmit => write!(f, "ready_to_submit"),
            Self::SubmitFailed => write!(f, "submit_failed"),
        }
    }
}

/// Result of `FlowState::start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Target normalized to nothing; state is idle.
    Cleared,
    /// Same target already in progress; nothing changed.
    Unchanged,
    /// Fresh flow for a new target, first field revealed.
    Started,
}

/// Result of `FlowState::answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Field unknown to this flow or not yet revealed; state untouched.
    Rejected,
    /// An already-answered field was changed; cursor untouched.
    Updated,
    /// The revealed field was answered and the next one is now revealed.
    Advanced { next: usize },
    /// The last field was answered; the flow is ready to submit.
    Completed,
}

/// Normalize a free-form target into a `@handle`. `None` if nothing remains.
pub fn normalize_target(raw: &str) -> Option<String> {
    let name = raw.trim().trim_start_matches('@').trim().to_lowercase();
    if name.is_empty() {
        None
    } else {
        Some(format!("@{name}"))
    }
}

/// State of one answer flow.
#[derive(Debug, Clone, Default)]
pub struct FlowState {
    target: Option<String>,
    fields: Vec<Field>,
    /// Highest field index unlocked for input; `None` while idle.
    cursor: Option<usize>,
    answers: BTreeMap<Field, Choice>,
    ready: bool,
    submit_error: Option<String>,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a flow for `raw_target` with the given adaptive questions.
    pub fn start(&mut self, raw_target: &str, questions: &AdaptiveQuestions) -> StartOutcome {
        let Some(target) = normalize_target(raw_target) else {
            self.reset();
            return StartOutcome::Cleared;
        };

        if self.target.as_deref() == Some(target.as_str()) && self.cursor.is_some() {
            return StartOutcome::Unchanged;
        }

        let before = self.phase();
        self.reset();
        self.fields = build_field_list(questions);
        self.target = Some(target);
        self.cursor = Some(0);
        self.check_transition(before);
        StartOutcome::Started
    }

    /// Record `choice` for `field`.
    ///
    /// Fields at or before the cursor may be re-answered at any time. An edit
    /// never re-locks or re-validates later fields.
    pub fn answer(&mut self, field: Field, choice: Choice) -> AnswerOutcome {
        let Some(cursor) = self.cursor else {
            return AnswerOutcome::Rejected;
        };
        let Some(index) = self.index_of(field) else {
            return AnswerOutcome::Rejected;
        };
        if index > cursor {
            return AnswerOutcome::Rejected;
        }

        let before = self.phase();
        self.answers.insert(field, choice);
        self.submit_error = None;

        let next = cursor + 1;
        let outcome = if index != cursor || self.ready {
            AnswerOutcome::Updated
        } else if next < self.fields.len() {
            self.cursor = Some(next);
            AnswerOutcome::Advanced { next }
        } else {
            self.ready = true;
            AnswerOutcome::Completed
        };
        self.check_transition(before);
        outcome
    }

    /// Validate the flow and assemble the payload. Never mutates state.
    ///
    /// Checks run in order: target present, target allowed by policy, every
    /// field answered.
    pub fn try_submit(&self, policy: &TargetPolicy) -> Result<FeedbackPayload, ValidationError> {
        let target = self
            .target
            .as_deref()
            .ok_or(ValidationError::TargetRequired)?;

        if let PolicyDecision::Block { reason } = policy.check(target) {
            return Err(ValidationError::TargetNotRatable { reason });
        }

        let missing = self.unanswered().count();
        if missing > 0 {
            return Err(ValidationError::Incomplete { missing });
        }

        let entries = self
            .fields
            .iter()
            .filter_map(|f| self.answers.get(f).map(|c| (*f, *c)))
            .collect();

        Ok(FeedbackPayload {
            target: target.to_string(),
            entries,
        })
    }

    /// The backend accepted the submission; the flow is over.
    pub fn mark_submitted(&mut self) {
        self.reset();
    }

    /// The backend refused the submission; answers stay for a retry.
    pub fn mark_submit_failed(&mut self, message: impl Into<String>) {
        let before = self.phase();
        if self.cursor.is_some() {
            self.submit_error = Some(message.into());
        }
        self.check_transition(before);
    }

    /// Drop everything and return to idle.
    pub fn reset(&mut self) {
        let before = self.phase();
        *self = Self::default();
        self.check_transition(before);
    }

    pub fn phase(&self) -> FlowPhase {
        match self.cursor {
            None => FlowPhase::Idle,
            Some(_) if self.ready && self.submit_error.is_some() => FlowPhase::SubmitFailed,
            Some(_) if self.ready => FlowPhase::ReadyToSubmit,
            Some(i) => FlowPhase::AwaitingField(i),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn value(&self, field: Field) -> Option<Choice> {
        self.answers.get(&field).copied()
    }

    /// Field waiting for its first answer, if any.
    pub fn current_field(&self) -> Option<Field> {
        if self.ready {
            return None;
        }
        self.cursor.and_then(|i| self.fields.get(i).copied())
    }

    /// Fields shown to the user so far (up to and including the cursor).
    pub fn revealed_fields(&self) -> &[Field] {
        match self.cursor {
            Some(i) => &self.fields[..=i.min(self.fields.len().saturating_sub(1))],
            None => &[],
        }
    }

    pub fn answered_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| self.answers.contains_key(f))
            .count()
    }

    fn unanswered(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !self.answers.contains_key(f))
    }

    fn index_of(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Every phase change must be an edge of `FlowPhase::can_transition_to`.
    fn check_transition(&self, before: FlowPhase) {
        let after = self.phase();
        debug_assert!(
            before == after || before.can_transition_to(after),
            "invalid flow transition {before} -> {after}"
        );
        if before != after {
            tracing::trace!(from = %before, to = %after, "Flow phase changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::field::BASE_FIELDS;

    fn started(target: &str, questions: AdaptiveQuestions) -> FlowState {
        let mut state = FlowState::new();
        assert_eq!(state.start(target, &questions), StartOutcome::Started);
        state
    }

    fn answer_all(state: &mut FlowState) {
        while let Some(field) = state.current_field() {
            state.answer(field, Choice::First);
        }
    }

    #[test]
    fn normalizes_targets() {
        assert_eq!(normalize_target("  Alice "), Some("@alice".to_string()));
        assert_eq!(normalize_target("@Bob"), Some("@bob".to_string()));
        assert_eq!(normalize_target("@@carol"), Some("@carol".to_string()));
        assert_eq!(normalize_target("   "), None);
        assert_eq!(normalize_target("@"), None);
    }

    #[test]
    fn start_with_empty_target_goes_idle() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        state.answer(Field::Tone, Choice::First);

        assert_eq!(state.start("  @ ", &AdaptiveQuestions::default()), StartOutcome::Cleared);
        assert_eq!(state.phase(), FlowPhase::Idle);
        assert!(state.target().is_none());
        assert!(state.fields().is_empty());
    }

    #[test]
    fn start_same_target_is_noop() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        state.answer(Field::Tone, Choice::Second);
        state.answer(Field::Speed, Choice::First);

        let outcome = state.start("ALICE", &AdaptiveQuestions::new(true, true));
        assert_eq!(outcome, StartOutcome::Unchanged);
        assert_eq!(state.value(Field::Tone), Some(Choice::Second));
        assert_eq!(state.cursor(), Some(2));
        // Descriptor of the redundant trigger is ignored.
        assert_eq!(state.fields().len(), 8);
    }

    #[test]
    fn start_new_target_discards_answers() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        state.answer(Field::Tone, Choice::Second);

        let outcome = state.start("@bob", &AdaptiveQuestions::new(false, true));
        assert_eq!(outcome, StartOutcome::Started);
        assert_eq!(state.target(), Some("@bob"));
        assert_eq!(state.value(Field::Tone), None);
        assert_eq!(state.cursor(), Some(0));
        assert_eq!(state.fields().len(), 9);
    }

    #[test]
    fn answering_cursor_field_advances_by_one() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        assert_eq!(
            state.answer(Field::Tone, Choice::First),
            AnswerOutcome::Advanced { next: 1 }
        );
        assert_eq!(state.cursor(), Some(1));
        assert_eq!(state.current_field(), Some(Field::Speed));
        assert_eq!(state.revealed_fields(), &[Field::Tone, Field::Speed]);
    }

    #[test]
    fn answering_unrevealed_field_is_rejected() {
        let mut state = started("@alice", AdaptiveQuestions::new(true, true));
        let before = (state.cursor(), state.answered_count());

        assert_eq!(state.answer(Field::Caution, Choice::First), AnswerOutcome::Rejected);
        assert_eq!(state.answer(Field::Uncertainty, Choice::First), AnswerOutcome::Rejected);
        assert_eq!((state.cursor(), state.answered_count()), before);
        assert_eq!(state.value(Field::Caution), None);
    }

    #[test]
    fn answering_field_outside_list_is_rejected() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        answer_all(&mut state);
        assert_eq!(state.answer(Field::CommFormat, Choice::First), AnswerOutcome::Rejected);
        assert_eq!(state.value(Field::CommFormat), None);
    }

    #[test]
    fn answering_while_idle_is_rejected() {
        let mut state = FlowState::new();
        assert_eq!(state.answer(Field::Tone, Choice::First), AnswerOutcome::Rejected);
        assert_eq!(state.phase(), FlowPhase::Idle);
    }

    #[test]
    fn reanswer_changes_only_that_value() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        state.answer(Field::Tone, Choice::First);
        state.answer(Field::Speed, Choice::First);
        state.answer(Field::ContactFormat, Choice::Second);

        assert_eq!(state.answer(Field::Speed, Choice::Second), AnswerOutcome::Updated);
        assert_eq!(state.cursor(), Some(3));
        assert_eq!(state.value(Field::Speed), Some(Choice::Second));
        assert_eq!(state.value(Field::Tone), Some(Choice::First));
        assert_eq!(state.value(Field::ContactFormat), Some(Choice::Second));
    }

    #[test]
    fn last_field_marks_ready() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        for field in &BASE_FIELDS[..7] {
            state.answer(*field, Choice::First);
        }
        assert_eq!(state.phase(), FlowPhase::AwaitingField(7));
        assert_eq!(state.answer(Field::Frequency, Choice::Second), AnswerOutcome::Completed);
        assert_eq!(state.phase(), FlowPhase::ReadyToSubmit);
        assert_eq!(state.cursor(), Some(7));
        assert!(state.current_field().is_none());

        // Re-answering the last field is an edit, not another completion.
        assert_eq!(state.answer(Field::Frequency, Choice::First), AnswerOutcome::Updated);
    }

    #[test]
    fn submit_without_target() {
        let state = FlowState::new();
        assert_eq!(
            state.try_submit(&TargetPolicy::default()),
            Err(ValidationError::TargetRequired)
        );
    }

    #[test]
    fn disallowed_target_rejected_before_completeness() {
        let state = started("@weatherbot", AdaptiveQuestions::default());
        let err = state.try_submit(&TargetPolicy::default()).unwrap_err();
        assert!(matches!(err, ValidationError::TargetNotRatable { .. }));
    }

    #[test]
    fn incomplete_regardless_of_which_field_is_missing() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        assert_eq!(
            state.try_submit(&TargetPolicy::default()),
            Err(ValidationError::Incomplete { missing: 8 })
        );

        for field in &BASE_FIELDS[..5] {
            state.answer(*field, Choice::Second);
        }
        assert_eq!(
            state.try_submit(&TargetPolicy::default()),
            Err(ValidationError::Incomplete { missing: 3 })
        );
        // Validation does not touch state.
        assert_eq!(state.cursor(), Some(5));
    }

    #[test]
    fn base_flow_payload_has_eight_entries() {
        let mut state = started("@alice", AdaptiveQuestions::new(false, false));
        assert_eq!(state.fields(), &BASE_FIELDS);
        answer_all(&mut state);

        let payload = state.try_submit(&TargetPolicy::default()).unwrap();
        assert_eq!(payload.target, "@alice");
        assert_eq!(payload.len(), 8);
        assert!(payload.get(Field::CommFormat).is_none());
        assert!(payload.get(Field::Uncertainty).is_none());
    }

    #[test]
    fn adaptive_flow_needs_uncertainty_answer() {
        let mut state = started("@alice", AdaptiveQuestions::new(true, true));
        assert_eq!(state.fields().len(), 10);
        assert_eq!(&state.fields()[8..], &[Field::CommFormat, Field::Uncertainty]);

        for field in state.fields()[..9].to_vec() {
            state.answer(field, Choice::First);
        }
        assert_eq!(state.current_field(), Some(Field::Uncertainty));
        assert_eq!(
            state.try_submit(&TargetPolicy::default()),
            Err(ValidationError::Incomplete { missing: 1 })
        );

        state.answer(Field::Uncertainty, Choice::Second);
        let payload = state.try_submit(&TargetPolicy::default()).unwrap();
        assert_eq!(payload.len(), 10);
        assert_eq!(payload.get(Field::Uncertainty), Some("high"));
        assert_eq!(payload.entries.last().map(|(f, _)| *f), Some(Field::Uncertainty));
    }

    #[test]
    fn submit_failure_keeps_answers_and_edit_clears_it() {
        let mut state = started("@alice", AdaptiveQuestions::default());
        answer_all(&mut state);

        state.mark_submit_failed("timeout");
        assert_eq!(state.phase(), FlowPhase::SubmitFailed);
        assert_eq!(state.submit_error(), Some("timeout"));
        assert_eq!(state.answered_count(), 8);
        assert!(state.try_submit(&TargetPolicy::default()).is_ok());

        state.answer(Field::Tone, Choice::Second);
        assert_eq!(state.phase(), FlowPhase::ReadyToSubmit);

        state.mark_submitted();
        assert_eq!(state.phase(), FlowPhase::Idle);
        assert!(state.target().is_none());
    }

    #[test]
    fn valid_transitions() {
        use FlowPhase::*;
        let transitions = [
            (Idle, AwaitingField(0)),
            (AwaitingField(0), AwaitingField(1)),
            (AwaitingField(7), ReadyToSubmit),
            (ReadyToSubmit, Idle),
            (ReadyToSubmit, SubmitFailed),
            (SubmitFailed, ReadyToSubmit),
            (SubmitFailed, Idle),
            (AwaitingField(3), Idle),
            (ReadyToSubmit, AwaitingField(0)),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn observed_phase_changes_follow_table() {
        let mut state = FlowState::new();
        let mut phases = vec![state.phase()];
        let mut record = |state: &FlowState| phases.push(state.phase());

        state.start("@alice", &AdaptiveQuestions::new(true, false));
        record(&state);
        while let Some(field) = state.current_field() {
            state.answer(field, Choice::First);
            record(&state);
        }
        state.mark_submit_failed("busy");
        record(&state);
        state.mark_submit_failed("busy again");
        record(&state);
        state.answer(Field::Speed, Choice::Second);
        record(&state);
        state.start("@bob", &AdaptiveQuestions::default());
        record(&state);
        state.answer(Field::Tone, Choice::Second);
        record(&state);
        state.reset();
        record(&state);

        assert_eq!(phases.len(), 17);
        for pair in phases.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            assert!(
                from == to || from.can_transition_to(to),
                "{from} -> {to} is not in the table"
            );
        }
        assert!(phases.contains(&FlowPhase::SubmitFailed));
    }

    #[test]
    fn invalid_transitions() {
        use FlowPhase::*;
        assert!(!Idle.can_transition_to(Idle));
        assert!(!Idle.can_transition_to(AwaitingField(2)));
        assert!(!Idle.can_transition_to(ReadyToSubmit));
        assert!(!AwaitingField(1).can_transition_to(AwaitingField(3)));
        assert!(!AwaitingField(3).can_transition_to(AwaitingField(2)));
        assert!(!AwaitingField(3).can_transition_to(SubmitFailed));
    }

    #[test]
    fn display() {
        assert_eq!(FlowPhase::Idle.to_string(), "idle");
        assert_eq!(FlowPhase::AwaitingField(4).to_string(), "awaiting_field:4");
        assert_eq!(FlowPhase::ReadyToSubmit.to_string(), "ready_to_submit");
        assert_eq!(
            serde_json::to_string(&FlowPhase::SubmitFailed).unwrap(),
            "\"submit_failed\""
        );
    }
}
