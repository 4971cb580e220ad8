//! Answer flow — the multi-step questionnaire a user fills in about
//! another user.
//!
//! Questions are revealed one at a time. The set is the fixed base list plus
//! up to two adaptive questions chosen per target by the profile lookup. A
//! completed flow produces a `FeedbackPayload` for the backend.

pub mod controller;
pub mod field;
pub mod gesture;
pub mod payload;
pub mod state;

pub use controller::{AnswerFlow, Begin, LookupTicket, SubmitOutcome};
pub use field::{AdaptiveQuestions, BASE_FIELDS, Choice, Field, build_field_list};
pub use gesture::{SwipeOutcome, SwipeTracker};
pub use payload::FeedbackPayload;
pub use state::{AnswerOutcome, FlowPhase, FlowState, StartOutcome, normalize_target};
