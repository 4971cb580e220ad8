//! Screen text for the three mini-app tabs.

use crate::api::{Insight, ProfileData, Recommendation};
use crate::flow::{Choice, Field, FlowPhase, FlowState};

/// Mini-app tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Profile,
    Answer,
    Insight,
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::Answer => write!(f, "answer"),
            Self::Insight => write!(f, "insight"),
        }
    }
}

/// "How people usually start talking to you" lines.
pub fn recommendation_lines(rec: &Recommendation) -> Vec<String> {
    let tone = if rec.tone == "easy" {
        "with humor"
    } else {
        "calmly, to the point"
    };
    let speed = if rec.speed == "slow" {
        "without rushing"
    } else {
        "right away"
    };
    let format = if rec.format == "text" {
        "over chat"
    } else {
        "in person"
    };
    vec![
        "How people most often".to_string(),
        "start a conversation with you:".to_string(),
        String::new(),
        format!("👉 {tone}"),
        format!("👉 {speed}"),
        format!("👉 {format}"),
    ]
}

/// The caller's own profile screen.
pub fn render_my_profile(data: &ProfileData) -> String {
    let answers = if data.answers == 0 {
        "🔥 answers — looks like someone has already stopped by".to_string()
    } else {
        format!("🔥 answers — {}", data.answers)
    };

    let mut lines = vec![
        "your link 👇".to_string(),
        data.link.clone(),
        String::new(),
        format!("👀 viewed — {}", data.viewed),
        answers,
        format!("👁 peeked silently — {}", data.silent),
        String::new(),
        "— — —".to_string(),
        String::new(),
    ];

    match (&data.recommendation, data.enough) {
        (Some(rec), true) => {
            lines.extend(recommendation_lines(rec));
            if data.caution_block {
                lines.extend([
                    String::new(),
                    "⚠️ Sometimes people feel tension.".to_string(),
                    "Better not to push; give it time.".to_string(),
                ]);
            }
            if data.uncertain_block {
                lines.extend([
                    String::new(),
                    "Opinions are split on this one —".to_string(),
                    "better read the situation.".to_string(),
                ]);
            }
        }
        _ => lines.extend([
            "Looks like someone has already answered.".to_string(),
            String::new(),
            "A couple more answers are needed".to_string(),
            "to put together a clear picture.".to_string(),
        ]),
    }

    lines.join("\n")
}

/// Insight screen for another user.
pub fn render_insight(insight: &Insight) -> String {
    match (&insight.text, insight.enough) {
        (Some(text), true) => text.clone(),
        _ => "Not enough answers about this person yet.".to_string(),
    }
}

/// Prompt for one revealed question.
pub fn render_question(field: Field, index: usize, total: usize, current: Option<Choice>) -> String {
    let (first, second) = field.labels();
    let mark = |choice: Choice| if current == Some(choice) { "●" } else { "○" };
    format!(
        "[{}/{}] {}\n  {} 1  {}\n  {} 2  {}",
        index + 1,
        total,
        field.title(),
        mark(Choice::First),
        first,
        mark(Choice::Second),
        second
    )
}

/// Every revealed question with its current answer, plus a progress line.
pub fn render_flow(state: &FlowState) -> String {
    let total = state.fields().len();
    let mut blocks: Vec<String> = state
        .revealed_fields()
        .iter()
        .enumerate()
        .map(|(i, f)| render_question(*f, i, total, state.value(*f)))
        .collect();

    let progress = match state.phase() {
        FlowPhase::Idle => "Pick someone to answer about.".to_string(),
        FlowPhase::AwaitingField(_) => format!("{}/{} answered", state.answered_count(), total),
        FlowPhase::ReadyToSubmit => "All set — send it.".to_string(),
        FlowPhase::SubmitFailed => format!(
            "Not sent: {}. Try again.",
            state.submit_error().unwrap_or("unknown error")
        ),
    };
    blocks.push(progress);
    blocks.join("\n\n")
}
