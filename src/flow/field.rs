//! Question fields, their binary choice values, and adaptive field-list
//! construction.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One binary-choice question asked about a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Tone,
    Speed,
    ContactFormat,
    Initiative,
    StartContext,
    AttentionReaction,
    Caution,
    Frequency,
    /// Adaptive: extra tone-nuance question.
    CommFormat,
    /// Adaptive: extra uncertainty question.
    Uncertainty,
}

/// Fields asked in every flow, in order.
pub const BASE_FIELDS: [Field; 8] = [
    Field::Tone,
    Field::Speed,
    Field::ContactFormat,
    Field::Initiative,
    Field::StartContext,
    Field::AttentionReaction,
    Field::Caution,
    Field::Frequency,
];

/// Which side of a field's choice pair was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    First,
    Second,
}

impl Field {
    /// Wire name used by the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tone => "tone",
            Self::Speed => "speed",
            Self::ContactFormat => "contact_format",
            Self::Initiative => "initiative",
            Self::StartContext => "start_context",
            Self::AttentionReaction => "attention_reaction",
            Self::Caution => "caution",
            Self::Frequency => "frequency",
            Self::CommFormat => "comm_format",
            Self::Uncertainty => "uncertainty",
        }
    }

    /// The two enumerated wire values, first then second.
    pub fn values(self) -> (&'static str, &'static str) {
        match self {
            Self::Tone => ("easy", "serious"),
            Self::Speed => ("fast", "slow"),
            Self::ContactFormat => ("text", "live"),
            Self::Initiative => ("self", "wait"),
            Self::StartContext => ("topic", "direct"),
            Self::AttentionReaction => ("likes", "careful"),
            Self::Caution => ("false", "true"),
            Self::Frequency => ("often", "rare"),
            Self::CommFormat => ("informal", "reserved"),
            Self::Uncertainty => ("low", "high"),
        }
    }

    /// Wire value for a choice on this field.
    pub fn value(self, choice: Choice) -> &'static str {
        let (first, second) = self.values();
        match choice {
            Choice::First => first,
            Choice::Second => second,
        }
    }

    /// Short card title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Tone => "How to start",
            Self::Speed => "Tempo",
            Self::ContactFormat => "Channel",
            Self::Initiative => "First step",
            Self::StartContext => "Opening context",
            Self::AttentionReaction => "Early reaction",
            Self::Caution => "Pressure",
            Self::Frequency => "Frequency",
            Self::CommFormat => "Tone of conversation",
            Self::Uncertainty => "Uncertainty",
        }
    }

    /// Button labels for the two options.
    pub fn labels(self) -> (&'static str, &'static str) {
        match self {
            Self::Tone => ("🙂 with a joke", "🧠 to the point"),
            Self::Speed => ("🔥 right away", "🐢 no rush"),
            Self::ContactFormat => ("💬 in chat", "🎤 in person"),
            Self::Initiative => ("👉 fine being written to first", "👀 prefers to look around first"),
            Self::StartContext => ("🌱 start light", "🎯 straight to the point"),
            Self::AttentionReaction => ("😊 warms up quickly", "😶 watches first"),
            Self::Caution => ("🫶 can be more active", "⚠️ better be careful"),
            Self::Frequency => ("📬 write often", "🕰 write rarely"),
            Self::CommFormat => ("😄 relaxed", "🤝 reserved"),
            Self::Uncertainty => ("🧭 fine with it", "🚧 better be specific"),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BASE_FIELDS
            .iter()
            .chain([Field::CommFormat, Field::Uncertainty].iter())
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unknown field: {s}"))
    }
}

/// Which optional questions a flow should include.
///
/// Produced by the profile lookup and consumed once when a flow starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveQuestions {
    #[serde(default, alias = "ask_tone_question")]
    pub include_tone_nuance: bool,
    #[serde(default, alias = "ask_uncertainty_question")]
    pub include_uncertainty: bool,
}

impl AdaptiveQuestions {
    pub fn new(include_tone_nuance: bool, include_uncertainty: bool) -> Self {
        Self {
            include_tone_nuance,
            include_uncertainty,
        }
    }
}

/// Base fields followed by whichever adaptive fields are enabled.
pub fn build_field_list(questions: &AdaptiveQuestions) -> Vec<Field> {
    let mut fields = BASE_FIELDS.to_vec();
    if questions.include_tone_nuance {
        fields.push(Field::CommFormat);
    }
    if questions.include_uncertainty {
        fields.push(Field::Uncertainty);
    }
    fields
}
