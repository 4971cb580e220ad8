//! Submission payload assembled from a completed flow.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::field::{Choice, Field};

/// Target handle plus every answered field, in field-list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackPayload {
    pub target: String,
    pub entries: Vec<(Field, Choice)>,
}

impl FeedbackPayload {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wire value recorded for `field`, if it is part of the payload.
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(f, c)| f.value(*c))
    }
}

/// Serializes as the flat object the feedback endpoint expects:
/// `{"target": "@x", "tone": "easy", ...}`.
impl Serialize for FeedbackPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        map.serialize_entry("target", &self.target)?;
        for (field, choice) in &self.entries {
            map.serialize_entry(field.as_str(), field.value(*choice))?;
        }
        map.end()
    }
}
