//! Extraction outcomes

use serde::Serialize;

/// Result of extracting one location from one segment occurrence
///
/// `SegmentAbsent` only ever appears as the single outcome for a message
/// that has no occurrence of the addressed segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Segment present with a non-empty value at the location
    Present(String),

    /// Segment present but the field or component is absent or empty
    FieldMissing,

    /// The message has no occurrence of the segment
    SegmentAbsent,
}

impl Outcome {
    /// Classify a raw split result; empty text counts as missing.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if !value.is_empty() => Outcome::Present(value.to_string()),
            _ => Outcome::FieldMissing,
        }
    }

    /// Take the extracted value, if any
    pub fn into_value(self) -> Option<String> {
        match self {
            Outcome::Present(value) => Some(value),
            Outcome::FieldMissing | Outcome::SegmentAbsent => None,
        }
    }

    pub fn is_segment_absent(&self) -> bool {
        matches!(self, Outcome::SegmentAbsent)
    }
}
