//! # hl7-adapter-v2
//!
//! HL7 v2 delimiter handling, segment extraction and message batch splitting.
//!
//! Messages are treated as opaque text: the field and component separators
//! are read from fixed offsets of the header, and every occurrence of a
//! segment is located with a line-anchored regular expression.

pub mod batch;
pub mod extract;
pub mod syntax;

pub use batch::{extract_wrapped, split_messages};
pub use extract::{SegmentMatcher, extract, parse_messages};
pub use syntax::Separators;

use thiserror::Error;

/// Errors that can occur when reading HL7 v2 messages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(
        "Malformed message at index {index}: {length} character(s) is too short to declare field and component separators"
    )]
    MalformedMessage { index: usize, length: usize },

    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

impl Error {
    /// Create a malformed-message error for the message at `index` of a batch
    pub fn malformed_message(index: usize, message: &str) -> Self {
        Self::MalformedMessage {
            index,
            length: message.chars().count(),
        }
    }

    /// Create a pattern compilation error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
