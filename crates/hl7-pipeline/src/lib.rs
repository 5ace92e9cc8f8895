#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # hl7-pipeline
//!
//! Message identity, tabular assembly, joining and orchestration.
//!
//! This crate turns a collection of HL7 v2 messages into a tidy,
//! row-per-segment report: identity locations name each message, report
//! locations are extracted per segment occurrence, and the per-location
//! tables are inner-joined on `(message id, segment index)`.

pub mod assemble;
pub mod config;
pub mod identity;
pub mod join;
pub mod pipeline;

pub use assemble::assemble;
pub use config::{LocationsFile, PipelineConfig, TidyConfig};
pub use identity::build_message_ids;
pub use join::join_tables;
pub use pipeline::{Pipeline, PipelineOutput, PipelineStats, dedupe_messages, tidy_segments};

use std::fmt;
use thiserror::Error;

/// Required pipeline inputs, named in [`Error::EmptyInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    IdentityLocations,
    ReportLocations,
    Messages,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityLocations => write!(f, "identity locations"),
            Self::ReportLocations => write!(f, "report locations"),
            Self::Messages => write!(f, "messages"),
        }
    }
}

/// Errors that can occur in the pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Empty input: no {input} supplied")]
    EmptyInput { input: InputKind },

    #[error("Report locations must address a single segment, found: {}", .segments.join(", "))]
    MixedSegmentReportLocations { segments: Vec<String> },

    #[error(
        "Identity location(s) match more than one segment in a message: {}",
        .locations.join(", ")
    )]
    AmbiguousIdentityField { locations: Vec<String> },

    #[error("Identity location(s) have no value in at least one message: {}", .locations.join(", "))]
    MissingIdentityValue { locations: Vec<String> },

    #[error("Message identities are not unique: {}", .identities.join("; "))]
    DuplicateMessageIdentity { identities: Vec<String> },

    #[error("Segment index {index} overflows when shifted by segment_index_base {base}")]
    SegmentIndexOverflow { index: usize, base: usize },

    #[error(transparent)]
    Location(#[from] hl7_ir::Error),

    #[error(transparent)]
    Message(#[from] hl7_adapter_v2::Error),

    #[error("Configuration error in '{path}': {message}")]
    Config { path: String, message: String },

    #[error("IO error during {operation} for '{path}': {message}")]
    Io {
        operation: String,
        path: String,
        message: String,
    },
}

impl Error {
    /// Create an empty-input error
    pub fn empty_input(input: InputKind) -> Self {
        Self::EmptyInput { input }
    }

    /// Create a configuration error with the config source it came from
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a structured I/O error with operation/path context.
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_names_the_missing_input() {
        let error = Error::empty_input(InputKind::ReportLocations);
        assert_eq!(error.to_string(), "Empty input: no report locations supplied");
    }

    #[test]
    fn list_variants_render_every_entry() {
        let error = Error::MixedSegmentReportLocations {
            segments: vec!["DG1".to_string(), "AL1".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Report locations must address a single segment, found: DG1, AL1"
        );

        let error = Error::DuplicateMessageIdentity {
            identities: vec!["123,A".to_string(), "456,B".to_string()],
        };
        assert!(error.to_string().ends_with("123,A; 456,B"));
    }

    #[test]
    fn location_errors_convert_transparently() {
        let inner = hl7_ir::Error::malformed_location("DG1", "bad");
        let error: Error = inner.clone().into();
        assert_eq!(error.to_string(), inner.to_string());
        assert!(matches!(error, Error::Location(_)));
    }

    #[test]
    fn config_error_preserves_path_context() {
        match Error::config("/tmp/tidy.yaml", "missing field `identity`") {
            Error::Config { path, message } => {
                assert_eq!(path, "/tmp/tidy.yaml");
                assert_eq!(message, "missing field `identity`");
            }
            other => panic!("expected config variant, got {other:?}"),
        }
    }
}
