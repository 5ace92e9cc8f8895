#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # hl7-ir
//!
//! Value types shared by the HL7 v2 tidying crates.
//!
//! This crate provides the location grammar used to address a
//! `(segment, field, component)` triple inside a message, the tagged
//! extraction outcome carried through every stage, and the table types
//! produced while reshaping extracted values into a row-per-segment report.

/// Location grammar (`SEG.N` / `SEG.N.M`) and ordered location specifications.
pub mod location;
/// Tagged per-occurrence extraction outcome.
pub mod outcome;
/// Long-form, wide and final report tables.
pub mod table;

/// Parsed location and the ordered location -> column association.
pub use location::{HEADER_SEGMENT, Location, LocationSpec, LocationSpecs};
/// Outcome of extracting one location from one segment occurrence.
pub use outcome::Outcome;
/// Table primitives for assembly, joining and output.
pub use table::{LocationRow, LocationTable, MessageId, TidyRow, TidyTable, WideRow, WideTable};

use thiserror::Error;

/// Errors that can occur when working with locations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed location '{location}': {reason}")]
    MalformedLocation { location: String, reason: String },
}

impl Error {
    /// Build a malformed-location error with the offending text and reason.
    pub fn malformed_location(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedLocation {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for IR operations.
pub type Result<T> = std::result::Result<T, Error>;
