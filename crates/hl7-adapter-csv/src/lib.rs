//! # hl7-adapter-csv
//!
//! CSV output for tidied HL7 v2 segment tables.
//!
//! ## Example Usage
//!
//! ```rust
//! use hl7_adapter_csv::{CsvConfig, NullRepresentation, TableWriter};
//!
//! let config = CsvConfig::new()
//!     .delimiter(';')
//!     .null_representation(NullRepresentation::Custom("NA".to_string()));
//! let writer = TableWriter::new().with_config(config);
//! ```

pub mod config;
pub mod errors;
pub mod writer;

pub use config::{CsvConfig, NullRepresentation, RecordTerminator};
pub use errors::{CsvError, CsvResult};
pub use writer::TableWriter;

pub use errors::CsvError as Error;
pub type Result<T> = CsvResult<T>;
