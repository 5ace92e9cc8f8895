//! CSV configuration options

use crate::{CsvError, CsvResult};

/// Configuration for CSV writing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    /// Field delimiter character (default: comma)
    pub delimiter: char,
    /// Quote character for fields containing special characters (default: double quote)
    pub quote_char: char,
    /// Whether to write the column header row (default: true)
    pub has_header: bool,
    /// How to represent missing values in output (default: empty string)
    pub null_representation: NullRepresentation,
    /// Record terminator (default: LF)
    pub record_terminator: RecordTerminator,
}

/// How to represent missing values in CSV output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullRepresentation {
    /// Empty string (default)
    EmptyString,
    /// Custom string representation
    Custom(String),
}

impl NullRepresentation {
    /// Text written in place of a missing value
    pub fn as_str(&self) -> &str {
        match self {
            NullRepresentation::EmptyString => "",
            NullRepresentation::Custom(text) => text,
        }
    }
}

/// Record terminator for writing CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTerminator {
    /// CRLF (Windows-style, RFC 4180)
    CRLF,
    /// LF (Unix-style)
    LF,
}

impl RecordTerminator {
    pub(crate) fn to_csv(self) -> csv::Terminator {
        match self {
            RecordTerminator::CRLF => csv::Terminator::CRLF,
            RecordTerminator::LF => csv::Terminator::Any(b'\n'),
        }
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            has_header: true,
            null_representation: NullRepresentation::EmptyString,
            record_terminator: RecordTerminator::LF,
        }
    }
}

impl CsvConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter character
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character
    pub fn quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Configure header presence
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Disable header row
    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }

    /// Set null representation
    pub fn null_representation(mut self, null_rep: NullRepresentation) -> Self {
        self.null_representation = null_rep;
        self
    }

    /// Set record terminator
    pub fn record_terminator(mut self, terminator: RecordTerminator) -> Self {
        self.record_terminator = terminator;
        self
    }

    /// Delimiter as a single byte for the csv crate
    pub fn delimiter_u8(&self) -> CsvResult<u8> {
        ascii_byte("delimiter", self.delimiter)
    }

    /// Quote character as a single byte for the csv crate
    pub fn quote_char_u8(&self) -> CsvResult<u8> {
        ascii_byte("quote character", self.quote_char)
    }
}

fn ascii_byte(name: &str, c: char) -> CsvResult<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| CsvError::config(format!("{name} '{c}' is not a single ASCII character")))
}
