//! CSV writer for tidy tables

use crate::config::CsvConfig;
use crate::Result;
use hl7_ir::TidyTable;
use std::io::Write;
use tracing::{debug, trace};

/// Writes a [`TidyTable`] as CSV
#[derive(Debug, Clone, Default)]
pub struct TableWriter {
    config: CsvConfig,
}

impl TableWriter {
    /// Create a new writer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given configuration
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    /// Get configuration
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Write the table, header first when configured.
    ///
    /// Missing values and the segment index of a segment-absent row are
    /// written as the configured null representation.
    pub fn write<W: Write>(&self, writer: W, table: &TidyTable) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter_u8()?)
            .quote(self.config.quote_char_u8()?)
            .terminator(self.config.record_terminator.to_csv())
            .from_writer(writer);

        if self.config.has_header {
            csv_writer.write_record(&table.columns)?;
        }

        let records = table.to_records(self.config.null_representation.as_str());
        for record in &records {
            csv_writer.write_record(record)?;
            trace!(?record, "Wrote CSV row");
        }

        csv_writer.flush()?;
        debug!(
            columns = table.columns.len(),
            record_count = records.len(),
            "Finished writing CSV"
        );
        Ok(())
    }
}
