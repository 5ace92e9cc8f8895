//! Pipeline orchestration
//!
//! Drives a tidy run end to end:
//! validate → de-duplicate → identify → extract → assemble → join → prune →
//! sort → split identity → rename.

use std::collections::HashSet;

use hl7_adapter_v2::parse_messages;
use hl7_ir::{LocationSpecs, TidyRow, TidyTable};
use tracing::{debug, info, warn};

use crate::assemble::assemble;
use crate::config::PipelineConfig;
use crate::identity::build_message_ids;
use crate::join::join_tables;
use crate::{Error, InputKind, Result};

/// Main pipeline for tidying message segments
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

/// Row and message counts collected during one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    /// Messages supplied by the caller
    pub messages_in: usize,
    /// Messages left after removing exact-text duplicates
    pub messages_unique: usize,
    /// Rows across all per-location tables
    pub rows_assembled: usize,
    /// Rows after the inner join
    pub rows_joined: usize,
    /// Rows dropped because every reported value was missing
    pub rows_pruned: usize,
    /// Rows in the final table
    pub rows_out: usize,
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: TidyTable,
    pub stats: PipelineStats,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Create a pipeline with default configuration
    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Tidy `messages` into one row per reported segment occurrence.
    ///
    /// All report locations must address the same segment. Nothing is
    /// returned on failure: every error aborts the whole run.
    pub fn run<S: AsRef<str>>(
        &self,
        identity: &LocationSpecs,
        report: &LocationSpecs,
        messages: &[S],
    ) -> Result<PipelineOutput> {
        validate(identity, report, messages)?;

        let mut stats = PipelineStats {
            messages_in: messages.len(),
            ..Default::default()
        };

        let unique = dedupe_messages(messages);
        stats.messages_unique = unique.len();
        if stats.messages_unique < stats.messages_in {
            warn!(
                dropped = stats.messages_in - stats.messages_unique,
                "Dropped duplicate messages"
            );
        }

        let ids = build_message_ids(identity, &unique, &self.config.identity_separator)?;

        let mut tables = Vec::with_capacity(report.len());
        for spec in report {
            let results = parse_messages(&spec.location, &unique)?;
            let table = assemble(&spec.column, results, &ids);
            stats.rows_assembled += table.len();
            tables.push(table);
        }

        let mut wide = join_tables(tables);
        stats.rows_joined = wide.len();

        stats.rows_pruned = wide.prune_empty_rows();
        wide.sort_by_message();

        let base = self.config.segment_index_base;
        let rows = wide
            .rows
            .into_iter()
            .map(|row| {
                let segment_index = row
                    .segment_index
                    .map(|index| {
                        index
                            .checked_add(base)
                            .ok_or(Error::SegmentIndexOverflow { index, base })
                    })
                    .transpose()?;
                Ok(TidyRow {
                    ids: row.message_id.parts().to_vec(),
                    segment_index,
                    values: row.values,
                })
            })
            .collect::<Result<Vec<TidyRow>>>()?;
        stats.rows_out = rows.len();

        let mut columns = identity.columns();
        columns.push(self.config.segment_column.clone());
        columns.extend(report.columns());

        debug!(
            messages_in = stats.messages_in,
            messages_unique = stats.messages_unique,
            rows_assembled = stats.rows_assembled,
            rows_joined = stats.rows_joined,
            rows_pruned = stats.rows_pruned,
            rows_out = stats.rows_out,
            "Pipeline stats"
        );
        info!(
            messages = stats.messages_unique,
            rows = stats.rows_out,
            "Tidied message segments"
        );

        Ok(PipelineOutput {
            table: TidyTable {
                columns,
                identity_width: identity.len(),
                rows,
            },
            stats,
        })
    }
}

/// Tidy message segments with the default configuration.
pub fn tidy_segments<S: AsRef<str>>(
    identity: &LocationSpecs,
    report: &LocationSpecs,
    messages: &[S],
) -> Result<TidyTable> {
    Pipeline::with_defaults()
        .run(identity, report, messages)
        .map(|output| output.table)
}

fn validate<S: AsRef<str>>(
    identity: &LocationSpecs,
    report: &LocationSpecs,
    messages: &[S],
) -> Result<()> {
    if identity.is_empty() {
        return Err(Error::empty_input(InputKind::IdentityLocations));
    }
    if report.is_empty() {
        return Err(Error::empty_input(InputKind::ReportLocations));
    }
    if messages.is_empty() {
        return Err(Error::empty_input(InputKind::Messages));
    }

    let segments = report.segments();
    if segments.len() > 1 {
        return Err(Error::MixedSegmentReportLocations {
            segments: segments.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(())
}

/// Distinct message texts, keeping first-appearance order
pub fn dedupe_messages<S: AsRef<str>>(messages: &[S]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(messages.len());
    messages
        .iter()
        .map(AsRef::as_ref)
        .filter(|message| seen.insert(*message))
        .collect()
}
