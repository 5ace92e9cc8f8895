//! Tabular assembly
//!
//! Reshapes one location's per-message outcomes into a long-form table.

use hl7_ir::{LocationRow, LocationTable, MessageId, Outcome};
use tracing::trace;

/// Build the long-form table for one reported location.
///
/// `results[i]` must hold the outcomes of message `i` and `ids[i]` its
/// identity. Every outcome becomes one row indexed by its position within
/// the message, except a segment-absent message, which becomes a single row
/// with neither segment index nor value.
///
/// # Panics
///
/// Panics if `results` and `ids` differ in length.
pub fn assemble(column: &str, results: Vec<Vec<Outcome>>, ids: &[MessageId]) -> LocationTable {
    assert_eq!(
        results.len(),
        ids.len(),
        "extraction results and message ids must be aligned"
    );

    let mut table = LocationTable::new(column);
    for (message_id, outcomes) in ids.iter().zip(results) {
        for (index, outcome) in outcomes.into_iter().enumerate() {
            let segment_index = (!outcome.is_segment_absent()).then_some(index);
            table.rows.push(LocationRow {
                message_id: message_id.clone(),
                segment_index,
                value: outcome.into_value(),
            });
        }
    }

    trace!(column, rows = table.len(), "Assembled location table");
    table
}
