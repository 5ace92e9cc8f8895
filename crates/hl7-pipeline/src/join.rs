//! Multi-field join
//!
//! Inner-joins per-location tables on `(message id, segment index)`, folding
//! left to right so column order follows table order.

use hl7_ir::{LocationTable, MessageId, WideRow, WideTable};
use std::collections::HashMap;
use tracing::debug;

/// Join location tables into one wide table.
///
/// A single table is converted unchanged. A row survives only if its key is
/// present in every table; rows without a segment index match each other,
/// so a message lacking the segment keeps one all-missing row. No tables
/// yields an empty table with no columns.
pub fn join_tables(tables: Vec<LocationTable>) -> WideTable {
    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else {
        return WideTable {
            columns: Vec::new(),
            rows: Vec::new(),
        };
    };

    let joined = tables.fold(WideTable::from(first), join_pair);
    debug!(
        columns = joined.columns.len(),
        rows = joined.len(),
        "Joined location tables"
    );
    joined
}

fn join_pair(left: WideTable, right: LocationTable) -> WideTable {
    let mut index: HashMap<(&MessageId, Option<usize>), Vec<usize>> = HashMap::new();
    for (position, row) in right.rows.iter().enumerate() {
        index
            .entry((&row.message_id, row.segment_index))
            .or_default()
            .push(position);
    }

    let mut rows = Vec::with_capacity(left.rows.len());
    for row in &left.rows {
        let Some(matches) = index.get(&row.key()) else {
            continue;
        };
        for &position in matches {
            let mut values = row.values.clone();
            values.push(right.rows[position].value.clone());
            rows.push(WideRow {
                message_id: row.message_id.clone(),
                segment_index: row.segment_index,
                values,
            });
        }
    }

    let mut columns = left.columns;
    columns.push(right.column);
    WideTable { columns, rows }
}
