use std::cmp::Ordering;

use super::model::{CellValue, RawRow, RawTable, Record, RecordTable};
use crate::config::TableSchema;

// ---------------------------------------------------------------------------
// Normalization: raw cells → typed records, sorted by rank
// ---------------------------------------------------------------------------

/// Build the normalized table from a loaded file.
///
/// * rank cells are coerced to a nullable number; parse failures become
///   null, they never error
/// * grouping columns are stringified and whitespace-trimmed
/// * the winner flag collapses to a bool
/// * records end up stably sorted ascending by rank, nulls last
///
/// Pure: the same raw table and schema always produce the same output, and
/// re-sorting an already-sorted table is a no-op.
pub fn build_table(raw: RawTable, schema: &TableSchema) -> RecordTable {
    let mut records: Vec<Record> = raw
        .rows
        .into_iter()
        .map(|row| build_record(&row, schema))
        .collect();

    sort_by_rank(&mut records);
    RecordTable::from_records(schema.clone(), records)
}

fn build_record(row: &RawRow, schema: &TableSchema) -> Record {
    let ranking = row.get(&schema.rank_column).and_then(coerce_rank);

    let groups = schema
        .group_columns
        .iter()
        .map(|col| trimmed_text(row.get(col)))
        .collect();

    let metrics = schema
        .metric_columns
        .iter()
        .map(|m| row.get(&m.column).and_then(CellValue::as_f64))
        .collect();

    let display = schema
        .display_columns
        .iter()
        .map(|col| cell_text(row.get(col)))
        .collect();

    Record {
        ranking,
        hc: cell_text(row.get(&schema.id_column)),
        nombre: cell_text(row.get(&schema.name_column)),
        groups,
        winner: row
            .get(&schema.winner_column)
            .map(CellValue::is_set_flag)
            .unwrap_or(false),
        metrics,
        display,
    }
}

/// Numeric coercion for the rank column.  `"abc"` → `None`, `"3"` → `3.0`.
fn coerce_rank(cell: &CellValue) -> Option<f64> {
    cell.as_f64().filter(|v| v.is_finite())
}

fn cell_text(cell: Option<&CellValue>) -> String {
    cell.map(CellValue::to_text).unwrap_or_default()
}

fn trimmed_text(cell: Option<&CellValue>) -> String {
    cell_text(cell).trim().to_string()
}

/// Stable ascending sort by rank with null ranks ordered last.  Idempotent.
pub fn sort_by_rank(records: &mut [Record]) {
    records.sort_by(|a, b| cmp_rank(a.ranking, b.ranking));
}

/// Rank ordering shared by normalization and the top-N ranker.
pub fn cmp_rank(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
