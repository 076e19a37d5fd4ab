use std::collections::BTreeMap;
use std::fmt;

use crate::config::TableSchema;

// ---------------------------------------------------------------------------
// CellValue – a single cell as parsed from disk
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what spreadsheet formats store.
/// Produced by the loaders; the normalizer coerces cells into typed records.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Interpret the cell as a number, if possible.  Numeric strings count
    /// (spreadsheet exports routinely stringify number columns).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Render the cell as text the way a spreadsheet would show it.
    /// Whole floats lose the trailing `.0`; null becomes the empty string.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    v.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// 0/1 winner-style flag: integer 1, float 1.0 or `true` all count.
    pub fn is_set_flag(&self) -> bool {
        match self {
            CellValue::Bool(b) => *b,
            _ => self.as_f64().map(|v| v == 1.0).unwrap_or(false),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

// ---------------------------------------------------------------------------
// RawTable – rows as loaded, before normalization
// ---------------------------------------------------------------------------

/// One loaded row: column name → cell.  Absent keys mean an empty cell.
pub type RawRow = BTreeMap<String, CellValue>;

/// The file contents as parsed, in file order, with the header kept so the
/// schema can be validated once up front.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ---------------------------------------------------------------------------
// Record – one typed row of the dashboard dataset
// ---------------------------------------------------------------------------

/// A performance record with the schema-mapped columns extracted.  The
/// `groups`, `metrics` and `display` vectors run parallel to the schema's
/// `group_columns`, `metric_columns` and `display_columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Position in the performance ordering; `None` means unranked.
    pub ranking: Option<f64>,
    /// Identifier (`HC`), kept as text so leading zeros survive.
    pub hc: String,
    pub nombre: String,
    /// Trimmed values of the grouping columns.
    pub groups: Vec<String>,
    /// Winner flag (`Ganadores` 0/1).
    pub winner: bool,
    /// Progress metrics; unparseable cells become `None`.
    pub metrics: Vec<Option<f64>>,
    /// Passthrough display columns, rendered verbatim.
    pub display: Vec<String>,
}

// ---------------------------------------------------------------------------
// RecordTable – the normalized dataset
// ---------------------------------------------------------------------------

/// The normalized table: records sorted ascending by rank (nulls last), plus
/// the sorted distinct values of every grouping column for the filter
/// dropdowns.  Immutable after build; filters derive index subsets.
#[derive(Debug, Clone)]
pub struct RecordTable {
    pub schema: TableSchema,
    pub records: Vec<Record>,
    /// Per grouping column (parallel to `schema.group_columns`): the sorted,
    /// deduplicated values observed in the data.
    pub group_values: Vec<Vec<String>>,
}

impl RecordTable {
    /// Build the group-value index from already-normalized records.
    pub fn from_records(schema: TableSchema, records: Vec<Record>) -> Self {
        let mut group_values: Vec<Vec<String>> = vec![Vec::new(); schema.group_columns.len()];
        for rec in &records {
            for (i, val) in rec.groups.iter().enumerate() {
                group_values[i].push(val.clone());
            }
        }
        for vals in &mut group_values {
            vals.sort();
            vals.dedup();
        }
        RecordTable {
            schema,
            records,
            group_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
