use std::fmt;

use super::model::RecordTable;
use crate::config::TableSchema;

/// Sentinel dropdown entry meaning "no predicate for this column".
pub const ALL_VALUES: &str = "Todos";

// ---------------------------------------------------------------------------
// Choice – one dropdown selection
// ---------------------------------------------------------------------------

/// A single-select filter choice: the `Todos` sentinel or a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice {
    #[default]
    Todos,
    Value(String),
}

impl Choice {
    /// Whether a row value passes this choice.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Choice::Todos => true,
            Choice::Value(v) => v == value,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Todos => write!(f, "{ALL_VALUES}"),
            Choice::Value(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – the full set of user selections
// ---------------------------------------------------------------------------

/// One choice per configured grouping column plus the winners-only switch.
/// The empty selection (all `Todos`, switch off) passes every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    /// Parallel to `TableSchema::group_columns`.
    pub groups: Vec<Choice>,
    pub winners_only: bool,
}

impl FilterSelection {
    /// The no-op selection for a schema: `Todos` everywhere.
    pub fn all_for(schema: &TableSchema) -> Self {
        FilterSelection {
            groups: vec![Choice::Todos; schema.group_columns.len()],
            winners_only: false,
        }
    }
}

/// Dropdown options for one grouping column: `Todos` followed by the sorted
/// distinct values present in the data.
pub fn filter_options(table: &RecordTable, group_idx: usize) -> Vec<String> {
    let mut options = vec![ALL_VALUES.to_string()];
    if let Some(values) = table.group_values.get(group_idx) {
        options.extend(values.iter().cloned());
    }
    options
}

/// Indices of records passing the conjunction of all active predicates, in
/// table order.  A pure subset: never reorders, never invents rows, and an
/// empty result is perfectly valid.
pub fn filtered_indices(table: &RecordTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            for (choice, value) in selection.groups.iter().zip(&rec.groups) {
                if !choice.matches(value) {
                    return false;
                }
            }
            !selection.winners_only || rec.winner
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MetricColumn, PercentScale};
    use crate::data::model::Record;

    fn schema() -> TableSchema {
        TableSchema {
            rank_column: "Ranking".to_string(),
            id_column: "HC".to_string(),
            name_column: "NOMBRE".to_string(),
            winner_column: "Ganadores".to_string(),
            group_columns: vec!["DEPARTAMENTO".to_string(), "CANAL".to_string()],
            metric_columns: vec![MetricColumn {
                column: "Avance".to_string(),
                label: "Avance".to_string(),
                scale: PercentScale::Percent,
            }],
            display_columns: vec![],
            text_columns: vec![],
            primary_metric: 0,
        }
    }

    fn record(rank: Option<f64>, dep: &str, canal: &str, winner: bool) -> Record {
        Record {
            ranking: rank,
            hc: String::new(),
            nombre: String::new(),
            groups: vec![dep.to_string(), canal.to_string()],
            winner,
            metrics: vec![Some(1.0)],
            display: vec![],
        }
    }

    fn table() -> RecordTable {
        RecordTable::from_records(
            schema(),
            vec![
                record(Some(1.0), "LIMA", "TIENDA", true),
                record(Some(2.0), "CUSCO", "CALL", false),
                record(Some(3.0), "LIMA", "CALL", false),
                record(None, "CUSCO", "TIENDA", true),
            ],
        )
    }

    fn selection(dep: Choice, canal: Choice, winners_only: bool) -> FilterSelection {
        FilterSelection {
            groups: vec![dep, canal],
            winners_only,
        }
    }

    #[test]
    fn todos_everywhere_passes_all_rows() {
        let t = table();
        let sel = FilterSelection::all_for(&t.schema);
        assert_eq!(filtered_indices(&t, &sel), vec![0, 1, 2, 3]);
    }

    #[test]
    fn predicates_are_a_pure_conjunction() {
        let t = table();
        let sel = selection(
            Choice::Value("LIMA".to_string()),
            Choice::Value("CALL".to_string()),
            false,
        );
        assert_eq!(filtered_indices(&t, &sel), vec![2]);

        // Swapping the per-column predicates yields the same row set.
        let swapped = selection(
            Choice::Value("CUSCO".to_string()),
            Choice::Todos,
            true,
        );
        let narrowed_then_winners = filtered_indices(&t, &swapped);
        let winners_first: Vec<usize> = filtered_indices(
            &t,
            &selection(Choice::Todos, Choice::Todos, true),
        )
        .into_iter()
        .filter(|&i| t.records[i].groups[0] == "CUSCO")
        .collect();
        assert_eq!(narrowed_then_winners, winners_first);
    }

    #[test]
    fn filtering_is_a_subset_in_table_order() {
        let t = table();
        let sel = selection(Choice::Todos, Choice::Value("CALL".to_string()), false);
        let indices = filtered_indices(&t, &sel);
        assert_eq!(indices, vec![1, 2]);
        assert!(indices.len() <= t.len());
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn winners_only_keeps_only_winners() {
        let t = table();
        let sel = selection(Choice::Todos, Choice::Todos, true);
        let indices = filtered_indices(&t, &sel);
        assert_eq!(indices, vec![0, 3]);
        assert!(indices.iter().all(|&i| t.records[i].winner));
    }

    #[test]
    fn empty_result_is_valid() {
        let t = table();
        let sel = selection(
            Choice::Value("TRUJILLO".to_string()),
            Choice::Todos,
            false,
        );
        assert!(filtered_indices(&t, &sel).is_empty());
    }

    #[test]
    fn options_lead_with_the_todos_sentinel() {
        let t = table();
        assert_eq!(filter_options(&t, 0), vec!["Todos", "CUSCO", "LIMA"]);
        assert_eq!(filter_options(&t, 1), vec!["Todos", "CALL", "TIENDA"]);
    }
}
