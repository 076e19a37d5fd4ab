use std::collections::BTreeMap;

use super::model::RecordTable;
use super::normalize::cmp_rank;

/// Top-N slider bounds shared by the UI and the ranker.
pub const TOP_N_MIN: usize = 1;
pub const TOP_N_MAX: usize = 50;
pub const TOP_N_DEFAULT: usize = 10;

// ---------------------------------------------------------------------------
// Summary stats – the KPI strip numbers
// ---------------------------------------------------------------------------

/// Aggregates over a filtered row set.  `metric_means` is parallel to the
/// schema's metric columns; `None` means no data (rendered as N/A).
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub participants: usize,
    pub winners: u64,
    pub metric_means: Vec<Option<f64>>,
}

/// Row count, winner sum and per-metric mean over the given indices.
/// Null metric cells are ignored; an empty or all-null column yields `None`
/// rather than an error.
pub fn summarize(table: &RecordTable, indices: &[usize]) -> Summary {
    let winners = indices
        .iter()
        .filter(|&&i| table.records[i].winner)
        .count() as u64;

    let metric_means = (0..table.schema.metric_columns.len())
        .map(|m| mean(indices.iter().filter_map(|&i| table.records[i].metrics[m])))
        .collect();

    Summary {
        participants: indices.len(),
        winners,
        metric_means,
    }
}

/// Arithmetic mean; `None` for an empty iterator.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ---------------------------------------------------------------------------
// Top-N ranking
// ---------------------------------------------------------------------------

/// The first `n` of the given rows ordered ascending by rank, nulls last.
/// Output length is `min(n, indices.len())`.  The sort is re-applied here so
/// the function stands on its own even for unsorted inputs.
pub fn top_n(table: &RecordTable, indices: &[usize], n: usize) -> Vec<usize> {
    let mut ordered: Vec<usize> = indices.to_vec();
    ordered.sort_by(|&a, &b| cmp_rank(table.records[a].ranking, table.records[b].ranking));
    ordered.truncate(n);
    ordered
}

/// Display transform for the ranking column: medals for the podium, the
/// plain integer for everyone else, an empty label for unranked rows.
pub fn medal_label(rank: Option<f64>) -> String {
    let Some(rank) = rank else {
        return String::new();
    };
    match rank as i64 {
        1 => "🥇 1".to_string(),
        2 => "🥈 2".to_string(),
        3 => "🥉 3".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Group summary – per-department metric means
// ---------------------------------------------------------------------------

/// One group row: the group value plus its per-metric means (parallel to
/// the schema's metric columns).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub name: String,
    pub means: Vec<Option<f64>>,
}

/// Group the given rows by the first grouping column and average every
/// metric, ignoring nulls.  Groups with no rows are simply absent.  Output
/// is ordered descending by the primary metric's mean, all-null means last.
pub fn group_summary(table: &RecordTable, indices: &[usize]) -> Vec<GroupRow> {
    let n_metrics = table.schema.metric_columns.len();

    // group name → per-metric (sum, count)
    let mut buckets: BTreeMap<&str, Vec<(f64, usize)>> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        let Some(name) = rec.groups.first() else {
            continue;
        };
        let bucket = buckets
            .entry(name.as_str())
            .or_insert_with(|| vec![(0.0, 0); n_metrics]);
        for (m, value) in rec.metrics.iter().enumerate() {
            if let Some(v) = value {
                bucket[m].0 += v;
                bucket[m].1 += 1;
            }
        }
    }

    let mut rows: Vec<GroupRow> = buckets
        .into_iter()
        .map(|(name, sums)| GroupRow {
            name: name.to_string(),
            means: sums
                .into_iter()
                .map(|(sum, count)| if count == 0 { None } else { Some(sum / count as f64) })
                .collect(),
        })
        .collect();

    let primary = table.schema.primary_metric.min(n_metrics.saturating_sub(1));
    rows.sort_by(|a, b| {
        let av = a.means.get(primary).copied().flatten();
        let bv = b.means.get(primary).copied().flatten();
        // Descending by mean, missing means last.
        match (av, bv) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
    rows
}
