//! End-to-end pipeline tests: CSV fixture → load → normalize → filter →
//! aggregate, the way a dashboard page runs it.

use std::path::{Path, PathBuf};

use avance_dash::config::{builtin_pages, MetricColumn, PageSpec, PercentScale, TableSchema};
use avance_dash::data::aggregate::{group_summary, medal_label, summarize, top_n};
use avance_dash::data::filter::{filtered_indices, Choice, FilterSelection};
use avance_dash::data::loader::load_table;
use avance_dash::data::model::RecordTable;
use avance_dash::data::normalize::build_table;
use tempfile::TempDir;

fn minimal_schema() -> TableSchema {
    TableSchema {
        rank_column: "Ranking".to_string(),
        id_column: "HC".to_string(),
        name_column: "NOMBRE".to_string(),
        winner_column: "Ganadores".to_string(),
        group_columns: vec!["DEPARTAMENTO".to_string()],
        metric_columns: vec![MetricColumn {
            column: "Avance PP Total".to_string(),
            label: "Avance PP".to_string(),
            scale: PercentScale::Percent,
        }],
        display_columns: vec![],
        text_columns: vec![],
        primary_metric: 0,
    }
}

fn write_csv(dir: &Path, name: &str, header: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut out = String::from(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    std::fs::write(&path, out).unwrap();
    path
}

fn load(path: &Path, schema: &TableSchema) -> RecordTable {
    let raw = load_table(path, schema).unwrap();
    build_table(raw, schema)
}

const MINIMAL_HEADER: &str = "Ranking,HC,NOMBRE,DEPARTAMENTO,Ganadores,Avance PP Total";

// ---------------------------------------------------------------------------
// Scenario from the design notes: mixed ranks, department filter, top-1
// ---------------------------------------------------------------------------

#[test]
fn scenario_rank_coercion_filtering_and_top_n() {
    let dir = TempDir::new().unwrap();
    let schema = minimal_schema();
    let path = write_csv(
        dir.path(),
        "avance.csv",
        MINIMAL_HEADER,
        &[
            "2,1,A,X,1,80",
            "1,2,B,Y,0,70",
            "abc,3,C,X,0,60",
        ],
    );
    let table = load(&path, &schema);

    // Normalized ranks are numeric or null, sorted ascending with null last.
    let ranks: Vec<Option<f64>> = table.records.iter().map(|r| r.ranking).collect();
    assert_eq!(ranks, vec![Some(1.0), Some(2.0), None]);

    // DEPARTAMENTO = "X" keeps exactly the rank-2 and unranked rows, in order.
    let selection = FilterSelection {
        groups: vec![Choice::Value("X".to_string())],
        winners_only: false,
    };
    let x_rows = filtered_indices(&table, &selection);
    let x_ranks: Vec<Option<f64>> = x_rows.iter().map(|&i| table.records[i].ranking).collect();
    assert_eq!(x_ranks, vec![Some(2.0), None]);

    // Top-1 on the full sorted table is the rank-1 row.
    let everything: Vec<usize> = (0..table.len()).collect();
    let top = top_n(&table, &everything, 1);
    assert_eq!(top.len(), 1);
    assert_eq!(table.records[top[0]].ranking, Some(1.0));
    assert_eq!(table.records[top[0]].nombre, "B");
}

// ---------------------------------------------------------------------------
// Scenario: winners-only over a table with zero winners
// ---------------------------------------------------------------------------

#[test]
fn scenario_winners_only_with_zero_winners_degrades_gracefully() {
    let dir = TempDir::new().unwrap();
    let schema = minimal_schema();
    let path = write_csv(
        dir.path(),
        "avance.csv",
        MINIMAL_HEADER,
        &["1,1,A,X,0,80", "2,2,B,Y,0,70"],
    );
    let table = load(&path, &schema);

    let selection = FilterSelection {
        groups: vec![Choice::Todos],
        winners_only: true,
    };
    let rows = filtered_indices(&table, &selection);
    assert!(rows.is_empty());

    let summary = summarize(&table, &rows);
    assert_eq!(summary.participants, 0);
    assert_eq!(summary.winners, 0);
    assert_eq!(summary.metric_means, vec![None]);

    // Downstream consumers keep working on the empty set.
    assert!(top_n(&table, &rows, 10).is_empty());
    assert!(group_summary(&table, &rows).is_empty());
}

// ---------------------------------------------------------------------------
// Subset and conjunction properties on a realistic page config
// ---------------------------------------------------------------------------

#[test]
fn filters_commute_and_never_grow_the_row_set() {
    let dir = TempDir::new().unwrap();
    let page: PageSpec = builtin_pages().remove(0);
    let path = write_csv(
        dir.path(),
        "avance.csv",
        "Ranking,HC,NOMBRE,DEMPARTAMENTO,CANAL,Ganadores,Avance PP Total,\
         Avance Eqv Total,Cumple PP,Cumple SS",
        &[
            "1,10,A,LIMA,TIENDA,1,101,110,SI,SI",
            "2,11,B,LIMA,CALL,0,95,90,NO,SI",
            "3,12,C,CUSCO,TIENDA,1,88,85,NO,NO",
            "S/R,13,D,LIMA,TIENDA,0,20,10,NO,NO",
        ],
    );
    let table = load(&path, &page.schema);

    let lima_tienda_winners = FilterSelection {
        groups: vec![
            Choice::Value("LIMA".to_string()),
            Choice::Value("TIENDA".to_string()),
        ],
        winners_only: true,
    };
    let direct = filtered_indices(&table, &lima_tienda_winners);

    // Apply the same predicates one at a time, in a different order.
    let winners_only = FilterSelection {
        groups: vec![Choice::Todos, Choice::Todos],
        winners_only: true,
    };
    let staged: Vec<usize> = filtered_indices(&table, &winners_only)
        .into_iter()
        .filter(|&i| table.records[i].groups[1] == "TIENDA")
        .filter(|&i| table.records[i].groups[0] == "LIMA")
        .collect();
    assert_eq!(direct, staged);
    assert_eq!(direct.len(), 1);
    assert!(direct.len() <= table.len());

    // Winner sum never exceeds the row count, and matches it under
    // winners-only.
    let summary = summarize(&table, &direct);
    assert_eq!(summary.winners as usize, summary.participants);
}

// ---------------------------------------------------------------------------
// Group summary over the January-style fraction metrics
// ---------------------------------------------------------------------------

#[test]
fn enero_page_groups_and_formats_fractions() {
    let dir = TempDir::new().unwrap();
    let page: PageSpec = builtin_pages().remove(1);
    let path = write_csv(
        dir.path(),
        "avance_real.csv",
        "Ranking,HC,NOMBRE,DEPARTAMENTO,CLUSTER,Ganadores,Avance PP Ene,\
         Avance SS Ene,Avance Eqv Ene,AVANCE ENE PP,AVANCE ENE SS",
        &[
            "1,00010,A,LIMA,ORO,1,0.9,0.8,0.95,9/10,8/10",
            "2,00011,B,LIMA,PLATA,0,0.7,0.6,0.65,7/10,6/10",
            "3,00012,C,CUSCO,ORO,0,0.5,0.4,0.45,5/10,4/10",
        ],
    );
    let table = load(&path, &page.schema);

    // Leading zeros survive the text-column rule.
    assert_eq!(table.records[0].hc, "00010");

    let everything: Vec<usize> = (0..table.len()).collect();
    let groups = group_summary(&table, &everything);
    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    // Ordered descending by the primary metric (Avance Eqv Ene).
    assert_eq!(names, vec!["LIMA", "CUSCO"]);
    let lima_eqv = groups[0].means[2].unwrap();
    assert!((lima_eqv - 0.8).abs() < 1e-9);

    // The ranked table's medal labels.
    let top = top_n(&table, &everything, 3);
    let labels: Vec<String> = top
        .iter()
        .map(|&i| medal_label(table.records[i].ranking))
        .collect();
    assert_eq!(labels, vec!["🥇 1", "🥈 2", "🥉 3"]);
}
