use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Schema mapping – which columns play which role on a dashboard page
// ---------------------------------------------------------------------------

/// How a percentage metric is stored in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentScale {
    /// Already 0–100.
    Percent,
    /// Stored as a 0–1 fraction, multiplied by 100 at display time.
    Fraction,
}

impl PercentScale {
    /// Scale a stored value to 0–100 for display.
    pub fn to_percent(self, value: f64) -> f64 {
        match self {
            PercentScale::Percent => value,
            PercentScale::Fraction => value * 100.0,
        }
    }
}

/// One percentage/progress metric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricColumn {
    /// Column name in the source file.
    pub column: String,
    /// Short label for KPI cards and chart legends.
    pub label: String,
    pub scale: PercentScale,
}

/// Maps the fixed roles of the pipeline onto a concrete file's column names.
/// Both dashboards run the same pipeline; only this mapping differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub rank_column: String,
    pub id_column: String,
    pub name_column: String,
    pub winner_column: String,
    /// Categorical columns used for filter dropdowns and grouping, in
    /// display order.  The first one is the group-summary dimension.
    pub group_columns: Vec<String>,
    pub metric_columns: Vec<MetricColumn>,
    /// Extra columns shown verbatim in the ranked table.
    #[serde(default)]
    pub display_columns: Vec<String>,
    /// Columns read as text even when they look numeric (leading zeros).
    #[serde(default)]
    pub text_columns: Vec<String>,
    /// Index into `metric_columns` that orders the group summary.
    #[serde(default)]
    pub primary_metric: usize,
}

impl TableSchema {
    /// Every column the pipeline reads; used to validate a file's header
    /// once at load time.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols = vec![
            self.rank_column.as_str(),
            self.id_column.as_str(),
            self.name_column.as_str(),
            self.winner_column.as_str(),
        ];
        cols.extend(self.group_columns.iter().map(String::as_str));
        cols.extend(self.metric_columns.iter().map(|m| m.column.as_str()));
        cols.extend(self.display_columns.iter().map(String::as_str));
        cols
    }

    /// Whether `column` must be kept as raw text when parsing.
    pub fn is_text_column(&self, column: &str) -> bool {
        self.text_columns.iter().any(|c| c == column)
    }
}

// ---------------------------------------------------------------------------
// Page definitions
// ---------------------------------------------------------------------------

/// One dashboard page: a data file plus its schema mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub title: String,
    /// File name resolved against the data directory.
    pub data_file: String,
    pub schema: TableSchema,
    /// Whether the group summary follows the active filters or is pinned to
    /// the full dataset.
    #[serde(default = "default_true")]
    pub group_summary_filtered: bool,
}

fn default_true() -> bool {
    true
}

/// Top-level config: the list of dashboard pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub pages: Vec<PageSpec>,
}

/// Optional config file next to the data; replaces the built-in pages.
pub const CONFIG_FILE: &str = "dashboards.json";

/// The two built-in dashboards.
pub fn builtin_pages() -> Vec<PageSpec> {
    let total = PageSpec {
        title: "Avance Total".to_string(),
        data_file: "avance.xlsx".to_string(),
        schema: TableSchema {
            rank_column: "Ranking".to_string(),
            id_column: "HC".to_string(),
            name_column: "NOMBRE".to_string(),
            winner_column: "Ganadores".to_string(),
            group_columns: vec!["DEMPARTAMENTO".to_string(), "CANAL".to_string()],
            metric_columns: vec![
                MetricColumn {
                    column: "Avance PP Total".to_string(),
                    label: "Avance PP".to_string(),
                    scale: PercentScale::Percent,
                },
                MetricColumn {
                    column: "Avance Eqv Total".to_string(),
                    label: "Avance Eqv".to_string(),
                    scale: PercentScale::Percent,
                },
            ],
            display_columns: vec!["Cumple PP".to_string(), "Cumple SS".to_string()],
            text_columns: vec![],
            primary_metric: 1,
        },
        group_summary_filtered: true,
    };

    let enero = PageSpec {
        title: "Avance Enero".to_string(),
        data_file: "avance_real.xlsx".to_string(),
        schema: TableSchema {
            rank_column: "Ranking".to_string(),
            id_column: "HC".to_string(),
            name_column: "NOMBRE".to_string(),
            winner_column: "Ganadores".to_string(),
            group_columns: vec!["DEPARTAMENTO".to_string(), "CLUSTER".to_string()],
            metric_columns: vec![
                MetricColumn {
                    column: "Avance PP Ene".to_string(),
                    label: "Avance PP".to_string(),
                    scale: PercentScale::Fraction,
                },
                MetricColumn {
                    column: "Avance SS Ene".to_string(),
                    label: "Avance SS".to_string(),
                    scale: PercentScale::Fraction,
                },
                MetricColumn {
                    column: "Avance Eqv Ene".to_string(),
                    label: "Avance Eqv".to_string(),
                    scale: PercentScale::Fraction,
                },
            ],
            display_columns: vec!["AVANCE ENE PP".to_string(), "AVANCE ENE SS".to_string()],
            text_columns: vec!["HC".to_string()],
            primary_metric: 2,
        },
        // The January page pins its department summary to the whole dataset.
        group_summary_filtered: false,
    };

    vec![total, enero]
}

/// Load the page list: `dashboards.json` in the data directory if present,
/// the built-in pages otherwise.  A malformed config file is logged and
/// ignored rather than taking the app down.
pub fn load_pages(data_dir: &Path) -> Vec<PageSpec> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return builtin_pages();
    }
    match std::fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|text| Ok(serde_json::from_str::<DashboardConfig>(&text)?))
    {
        Ok(config) if !config.pages.is_empty() => {
            log::info!("Loaded {} page(s) from {}", config.pages.len(), path.display());
            config.pages
        }
        Ok(_) => {
            log::warn!("{}: empty page list, using built-in pages", path.display());
            builtin_pages()
        }
        Err(e) => {
            log::error!("Failed to read {}: {e:#}", path.display());
            builtin_pages()
        }
    }
}

/// Directory the data files live in: next to the executable, falling back
/// to the working directory.
pub fn data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve a page's data file.  When the configured name is missing, sibling
/// `.csv` / `.parquet` / `.json` variants of the same stem are tried so a
/// re-exported dataset keeps working without touching the config.
pub fn resolve_data_path(data_dir: &Path, file_name: &str) -> PathBuf {
    let direct = data_dir.join(file_name);
    if direct.exists() {
        return direct;
    }
    for ext in ["csv", "parquet", "json"] {
        let candidate = direct.with_extension(ext);
        if candidate.exists() {
            return candidate;
        }
    }
    direct
}
