use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, RawRow, RawTable};
use crate::config::TableSchema;

// ---------------------------------------------------------------------------
// LoadError – fatal per page, no automatic retry
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },
    #[error("{path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> LoadError {
    LoadError::Malformed {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dashboard dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` – spreadsheet, first sheet, header row first
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "Ranking": 1, "HC": "00123", ... }, ...]`
/// * `.parquet` – scalar columns, one record per row
///
/// The whole file is read eagerly; the header is validated against the
/// schema so a column mismatch fails here with a descriptive error instead
/// of surfacing later during aggregation.
pub fn load_table(path: &Path, schema: &TableSchema) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => load_excel(path, schema)?,
        "csv" => load_csv(path, schema)?,
        "json" => load_json(path, schema)?,
        "parquet" | "pq" => load_parquet(path, schema)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    validate_columns(path, &table, schema)?;
    Ok(table)
}

/// Check that every column the schema maps is present.  Unknown extra
/// columns are allowed and ignored downstream.
fn validate_columns(path: &Path, table: &RawTable, schema: &TableSchema) -> Result<(), LoadError> {
    for required in schema.required_columns() {
        if !table.columns.iter().any(|c| c == required) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: required.to_string(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// First sheet only, first row is the header.  Cells keep their stored type;
/// columns listed in `schema.text_columns` are captured as text verbatim so
/// identifiers like `HC` keep their leading zeros.
fn load_excel(path: &Path, schema: &TableSchema) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| malformed(path, e))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let first_sheet = sheet_names
        .first()
        .ok_or_else(|| malformed(path, "workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(first_sheet)
        .map_err(|e| malformed(path, e))?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header.iter().map(excel_cell_text).collect(),
        None => return Err(malformed(path, "sheet has no header row")),
    };

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut raw = RawRow::new();
        for (idx, cell) in row.iter().enumerate() {
            let Some(name) = columns.get(idx) else {
                continue;
            };
            let value = if schema.is_text_column(name) {
                match cell {
                    Data::Empty => CellValue::Null,
                    other => CellValue::String(excel_cell_text(other)),
                }
            } else {
                excel_cell_value(cell)
            };
            raw.insert(name.clone(), value);
        }
        rows.push(raw);
    }

    Ok(RawTable { columns, rows })
}

fn excel_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

fn excel_cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => excel_cell_value(other).to_text(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; every field is type-guessed unless its
/// column is marked as text in the schema.
fn load_csv(path: &Path, schema: &TableSchema) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| match e.into_kind() {
        csv::ErrorKind::Io(io) => LoadError::Io {
            path: path.to_path_buf(),
            source: io,
        },
        other => malformed(path, format!("{other:?}")),
    })?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| malformed(path, format!("row {row_no}: {e}")))?;
        let mut raw = RawRow::new();
        for (idx, field) in record.iter().enumerate() {
            let Some(name) = columns.get(idx) else {
                continue;
            };
            let value = if schema.is_text_column(name) {
                if field.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::String(field.to_string())
                }
            } else {
                guess_cell_type(field)
            };
            raw.insert(name.clone(), value);
        }
        rows.push(raw);
    }

    Ok(RawTable { columns, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Ranking": 1, "HC": "00123", "NOMBRE": "...", "Ganadores": 0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path, schema: &TableSchema) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| malformed(path, e))?;

    let records = root
        .as_array()
        .ok_or_else(|| malformed(path, "expected a top-level JSON array"))?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| malformed(path, format!("row {i} is not a JSON object")))?;

        let mut raw = RawRow::new();
        for (key, val) in obj {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
            let value = if schema.is_text_column(key) {
                match val {
                    JsonValue::Null => CellValue::Null,
                    JsonValue::String(s) => CellValue::String(s.clone()),
                    other => CellValue::String(json_to_cell(other).to_text()),
                }
            } else {
                json_to_cell(val)
            };
            raw.insert(key.clone(), value);
        }
        rows.push(raw);
    }

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Scalar columns only (strings, ints, floats, bools); one record per row.
/// Works with files written by Pandas, Polars and our own sample generator.
fn load_parquet(path: &Path, schema: &TableSchema) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| malformed(path, e))?;
    let reader = builder.build().map_err(|e| malformed(path, e))?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| malformed(path, e))?;
        let batch_schema = batch.schema();

        if columns.is_empty() {
            columns = batch_schema
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect();
        }

        for row in 0..batch.num_rows() {
            let mut raw = RawRow::new();
            for (col_idx, field) in batch_schema.fields().iter().enumerate() {
                let cell = extract_cell(batch.column(col_idx), row);
                let value = if schema.is_text_column(field.name()) {
                    match cell {
                        CellValue::Null => CellValue::Null,
                        other => CellValue::String(other.to_text()),
                    }
                } else {
                    cell
                };
                raw.insert(field.name().clone(), value);
            }
            rows.push(raw);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::String(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::String(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        _ => CellValue::String(format!("{:?}", col.data_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_pages;

    fn enero_schema() -> TableSchema {
        builtin_pages().remove(1).schema
    }

    fn write_enero_csv(dir: &Path) -> PathBuf {
        let path = dir.join("avance_real.csv");
        let mut out = String::from(
            "Ranking,HC,NOMBRE,DEPARTAMENTO,CLUSTER,Ganadores,\
             Avance PP Ene,Avance SS Ene,Avance Eqv Ene,AVANCE ENE PP,AVANCE ENE SS\n",
        );
        out.push_str("2,00123,ROSA QUISPE,LIMA,ORO,1,0.8,0.7,0.75,8/10,7/10\n");
        out.push_str("1,00045,JUAN PEREZ, AREQUIPA ,PLATA,0,0.9,0.95,0.92,9/10,9/10\n");
        out.push_str("S/R,00778,ANA TORRES,LIMA,ORO,0,,0.1,0.2,0/10,1/10\n");
        std::fs::write(&path, out).unwrap();
        path
    }

    #[test]
    fn csv_keeps_text_columns_verbatim() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_enero_csv(dir.path());
        let table = load_table(&path, &enero_schema()).unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(
            table.rows[0].get("HC"),
            Some(&CellValue::String("00123".to_string()))
        );
        // Non-text numeric columns are still typed.
        assert_eq!(table.rows[0].get("Ranking"), Some(&CellValue::Integer(2)));
        // Empty cells come through as null.
        assert_eq!(table.rows[2].get("Avance PP Ene"), Some(&CellValue::Null));
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "Ranking,HC,NOMBRE\n1,00123,ROSA\n").unwrap();

        let err = load_table(&path, &enero_schema()).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => {
                assert_eq!(column, "DEPARTAMENTO");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_table(Path::new("avance.pdf"), &enero_schema()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "pdf"));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_table(&dir.path().join("nope.csv"), &enero_schema()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("avance_real.json");
        std::fs::write(
            &path,
            r#"[{"Ranking": 1, "HC": 123, "NOMBRE": "ROSA", "DEPARTAMENTO": "LIMA",
                "CLUSTER": "ORO", "Ganadores": 1, "Avance PP Ene": 0.8,
                "Avance SS Ene": 0.7, "Avance Eqv Ene": 0.75,
                "AVANCE ENE PP": "8/10", "AVANCE ENE SS": "7/10"}]"#,
        )
        .unwrap();

        let table = load_table(&path, &enero_schema()).unwrap();
        assert_eq!(table.rows.len(), 1);
        // HC is a text column: the numeric JSON value is stringified.
        assert_eq!(
            table.rows[0].get("HC"),
            Some(&CellValue::String("123".to_string()))
        );
    }
}
