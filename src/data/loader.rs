use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type, UInt64Type};
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataError, Result};
use super::model::{Cell, ResultsTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a results table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one trial per line (what the generator writes)
/// * `.json`    – `[{ "list": "...", "wrk_threads": 24, ... }, ...]`
/// * `.parquet` – flat scalar columns
///
/// A missing file is reported as [`DataError::MissingArtifact`], with the file
/// stem standing in for the dataset name.
pub fn load_file(path: &Path) -> Result<ResultsTable> {
    if !path.exists() {
        let dataset = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(DataError::MissingArtifact {
            dataset,
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        // Anything else is read as delimited text.
        _ => load_csv(path),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one trial per record.
/// Records are read in `flexible` mode so a ragged row surfaces as a
/// [`DataError::Format`] naming the row instead of a bare csv error.
fn load_csv(path: &Path) -> Result<ResultsTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::format(path, format!("opening CSV: {e}")))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::format(path, format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // An empty file yields one empty header field.
    if header.iter().all(|h| h.is_empty()) {
        return Err(DataError::format(path, "missing header row"));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::format(path, format!("CSV row {row_no}: {e}")))?;
        rows.push(record.iter().map(|field| Cell::parse(field.trim())).collect());
    }

    ResultsTable::new(path, header, rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Every object must
/// carry the same keys; the first object fixes the schema.
fn load_json(path: &Path) -> Result<ResultsTable> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DataError::format(path, format!("reading JSON: {e}")))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DataError::format(path, format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::format(path, "expected top-level JSON array"))?;

    let header: Vec<String> = match records.first() {
        Some(JsonValue::Object(first)) => first.keys().cloned().collect(),
        Some(_) => return Err(DataError::format(path, "row 0 is not a JSON object")),
        None => return Err(DataError::format(path, "missing header row")),
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::format(path, format!("row {i} is not a JSON object")))?;
        if obj.len() != header.len() {
            return Err(DataError::format(
                path,
                format!("row {i} has {} fields but the header has {}", obj.len(), header.len()),
            ));
        }
        let row = header
            .iter()
            .map(|key| {
                obj.get(key)
                    .map(json_to_cell)
                    .ok_or_else(|| DataError::format(path, format!("row {i} is missing '{key}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    ResultsTable::new(path, header, rows)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per table column, as written by
/// both **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ResultsTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| DataError::format(path, format!("opening parquet file: {e}")))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::format(path, format!("reading parquet metadata: {e}")))?;

    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let reader = builder
        .build()
        .map_err(|e| DataError::format(path, format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| DataError::format(path, format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>, ArrowError>>()
                .map_err(|e| DataError::format(path, format!("row {}: {e}", rows.len())))?;
            rows.push(cells);
        }
    }

    ResultsTable::new(path, header, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<Cell, ArrowError> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(i64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => Cell::Integer(i64::from(col.as_primitive::<UInt32Type>().value(row))),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Cell::Float(v as f64), Cell::Integer)
        }
        DataType::Float32 => Cell::Float(f64::from(col.as_primitive::<Float32Type>().value(row))),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        _ => Cell::parse(&array_value_to_string(col.as_ref(), row)?),
    };
    Ok(cell)
}
