use std::path::Path;

use anyhow::{Context, Result};

use super::model::{parse_numeric, FieldValue, FlowFrame, FlowRecord};
use super::schema;

// ---------------------------------------------------------------------------
// Raw capture loader
// ---------------------------------------------------------------------------

/// Columns read as text and coerced to numeric at load time (they arrive as
/// hex-ish strings in some captures and would otherwise misparse).
const COERCED_NUMERIC_COLUMNS: [&str; 2] = ["sTos", "dTos"];

/// Load one raw `.binetflow` capture file (comma-delimited, header row).
///
/// Cell typing:
/// * encoder-target columns stay raw strings (empty → `Null`) so that the
///   fitted codes are the only integers those columns ever hold
/// * `sTos` / `dTos` are numerically coerced, invalid or missing → 0
/// * everything else is type-guessed (int, float, else string)
pub fn load_binetflow(path: &Path) -> Result<FlowFrame> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening capture file {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading capture headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("capture row {row_no}"))?;

        let mut row = FlowRecord::new();
        for (col_idx, header) in headers.iter().enumerate() {
            let raw = record.get(col_idx).unwrap_or("").trim();
            let value = cell_value(header, raw);
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }

    Ok(FlowFrame::from_rows(rows))
}

fn cell_value(header: &str, raw: &str) -> FieldValue {
    if COERCED_NUMERIC_COLUMNS.contains(&header) {
        return FieldValue::Float(parse_numeric(raw, 0.0));
    }
    if schema::CATEGORICAL_COLUMNS.contains(&header) {
        if raw.is_empty() {
            return FieldValue::Null;
        }
        return FieldValue::String(raw.to_string());
    }
    FieldValue::guess(raw)
}
