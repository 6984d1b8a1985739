use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::model::{FieldValue, FlowFrame};

// ---------------------------------------------------------------------------
// CSV artifact writer
// ---------------------------------------------------------------------------

/// Write one reconciled frame as `<dir>/<name>` with a header row, columns
/// in the frame's order. Returns the written path. Partial output from a
/// failed write is left in place (one-shot batch tool, no rollback).
pub fn write_frame(dir: &Path, name: &str, frame: &FlowFrame) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating output file {}", path.display()))?;

    writer
        .write_record(&frame.columns)
        .context("writing header row")?;

    for (row_no, row) in frame.rows.iter().enumerate() {
        let record: Vec<String> = frame
            .columns
            .iter()
            .map(|col| row.get(col).unwrap_or(&FieldValue::Null).to_string())
            .collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing row {row_no}"))?;
    }

    writer.flush().context("flushing output file")?;
    Ok(path)
}
