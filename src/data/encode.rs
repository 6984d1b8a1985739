use std::collections::{BTreeMap, BTreeSet};

use super::model::FlowFrame;

// ---------------------------------------------------------------------------
// ColumnEncoder – string value → integer code for one column
// ---------------------------------------------------------------------------

/// A fitted categorical encoder for a single column. Codes are assigned by
/// lexicographic order of the fitted keys; any key not seen at fit time maps
/// to `fallback` (the code of the `"nan"` sentinel when fitted, else 0).
#[derive(Debug, Clone)]
pub struct ColumnEncoder {
    codes: BTreeMap<String, i64>,
    fallback: i64,
}

impl ColumnEncoder {
    fn fit(keys: BTreeSet<String>) -> Self {
        let codes: BTreeMap<String, i64> = keys
            .into_iter()
            .enumerate()
            .map(|(code, key)| (key, code as i64))
            .collect();
        let fallback = codes.get("nan").copied().unwrap_or(0);
        ColumnEncoder { codes, fallback }
    }

    /// Encode one key. Total: unseen keys map to the fallback code.
    pub fn encode(&self, key: &str) -> i64 {
        self.codes.get(key).copied().unwrap_or(self.fallback)
    }

    /// The code handed out for keys absent from the fitted set.
    pub fn fallback_code(&self) -> i64 {
        self.fallback
    }

    /// Number of distinct fitted keys.
    pub fn cardinality(&self) -> usize {
        self.codes.len()
    }
}

// ---------------------------------------------------------------------------
// EncoderTable – all fitted column encoders
// ---------------------------------------------------------------------------

/// The full set of fitted encoders. Fit exactly once over the union of all
/// sources, then applied immutably to the training set and every test
/// partition; refitting per partition would drift codes between them.
#[derive(Debug, Clone)]
pub struct EncoderTable {
    encoders: BTreeMap<String, ColumnEncoder>,
}

impl EncoderTable {
    /// Fit one encoder per designated column over every frame. Columns no
    /// frame contains are skipped (with a warning) rather than fitted empty.
    pub fn fit(frames: &[FlowFrame], columns: &[&str]) -> Self {
        let mut encoders = BTreeMap::new();

        for &col in columns {
            let mut keys: BTreeSet<String> = BTreeSet::new();
            let mut seen = false;
            let mut absent_somewhere = false;
            for frame in frames {
                if !frame.columns.iter().any(|c| c == col) {
                    absent_somewhere |= !frame.is_empty();
                    continue;
                }
                seen = true;
                for row in &frame.rows {
                    let key = row
                        .get(col)
                        .map(|v| v.encoding_key())
                        .unwrap_or_else(|| "nan".to_string());
                    keys.insert(key);
                }
            }
            if !seen {
                log::warn!("column '{col}' not found in any source, skipping encoder");
                continue;
            }
            // A source without the column is all-missing for it in the
            // combined fitting corpus, so the sentinel joins the key set and
            // keeps the fallback code distinct from real values.
            if absent_somewhere {
                keys.insert("nan".to_string());
            }
            let encoder = ColumnEncoder::fit(keys);
            log::info!(
                "fitted encoder for '{col}': {} values, fallback code {}",
                encoder.cardinality(),
                encoder.fallback_code()
            );
            encoders.insert(col.to_string(), encoder);
        }

        EncoderTable { encoders }
    }

    /// Fitted encoder for a column, if any frame contained it at fit time.
    pub fn encoder(&self, column: &str) -> Option<&ColumnEncoder> {
        self.encoders.get(column)
    }
}
