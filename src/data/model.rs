use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// FieldValue – a single cell in a flow record
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the mixed dtypes of raw capture
/// files. Using `BTreeMap` / `BTreeSet` downstream so `FieldValue` must be
/// `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::String(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Null => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Null => Ok(()),
        }
    }
}

impl FieldValue {
    /// String key used for encoder fitting and lookup. Absent values map to
    /// the `"nan"` sentinel so they get a code of their own.
    pub fn encoding_key(&self) -> String {
        match self {
            FieldValue::Null => "nan".to_string(),
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(v) => v.to_string(),
        }
    }

    /// Numeric view with total fallback: non-numeric and absent values
    /// become 0.0.
    pub fn as_f64_lossy(&self) -> f64 {
        match self {
            FieldValue::Float(v) => *v,
            FieldValue::Integer(i) => *i as f64,
            FieldValue::String(s) => parse_numeric(s, 0.0),
            FieldValue::Null => 0.0,
        }
    }

    /// Integer view with total fallback: fractional values truncate,
    /// non-numeric and absent values become 0.
    pub fn as_i64_lossy(&self) -> i64 {
        match self {
            FieldValue::Integer(i) => *i,
            other => other.as_f64_lossy() as i64,
        }
    }

    /// Guess the type of a raw CSV cell: integer, then float, else string.
    /// Empty cells are `Null`.
    pub fn guess(raw: &str) -> FieldValue {
        if raw.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            // "nan"/"inf" cells count as missing, like a dataframe read.
            if f.is_finite() {
                return FieldValue::Float(f);
            }
            return FieldValue::Null;
        }
        FieldValue::String(raw.to_string())
    }
}

/// Total numeric coercion: parse `raw` as a float, returning `fallback` for
/// anything unparseable (including the empty string).
pub fn parse_numeric(raw: &str, fallback: f64) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => fallback,
    }
}

// ---------------------------------------------------------------------------
// FlowRecord – one row (a partial record: columns may be absent)
// ---------------------------------------------------------------------------

/// One flow observation: column_name → value. Columns a source never saw
/// are simply absent until schema reconciliation forces totality.
pub type FlowRecord = BTreeMap<String, FieldValue>;

// ---------------------------------------------------------------------------
// FlowFrame – one loaded record set
// ---------------------------------------------------------------------------

/// A full record set from one source (or one partition of one), with the
/// ordered union of observed column names.
#[derive(Debug, Clone)]
pub struct FlowFrame {
    /// All records (rows).
    pub rows: Vec<FlowRecord>,
    /// Ordered list of column names observed across the rows.
    pub columns: Vec<String>,
}

impl FlowFrame {
    /// Build the column index from the given rows.
    pub fn from_rows(rows: Vec<FlowRecord>) -> Self {
        let mut column_set: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            for col in row.keys() {
                column_set.insert(col.clone());
            }
        }
        FlowFrame {
            rows,
            columns: column_set.into_iter().collect(),
        }
    }

    /// Build a frame with an explicit column order (rows must only use
    /// these columns).
    pub fn with_columns(rows: Vec<FlowRecord>, columns: Vec<String>) -> Self {
        FlowFrame { rows, columns }
    }

    /// Concatenate several frames into one, re-deriving the column union.
    pub fn concat(frames: Vec<FlowFrame>) -> Self {
        let mut rows = Vec::with_capacity(frames.iter().map(|f| f.rows.len()).sum());
        for frame in frames {
            rows.extend(frame.rows);
        }
        FlowFrame::from_rows(rows)
    }

    /// Remove the named columns from every row and the column index.
    pub fn drop_columns(&mut self, names: &[&str]) {
        for row in &mut self.rows {
            for name in names {
                row.remove(*name);
            }
        }
        self.columns.retain(|c| !names.contains(&c.as_str()));
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
