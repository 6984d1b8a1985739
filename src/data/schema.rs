use std::collections::BTreeSet;

use super::encode::EncoderTable;
use super::model::{FieldValue, FlowFrame, FlowRecord};

// ---------------------------------------------------------------------------
// Final Schema – the fixed column contract every output file satisfies
// ---------------------------------------------------------------------------

/// Core fields, in output order.
pub const CORE_COLUMNS: [&str; 11] = [
    "Dur", "SrcAddr", "Sport", "Dir", "DstAddr", "Dport", "State", "TotPkts", "TotBytes",
    "SrcBytes", "Label",
];

/// Fixed protocol enumeration appended as one-hot indicator columns.
pub const PROTOCOL_COLUMNS: [&str; 19] = [
    "arp", "esp", "gre", "icmp", "igmp", "ipv6", "ipv6-icmp", "ipx/spx", "llc", "pim", "rarp",
    "rsvp", "rtcp", "rtp", "tcp", "udp", "udt", "unas", "ipnip",
];

/// Encoder targets among the core fields.
pub const CATEGORICAL_COLUMNS: [&str; 6] = ["SrcAddr", "Sport", "Dir", "DstAddr", "Dport", "State"];

/// Raw columns with no place in the output, removed before splitting.
pub const DROPPED_COLUMNS: [&str; 6] = [
    "dTos", "sTos", "ActivityLabel", "BotnetName", "SensorId", "StartTime",
];

/// The complete ordered output column list.
pub fn final_schema() -> Vec<&'static str> {
    CORE_COLUMNS.iter().chain(PROTOCOL_COLUMNS.iter()).copied().collect()
}

// ---------------------------------------------------------------------------
// Reconciler – force any partition onto the Final Schema
// ---------------------------------------------------------------------------

/// Reconcile one partition (the training frame or one source's test frame)
/// onto the Final Schema. Behavior is identical for every partition, and
/// reconciling an already-reconciled frame is a no-op. Steps, in order:
///
/// 1. expand `Proto` into 0/1 indicator columns named by the observed
///    values, dropping `Proto`
/// 2. encode categorical columns through the fitted table (unseen keys →
///    the column's fallback code; integer cells are prior codes and pass
///    through unchanged)
/// 3. categorical columns absent from the frame are filled with the
///    fallback code, or 0 when no encoder was fitted
/// 4. every remaining Final Schema column missing from the frame is created
///    filled with 0
/// 5. columns reduced to exactly the Final Schema, in order
/// 6. target dtypes: `Dur` → float, `Label` → text, everything else →
///    integer (non-numeric → 0, fractional values truncate)
pub fn reconcile(frame: FlowFrame, encoders: &EncoderTable) -> FlowFrame {
    let mut rows = frame.rows;

    // ---- 1. one-hot protocol expansion ----
    if frame.columns.iter().any(|c| c == "Proto") {
        let observed: BTreeSet<String> = rows
            .iter()
            .filter_map(|row| match row.get("Proto") {
                Some(FieldValue::Null) | None => None,
                Some(v) => Some(v.encoding_key()),
            })
            .collect();

        for row in &mut rows {
            let proto = match row.remove("Proto") {
                Some(FieldValue::Null) | None => None,
                Some(v) => Some(v.encoding_key()),
            };
            for name in &observed {
                let hit = proto.as_deref() == Some(name.as_str());
                row.insert(name.clone(), FieldValue::Integer(hit as i64));
            }
        }
    }

    // ---- 2 + 3. categorical encoding ----
    for col in CATEGORICAL_COLUMNS {
        match encoders.encoder(col) {
            Some(encoder) => {
                // Computed once per partition, not per row. A missing cell
                // keys as "nan", whose code IS the fallback, so absent
                // columns and absent cells land on the same value.
                let fallback = encoder.fallback_code();
                for row in &mut rows {
                    let coded = match row.get(col) {
                        // Already a code from a previous reconciliation.
                        Some(FieldValue::Integer(i)) => *i,
                        Some(v) => encoder.encode(&v.encoding_key()),
                        None => fallback,
                    };
                    row.insert(col.to_string(), FieldValue::Integer(coded));
                }
            }
            None => {
                if frame.columns.iter().any(|c| c == col) {
                    log::warn!("no fitted encoder for '{col}', filling with 0");
                }
                for row in &mut rows {
                    row.insert(col.to_string(), FieldValue::Integer(0));
                }
            }
        }
    }

    // ---- 4 + 5 + 6. totality, projection, dtypes ----
    let schema = final_schema();
    let projected: Vec<FlowRecord> = rows
        .into_iter()
        .map(|mut row| {
            let mut out = FlowRecord::new();
            for &col in &schema {
                let value = row.remove(col).unwrap_or(FieldValue::Integer(0));
                let typed = match col {
                    "Dur" => FieldValue::Float(value.as_f64_lossy()),
                    "Label" => value,
                    _ => FieldValue::Integer(value.as_i64_lossy()),
                };
                out.insert(col.to_string(), typed);
            }
            out
        })
        .collect();

    FlowFrame::with_columns(projected, schema.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(cells: &[(&str, FieldValue)]) -> FlowRecord {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn fit_table(frame: &FlowFrame) -> EncoderTable {
        EncoderTable::fit(std::slice::from_ref(frame), &CATEGORICAL_COLUMNS)
    }

    #[test]
    fn output_has_exactly_the_final_schema_in_order() {
        let frame = FlowFrame::from_rows(vec![record(&[
            ("Dur", FieldValue::Float(1.5)),
            ("Proto", FieldValue::String("tcp".into())),
            ("SrcAddr", FieldValue::String("10.0.0.1".into())),
            ("Label", FieldValue::String("normal".into())),
        ])]);
        let table = fit_table(&frame);
        let out = reconcile(frame, &table);

        let expected: Vec<String> = final_schema().iter().map(|s| s.to_string()).collect();
        assert_eq!(out.columns, expected);
        for row in &out.rows {
            assert_eq!(row.len(), expected.len());
        }
    }

    #[test]
    fn proto_expands_to_indicators_and_is_dropped() {
        let frame = FlowFrame::from_rows(vec![
            record(&[("Proto", FieldValue::String("tcp".into()))]),
            record(&[("Proto", FieldValue::String("udp".into()))]),
        ]);
        let table = fit_table(&frame);
        let out = reconcile(frame, &table);

        assert_eq!(out.rows[0].get("tcp"), Some(&FieldValue::Integer(1)));
        assert_eq!(out.rows[0].get("udp"), Some(&FieldValue::Integer(0)));
        assert_eq!(out.rows[1].get("tcp"), Some(&FieldValue::Integer(0)));
        assert_eq!(out.rows[1].get("udp"), Some(&FieldValue::Integer(1)));
        assert!(!out.columns.iter().any(|c| c == "Proto"));
        // Protocols never observed stay all-zero.
        assert_eq!(out.rows[0].get("icmp"), Some(&FieldValue::Integer(0)));
    }

    #[test]
    fn unseen_value_encodes_to_fallback() {
        let fitted = FlowFrame::from_rows(vec![record(&[(
            "State",
            FieldValue::String("CON".into()),
        )])]);
        let table = fit_table(&fitted);

        let incoming = FlowFrame::from_rows(vec![record(&[(
            "State",
            FieldValue::String("FSPA_FSPA".into()),
        )])]);
        let out = reconcile(incoming, &table);

        let fallback = table.encoder("State").unwrap().fallback_code();
        assert_eq!(out.rows[0].get("State"), Some(&FieldValue::Integer(fallback)));
    }

    #[test]
    fn absent_categorical_column_fills_with_fallback() {
        // Fit Dir with a nan sentinel so the fallback is nan's code.
        let fitted = FlowFrame::from_rows(vec![
            record(&[("Dir", FieldValue::String("->".into()))]),
            record(&[("Dir", FieldValue::Null)]),
        ]);
        let table = fit_table(&fitted);
        let nan_code = table.encoder("Dir").unwrap().fallback_code();

        let incoming = FlowFrame::from_rows(vec![record(&[("Dur", FieldValue::Float(0.5))])]);
        let out = reconcile(incoming, &table);
        assert_eq!(out.rows[0].get("Dir"), Some(&FieldValue::Integer(nan_code)));
        // No encoder at all for SrcAddr → plain zero.
        assert_eq!(out.rows[0].get("SrcAddr"), Some(&FieldValue::Integer(0)));
    }

    #[test]
    fn dtype_pass_forces_float_int_and_text() {
        let frame = FlowFrame::from_rows(vec![record(&[
            ("Dur", FieldValue::String("2.75".into())),
            ("TotPkts", FieldValue::String("junk".into())),
            ("TotBytes", FieldValue::Float(99.9)),
            ("Label", FieldValue::String("botnet".into())),
        ])]);
        let table = fit_table(&frame);
        let out = reconcile(frame, &table);

        assert_eq!(out.rows[0].get("Dur"), Some(&FieldValue::Float(2.75)));
        assert_eq!(out.rows[0].get("TotPkts"), Some(&FieldValue::Integer(0)));
        assert_eq!(out.rows[0].get("TotBytes"), Some(&FieldValue::Integer(99)));
        assert_eq!(
            out.rows[0].get("Label"),
            Some(&FieldValue::String("botnet".into()))
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let frame = FlowFrame::from_rows(vec![
            record(&[
                ("Dur", FieldValue::Float(1.0)),
                ("Proto", FieldValue::String("tcp".into())),
                ("SrcAddr", FieldValue::String("10.0.0.1".into())),
                ("Sport", FieldValue::String("443".into())),
                ("Label", FieldValue::String("normal".into())),
            ]),
            record(&[
                ("Dur", FieldValue::Float(2.0)),
                ("Proto", FieldValue::String("udp".into())),
                ("SrcAddr", FieldValue::String("10.0.0.2".into())),
                ("Sport", FieldValue::Null),
                ("Label", FieldValue::String("botnet".into())),
            ]),
        ]);
        let table = fit_table(&frame);

        let once = reconcile(frame, &table);
        let twice = reconcile(once.clone(), &table);

        assert_eq!(once.columns, twice.columns);
        assert_eq!(once.rows, twice.rows);
    }
}
