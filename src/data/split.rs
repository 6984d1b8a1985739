use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::label::LabelClass;
use super::model::{FlowFrame, FlowRecord};

// ---------------------------------------------------------------------------
// Stratified train/test split
// ---------------------------------------------------------------------------

/// One source's train and test contributions.
#[derive(Debug)]
pub struct SplitFrames {
    pub train: FlowFrame,
    pub test: FlowFrame,
}

/// Split a labeled frame into train and test, stratified per label class so
/// the split preserves class balance. Each non-empty class subset is
/// shuffled with a fresh seeded RNG and `ceil(n * test_fraction)` rows go to
/// test (sklearn's rounding). Empty class subsets contribute nothing.
pub fn stratified_split(frame: FlowFrame, test_fraction: f64, seed: u64) -> SplitFrames {
    let mut by_class: BTreeMap<LabelClass, Vec<FlowRecord>> = BTreeMap::new();
    for row in frame.rows {
        let class = row
            .get("Label")
            .map(|v| v.encoding_key())
            .and_then(|text| {
                LabelClass::ALL
                    .iter()
                    .copied()
                    .find(|c| c.as_str() == text)
            })
            .unwrap_or(LabelClass::Normal);
        by_class.entry(class).or_default().push(row);
    }

    let mut train_rows = Vec::new();
    let mut test_rows = Vec::new();

    // Fixed class iteration order keeps the split deterministic.
    for class in LabelClass::ALL {
        let Some(mut rows) = by_class.remove(&class) else {
            continue;
        };
        if rows.is_empty() {
            continue;
        }
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let n_test = (rows.len() as f64 * test_fraction).ceil() as usize;
        let n_train = rows.len() - n_test;
        let class_test = rows.split_off(n_train);

        train_rows.extend(rows);
        test_rows.extend(class_test);
    }

    SplitFrames {
        train: FlowFrame::from_rows(train_rows),
        test: FlowFrame::from_rows(test_rows),
    }
}

/// Shuffle a frame's rows in place with a fixed seed.
pub fn shuffle_frame(frame: &mut FlowFrame, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    frame.rows.shuffle(&mut rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;
    use pretty_assertions::assert_eq;

    fn labeled_frame(counts: &[(&str, usize)]) -> FlowFrame {
        let mut rows = Vec::new();
        let mut id = 0i64;
        for &(label, n) in counts {
            for _ in 0..n {
                let mut row = FlowRecord::new();
                row.insert("Label".into(), FieldValue::String(label.into()));
                row.insert("TotPkts".into(), FieldValue::Integer(id));
                id += 1;
                rows.push(row);
            }
        }
        FlowFrame::from_rows(rows)
    }

    fn class_count(frame: &FlowFrame, label: &str) -> usize {
        frame
            .rows
            .iter()
            .filter(|r| r.get("Label") == Some(&FieldValue::String(label.into())))
            .count()
    }

    #[test]
    fn split_sizes_sum_per_class() {
        let frame = labeled_frame(&[("normal", 10), ("botnet", 5)]);
        let split = stratified_split(frame, 0.3, 42);

        // ceil(10 * 0.3) = 3, ceil(5 * 0.3) = 2
        assert_eq!(class_count(&split.train, "normal"), 7);
        assert_eq!(class_count(&split.test, "normal"), 3);
        assert_eq!(class_count(&split.train, "botnet"), 3);
        assert_eq!(class_count(&split.test, "botnet"), 2);
        assert_eq!(split.train.len() + split.test.len(), 15);
    }

    #[test]
    fn empty_class_contributes_nothing() {
        let frame = labeled_frame(&[("normal", 4)]);
        let split = stratified_split(frame, 0.3, 42);

        assert_eq!(class_count(&split.train, "botnet_spam"), 0);
        assert_eq!(class_count(&split.test, "botnet_spam"), 0);
        assert_eq!(split.train.len() + split.test.len(), 4);
    }

    #[test]
    fn split_is_deterministic_for_a_fixed_seed() {
        let frame = labeled_frame(&[("normal", 20), ("botnet_spam", 7)]);
        let a = stratified_split(frame.clone(), 0.3, 42);
        let b = stratified_split(frame, 0.3, 42);

        let ids = |f: &FlowFrame| -> Vec<i64> {
            f.rows
                .iter()
                .map(|r| r.get("TotPkts").unwrap().as_i64_lossy())
                .collect()
        };
        assert_eq!(ids(&a.train), ids(&b.train));
        assert_eq!(ids(&a.test), ids(&b.test));
    }

    #[test]
    fn no_row_lands_in_both_partitions() {
        let frame = labeled_frame(&[("normal", 12), ("botnet", 6)]);
        let split = stratified_split(frame, 0.3, 7);

        let train_ids: Vec<i64> = split
            .train
            .rows
            .iter()
            .map(|r| r.get("TotPkts").unwrap().as_i64_lossy())
            .collect();
        for row in &split.test.rows {
            let id = row.get("TotPkts").unwrap().as_i64_lossy();
            assert!(!train_ids.contains(&id));
        }
    }

    #[test]
    fn shuffle_is_deterministic_and_preserves_rows() {
        let mut a = labeled_frame(&[("normal", 9)]);
        let mut b = a.clone();
        shuffle_frame(&mut a, 42);
        shuffle_frame(&mut b, 42);

        assert_eq!(a.rows, b.rows);
        assert_eq!(a.len(), 9);
    }
}
