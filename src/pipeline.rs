use anyhow::Result;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::data::encode::EncoderTable;
use crate::data::label::LabelPolicy;
use crate::data::loader::load_binetflow;
use crate::data::model::FlowFrame;
use crate::data::schema::{self, reconcile};
use crate::data::split::{shuffle_frame, stratified_split};
use crate::data::writer::write_frame;

// ---------------------------------------------------------------------------
// Pipeline errors callers branch on
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no capture files could be loaded")]
    NoSourcesLoaded,
    #[error("no training data was generated")]
    NoTrainingData,
    #[error("{failed} of {attempted} output files could not be written")]
    WriteFailures { failed: usize, attempted: usize },
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// What one pipeline run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub sources_loaded: usize,
    pub train_rows: usize,
    /// Per-source test row counts, in source order.
    pub test_rows: Vec<(String, usize)>,
}

// ---------------------------------------------------------------------------
// The pipeline
// ---------------------------------------------------------------------------

/// Run the full preprocessing pipeline:
/// load → fit encoders (jointly, once) → simplify labels → stratified split
/// per source → merge + shuffle train → reconcile every partition → write.
///
/// Missing source files are skipped with a warning; zero loadable sources is
/// fatal. Write failures are reported per artifact and the remaining
/// artifacts are still attempted before the run fails.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    // ---- load all sources ----
    let mut frames: Vec<(String, FlowFrame)> = Vec::new();
    for source in &config.sources {
        match load_binetflow(&source.path) {
            Ok(frame) => {
                log::info!(
                    "loaded source '{}' from {} ({} rows, {} columns)",
                    source.key,
                    source.path.display(),
                    frame.len(),
                    frame.columns.len()
                );
                frames.push((source.key.clone(), frame));
            }
            Err(e) => {
                log::warn!("skipping source '{}': {e:#}", source.key);
            }
        }
    }
    if frames.is_empty() {
        return Err(PipelineError::NoSourcesLoaded.into());
    }
    let sources_loaded = frames.len();

    // ---- fit encoders over the union of ALL sources, before splitting ----
    // Fitting per partition would drift codes between train and test.
    let fit_corpus: Vec<FlowFrame> = frames.iter().map(|(_, f)| f.clone()).collect();
    let encoders = EncoderTable::fit(&fit_corpus, &schema::CATEGORICAL_COLUMNS);
    drop(fit_corpus);

    // ---- simplify labels, drop raw-only columns ----
    let policy = LabelPolicy::default();
    for (_, frame) in &mut frames {
        policy.simplify_frame(frame);
        frame.drop_columns(&schema::DROPPED_COLUMNS);
    }

    // ---- stratified split per source ----
    let mut train_parts: Vec<FlowFrame> = Vec::new();
    let mut test_parts: Vec<(String, FlowFrame)> = Vec::new();
    for (key, frame) in frames {
        let split = stratified_split(frame, config.test_fraction, config.seed);
        log::info!(
            "source '{key}': {} train rows, {} test rows",
            split.train.len(),
            split.test.len()
        );
        if !split.train.is_empty() {
            train_parts.push(split.train);
        }
        if !split.test.is_empty() {
            test_parts.push((key, split.test));
        }
    }

    if train_parts.is_empty() {
        return Err(PipelineError::NoTrainingData.into());
    }

    // ---- merge + shuffle ----
    let mut train = FlowFrame::concat(train_parts);
    shuffle_frame(&mut train, config.seed);
    for (_, test) in &mut test_parts {
        shuffle_frame(test, config.seed);
    }

    // ---- reconcile every partition onto the Final Schema ----
    let train = reconcile(train, &encoders);
    let tests: Vec<(String, FlowFrame)> = test_parts
        .into_iter()
        .map(|(key, test)| (key, reconcile(test, &encoders)))
        .collect();

    // ---- write artifacts, best effort ----
    let mut attempted = 0;
    let mut failed = 0;
    attempted += 1;
    match write_frame(&config.output_dir, "train.csv", &train) {
        Ok(path) => log::info!("wrote {} ({} rows)", path.display(), train.len()),
        Err(e) => {
            log::error!("failed to write train.csv: {e:#}");
            failed += 1;
        }
    }
    let mut test_rows = Vec::with_capacity(tests.len());
    for (key, test) in &tests {
        attempted += 1;
        let name = format!("test_{key}.csv");
        match write_frame(&config.output_dir, &name, test) {
            Ok(path) => log::info!("wrote {} ({} rows)", path.display(), test.len()),
            Err(e) => {
                log::error!("failed to write {name}: {e:#}");
                failed += 1;
            }
        }
        test_rows.push((key.clone(), test.len()));
    }
    if failed > 0 {
        return Err(PipelineError::WriteFailures { failed, attempted }.into());
    }

    Ok(RunSummary {
        sources_loaded,
        train_rows: train.len(),
        test_rows,
    })
}
