use std::path::Path;

use anyhow::Result;

use flowprep::config::PipelineConfig;
use flowprep::pipeline;

fn main() -> Result<()> {
    env_logger::init();

    // Usage: flowprep [config.json]
    // Without an argument the conventional sensor1..3 layout is assumed.
    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_file(Path::new(&path))?,
        None => PipelineConfig::sensor_layout(),
    };

    let summary = pipeline::run(&config)?;
    log::info!(
        "done: {} sources, {} train rows, {} test files",
        summary.sources_loaded,
        summary.train_rows,
        summary.test_rows.len()
    );
    Ok(())
}
