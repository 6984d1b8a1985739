use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// One sensor source: a short key used in output file names and the path to
/// its raw capture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub key: String,
    pub path: PathBuf,
}

/// Full pipeline configuration, loadable from a JSON file:
///
/// ```json
/// {
///   "sources": [{ "key": "1", "path": "sensor1/sensor1.binetflow" }],
///   "output_dir": "final_dataset",
///   "seed": 42,
///   "test_fraction": 0.3
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sources: Vec<SourceSpec>,
    pub output_dir: PathBuf,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

fn default_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.3
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Conventional three-sensor layout used when no config file is given:
    /// `sensorN/sensorN.binetflow` inputs, `final_dataset/` output.
    pub fn sensor_layout() -> Self {
        let sources = (1..=3)
            .map(|n| SourceSpec {
                key: n.to_string(),
                path: PathBuf::from(format!("sensor{n}/sensor{n}.binetflow")),
            })
            .collect();
        PipelineConfig {
            sources,
            output_dir: PathBuf::from("final_dataset"),
            seed: default_seed(),
            test_fraction: default_test_fraction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn loads_config_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "sources": [{{ "key": "a", "path": "a/a.binetflow" }}],
                "output_dir": "out"
            }}"#
        )
        .expect("write config");

        let config = PipelineConfig::from_file(file.path()).expect("load");
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.3);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn sensor_layout_matches_convention() {
        let config = PipelineConfig::sensor_layout();
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.sources[0].key, "1");
        assert_eq!(
            config.sources[2].path,
            PathBuf::from("sensor3/sensor3.binetflow")
        );
    }
}
