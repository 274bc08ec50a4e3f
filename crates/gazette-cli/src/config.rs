//! Configuration file handling for the CLI.

use anyhow::Context;
use gazette_ingest::IngestConfig;
use gazette_normalize::NormalizeConfig;
use gazette_runner::RunnerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration, one section per layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GazetteConfig {
    /// Normalizer settings
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Runner settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

impl GazetteConfig {
    /// Load from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(Path::new(path))
            .with_context(|| format!("failed to read config file {}", path))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("invalid config file {}", path))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.normalize.validate()?;
        self.ingest.validate()?;
        self.runner.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = GazetteConfig::load(None).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[normalize]\nhead_lines = 5\ntail_lines = 2\nboilerplate_threshold = 0.5\nmetadata_scan_pages = 1\n\n[runner]\nworkers = 2"
        )
        .unwrap();

        let config = GazetteConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.normalize.head_lines, 5);
        assert_eq!(config.runner.workers, 2);
        // Missing section falls back to defaults.
        assert_eq!(config.ingest.max_retries, IngestConfig::default().max_retries);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[runner]\nworkers = 0").unwrap();
        assert!(GazetteConfig::load(Some(file.path().to_str().unwrap())).is_err());
    }
}
