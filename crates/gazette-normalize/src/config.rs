//! Configuration for the normalizer

use serde::{Deserialize, Serialize};

/// Configuration for the normalization stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Lines from the top of each page considered header candidates
    pub head_lines: usize,

    /// Lines from the bottom of each page considered footer candidates
    pub tail_lines: usize,

    /// Fraction of pages a candidate must appear on to count as
    /// boilerplate (0.0–1.0]
    pub boilerplate_threshold: f64,

    /// How many cleaned pages the metadata inferrer scans
    pub metadata_scan_pages: usize,
}

impl NormalizeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.head_lines == 0 && self.tail_lines == 0 {
            return Err("at least one of head_lines/tail_lines must be non-zero".to_string());
        }
        if !(self.boilerplate_threshold > 0.0 && self.boilerplate_threshold <= 1.0) {
            return Err(format!(
                "boilerplate_threshold {} outside (0.0, 1.0]",
                self.boilerplate_threshold
            ));
        }
        if self.metadata_scan_pages == 0 {
            return Err("metadata_scan_pages must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Preset for heavily scanned sources: wider header/footer zones
    /// and a lower threshold, tolerating more OCR dropout
    pub fn for_scanned_sources() -> Self {
        Self {
            head_lines: 4,
            tail_lines: 4,
            boilerplate_threshold: 0.5,
            metadata_scan_pages: 3,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            head_lines: 3,
            tail_lines: 3,
            boilerplate_threshold: 0.6,
            metadata_scan_pages: 2,
        }
    }
}
