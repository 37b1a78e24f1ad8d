//! Configuration for table scanning

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Formula text containing this marker contributes no dependencies
    pub broken_reference_marker: String,
    /// Annotation used when a reference resolves to no named column
    pub unknown_marker: String,
    /// Rows of a table handed to a classifier
    pub preview_rows: usize,
    /// Rows of a table printed by the human formatter
    pub display_rows: usize,
    /// Attempts granted to a classifier before a table is skipped
    pub classifier_attempts: usize,
    /// Sheets excluded from extraction in addition to hidden ones
    pub skip_sheets: HashSet<String>,
}

impl ScanConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ScanConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check values that would make the scan meaningless
    pub fn validate(&self) -> Result<()> {
        if self.broken_reference_marker.is_empty() {
            anyhow::bail!("Configuration error: 'broken_reference_marker' must not be empty");
        }
        if self.unknown_marker.is_empty() {
            anyhow::bail!("Configuration error: 'unknown_marker' must not be empty");
        }
        if self.classifier_attempts == 0 {
            anyhow::bail!("Configuration error: 'classifier_attempts' must be at least 1");
        }
        Ok(())
    }

    pub fn is_sheet_skipped(&self, sheet_name: &str) -> bool {
        self.skip_sheets.contains(sheet_name)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            broken_reference_marker: "#REF!".to_string(),
            unknown_marker: "Unknown".to_string(),
            preview_rows: 5,
            display_rows: 6,
            classifier_attempts: 10,
            skip_sheets: HashSet::new(),
        }
    }
}
