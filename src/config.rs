use crate::errors::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the URL pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Regex for URLs to exclude from validation entirely. An unset or
    /// empty pattern means "ignore nothing".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_pattern: Option<String>,

    /// Maximum number of concurrent validator workers
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Whether to issue HEAD requests to check URL liveness
    #[serde(default)]
    pub validate_head: bool,

    /// Per-request timeout for the HEAD probe, in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Global request rate for the HEAD probe, in requests per second
    #[serde(default = "default_probe_rate_per_sec")]
    pub probe_rate_per_sec: u32,
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    8
}

/// Default value for probe_timeout_secs
fn default_probe_timeout_secs() -> u64 {
    15
}

/// Default value for probe_rate_per_sec
fn default_probe_rate_per_sec() -> u32 {
    10
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ignore_pattern: None,
            max_concurrency: default_max_concurrency(),
            validate_head: false,
            probe_timeout_secs: default_probe_timeout_secs(),
            probe_rate_per_sec: default_probe_rate_per_sec(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        crate::utils::read_json_file(path)
    }

    /// Override the ignore pattern from the IMPORT_IGNORE environment
    /// variable if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(pattern) = std::env::var("IMPORT_IGNORE") {
            if !pattern.is_empty() {
                self.ignore_pattern = Some(pattern);
            }
        }
    }

    /// Compiles the configured ignore pattern.
    ///
    /// An unset or empty pattern means no filtering (`Ok(None)`); a pattern
    /// that fails to compile is a hard configuration error, rejected here
    /// before the validator ever runs.
    pub fn ignore_regex(&self) -> Result<Option<Regex>> {
        match self.ignore_pattern.as_deref() {
            None | Some("") => Ok(None),
            Some(pattern) => Regex::new(pattern).map(Some).map_err(|source| {
                Error::IgnorePattern {
                    pattern: pattern.to_string(),
                    source,
                }
            }),
        }
    }
}
