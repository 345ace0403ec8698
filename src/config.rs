//! Run configuration.
//!
//! Every section has defaults, so a config file only needs the keys it
//! overrides. Credentials live in [`GenerationConfig`] and are handed to the
//! generation engine at construction; the library never reads them from the
//! environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::algo::clustering::Linkage;
use crate::error::{Result, TopologyError};

/// Embedded default configuration, compiled from `config/default.json`.
const EMBEDDED_DEFAULT: &str = include_str!("../config/default.json");

/// Environment variable naming a config file to load.
pub const CONFIG_ENV: &str = "FEEDBACK_TOPOLOGY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub clustering: ClusterConfig,
    pub generation: GenerationConfig,
    pub naming: NamingConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Column holding the free-text feedback.
    pub column: String,
    /// Required file extension, compared case-insensitively.
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            column: "Comments".into(),
            extension: "csv".into(),
        }
    }
}

/// Settings for the built-in TF-IDF clustering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Target number of flat clusters before small ones are discarded.
    pub topics: usize,
    /// Clusters with fewer members are reported as unclustered.
    pub min_cluster_size: usize,
    /// Keywords kept per cluster.
    pub keywords: usize,
    /// Keywords used to build raw cluster and parent labels.
    pub label_terms: usize,
    /// Representative documents kept per cluster.
    pub representative_docs: usize,
    /// Terms found in more than this fraction of documents are never keywords.
    pub max_df: f64,
    pub linkage: Linkage,
    /// HAC is quadratic; larger corpora are clustered on a seeded sample.
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            topics: 20,
            min_cluster_size: 4,
            keywords: 10,
            label_terms: 4,
            representative_docs: 4,
            max_df: 0.4,
            linkage: Linkage::Average,
            sample_size: 2000,
            seed: 42,
        }
    }
}

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL; `/chat/completions` is appended.
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://router.huggingface.co/v1".into(),
            model: "google/gemma-3-4b-it".into(),
            api_key: None,
            max_tokens: 256,
            temperature: 0.2,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// System instruction sent with every generation request.
    pub system_prompt: String,
    /// Value stored when generation fails for an item.
    pub failure_text: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant".into(),
            failure_text: "Error generating summary".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub max_rows: usize,
    /// Topic name used when a Subtopic has no resolvable parent.
    pub unresolved_topic: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_rows: 25,
            unresolved_topic: "None".into(),
        }
    }
}

impl Config {
    /// Resolve configuration in this order:
    ///
    /// 1. `explicit` path (a load failure here is an error)
    /// 2. `$FEEDBACK_TOPOLOGY_CONFIG`
    /// 3. `$XDG_CONFIG_HOME/feedback-topology/config.json` (or `~/.config/...`)
    /// 4. Embedded compile-time default
    ///
    /// Steps 2 and 3 fall through silently when missing or unparsable.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::load(Path::new(&path)) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!("ignoring {CONFIG_ENV}={path}: {e}"),
            }
        }

        if let Some(path) = xdg_config_path().filter(|p| p.exists()) {
            match Self::load(&path) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!("ignoring {}: {e}", path.display()),
            }
        }

        Self::parse(EMBEDDED_DEFAULT)
    }

    /// Parse a configuration from a JSON string.
    pub fn parse(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| TopologyError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::parse(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.report.max_rows == 0 {
            return Err(TopologyError::Config("report.max_rows must be at least 1".into()));
        }
        if self.clustering.topics == 0 {
            return Err(TopologyError::Config("clustering.topics must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.clustering.max_df) {
            return Err(TopologyError::Config("clustering.max_df must be within [0, 1]".into()));
        }
        if self.input.column.trim().is_empty() {
            return Err(TopologyError::Config("input.column must not be empty".into()));
        }
        Ok(())
    }
}

/// The embedded default configuration as JSON.
pub fn embedded_default_json() -> &'static str {
    EMBEDDED_DEFAULT
}

fn xdg_config_path() -> Option<PathBuf> {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })?;
    Some(config_home.join("feedback-topology/config.json"))
}
