//! Boundaries to the model services the pipeline depends on.
//!
//! Clustering, sentiment classification and text generation are external
//! collaborators. Each is a trait here so the pipeline can be driven by the
//! bundled implementations, by a remote service, or by fakes in tests.

pub mod cluster;
#[cfg(feature = "http")]
pub mod generation;
pub mod precomputed;
pub mod sentiment;

use serde::{Deserialize, Serialize};

use crate::algo::hierarchy::MergeTable;
use crate::error::Result;
use crate::sentiment::SentimentScore;
use crate::topic::SubtopicId;

pub use cluster::TfidfClusterer;
#[cfg(feature = "http")]
pub use generation::HttpGenerator;
pub use precomputed::PrecomputedClusters;
pub use sentiment::LexiconSentiment;

/// One flat cluster as reported by a clustering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub id: SubtopicId,
    /// Raw label, usually prefixed with the cluster id.
    pub name: String,
    /// Total number of member documents.
    pub count: usize,
    /// Keywords, most representative first.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Representative documents, at most four are used.
    #[serde(default)]
    pub feedback: Vec<String>,
}

/// Complete output of a clustering run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutput {
    pub clusters: Vec<ClusterRecord>,
    #[serde(default)]
    pub hierarchy: MergeTable,
}

pub trait ClusteringEngine {
    /// Cluster `feedback`, optionally biased toward the given seed keyword lists.
    fn cluster(&self, feedback: &[String], seeds: Option<&[Vec<String>]>) -> Result<ClusterOutput>;
}

pub trait SentimentEngine {
    /// Classify one piece of feedback. Failures are handled inside the engine.
    fn classify(&self, feedback: &str) -> SentimentScore;
}

pub trait GenerationEngine {
    /// Generate text for `prompt` under the `system` instruction.
    fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}
