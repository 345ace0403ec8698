use std::path::Path;
use tracing::{info, warn};

use crate::engine::{ClusterOutput, ClusteringEngine};
use crate::error::{Result, TopologyError};

/// Clustering output produced elsewhere and loaded from JSON.
///
/// Lets an external topic model feed the pipeline: the file holds the same
/// `{clusters, hierarchy}` shape the `cluster` command prints.
#[derive(Debug, Clone)]
pub struct PrecomputedClusters {
    output: ClusterOutput,
}

impl PrecomputedClusters {
    pub fn new(output: ClusterOutput) -> Self {
        Self { output }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TopologyError::InputNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        let output: ClusterOutput = serde_json::from_str(&json)?;
        info!(
            clusters = output.clusters.len(),
            merges = output.hierarchy.nodes().len(),
            "loaded precomputed clusters from {}",
            path.display()
        );
        Ok(Self::new(output))
    }

    pub fn output(&self) -> &ClusterOutput {
        &self.output
    }
}

impl ClusteringEngine for PrecomputedClusters {
    fn cluster(&self, feedback: &[String], seeds: Option<&[Vec<String>]>) -> Result<ClusterOutput> {
        if seeds.is_some() {
            warn!("seed keywords are ignored for precomputed clusters");
        }
        let members: usize = self.output.clusters.iter().map(|c| c.count).sum();
        if members > feedback.len() {
            warn!(
                members,
                documents = feedback.len(),
                "precomputed clusters report more members than input rows"
            );
        }
        Ok(self.output.clone())
    }
}
