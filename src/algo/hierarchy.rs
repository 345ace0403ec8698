//! Hierarchical merge table and parent resolution.
//!
//! The clustering engine reports, for every merge it performed over the flat
//! clusters, which leaf cluster ids the merged node spans together with a
//! parent id and label. Resolving a leaf means finding its nearest enclosing
//! merge: the node spanning the fewest leaves, with the lowest parent id
//! winning among equally tight nodes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One merge in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeNode {
    pub leaf_ids: BTreeSet<i64>,
    pub parent_id: i64,
    pub parent_name: String,
}

impl MergeNode {
    pub fn new<I>(leaf_ids: I, parent_id: i64, parent_name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self {
            leaf_ids: leaf_ids.into_iter().collect(),
            parent_id,
            parent_name: parent_name.into(),
        }
    }

    pub fn span(&self) -> usize {
        self.leaf_ids.len()
    }
}

/// Ordered collection of merge nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeTable {
    nodes: Vec<MergeNode>,
}

impl MergeTable {
    pub fn new(nodes: Vec<MergeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[MergeNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nearest enclosing merge node for `leaf_id`, if any node spans it.
    pub fn enclosing(&self, leaf_id: i64) -> Option<&MergeNode> {
        self.nodes
            .iter()
            .filter(|node| node.leaf_ids.contains(&leaf_id))
            .min_by_key(|node| (node.span(), node.parent_id))
    }

    /// Parent name of the nearest enclosing merge node for `leaf_id`.
    pub fn resolve(&self, leaf_id: i64) -> Option<&str> {
        self.enclosing(leaf_id).map(|node| node.parent_name.as_str())
    }
}

impl FromIterator<MergeNode> for MergeTable {
    fn from_iter<I: IntoIterator<Item = MergeNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
