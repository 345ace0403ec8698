use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::algo::tfidf::TermVector;

/// Linkage method for HAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Min distance between any pair of points in two clusters.
    Single,
    /// Max distance between any pair of points in two clusters.
    Complete,
    /// Average distance between all pairs of points.
    Average,
    /// Ward's method: minimizes total within-cluster variance.
    Ward,
}

impl Linkage {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(Self::Single),
            "complete" => Some(Self::Complete),
            "average" => Some(Self::Average),
            "ward" => Some(Self::Ward),
            _ => None,
        }
    }
}

/// Result of HAC: merge steps over `n` leaves.
///
/// Merge `i` creates the cluster with id `n + i`; leaves keep ids `0..n`.
#[derive(Debug, Clone)]
pub struct Dendrogram {
    pub merges: Vec<Merge>,
    pub n: usize,
}

/// A single merge step in the dendrogram.
#[derive(Debug, Clone)]
pub struct Merge {
    pub cluster_a: usize,
    pub cluster_b: usize,
    pub distance: f64,
    pub size: usize,
}

impl Dendrogram {
    /// Leaf indices spanned by each merge, in merge order. Each list is sorted.
    pub fn spans(&self) -> Vec<Vec<usize>> {
        let mut members: HashMap<usize, Vec<usize>> = (0..self.n).map(|i| (i, vec![i])).collect();
        let mut spans = Vec::with_capacity(self.merges.len());
        for (step, merge) in self.merges.iter().enumerate() {
            let mut leaves = members.remove(&merge.cluster_a).unwrap_or_default();
            leaves.extend(members.remove(&merge.cluster_b).unwrap_or_default());
            leaves.sort_unstable();
            members.insert(self.n + step, leaves.clone());
            spans.push(leaves);
        }
        spans
    }
}

/// Perform Hierarchical Agglomerative Clustering on a condensed distance matrix.
///
/// `distances` is the upper triangle of size n*(n-1)/2, indexed by
/// [`condensed_index`]. Ties resolve to the lowest (i, j) pair.
pub fn hac(distances: &[f64], n: usize, linkage: Linkage) -> Dendrogram {
    if n < 2 {
        return Dendrogram { merges: Vec::new(), n };
    }

    let mut dist = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distances[condensed_index(i, j, n)];
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut active = vec![true; n];
    let mut sizes = vec![1usize; n];
    let mut cluster_id: Vec<usize> = (0..n).collect();
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        let (mut best_i, mut best_j, mut best_dist) = (0, 0, f64::INFINITY);
        for i in (0..n).filter(|&i| active[i]) {
            for j in ((i + 1)..n).filter(|&j| active[j]) {
                if dist[i][j] < best_dist {
                    best_dist = dist[i][j];
                    best_i = i;
                    best_j = j;
                }
            }
        }

        let new_size = sizes[best_i] + sizes[best_j];
        merges.push(Merge {
            cluster_a: cluster_id[best_i],
            cluster_b: cluster_id[best_j],
            distance: best_dist,
            size: new_size,
        });

        // Lance-Williams update: fold best_j into best_i
        for k in (0..n).filter(|&k| active[k] && k != best_i && k != best_j) {
            let (ni, nj, nk) = (sizes[best_i] as f64, sizes[best_j] as f64, sizes[k] as f64);
            let (dik, djk) = (dist[best_i][k], dist[best_j][k]);
            let updated = match linkage {
                Linkage::Single => dik.min(djk),
                Linkage::Complete => dik.max(djk),
                Linkage::Average => (ni * dik + nj * djk) / (ni + nj),
                Linkage::Ward => {
                    ((ni + nk) * dik + (nj + nk) * djk - nk * best_dist) / (ni + nj + nk)
                }
            };
            dist[best_i][k] = updated;
            dist[k][best_i] = updated;
        }

        active[best_j] = false;
        sizes[best_i] = new_size;
        cluster_id[best_i] = n + step;
    }

    Dendrogram { merges, n }
}

/// Cut the dendrogram into `k` flat clusters.
///
/// Returns one label per leaf in `0..k`, numbered by first appearance.
pub fn cut_tree(dendrogram: &Dendrogram, k: usize) -> Vec<usize> {
    let n = dendrogram.n;
    if k >= n {
        return (0..n).collect();
    }

    let applied = n - k.max(1);
    let mut parent: HashMap<usize, usize> = HashMap::new();
    for (step, merge) in dendrogram.merges.iter().take(applied).enumerate() {
        parent.insert(merge.cluster_a, n + step);
        parent.insert(merge.cluster_b, n + step);
    }

    let find_root = |mut id: usize| -> usize {
        while let Some(&p) = parent.get(&id) {
            id = p;
        }
        id
    };

    let mut label_map: HashMap<usize, usize> = HashMap::new();
    (0..n)
        .map(|leaf| {
            let root = find_root(leaf);
            let next = label_map.len();
            *label_map.entry(root).or_insert(next)
        })
        .collect()
}

/// Cosine similarity between two sparse vectors; 0.0 when either is empty.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let norm_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(k, v)| large.get(k).map(|w| v * w))
        .sum();
    dot / (norm_a * norm_b)
}

/// Condensed cosine distance matrix (1 - similarity).
pub fn cosine_distance_matrix(vectors: &[TermVector]) -> Vec<f64> {
    let n = vectors.len();
    let mut distances = vec![0.0; n * n.saturating_sub(1) / 2];
    for i in 0..n {
        for j in (i + 1)..n {
            distances[condensed_index(i, j, n)] = 1.0 - cosine_similarity(&vectors[i], &vectors[j]);
        }
    }
    distances
}

/// Index into a condensed distance matrix for pair (i, j) where i < j.
pub fn condensed_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i < j);
    i * n - i * (i + 1) / 2 + j - i - 1
}
