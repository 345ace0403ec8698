//! Built-in clustering engine: TF-IDF vectors, HAC, and a second HAC pass
//! over cluster centroids to produce the merge table.
//!
//! Pipeline:
//! 1. Tokenize every document and build a TF-IDF corpus
//! 2. Boost terms that appear in any seed keyword list
//! 3. Run HAC on cosine distances (on a seeded sample when the corpus is large)
//! 4. Cut the dendrogram into `topics` clusters and attach unsampled documents
//!    to their nearest centroid
//! 5. Drop clusters below `min_cluster_size` to the unclustered id
//! 6. Renumber survivors by descending size and describe each one
//! 7. Merge the surviving centroids into a hierarchy

use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::algo::clustering::{self, cosine_similarity};
use crate::algo::hierarchy::{MergeNode, MergeTable};
use crate::algo::tfidf::{self, Corpus, TermVector};
use crate::algo::tokenizer;
use crate::config::ClusterConfig;
use crate::engine::{ClusterOutput, ClusterRecord, ClusteringEngine};
use crate::error::Result;

/// Weight multiplier for terms that appear in a seed keyword list.
const SEED_BOOST: f64 = 2.0;

pub struct TfidfClusterer {
    config: ClusterConfig,
}

/// A surviving cluster before it is turned into a record.
struct Group {
    members: Vec<usize>,
    centroid: TermVector,
}

impl TfidfClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    fn vectors(&self, corpus: &Corpus, seeds: &HashSet<String>) -> Vec<TermVector> {
        (0..corpus.num_docs() as usize)
            .into_par_iter()
            .map(|i| {
                let mut v = corpus.tfidf_vector(i);
                for (term, weight) in v.iter_mut() {
                    if seeds.contains(term) {
                        *weight *= SEED_BOOST;
                    }
                }
                v
            })
            .collect()
    }

    /// Raw cluster label per document; `None` for documents that share no
    /// terms with any cluster.
    fn assign(&self, vectors: &[TermVector]) -> Vec<Option<usize>> {
        let n = vectors.len();
        let sample = sample_indices(n, self.config.sample_size, self.config.seed);
        let sample_vectors: Vec<TermVector> = sample.iter().map(|&i| vectors[i].clone()).collect();

        let distances = clustering::cosine_distance_matrix(&sample_vectors);
        let dendrogram = clustering::hac(&distances, sample.len(), self.config.linkage);
        let labels = clustering::cut_tree(&dendrogram, self.config.topics.min(sample.len()));

        let mut assignment: Vec<Option<usize>> = vec![None; n];
        for (&doc, &label) in sample.iter().zip(&labels) {
            assignment[doc] = Some(label);
        }
        if sample.len() == n {
            return assignment;
        }

        let k = labels.iter().max().map_or(0, |m| m + 1);
        let centroids: Vec<TermVector> = (0..k)
            .map(|label| {
                let members: Vec<&TermVector> = sample
                    .iter()
                    .zip(&labels)
                    .filter(|(_, &l)| l == label)
                    .map(|(&doc, _)| &vectors[doc])
                    .collect();
                mean(&members)
            })
            .collect();

        let in_sample: HashSet<usize> = sample.iter().copied().collect();
        let attached: Vec<(usize, Option<usize>)> = (0..n)
            .into_par_iter()
            .filter(|doc| !in_sample.contains(doc))
            .map(|doc| (doc, nearest(&vectors[doc], &centroids)))
            .collect();
        for (doc, label) in attached {
            assignment[doc] = label;
        }
        assignment
    }

    fn describe(&self, id: usize, group: &Group, corpus: &Corpus, feedback: &[String]) -> ClusterRecord {
        let tags = self.keywords(&group.centroid, corpus, self.config.keywords);
        let label = tags
            .iter()
            .take(self.config.label_terms)
            .cloned()
            .collect::<Vec<_>>()
            .join("_");

        let mut ranked: Vec<(usize, f64)> = group
            .members
            .iter()
            .map(|&doc| (doc, cosine_similarity(&corpus.tfidf_vector(doc), &group.centroid)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        ClusterRecord {
            id: id as i64,
            name: format!("{id}_{label}"),
            count: group.members.len(),
            tags,
            feedback: ranked
                .iter()
                .take(self.config.representative_docs)
                .map(|&(doc, _)| feedback[doc].clone())
                .collect(),
        }
    }

    /// Top terms of `vector`, skipping terms above the document-frequency
    /// ceiling. Falls back to the unfiltered ranking when the ceiling would
    /// leave nothing, which happens on very small corpora.
    fn keywords(&self, vector: &TermVector, corpus: &Corpus, n: usize) -> Vec<String> {
        let filtered: TermVector = vector
            .iter()
            .filter(|(term, _)| corpus.doc_ratio(term) <= self.config.max_df)
            .map(|(t, w)| (t.clone(), *w))
            .collect();
        let source = if filtered.is_empty() { vector } else { &filtered };
        tfidf::rank_terms(source, n).into_iter().map(|(t, _)| t).collect()
    }

    fn hierarchy(&self, groups: &[Group], corpus: &Corpus) -> MergeTable {
        let k = groups.len();
        let centroids: Vec<TermVector> = groups.iter().map(|g| g.centroid.clone()).collect();
        let distances = clustering::cosine_distance_matrix(&centroids);
        let dendrogram = clustering::hac(&distances, k, self.config.linkage);

        dendrogram
            .spans()
            .into_iter()
            .enumerate()
            .map(|(step, leaves)| {
                let merged = tfidf::sum_vectors(leaves.iter().map(|&leaf| &centroids[leaf]));
                let name = self.keywords(&merged, corpus, self.config.label_terms).join("_");
                MergeNode::new(leaves.iter().map(|&l| l as i64), (k + step) as i64, name)
            })
            .collect()
    }
}

impl ClusteringEngine for TfidfClusterer {
    fn cluster(&self, feedback: &[String], seeds: Option<&[Vec<String>]>) -> Result<ClusterOutput> {
        if feedback.is_empty() {
            return Ok(ClusterOutput::default());
        }
        info!(documents = feedback.len(), "clustering feedback");

        let token_lists: Vec<Vec<String>> =
            feedback.par_iter().map(|t| tokenizer::tokenize(t)).collect();
        let corpus = Corpus::from_tokens(&token_lists);
        let seed_terms: HashSet<String> = seeds
            .unwrap_or_default()
            .iter()
            .flatten()
            .flat_map(|s| tokenizer::tokenize(s))
            .collect();
        let vectors = self.vectors(&corpus, &seed_terms);

        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (doc, label) in self.assign(&vectors).into_iter().enumerate() {
            if let Some(label) = label {
                members.entry(label).or_default().push(doc);
            }
        }

        let mut groups: Vec<Group> = members
            .into_values()
            .filter(|m| m.len() >= self.config.min_cluster_size)
            .map(|m| {
                let centroid = mean(&m.iter().map(|&doc| &vectors[doc]).collect::<Vec<_>>());
                Group { members: m, centroid }
            })
            .collect();
        groups.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then(a.members[0].cmp(&b.members[0]))
        });

        let clustered: usize = groups.iter().map(|g| g.members.len()).sum();
        debug!(
            clusters = groups.len(),
            unclustered = feedback.len() - clustered,
            "flat clustering complete"
        );

        let clusters = groups
            .iter()
            .enumerate()
            .map(|(id, group)| self.describe(id, group, &corpus, feedback))
            .collect();
        let hierarchy = self.hierarchy(&groups, &corpus);

        Ok(ClusterOutput { clusters, hierarchy })
    }
}

fn mean(vectors: &[&TermVector]) -> TermVector {
    let mut sum = tfidf::sum_vectors(vectors.iter().copied());
    if !vectors.is_empty() {
        let n = vectors.len() as f64;
        sum.values_mut().for_each(|w| *w /= n);
    }
    sum
}

fn nearest(vector: &TermVector, centroids: &[TermVector]) -> Option<usize> {
    centroids
        .iter()
        .enumerate()
        .map(|(label, c)| (label, cosine_similarity(vector, c)))
        .filter(|&(_, sim)| sim > 0.0)
        .fold(None, |best: Option<(usize, f64)>, (label, sim)| match best {
            Some((_, top)) if top >= sim => best,
            _ => Some((label, sim)),
        })
        .map(|(label, _)| label)
}

/// Seeded partial Fisher-Yates over `0..total`, returned sorted.
fn sample_indices(total: usize, size: usize, seed: u64) -> Vec<usize> {
    if size >= total {
        return (0..total).collect();
    }
    let mut indices: Vec<usize> = (0..total).collect();
    // Knuth MMIX LCG constants
    let mut state = seed.wrapping_add(1);
    for i in 0..size {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let j = i + (state as usize % (total - i));
        indices.swap(i, j);
    }
    indices.truncate(size);
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        let battery = [
            "battery dies fast and charging takes forever",
            "charging port underneath so battery charging blocks use",
            "battery charging cable lightning port awkward",
            "battery drains overnight need charging daily",
            "charging battery upside down is silly design",
        ];
        let scroll = [
            "scroll gestures smooth trackpad swipe feel",
            "swipe scroll gestures great on mac",
            "gestures scroll swipe responsive and precise",
            "smooth scroll swipe gestures love them",
            "scroll swipe gestures intuitive surface",
        ];
        let price = [
            "price expensive overpriced for mouse",
            "expensive price not worth money",
            "overpriced price premium cost too high",
            "price cost expensive compared alternatives",
            "money price expensive cheaper options exist",
        ];
        battery.iter().chain(&scroll).chain(&price).map(|s| s.to_string()).collect()
    }

    fn config() -> ClusterConfig {
        ClusterConfig {
            topics: 3,
            min_cluster_size: 3,
            ..ClusterConfig::default()
        }
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let out = TfidfClusterer::new(config()).cluster(&[], None).unwrap();
        assert!(out.clusters.is_empty());
        assert!(out.hierarchy.is_empty());
    }

    #[test]
    fn separates_distinct_themes() {
        let out = TfidfClusterer::new(config()).cluster(&corpus(), None).unwrap();
        assert_eq!(out.clusters.len(), 3);
        let total: usize = out.clusters.iter().map(|c| c.count).sum();
        assert_eq!(total, 15);

        let themes: Vec<&str> = vec!["battery", "scroll", "price"];
        for theme in themes {
            assert!(
                out.clusters.iter().any(|c| c.tags.iter().any(|t| t == theme)),
                "no cluster tagged '{theme}'"
            );
        }
    }

    #[test]
    fn records_are_well_formed() {
        let out = TfidfClusterer::new(config()).cluster(&corpus(), None).unwrap();
        for (i, record) in out.clusters.iter().enumerate() {
            assert_eq!(record.id, i as i64);
            assert!(record.name.starts_with(&format!("{i}_")));
            assert!(record.feedback.len() <= 4);
            assert!(!record.tags.is_empty());
            assert!(record.tags.len() <= 10);
        }
    }

    #[test]
    fn hierarchy_spans_all_clusters() {
        let out = TfidfClusterer::new(config()).cluster(&corpus(), None).unwrap();
        let nodes = out.hierarchy.nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].parent_id, 3);
        assert_eq!(nodes[1].parent_id, 4);
        assert_eq!(nodes[1].span(), 3);
        for id in 0..3 {
            assert!(out.hierarchy.resolve(id).is_some());
        }
    }

    #[test]
    fn small_clusters_become_unclustered() {
        let cfg = ClusterConfig {
            topics: 3,
            min_cluster_size: 10,
            ..ClusterConfig::default()
        };
        let out = TfidfClusterer::new(cfg).cluster(&corpus(), None).unwrap();
        assert!(out.clusters.is_empty());
    }

    #[test]
    fn clustering_is_deterministic() {
        let engine = TfidfClusterer::new(config());
        let a = engine.cluster(&corpus(), None).unwrap();
        let b = engine.cluster(&corpus(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sampled_clustering_assigns_every_document() {
        let cfg = ClusterConfig {
            topics: 3,
            min_cluster_size: 1,
            sample_size: 9,
            ..ClusterConfig::default()
        };
        let out = TfidfClusterer::new(cfg).cluster(&corpus(), None).unwrap();
        let total: usize = out.clusters.iter().map(|c| c.count).sum();
        assert_eq!(total, 15);
    }

    #[test]
    fn sample_indices_sorted_and_bounded() {
        let s = sample_indices(100, 10, 42);
        assert_eq!(s.len(), 10);
        assert!(s.windows(2).all(|w| w[0] < w[1]));
        assert!(s.iter().all(|&i| i < 100));
        assert_eq!(sample_indices(5, 10, 42), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn nearest_ignores_disjoint_centroids() {
        let v: TermVector = [("battery".to_string(), 1.0)].into();
        let c0: TermVector = [("scroll".to_string(), 1.0)].into();
        let c1: TermVector = [("battery".to_string(), 0.5)].into();
        assert_eq!(nearest(&v, &[c0.clone(), c1]), Some(1));
        assert_eq!(nearest(&v, &[c0]), None);
    }
}
