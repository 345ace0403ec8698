use std::collections::{BTreeMap, HashMap};

/// Sparse term-weight vector. Ordered so that dot products and keyword
/// rankings are reproducible from run to run.
pub type TermVector = BTreeMap<String, f64>;

/// A corpus of tokenized feedback documents for TF-IDF weighting.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// document_id -> term -> count
    doc_terms: Vec<HashMap<String, u32>>,
    /// term -> number of documents containing it
    doc_freq: HashMap<String, u32>,
    num_docs: u32,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from pre-tokenized documents.
    pub fn from_tokens(token_lists: &[Vec<String>]) -> Self {
        let mut corpus = Self::new();
        for tokens in token_lists {
            corpus.add_document(tokens);
        }
        corpus
    }

    /// Add a document (as pre-tokenized terms) to the corpus.
    pub fn add_document(&mut self, tokens: &[String]) {
        let mut term_counts: HashMap<String, u32> = HashMap::new();
        for token in tokens {
            *term_counts.entry(token.clone()).or_insert(0) += 1;
        }
        for term in term_counts.keys() {
            *self.doc_freq.entry(term.clone()).or_insert(0) += 1;
        }
        self.doc_terms.push(term_counts);
        self.num_docs += 1;
    }

    /// Smoothed IDF: ln((N - df + 0.5) / (df + 0.5) + 1)
    pub fn idf(&self, term: &str) -> f64 {
        let df = *self.doc_freq.get(term).unwrap_or(&0) as f64;
        let n = self.num_docs as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    /// Fraction of documents that contain `term`.
    pub fn doc_ratio(&self, term: &str) -> f64 {
        if self.num_docs == 0 {
            return 0.0;
        }
        *self.doc_freq.get(term).unwrap_or(&0) as f64 / self.num_docs as f64
    }

    /// TF-IDF vector for a document by index. Empty documents yield an empty vector.
    pub fn tfidf_vector(&self, doc_idx: usize) -> TermVector {
        let doc = &self.doc_terms[doc_idx];
        let dl: u32 = doc.values().sum();
        let mut result = TermVector::new();
        if dl == 0 {
            return result;
        }
        for (term, &count) in doc {
            let tf = count as f64 / dl as f64;
            result.insert(term.clone(), tf * self.idf(term));
        }
        result
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }
}

/// Rank the terms of a vector by descending weight, ties broken alphabetically.
pub fn rank_terms(vector: &TermVector, n: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = vector.iter().map(|(t, w)| (t.clone(), *w)).collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(n);
    ranked
}

/// Element-wise sum of several vectors.
pub fn sum_vectors<'a, I>(vectors: I) -> TermVector
where
    I: IntoIterator<Item = &'a TermVector>,
{
    let mut merged = TermVector::new();
    for vector in vectors {
        for (term, weight) in vector {
            *merged.entry(term.clone()).or_insert(0.0) += weight;
        }
    }
    merged
}
