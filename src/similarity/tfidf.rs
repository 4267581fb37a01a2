//! TF-IDF vectorizer fitted over a small per-call corpus.
//!
//! Weights follow the smoothed formulation:
//! - tf: raw term count in the text
//! - idf: `ln((1 + n) / (1 + df)) + 1`
//! - rows are L2-normalized
//!
//! A model is fitted for every scoring call and never cached across calls,
//! so vocabularies of unrelated requests never mix.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

/// Runs of at least two word characters.
static TERM_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("term pattern must compile"));

/// Sparse vector: feature index -> weight.
pub type SparseVector = HashMap<usize, f64>;

/// Vocabulary and IDF weights learned from one corpus.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

/// Split text into lowercase terms the way the vectorizer sees them.
pub fn analyze(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TERM_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

impl TfidfModel {
    /// Fit vocabulary and IDF weights over `corpus`.
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for text in corpus {
            let mut terms = analyze(text.as_ref());
            terms.sort();
            terms.dedup();
            for term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = corpus.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());

        // BTreeMap iteration gives lexicographic feature order
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self { vocabulary, idf }
    }

    /// Number of features learned.
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Feature index of `term`, if it is in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Feature names in index order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    /// L2-normalized TF-IDF vector of `text`. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in analyze(text) {
            if let Some(index) = self.index_of(&term) {
                *vector.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (index, weight) in vector.iter_mut() {
            *weight *= self.idf[*index];
        }

        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in vector.values_mut() {
                *weight /= norm;
            }
        }

        vector
    }

    /// Weight of `term` inside an already transformed vector.
    pub fn weight(&self, vector: &SparseVector, term: &str) -> Option<f64> {
        self.index_of(term).map(|i| vector.get(&i).copied().unwrap_or(0.0))
    }
}

/// Cosine similarity of two sparse vectors, 0 when either is empty.
pub fn sparse_cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(i, x)| large.get(i).map(|y| x * y))
        .sum();

    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
