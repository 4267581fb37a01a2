//! Similarity engines.
//!
//! Every engine scores one segment against an ordered list of candidate
//! documents and returns the same [`SegmentScores`] shape, so the detection
//! pipeline can swap them freely:
//! - `lexical`: raw token-count cosine and TF-IDF cosine
//! - `semantic`: averaged word-embedding cosine
//! - `edit`: character edit distance (separate percentage-based API)

pub mod edit;
pub mod lexical;
pub mod semantic;
pub mod tfidf;

pub use lexical::{RawFrequencyScorer, TfidfScorer};
pub use semantic::EmbeddingScorer;

use crate::{search::Document, text::Segment};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("word embeddings are not loaded")]
    EmbeddingsUnavailable,

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Result of comparing one segment against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub segment_index: usize,
    pub link_index: usize,
    pub similarity: f64,
    pub link: String,
    pub title: String,
}

/// Scores of one segment against every candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentScores {
    pub average_similarity: f64,
    pub max_similarity: f64,
    /// In candidate order.
    #[serde(rename = "individual_similarity")]
    pub individual: Vec<SimilarityScore>,
    /// Highest first, ties in candidate order.
    #[serde(rename = "sorted_similarity")]
    pub sorted: Vec<SimilarityScore>,
}

impl SegmentScores {
    /// Build the scores from one similarity value per document.
    pub fn from_similarities(segment_index: usize, documents: &[Document], similarities: Vec<f64>) -> Self {
        let individual: Vec<SimilarityScore> = documents
            .iter()
            .zip(similarities)
            .enumerate()
            .map(|(link_index, (doc, similarity))| SimilarityScore {
                segment_index,
                link_index,
                similarity,
                link: doc.link.clone(),
                title: doc.title.clone(),
            })
            .collect();

        let average_similarity = if individual.is_empty() {
            0.0
        } else {
            individual.iter().map(|s| s.similarity).sum::<f64>() / individual.len() as f64
        };
        let max_similarity = individual.iter().map(|s| s.similarity).fold(0.0, f64::max);

        let mut sorted = individual.clone();
        sort_descending(&mut sorted);

        Self {
            average_similarity,
            max_similarity,
            individual,
            sorted,
        }
    }
}

/// Stable sort, highest similarity first.
pub fn sort_descending(scores: &mut [SimilarityScore]) {
    scores.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

/// Cosine similarity of two dense vectors, 0 when either norm is 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// A similarity engine.
///
/// `segment.cleaned` and every `Document::content` are expected to be
/// normalized already.
pub trait Scorer: Send + Sync {
    fn score(&self, segment: &Segment, documents: &[Document]) -> Result<SegmentScores, ScoringError>;

    /// Name reported in results and logs.
    fn name(&self) -> &'static str;
}
