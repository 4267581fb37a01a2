//! Cosine similarity over sparse token vectors.

use super::{
    tfidf::{sparse_cosine, TfidfModel},
    Scorer, ScoringError, SegmentScores,
};
use crate::{search::Document, text, text::Segment};
use std::collections::HashMap;

/// Token counts of `text` as produced by [`text::tokenize`].
fn term_counts(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for token in text::tokenize(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine of two raw term-frequency vectors over the union of their terms.
pub fn raw_frequency_cosine(a: &str, b: &str) -> f64 {
    let a = term_counts(a);
    let b = term_counts(b);

    let dot: f64 = a
        .iter()
        .filter_map(|(term, x)| b.get(term).map(|y| x * y))
        .sum();
    let norm_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Raw token-count cosine.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFrequencyScorer;

impl Scorer for RawFrequencyScorer {
    fn score(&self, segment: &Segment, documents: &[Document]) -> Result<SegmentScores, ScoringError> {
        let similarities = documents
            .iter()
            .map(|doc| raw_frequency_cosine(&segment.cleaned, &doc.content))
            .collect();

        Ok(SegmentScores::from_similarities(segment.index, documents, similarities))
    }

    fn name(&self) -> &'static str {
        "raw_frequency"
    }
}

/// TF-IDF cosine. The vectorizer is fitted on the segment plus all
/// documents for every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TfidfScorer;

impl Scorer for TfidfScorer {
    fn score(&self, segment: &Segment, documents: &[Document]) -> Result<SegmentScores, ScoringError> {
        let corpus: Vec<&str> = std::iter::once(segment.cleaned.as_str())
            .chain(documents.iter().map(|d| d.content.as_str()))
            .collect();

        let model = TfidfModel::fit(&corpus);
        let query = model.transform(&segment.cleaned);

        let similarities = documents
            .iter()
            .map(|doc| sparse_cosine(&query, &model.transform(&doc.content)))
            .collect();

        Ok(SegmentScores::from_similarities(segment.index, documents, similarities))
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, link: &str) -> Document {
        Document {
            content: text::clean(content),
            title: String::new(),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_identical_text_scores_one() {
        let segment = Segment::new(0, "The quick brown fox jumps.");
        let docs = vec![doc("The quick brown fox jumps.", "a")];

        for scorer in [&RawFrequencyScorer as &dyn Scorer, &TfidfScorer] {
            let scores = scorer.score(&segment, &docs).unwrap();
            assert!((scores.max_similarity - 1.0).abs() < 1e-9, "{}", scorer.name());
        }
    }

    #[test]
    fn test_symmetry() {
        let a = "solar panels convert sunlight into electricity";
        let b = "wind turbines convert wind into electricity";
        assert!((raw_frequency_cosine(a, b) - raw_frequency_cosine(b, a)).abs() < 1e-12);

        let ab = TfidfScorer
            .score(&Segment::new(0, a), &[doc(b, "b")])
            .unwrap()
            .max_similarity;
        let ba = TfidfScorer
            .score(&Segment::new(0, b), &[doc(a, "a")])
            .unwrap()
            .max_similarity;
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_empty_side_is_zero() {
        assert_eq!(raw_frequency_cosine("", "some words"), 0.0);

        let segment = Segment::new(0, "meaningful content here");
        let docs = vec![doc("the and of", "empty")];
        for scorer in [&RawFrequencyScorer as &dyn Scorer, &TfidfScorer] {
            let scores = scorer.score(&segment, &docs).unwrap();
            assert_eq!(scores.max_similarity, 0.0);
            assert!(!scores.average_similarity.is_nan());
        }
    }

    #[test]
    fn test_ranking_prefers_closer_document() {
        let segment = Segment::new(1, "Photosynthesis turns light into chemical energy in plants.");
        let docs = vec![
            doc("Stock markets fell sharply on Monday.", "far"),
            doc("Plants use photosynthesis to turn light into chemical energy.", "near"),
        ];

        let scores = TfidfScorer.score(&segment, &docs).unwrap();
        assert_eq!(scores.sorted[0].link, "near");
        assert_eq!(scores.sorted[0].link_index, 1);
        assert_eq!(scores.sorted[0].segment_index, 1);
        assert_eq!(scores.individual[0].link, "far");
    }
}
