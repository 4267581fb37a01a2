//! Per-segment scoring and merging of segment results into overall scores.

use crate::{
    search::Document,
    similarity::{sort_descending, Scorer, SegmentScores, SimilarityScore},
    text::Segment,
};
use serde::Serialize;
use std::collections::HashSet;

/// Scores of one processed segment.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentResult {
    pub segment_index: usize,
    pub input_text: String,
    #[serde(flatten)]
    pub scores: SegmentScores,
}

/// A segment that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentFailure {
    pub segment_index: usize,
    pub message: String,
}

/// Running totals of one pass over all segments.
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    pub results: Vec<SegmentResult>,
    pub max_similarity_overall: f64,
    pub total_similarities: f64,
    pub paragraphs_processed: usize,
    /// Every individual score of every processed segment.
    pub pool: Vec<SimilarityScore>,
    pub errors: Vec<SegmentFailure>,
}

impl PassOutcome {
    /// Mean of the per-segment averages, 0 when nothing was processed.
    pub fn average_similarity(&self) -> f64 {
        if self.paragraphs_processed == 0 {
            return 0.0;
        }
        self.total_similarities / self.paragraphs_processed as f64
    }

    fn merge(&mut self, segment: &Segment, scores: SegmentScores) {
        self.total_similarities += scores.average_similarity;
        self.max_similarity_overall = self.max_similarity_overall.max(scores.max_similarity);
        self.paragraphs_processed += 1;
        self.pool.extend(scores.sorted.iter().cloned());

        self.results.push(SegmentResult {
            segment_index: segment.index,
            input_text: segment.raw.clone(),
            scores,
        });
    }
}

/// Score every segment against its candidates and merge the results.
///
/// A segment whose scoring fails is recorded in `errors` and contributes
/// nothing to the totals; the remaining segments are still processed.
pub fn process_all_paragraphs<F>(segments: &[Segment], scorer: &dyn Scorer, mut candidates: F) -> PassOutcome
where
    F: FnMut(&Segment) -> Vec<Document>,
{
    let mut outcome = PassOutcome::default();

    for segment in segments {
        let documents = candidates(segment);

        match scorer.score(segment, &documents) {
            Ok(scores) => outcome.merge(segment, scores),
            Err(err) => {
                log::warn!(
                    "segment={} scorer={} outcome=failed error={err}",
                    segment.index,
                    scorer.name()
                );
                outcome.errors.push(SegmentFailure {
                    segment_index: segment.index,
                    message: err.to_string(),
                });
            }
        }
    }

    outcome
}

/// Highest-scoring scores with distinct links, at most `n`.
pub fn top_links(pool: &[SimilarityScore], n: usize) -> Vec<SimilarityScore> {
    let mut sorted = pool.to_vec();
    sort_descending(&mut sorted);

    let mut seen = HashSet::new();
    let mut top = Vec::with_capacity(n);

    for score in sorted {
        if top.len() == n {
            break;
        }
        if seen.insert(score.link.clone()) {
            top.push(score);
        }
    }

    top
}
