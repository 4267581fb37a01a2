//! Cosine similarity over averaged word embeddings.

use super::{
    cosine,
    tfidf::{SparseVector, TfidfModel},
    Scorer, ScoringError, SegmentScores,
};
use crate::{embeddings::WordEmbeddings, search::Document, text::Segment};
use std::sync::Arc;

/// Scores texts by the cosine of their mean word vectors.
///
/// With `tfidf_weighted` every word vector is weighted by the word's TF-IDF
/// value in its own text, using a vectorizer fitted on the segment plus all
/// documents of the call.
#[derive(Clone)]
pub struct EmbeddingScorer {
    embeddings: Arc<dyn WordEmbeddings>,
    tfidf_weighted: bool,
}

impl EmbeddingScorer {
    pub fn new(embeddings: Arc<dyn WordEmbeddings>, tfidf_weighted: bool) -> Self {
        Self {
            embeddings,
            tfidf_weighted,
        }
    }

    /// Unweighted mean of the vectors of all in-vocabulary words.
    pub fn mean_vector(&self, text: &str) -> Result<Vec<f32>, ScoringError> {
        let size = self.embeddings.vector_size();
        let mut sum = vec![0.0f32; size];
        let mut count = 0usize;

        for word in text.split_whitespace() {
            if let Some(vector) = self.lookup(word)? {
                for (acc, v) in sum.iter_mut().zip(vector) {
                    *acc += v;
                }
                count += 1;
            }
        }

        if count == 0 {
            return Ok(vec![0.0; size]);
        }

        Ok(sum.into_iter().map(|v| v / count as f32).collect())
    }

    /// Mean of word vectors weighted by the TF-IDF row of `text`.
    pub fn weighted_vector(&self, text: &str, model: &TfidfModel) -> Result<Vec<f32>, ScoringError> {
        let size = self.embeddings.vector_size();
        let row: SparseVector = model.transform(text);
        let mut sum = vec![0.0f32; size];
        let mut total = 0.0f64;

        for word in text.split_whitespace() {
            let Some(vector) = self.lookup(word)? else {
                continue;
            };
            let Some(weight) = model.weight(&row, word) else {
                continue;
            };

            for (acc, v) in sum.iter_mut().zip(vector) {
                *acc += v * weight as f32;
            }
            total += weight;
        }

        if total == 0.0 {
            return Ok(vec![0.0; size]);
        }

        Ok(sum.into_iter().map(|v| v / total as f32).collect())
    }

    fn lookup(&self, word: &str) -> Result<Option<&[f32]>, ScoringError> {
        match self.embeddings.get(word) {
            Some(v) if v.len() != self.embeddings.vector_size() => Err(ScoringError::DimensionMismatch {
                expected: self.embeddings.vector_size(),
                got: v.len(),
            }),
            other => Ok(other),
        }
    }
}

impl Scorer for EmbeddingScorer {
    fn score(&self, segment: &Segment, documents: &[Document]) -> Result<SegmentScores, ScoringError> {
        let similarities = if self.tfidf_weighted {
            let corpus: Vec<&str> = std::iter::once(segment.cleaned.as_str())
                .chain(documents.iter().map(|d| d.content.as_str()))
                .collect();
            let model = TfidfModel::fit(&corpus);

            let query = self.weighted_vector(&segment.cleaned, &model)?;
            documents
                .iter()
                .map(|doc| Ok(cosine(&query, &self.weighted_vector(&doc.content, &model)?)))
                .collect::<Result<Vec<f64>, ScoringError>>()?
        } else {
            let query = self.mean_vector(&segment.cleaned)?;
            documents
                .iter()
                .map(|doc| Ok(cosine(&query, &self.mean_vector(&doc.content)?)))
                .collect::<Result<Vec<f64>, ScoringError>>()?
        };

        Ok(SegmentScores::from_similarities(segment.index, documents, similarities))
    }

    fn name(&self) -> &'static str {
        "semantic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::WordVectors;

    fn table() -> Arc<dyn WordEmbeddings> {
        let mut vectors = WordVectors::new(3);
        vectors.insert("cat", vec![1.0, 0.0, 0.0]).unwrap();
        vectors.insert("kitten", vec![0.9, 0.1, 0.0]).unwrap();
        vectors.insert("dog", vec![0.0, 1.0, 0.0]).unwrap();
        vectors.insert("car", vec![0.0, 0.0, 1.0]).unwrap();
        vectors.insert("Cat", vec![0.0, 0.0, 1.0]).unwrap();
        Arc::new(vectors)
    }

    fn doc(content: &str, link: &str) -> Document {
        Document {
            content: content.to_string(),
            title: String::new(),
            link: link.to_string(),
        }
    }

    fn segment(cleaned: &str) -> Segment {
        Segment {
            index: 0,
            raw: cleaned.to_string(),
            cleaned: cleaned.to_string(),
        }
    }

    #[test]
    fn test_mean_vector_skips_unknown_words() {
        let scorer = EmbeddingScorer::new(table(), false);
        assert_eq!(scorer.mean_vector("cat dog zebra").unwrap(), vec![0.5, 0.5, 0.0]);
        assert_eq!(scorer.mean_vector("zebra").unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let scorer = EmbeddingScorer::new(table(), false);
        assert_eq!(scorer.mean_vector("Cat").unwrap(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_identical_text_scores_one() {
        for weighted in [false, true] {
            let scorer = EmbeddingScorer::new(table(), weighted);
            let scores = scorer
                .score(&segment("cat dog"), &[doc("cat dog", "a")])
                .unwrap();
            assert!((scores.max_similarity - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_out_of_vocabulary_document_scores_zero() {
        for weighted in [false, true] {
            let scorer = EmbeddingScorer::new(table(), weighted);
            let scores = scorer
                .score(&segment("cat"), &[doc("zebra giraffe", "z"), doc("", "empty")])
                .unwrap();
            assert_eq!(scores.individual[0].similarity, 0.0);
            assert_eq!(scores.individual[1].similarity, 0.0);
            assert!(!scores.average_similarity.is_nan());
        }
    }

    #[test]
    fn test_semantic_neighbours_rank_first() {
        let scorer = EmbeddingScorer::new(table(), true);
        let scores = scorer
            .score(&segment("cat"), &[doc("car", "car"), doc("kitten", "kitten")])
            .unwrap();
        assert_eq!(scores.sorted[0].link, "kitten");
        assert!(scores.sorted[0].similarity > 0.9);
    }

    #[test]
    fn test_symmetry() {
        let scorer = EmbeddingScorer::new(table(), true);
        let ab = scorer.score(&segment("cat dog"), &[doc("kitten car", "b")]).unwrap();
        let ba = scorer.score(&segment("kitten car"), &[doc("cat dog", "a")]).unwrap();
        assert!((ab.max_similarity - ba.max_similarity).abs() < 1e-6);
    }
}
