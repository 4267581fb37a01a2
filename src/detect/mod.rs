//! Plagiarism detection flows built on the similarity engines.
//!
//! `find_plagiarism` splits the input into segments, fetches candidates per
//! segment from web search, scores them lexically and escalates to the
//! semantic engine when the lexical pass finds a strong match. The direct
//! comparison flows skip segmentation and escalation.

pub mod aggregate;
pub mod escalation;

use crate::{
    config::{DetectionConfig, LexicalMethod},
    embeddings::WordEmbeddings,
    keywords::KeywordExtractor,
    search::{CandidateRetriever, Document},
    similarity::{EmbeddingScorer, RawFrequencyScorer, Scorer, ScoringError, SimilarityScore, TfidfScorer},
    text::{self, Segment},
};
use aggregate::{top_links, SegmentFailure, SegmentResult};
use escalation::Stage;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};

/// Result of a full plagiarism check.
#[derive(Debug, Clone, Serialize)]
pub struct PlagiarismReport {
    pub results: Vec<SegmentResult>,
    pub similarity: f64,
    pub max_similarity: f64,
    pub average_similarity: f64,
    pub total_paragraphs_processed: usize,
    /// Scorer of the pass the numbers come from.
    pub method: &'static str,
    #[serde(rename = "SortedUrls")]
    pub sorted_urls: Vec<SimilarityScore>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SegmentFailure>,
}

/// One input text compared lexically against the targets.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Cleaned input.
    pub input_text: String,
    pub average_similarity: f64,
    pub similarity: f64,
    pub individual_similarity: Vec<SimilarityScore>,
    #[serde(rename = "SortedUrls")]
    pub sorted_urls: Vec<SimilarityScore>,
}

/// One input sentence compared semantically against the targets.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceComparison {
    /// Cleaned sentence.
    pub input_text: String,
    pub average_similarity: f64,
    pub max_similarity: f64,
    pub individual_similarity: Vec<SimilarityScore>,
    #[serde(rename = "SortedUrls")]
    pub sorted_urls: Vec<SimilarityScore>,
}

/// Candidates of one detection request, keyed by keyword list.
///
/// The lexical pass fills the cache; the first non-empty result becomes the
/// fallback for segments that found nothing of their own. The semantic pass
/// only reads it.
struct RetrievalCache<'a> {
    retriever: &'a CandidateRetriever,
    entries: HashMap<Vec<String>, Vec<Document>>,
    fallback: Option<Vec<Document>>,
}

impl<'a> RetrievalCache<'a> {
    fn new(retriever: &'a CandidateRetriever) -> Self {
        Self {
            retriever,
            entries: HashMap::new(),
            fallback: None,
        }
    }

    fn candidates(&mut self, keywords: Vec<String>, stage: Stage) -> Vec<Document> {
        let found = match self.entries.get(&keywords) {
            Some(documents) => documents.clone(),
            None if stage == Stage::Semantic => vec![],
            None => {
                let documents: Vec<Document> =
                    self.retriever.retrieve(&keywords).iter().map(Document::cleaned).collect();
                self.entries.insert(keywords, documents.clone());
                documents
            }
        };

        if found.is_empty() {
            return self.fallback.clone().unwrap_or_default();
        }

        if self.fallback.is_none() {
            self.fallback = Some(found.clone());
        }

        found
    }
}

/// Plain target texts as documents, linked as `target-<index>`.
fn target_documents(targets: &[String]) -> Vec<Document> {
    targets
        .iter()
        .enumerate()
        .map(|(i, content)| Document {
            content: text::clean(content),
            title: String::new(),
            link: format!("target-{i}"),
        })
        .collect()
}

pub struct Detector {
    retriever: CandidateRetriever,
    keywords: KeywordExtractor,
    embeddings: Option<Arc<dyn WordEmbeddings>>,
    tfidf_weighted: bool,
    settings: DetectionConfig,
}

impl Detector {
    pub fn new(
        retriever: CandidateRetriever,
        settings: DetectionConfig,
        embeddings: Option<Arc<dyn WordEmbeddings>>,
        tfidf_weighted: bool,
    ) -> Self {
        Self {
            retriever,
            keywords: KeywordExtractor::new(settings.max_keywords),
            embeddings,
            tfidf_weighted,
            settings,
        }
    }

    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        self.keywords.extract(text)
    }

    /// Candidate documents for `keywords`, uncleaned. Empty on any failure.
    pub fn search(&self, keywords: &[String]) -> Vec<Document> {
        self.retriever.retrieve(keywords)
    }

    fn lexical_scorer(&self) -> Box<dyn Scorer> {
        match self.settings.lexical_method {
            LexicalMethod::Tfidf => Box::new(TfidfScorer),
            LexicalMethod::RawFrequency => Box::new(RawFrequencyScorer),
        }
    }

    fn semantic_scorer(&self) -> Option<EmbeddingScorer> {
        self.embeddings
            .clone()
            .map(|e| EmbeddingScorer::new(e, self.tfidf_weighted))
    }

    /// Check `text` against web search results.
    pub fn find_plagiarism(&self, text: &str) -> PlagiarismReport {
        let segments: Vec<Segment> = text::segment_fixed(
            text,
            self.settings.segment_count,
            self.settings.min_segment_length,
        )
        .into_iter()
        .enumerate()
        .map(|(i, raw)| Segment::new(i, raw))
        .collect();

        log::info!("find_plagiarism segments={} chars={}", segments.len(), text.chars().count());

        let lexical = self.lexical_scorer();
        let semantic = self.semantic_scorer();
        let mut cache = RetrievalCache::new(&self.retriever);

        let outcome = escalation::run(
            &segments,
            lexical.as_ref(),
            semantic.as_ref().map(|s| s as &dyn Scorer),
            self.settings.escalation_threshold,
            |segment, stage| cache.candidates(self.keywords.extract(&segment.raw), stage),
        );

        let pass = outcome.pass;
        let average_similarity = pass.average_similarity();

        PlagiarismReport {
            sorted_urls: top_links(&pass.pool, self.settings.top_links),
            similarity: pass.max_similarity_overall,
            max_similarity: pass.max_similarity_overall,
            average_similarity,
            total_paragraphs_processed: pass.paragraphs_processed,
            method: outcome.method,
            results: pass.results,
            errors: pass.errors,
        }
    }

    /// Raw-frequency comparison of every input text against `targets`, or
    /// against search results for the first input's keywords when no
    /// targets are given.
    pub fn compare(&self, inputs: &[String], targets: Option<&[String]>) -> Vec<ComparisonResult> {
        let documents = match targets {
            Some(targets) => target_documents(targets),
            None => {
                let keywords = inputs
                    .first()
                    .map(|first| self.extract_keywords(first))
                    .unwrap_or_default();
                self.search(&keywords).iter().map(Document::cleaned).collect()
            }
        };

        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                let segment = Segment::new(i, input.as_str());
                // raw-frequency scoring never fails
                let scores = RawFrequencyScorer.score(&segment, &documents).unwrap_or_default();

                ComparisonResult {
                    sorted_urls: top_links(&scores.sorted, self.settings.top_links),
                    input_text: segment.cleaned,
                    average_similarity: scores.average_similarity,
                    similarity: scores.max_similarity,
                    individual_similarity: scores.individual,
                }
            })
            .collect()
    }

    /// Semantic comparison of every sentence of `input` against `targets`.
    pub fn compare_semantic(&self, input: &str, targets: &[String]) -> Result<Vec<SentenceComparison>, ScoringError> {
        let scorer = self.semantic_scorer().ok_or(ScoringError::EmbeddingsUnavailable)?;
        let documents = target_documents(targets);

        text::segment_by_sentence(input)
            .enumerate()
            .map(|(i, sentence)| {
                let segment = Segment::new(i, sentence);
                let scores = scorer.score(&segment, &documents)?;

                Ok(SentenceComparison {
                    sorted_urls: top_links(&scores.sorted, self.settings.top_links),
                    input_text: segment.cleaned,
                    average_similarity: scores.average_similarity,
                    max_similarity: scores.max_similarity,
                    individual_similarity: scores.individual,
                })
            })
            .collect()
    }
}
