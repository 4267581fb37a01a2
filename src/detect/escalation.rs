//! Lexical pass first, semantic rescoring only when the lexical pass finds
//! a strong enough match.

use super::aggregate::{process_all_paragraphs, PassOutcome};
use crate::{search::Document, similarity::Scorer, text::Segment};

/// Which pass is asking for candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexical,
    Semantic,
}

/// The semantic pass runs only for a max similarity strictly above `threshold`.
pub fn should_escalate(max_similarity: f64, threshold: f64) -> bool {
    max_similarity > threshold
}

pub struct EscalationOutcome {
    pub pass: PassOutcome,
    /// Name of the scorer that produced `pass`.
    pub method: &'static str,
    pub escalated: bool,
}

/// Run the lexical pass and, when it crosses `threshold`, rerun every
/// segment with the semantic scorer. The outcome of the last pass wins.
///
/// `candidates` is called once per segment and pass; it receives the stage
/// so the semantic pass can be served from what the lexical pass fetched.
pub fn run<F>(
    segments: &[Segment],
    lexical: &dyn Scorer,
    semantic: Option<&dyn Scorer>,
    threshold: f64,
    mut candidates: F,
) -> EscalationOutcome
where
    F: FnMut(&Segment, Stage) -> Vec<Document>,
{
    let lexical_pass = process_all_paragraphs(segments, lexical, |s| candidates(s, Stage::Lexical));
    let max = lexical_pass.max_similarity_overall;

    if !should_escalate(max, threshold) {
        log::info!("escalation=skipped max_similarity={max} threshold={threshold}");
        return EscalationOutcome {
            pass: lexical_pass,
            method: lexical.name(),
            escalated: false,
        };
    }

    let Some(semantic) = semantic else {
        log::warn!("escalation=unavailable max_similarity={max} threshold={threshold} reason=no word embeddings loaded");
        return EscalationOutcome {
            pass: lexical_pass,
            method: lexical.name(),
            escalated: false,
        };
    };

    log::info!("escalation=semantic max_similarity={max} threshold={threshold}");
    let semantic_pass = process_all_paragraphs(segments, semantic, |s| candidates(s, Stage::Semantic));

    EscalationOutcome {
        pass: semantic_pass,
        method: semantic.name(),
        escalated: true,
    }
}
