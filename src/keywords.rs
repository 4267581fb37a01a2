//! Keyword extraction for search queries.
//!
//! Candidate phrases are the runs of words between stopwords and punctuation
//! (RAKE). Each word scores `degree / frequency`, where degree counts the
//! words it co-occurs with inside phrases (itself included); a phrase scores
//! the sum of its words. The best phrases are lemmatized and long ones are
//! broken into 3-word windows so each query term stays short.

use crate::text::{is_stopword, lemmatize, word_tokens};
use std::collections::HashMap;

const DEFAULT_MAX_KEYWORDS: usize = 5;
/// Words per sliding window for long phrases.
const WINDOW: usize = 3;

pub struct KeywordExtractor {
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_KEYWORDS)
    }
}

fn is_word(token: &str) -> bool {
    token.chars().any(char::is_alphanumeric)
}

impl KeywordExtractor {
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }

    /// Candidate phrases in order of appearance, lowercased.
    fn phrases(text: &str) -> Vec<Vec<String>> {
        let mut phrases = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for token in word_tokens(text) {
            let token = token.to_lowercase();
            if !is_word(&token) || is_stopword(&token) {
                if !current.is_empty() {
                    phrases.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push(token);
        }

        if !current.is_empty() {
            phrases.push(current);
        }

        phrases
    }

    /// Top phrases by RAKE score, highest first, each phrase once.
    pub fn ranked_phrases(&self, text: &str) -> Vec<String> {
        let phrases = Self::phrases(text);

        let mut frequency: HashMap<&str, f64> = HashMap::new();
        let mut degree: HashMap<&str, f64> = HashMap::new();
        for phrase in &phrases {
            for word in phrase {
                *frequency.entry(word).or_insert(0.0) += 1.0;
                *degree.entry(word).or_insert(0.0) += phrase.len() as f64;
            }
        }

        let word_score = |word: &str| degree[word] / frequency[word];

        let mut scored: Vec<(String, f64)> = Vec::new();
        for phrase in &phrases {
            let joined = phrase.join(" ");
            if scored.iter().any(|(p, _)| *p == joined) {
                continue;
            }
            let score = phrase.iter().map(|w| word_score(w)).sum();
            scored.push((joined, score));
        }

        // stable: equal scores keep first appearance
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(self.max_keywords)
            .map(|(phrase, _)| phrase)
            .collect()
    }

    /// Keywords for a search query: lemmatized top phrases, phrases of
    /// three or more words expanded into their 3-word windows.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let keywords: Vec<String> = self
            .ranked_phrases(text)
            .iter()
            .flat_map(|phrase| {
                let words: Vec<String> = phrase.split_whitespace().map(lemmatize).collect();
                windows(&words)
            })
            .collect();

        log::debug!("keywords={keywords:?}");
        keywords
    }
}

fn windows(words: &[String]) -> Vec<String> {
    if words.len() < WINDOW {
        return vec![words.join(" ")];
    }

    words.windows(WINDOW).map(|w| w.join(" ")).collect()
}
