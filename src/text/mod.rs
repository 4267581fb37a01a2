//! Text normalization for similarity scoring.
//!
//! - `dates`: date substring removal
//! - `stopwords`: English stopword list
//! - `lemmatize`: noun base-form lemmatization
//! - `segment`: sentence and fixed-size segmentation
//!
//! `clean` produces the whitespace-joined form every engine compares,
//! `tokenize` produces the token sequence used for frequency vectors.

mod dates;
mod lemmatize;
mod segment;
mod stopwords;

pub use dates::strip_dates;
pub use lemmatize::lemmatize;
pub use segment::{segment_by_sentence, segment_fixed};
pub use stopwords::is_stopword;

use once_cell::sync::Lazy;
use regex::Regex;

/// Words (with inner apostrophes) or single non-space symbols.
static WORD_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:'\w+)*|[^\w\s]").expect("token pattern must compile"));

/// Clean a raw text: strip dates and punctuation, lowercase, drop stopwords,
/// lemmatize, and join the remaining words with single spaces.
pub fn clean(text: &str) -> String {
    let text = strip_dates(text);

    let without_punctuation: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let lowercase = without_punctuation.to_lowercase();

    let words: Vec<String> = lowercase
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .map(lemmatize)
        .collect();

    words.join(" ").replace('\u{a0}', "")
}

/// A span of input text scored on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub raw: String,
    pub cleaned: String,
}

impl Segment {
    pub fn new(index: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let cleaned = clean(&raw);
        Self {
            index,
            raw,
            cleaned,
        }
    }
}

/// Raw word and symbol tokens of `text`, case preserved.
pub fn word_tokens(text: &str) -> impl Iterator<Item = &str> {
    WORD_TOKEN.find_iter(text).map(|m| m.as_str())
}

/// Tokenize for frequency vectors: word-level tokens, lowercased, stopwords
/// removed, lemmatized. Punctuation symbols are kept as their own tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    word_tokens(text)
        .map(str::to_lowercase)
        .filter(|token| !is_stopword(token))
        .map(|token| lemmatize(&token))
        .collect()
}
