//! Character-level edit distance and the percentage scores built on it.

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DISTANCE_THRESHOLD: usize = 1000;

/// Sentence pattern sent by browser clients. The regex crate has no
/// lookbehind, so it maps onto [`Splitter::Sentences`].
const LOOKBEHIND_SENTENCE_PATTERN: &str = r"(?<=[.!?])\s+";

/// How texts are cut into chunks before chunk-wise comparison.
#[derive(Debug, Clone)]
pub enum Splitter {
    /// Split after `.`, `!` or `?` followed by whitespace.
    Sentences,
    /// Split on line breaks.
    Paragraphs,
    /// Split on every match of a caller-supplied pattern.
    Pattern(Regex),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Sentences,
    Paragraphs,
}

impl From<Granularity> for Splitter {
    fn from(value: Granularity) -> Self {
        match value {
            Granularity::Sentences => Splitter::Sentences,
            Granularity::Paragraphs => Splitter::Paragraphs,
        }
    }
}

impl Splitter {
    pub fn from_pattern(pattern: &str) -> Result<Self, regex::Error> {
        if pattern == LOOKBEHIND_SENTENCE_PATTERN {
            return Ok(Splitter::Sentences);
        }
        Regex::new(pattern).map(Splitter::Pattern)
    }

    /// Non-blank chunks of `text`.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let chunks: Vec<&str> = match self {
            Splitter::Sentences => split_sentences(text),
            Splitter::Paragraphs => text.split('\n').collect(),
            Splitter::Pattern(re) => re.split(text).collect(),
        };

        chunks.into_iter().filter(|c| !c.trim().is_empty()).collect()
    }
}

/// Split after terminal punctuation, dropping the whitespace run that follows.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut prev = None;
    let mut gap_start = None;

    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            if gap_start.is_none() && matches!(prev, Some('.' | '!' | '?')) {
                gap_start = Some(idx);
            }
        } else if let Some(gap) = gap_start.take() {
            chunks.push(&text[start..gap]);
            start = idx;
        }
        if gap_start.is_none() {
            prev = Some(c);
        }
    }

    match gap_start {
        Some(gap) => chunks.push(&text[start..gap]),
        None => chunks.push(&text[start..]),
    }

    chunks
}

/// Levenshtein distance between `a` and `b`.
///
/// Returns `threshold + 1` as soon as the result is known to exceed
/// `threshold`: when the length gap alone is larger, or when a whole DP row
/// is above it.
pub fn distance(a: &str, b: &str, threshold: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > threshold {
        return threshold + 1;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        let mut within_threshold = false;

        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1]
            } else {
                1 + prev[j].min(curr[j - 1]).min(prev[j - 1])
            };

            if curr[j] <= threshold {
                within_threshold = true;
            }
        }

        if !within_threshold {
            return threshold + 1;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn percentage_of(len: usize, dist: usize) -> f64 {
    if len == 0 {
        return 100.0;
    }
    (len - dist.min(len)) as f64 / len as f64 * 100.0
}

/// Similarity of two texts in percent, 0 when the distance exceeds `threshold`.
pub fn percentage(a: &str, b: &str, threshold: usize) -> f64 {
    let dist = distance(a, b, threshold);
    if dist > threshold {
        return 0.0;
    }

    let len = a.chars().count().max(b.chars().count());
    percentage_of(len, dist)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkComparison {
    #[serde(rename = "chunkSimilarities")]
    pub chunk_similarities: Vec<f64>,
    pub similarity: f64,
}

/// Best percentage of every chunk of `a` against the chunks of `b`, and
/// their mean.
pub fn chunk_percentages(a: &str, b: &str, splitter: &Splitter, threshold: usize) -> ChunkComparison {
    let chunks_b = splitter.split(b);

    let chunk_similarities: Vec<f64> = splitter
        .split(a)
        .into_iter()
        .map(|chunk| {
            chunks_b
                .iter()
                .map(|other| percentage(chunk, other, threshold))
                .fold(0.0, f64::max)
        })
        .collect();

    let similarity = if chunk_similarities.is_empty() {
        0.0
    } else {
        chunk_similarities.iter().sum::<f64>() / chunk_similarities.len() as f64
    };

    ChunkComparison {
        chunk_similarities,
        similarity,
    }
}
