//! Removal of date substrings before text cleaning.

use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bJan(?:uary)? \d{1,2}, \d{4}\b",
        r"\bFeb(?:ruary)? \d{1,2}, \d{4}\b",
        r"\bMar(?:ch)? \d{1,2}, \d{4}\b",
        r"\bApr(?:il)? \d{1,2}, \d{4}\b",
        r"\bMay \d{1,2}, \d{4}\b",
        r"\bJun(?:e)? \d{1,2}, \d{4}\b",
        r"\bJul(?:y)? \d{1,2}, \d{4}\b",
        r"\bAug(?:ust)? \d{1,2}, \d{4}\b",
        r"\bSep(?:tember)? \d{1,2}, \d{4}\b",
        r"\bOct(?:ober)? \d{1,2}, \d{4}\b",
        r"\bNov(?:ember)? \d{1,2}, \d{4}\b",
        r"\bDec(?:ember)? \d{1,2}, \d{4}\b",
        r"\b\d{1,2}/\d{1,2}/\d{2,4}\b",
        r"\b\d{2,4}-\d{1,2}-\d{1,2}\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("date pattern must compile"))
    .collect()
});

/// Strip recognizable dates from `text`.
///
/// Matches are collected for every pattern in order against the original
/// text, then each match is removed once (its first remaining occurrence).
pub fn strip_dates(text: &str) -> String {
    let found: Vec<&str> = DATE_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str()))
        .collect();

    let mut out = text.to_string();
    for date in found {
        out = out.replacen(date, "", 1);
    }

    out.trim().to_string()
}
