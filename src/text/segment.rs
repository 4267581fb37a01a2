//! Splitting input text into segments that are scored independently.

/// Abbreviations that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd", "co", "corp",
    "no", "fig", "approx", "dept", "est", "gen", "gov", "jan", "feb", "mar", "apr", "jun",
    "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

const CLOSING: &[char] = &['"', '\'', ')', ']', '\u{201d}', '\u{2019}'];

/// Forward-only iterator over the sentences of a text.
///
/// Produced by [`segment_by_sentence`]. It cannot be rewound; callers that
/// need to walk the sentences twice must `collect()` them first.
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return None;
        }

        let text = self.rest;
        let mut chars = text.char_indices().peekable();

        while let Some((idx, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }

            let mut end = idx + c.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if matches!(next, '.' | '!' | '?') || CLOSING.contains(&next) {
                    end = next_idx + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }

            let at_boundary = match chars.peek() {
                Some(&(_, next)) => next.is_whitespace(),
                None => true,
            };
            if !at_boundary {
                continue;
            }

            if c == '.' && is_abbreviation(&text[..idx]) && chars.peek().is_some() {
                continue;
            }

            self.rest = &text[end..];
            return Some(text[..end].trim());
        }

        self.rest = "";
        Some(text.trim())
    }
}

/// The word immediately before a period looks like an abbreviation or an initial.
fn is_abbreviation(before: &str) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    if word.is_empty() {
        return false;
    }

    let lower = word.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) || lower.contains('.') {
        return true;
    }

    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic() && c.is_uppercase())
}

/// Lazily split `text` into sentences.
pub fn segment_by_sentence(text: &str) -> Sentences<'_> {
    Sentences { rest: text }
}

/// Byte offset of the `n`th character of `s` (or `s.len()` past the end).
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Split `text` into roughly `desired` pieces of similar length.
///
/// Texts shorter than `min_length` characters come back as a single
/// unmodified piece. Otherwise every cut lands on the last whitespace within
/// the target length, else just after the last period, else exactly on the
/// target. Empty pieces are dropped.
pub fn segment_fixed(text: &str, desired: usize, min_length: usize) -> Vec<String> {
    if text.chars().count() < min_length {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::with_capacity(desired);
    let mut remaining = text;

    for segments_left in (2..=desired).rev() {
        let len = remaining.chars().count();
        let target = len / segments_left;
        let window = &remaining[..char_offset(remaining, target + 1)];

        let cut = if let Some(i) = window.rfind(char::is_whitespace) {
            i
        } else if let Some(i) = window.rfind('.') {
            i + 1
        } else {
            char_offset(remaining, target)
        };

        let piece = remaining[..cut].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        remaining = remaining[cut..].trim();
    }

    if !remaining.is_empty() {
        pieces.push(remaining.to_string());
    }

    pieces
}
