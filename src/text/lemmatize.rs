//! Dictionary-form lemmatization for English nouns.
//!
//! Irregular plurals are resolved through an exception table, regular plurals
//! through ordered suffix rules. Anything that does not look like a plural
//! word is returned unchanged.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("people", "person"),
        ("women", "woman"),
        ("oxen", "ox"),
        ("lice", "louse"),
        ("dice", "die"),
        ("wolves", "wolf"),
        ("knives", "knife"),
        ("wives", "wife"),
        ("lives", "life"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("thieves", "thief"),
        ("loaves", "loaf"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("analyses", "analysis"),
        ("theses", "thesis"),
        ("crises", "crisis"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("vertices", "vertex"),
        ("cacti", "cactus"),
        ("fungi", "fungus"),
        ("nuclei", "nucleus"),
        ("radii", "radius"),
        ("stimuli", "stimulus"),
        ("alumni", "alumnus"),
        ("bacteria", "bacterium"),
        ("curricula", "curriculum"),
        ("media", "medium"),
    ]
    .into_iter()
    .collect()
});

/// Words ending in `s` that are already in base form.
const SINGULAR_S: &[&str] = &[
    "news", "series", "species", "mathematics", "physics", "economics", "politics", "ethics",
    "lens", "always", "perhaps", "whereas", "besides", "towards", "afterwards", "thus",
    "across", "yes", "bias", "atlas", "canvas", "alias", "gas", "plus", "chaos", "kudos",
];

/// Suffix rewrite rules, tried in order. `(suffix, replacement, min_len)`.
const SUFFIX_RULES: &[(&str, &str, usize)] = &[
    ("ies", "y", 5),
    ("sses", "ss", 5),
    ("ches", "ch", 5),
    ("shes", "sh", 5),
    ("xes", "x", 4),
    ("zzes", "zz", 5),
    ("emen", "eman", 6),
];

/// Lemmatize a single lowercased token to its noun base form.
pub fn lemmatize(token: &str) -> String {
    if token.chars().count() <= 3 || !token.chars().all(|c| c.is_alphabetic()) {
        return token.to_string();
    }

    if let Some(base) = IRREGULAR.get(token) {
        return base.to_string();
    }

    if SINGULAR_S.contains(&token) {
        return token.to_string();
    }

    for (suffix, replacement, min_len) in SUFFIX_RULES {
        if token.len() >= *min_len && token.ends_with(suffix) {
            let stem = &token[..token.len() - suffix.len()];
            return format!("{stem}{replacement}");
        }
    }

    if token.ends_with("ss") || token.ends_with("us") || token.ends_with("is") {
        return token.to_string();
    }

    match token.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemmatize("foxes"), "fox");
        assert_eq!(lemmatize("dogs"), "dog");
        assert_eq!(lemmatize("jumps"), "jump");
        assert_eq!(lemmatize("planets"), "planet");
        assert_eq!(lemmatize("churches"), "church");
        assert_eq!(lemmatize("bushes"), "bush");
        assert_eq!(lemmatize("classes"), "class");
    }

    #[test]
    fn test_ies_to_y() {
        assert_eq!(lemmatize("bodies"), "body");
        assert_eq!(lemmatize("cities"), "city");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("mice"), "mouse");
        assert_eq!(lemmatize("women"), "woman");
        assert_eq!(lemmatize("wolves"), "wolf");
        assert_eq!(lemmatize("firemen"), "fireman");
        assert_eq!(lemmatize("specimen"), "specimen");
    }

    #[test]
    fn test_base_forms_untouched() {
        assert_eq!(lemmatize("glass"), "glass");
        assert_eq!(lemmatize("status"), "status");
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("news"), "news");
        assert_eq!(lemmatize("quick"), "quick");
        assert_eq!(lemmatize("jumping"), "jumping");
    }

    #[test]
    fn test_short_and_non_alphabetic() {
        assert_eq!(lemmatize("gas"), "gas");
        assert_eq!(lemmatize("bus"), "bus");
        assert_eq!(lemmatize("2023s"), "2023s");
        assert_eq!(lemmatize("."), ".");
    }
}
