use crate::timing::word::WordTiming;

const POWER_WORDS: &[&str] = &[
    "free",
    "guaranteed",
    "proven",
    "secret",
    "exclusive",
    "limited",
    "bonus",
    "instant",
];

const ACTION_VERBS: &[&str] = &[
    "make", "earn", "save", "get", "build", "grow", "scale", "double", "triple",
];

const SUPERLATIVES: &[&str] = &[
    "best",
    "worst",
    "top",
    "ultimate",
    "perfect",
    "amazing",
    "incredible",
];

/// `$?\d+[kmb]?`, whole word, case-insensitive.
fn is_amount(text: &str) -> bool {
    let body = text.strip_prefix('$').unwrap_or(text);
    let body = match body.chars().last() {
        Some(c) if matches!(c.to_ascii_lowercase(), 'k' | 'm' | 'b') => &body[..body.len() - 1],
        _ => body,
    };
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
}

/// Whole-word, case-insensitive keyword match against the emphasis vocabulary.
///
/// Punctuation is not stripped: `"free!"` is not a keyword.
pub fn is_keyword(text: &str) -> bool {
    if is_amount(text) {
        return true;
    }
    let lower = text.to_lowercase();
    [POWER_WORDS, ACTION_VERBS, SUPERLATIVES]
        .iter()
        .any(|list| list.contains(&lower.as_str()))
}

/// Flag keyword words in place.
pub fn detect_keywords(words: &mut [WordTiming]) {
    for w in words.iter_mut() {
        w.is_keyword = is_keyword(&w.text);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/keywords.rs"]
mod tests;
