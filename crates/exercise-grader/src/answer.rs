//! Answer keys with slash-separated alternatives.
//!
//! An answer key such as `"went / gone"` accepts either form. Comparison is
//! exact after trimming and lowercasing both sides; there is no typo
//! tolerance and no partial credit.

/// Separator between accepted alternatives in an answer key.
pub const ALTERNATIVE_SEPARATOR: char = '/';

/// Normalize a single answer for comparison.
fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Normalized alternatives of an answer key, in key order.
///
/// An empty key yields a single empty alternative, so the iterator is never
/// empty.
pub fn alternatives(answer_key: &str) -> impl Iterator<Item = String> + '_ {
    answer_key.split(ALTERNATIVE_SEPARATOR).map(normalize)
}

/// The first alternative of an answer key, trimmed but with its original case.
///
/// Used when revealing answers.
pub fn first_alternative(answer_key: &str) -> &str {
    answer_key
        .split(ALTERNATIVE_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
}

/// Check whether `user_answer` satisfies any alternative of `answer_key`.
pub fn is_correct(user_answer: &str, answer_key: &str) -> bool {
    let normalized = normalize(user_answer);
    alternatives(answer_key).any(|alt| alt == normalized)
}
