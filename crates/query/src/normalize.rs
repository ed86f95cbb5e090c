//! Query text normalization.
//!
//! Lexicon lookups run against a normalized form of the query so that
//! compatibility characters, typographic apostrophes, letter case, and runs of
//! whitespace never hide a match. The original text is never replaced by this
//! form; it is only used for matching.

use unicode_normalization::UnicodeNormalization;

/// Collapses runs of Unicode whitespace into single ASCII spaces and trims
/// both ends.
///
/// ```rust
/// use query::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  not \t breathing\n"), "not breathing");
/// ```
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(segment);
    }
    out
}

/// Produces the matching form of a query: NFKC, lowercase, ASCII apostrophes,
/// collapsed whitespace.
pub fn normalize_for_matching(text: &str) -> String {
    let folded: String = text
        .nfkc()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '\u{FF07}' => '\'',
            other => other,
        })
        .collect();
    collapse_whitespace(&folded)
}

/// Returns true when `needle` occurs in `haystack` starting at a word
/// boundary. Both arguments must already be in matching form.
pub(crate) fn contains_at_word_start(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .is_none_or(|prev| !prev.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_handles_mixed_whitespace() {
        assert_eq!(collapse_whitespace("a\u{00A0}\u{00A0}b\r\nc"), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn matching_form_folds_case_and_apostrophes() {
        assert_eq!(normalize_for_matching("Can\u{2019}t  STAND"), "can't stand");
    }

    #[test]
    fn matching_form_applies_nfkc() {
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_for_matching("\u{FF22}\u{FF2C}\u{FF2F}\u{FF2F}\u{FF24}"), "blood");
    }

    #[test]
    fn word_start_matching() {
        assert!(contains_at_word_start("dog is vomiting", "vomit"));
        assert!(contains_at_word_start("eat", "eat"));
        assert!(!contains_at_word_start("a great day", "eat"));
        assert!(contains_at_word_start("great, eating less", "eat"));
        assert!(!contains_at_word_start("anything", ""));
    }
}
