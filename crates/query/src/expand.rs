use serde::{Deserialize, Serialize};

use crate::lexicon::SYNONYMS;
use crate::normalize::{contains_at_word_start, normalize_for_matching};

/// One lexicon row: a trigger term and the phrases appended when it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRule {
    pub term: String,
    pub phrases: Vec<String>,
}

/// Rewrites a symptom query into a richer string for embedding.
///
/// The expanded text is the original query followed by the synonym phrases of
/// every lexicon term that starts a word in the query, in lexicon order.
/// Phrases already present in the query, or already appended by an earlier
/// rule, are not repeated. The original text always survives verbatim as a
/// prefix of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExpander {
    rules: Vec<SynonymRule>,
}

impl Default for QueryExpander {
    fn default() -> Self {
        let rules = SYNONYMS
            .iter()
            .map(|(term, phrases)| SynonymRule {
                term: (*term).to_string(),
                phrases: phrases.iter().map(|p| (*p).to_string()).collect(),
            })
            .collect();
        Self { rules }
    }
}

impl QueryExpander {
    /// Builds an expander over a custom lexicon. Terms and phrases are stored
    /// in matching form.
    pub fn with_rules(rules: impl IntoIterator<Item = SynonymRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| SynonymRule {
                term: normalize_for_matching(&rule.term),
                phrases: rule
                    .phrases
                    .iter()
                    .map(|p| normalize_for_matching(p))
                    .filter(|p| !p.is_empty())
                    .collect(),
            })
            .filter(|rule| !rule.term.is_empty())
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[SynonymRule] {
        &self.rules
    }

    /// Returns the lexicon terms found in `query`, in lexicon order.
    pub fn matched_terms(&self, query: &str) -> Vec<&str> {
        let normalized = normalize_for_matching(query);
        self.rules
            .iter()
            .filter(|rule| contains_at_word_start(&normalized, &rule.term))
            .map(|rule| rule.term.as_str())
            .collect()
    }

    /// Expands `query`. Pure and deterministic; never fails.
    ///
    /// ```rust
    /// use query::QueryExpander;
    ///
    /// let expander = QueryExpander::default();
    /// assert_eq!(
    ///     expander.expand("my dog is coughing"),
    ///     "my dog is coughing hacking"
    /// );
    /// assert_eq!(expander.expand("lethargic"), "lethargic");
    /// ```
    pub fn expand(&self, query: &str) -> String {
        let normalized = normalize_for_matching(query);
        let mut seen = normalized.clone();
        let mut expanded = query.to_string();

        for rule in &self.rules {
            if !contains_at_word_start(&normalized, &rule.term) {
                continue;
            }
            for phrase in &rule.phrases {
                if seen.contains(phrase.as_str()) {
                    continue;
                }
                expanded.push(' ');
                expanded.push_str(phrase);
                seen.push(' ');
                seen.push_str(phrase);
            }
        }

        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_contains_original_query() {
        let expander = QueryExpander::default();
        for q in [
            "My dog keeps vomiting",
            "cat has diarrhea and won't eat",
            "  odd spacing\tand CAPS ",
            "nothing relevant here",
            "limp",
        ] {
            let expanded = expander.expand(q);
            assert!(expanded.contains(q), "{expanded:?} lost {q:?}");
            assert!(expanded.starts_with(q));
        }
    }

    #[test]
    fn no_match_returns_original_unchanged() {
        let expander = QueryExpander::default();
        assert_eq!(expander.expand("lethargic and sleepy"), "lethargic and sleepy");
    }

    #[test]
    fn appends_phrases_in_lexicon_order() {
        let expander = QueryExpander::default();
        // "blood" precedes nothing else here, "vomit" is first in the table.
        let expanded = expander.expand("dog vomit with blood");
        assert_eq!(
            expanded,
            "dog vomit with blood vomiting throwing up emesis bleeding bloody"
        );
    }

    #[test]
    fn skips_phrases_already_present() {
        let expander = QueryExpander::default();
        // "vomiting" already contains the term and the first phrase.
        assert_eq!(
            expander.expand("Vomiting since morning"),
            "Vomiting since morning throwing up emesis"
        );
    }

    #[test]
    fn term_must_start_a_word() {
        let expander = QueryExpander::default();
        assert!(expander.matched_terms("a great sweating dog").is_empty());
        assert_eq!(expander.matched_terms("not eating, coughing"), vec!["cough", "eat"]);
    }

    #[test]
    fn custom_rules_are_normalized() {
        let expander = QueryExpander::with_rules([SynonymRule {
            term: "Tick".into(),
            phrases: vec!["Parasite".into(), "  ".into()],
        }]);
        assert_eq!(expander.rules()[0].phrases, vec!["parasite".to_string()]);
        assert_eq!(expander.expand("found a TICK"), "found a TICK parasite");
    }

    #[test]
    fn expansion_is_deterministic() {
        let expander = QueryExpander::default();
        let q = "puppy won't eat, poop is watery, scratching ears";
        assert_eq!(expander.expand(q), expander.expand(q));
    }
}
