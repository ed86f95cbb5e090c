use serde::{Deserialize, Serialize};

use crate::lexicon::EMERGENCY_KEYWORDS;
use crate::normalize::normalize_for_matching;

/// Flags queries that mention a critical condition.
///
/// Detection is a case-insensitive containment test against every keyword;
/// the result is the OR over the lexicon, so keyword order never changes the
/// answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyDetector {
    keywords: Vec<String>,
}

impl Default for EmergencyDetector {
    fn default() -> Self {
        Self::with_keywords(EMERGENCY_KEYWORDS.iter().copied())
    }
}

impl EmergencyDetector {
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| normalize_for_matching(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// ```rust
    /// use query::EmergencyDetector;
    ///
    /// let detector = EmergencyDetector::default();
    /// assert!(detector.detect("Active BLEEDING from paw"));
    /// assert!(!detector.detect("mild itching"));
    /// ```
    pub fn detect(&self, query: &str) -> bool {
        self.first_match(query).is_some()
    }

    /// Returns the first keyword found, for logging.
    pub fn first_match(&self, query: &str) -> Option<&str> {
        let normalized = normalize_for_matching(query);
        self.keywords
            .iter()
            .find(|k| normalized.contains(k.as_str()))
            .map(String::as_str)
    }
}
