//! Quiz specifications

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::progress::QuizProgress;
use crate::error::{SpecError, SpecResult};
use crate::search::SearchSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizType {
    /// Questions are alphagrams; answers are their anagrams
    #[default]
    Anagrams,
    /// As `Anagrams`, answered as `front:WORD:back` with hook letters
    #[serde(rename = "Anagrams with Hooks")]
    AnagramsWithHooks,
    /// Questions are words; answers are their one-letter extensions
    Hooks,
    /// One question, answered by every word the search finds
    #[serde(rename = "Word List Recall")]
    WordListRecall,
}

impl QuizType {
    pub const ALL: [Self; 4] = [
        Self::Anagrams,
        Self::AnagramsWithHooks,
        Self::Hooks,
        Self::WordListRecall,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anagrams => "Anagrams",
            Self::AnagramsWithHooks => "Anagrams with Hooks",
            Self::Hooks => "Hooks",
            Self::WordListRecall => "Word List Recall",
        }
    }

    /// Whether questions are alphagrams of the search results
    #[must_use]
    pub const fn asks_alphagrams(self) -> bool {
        matches!(self, Self::Anagrams | Self::AnagramsWithHooks)
    }
}

impl FromStr for QuizType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpecError::UnknownQuizType(s.to_string()))
    }
}

impl fmt::Display for QuizType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionOrder {
    #[default]
    Random,
    Alphabetical,
    /// Most probable first
    Probability,
    /// Most playable first, taking the best of a question's answers
    Playability,
    /// The order of an external review schedule
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSpec {
    pub lexicon: String,
    #[serde(rename = "type")]
    pub quiz_type: QuizType,
    pub order: QuestionOrder,
    pub search: SearchSpec,
    /// Shuffle seed; 0 means pick one and record it here
    pub random_seed: u64,
    /// Questions in review order, for `QuestionOrder::Schedule`
    pub schedule: Vec<String>,
    /// Require lexicon symbols on hook letters in hook responses
    pub require_symbols: bool,
    pub progress: QuizProgress,
}

impl Default for QuizSpec {
    fn default() -> Self {
        Self {
            lexicon: String::new(),
            quiz_type: QuizType::default(),
            order: QuestionOrder::default(),
            search: SearchSpec::default(),
            random_seed: 0,
            schedule: Vec::new(),
            require_symbols: false,
            progress: QuizProgress::default(),
        }
    }
}

impl QuizSpec {
    #[must_use]
    pub fn new(lexicon: &str, quiz_type: QuizType, search: SearchSpec) -> Self {
        Self {
            lexicon: lexicon.to_string(),
            quiz_type,
            search,
            ..Self::default()
        }
    }

    /// # Errors
    /// Returns `SpecError::Json` for malformed documents, including unknown
    /// quiz types or search conditions.
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let mut spec: Self = serde_json::from_str(json)?;
        spec.search.update();
        Ok(spec)
    }

    /// # Errors
    /// Returns `SpecError::Json` if serialization fails.
    pub fn to_json(&self) -> SpecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_types_parse_by_name() {
        assert_eq!(
            "anagrams with hooks".parse::<QuizType>().unwrap(),
            QuizType::AnagramsWithHooks
        );
        assert!(matches!(
            "Crosswords".parse::<QuizType>(),
            Err(SpecError::UnknownQuizType(_))
        ));
        assert!(QuizType::Anagrams.asks_alphagrams());
        assert!(!QuizType::Hooks.asks_alphagrams());
    }

    #[test]
    fn documents_fill_defaults() {
        let spec = QuizSpec::from_json(
            r#"{
                "lexicon": "OWL2",
                "type": "Word List Recall",
                "search": {"conditions": [{"type": "Length", "min": 2, "max": 2}]}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.quiz_type, QuizType::WordListRecall);
        assert_eq!(spec.order, QuestionOrder::Random);
        assert_eq!(spec.random_seed, 0);
        assert!(spec.progress.is_empty());
        assert_eq!(spec.search.conditions.len(), 1);

        let back = QuizSpec::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn unknown_quiz_type_is_rejected() {
        assert!(QuizSpec::from_json(r#"{"type": "Crosswords"}"#).is_err());
    }
}
