//! Quiz progress counters

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Progress through a quiz, saved with its spec so it can be resumed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizProgress {
    /// Index of the current question
    pub question: usize,
    pub num_correct: usize,
    pub num_incorrect: usize,
    pub num_missed: usize,
    pub question_complete: bool,
    /// Correct answers given so far for the current question
    pub question_correct: BTreeSet<String>,
    /// Wrong responses over the whole quiz, with how often each was given
    pub incorrect: BTreeMap<String, u32>,
    /// Answers never given before moving on, with how often each was missed
    pub missed: BTreeMap<String, u32>,
}

impl QuizProgress {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question == 0
            && self.num_correct == 0
            && self.num_incorrect == 0
            && self.num_missed == 0
            && self.question_correct.is_empty()
    }

    pub fn add_incorrect(&mut self, response: &str) {
        *self.incorrect.entry(response.to_string()).or_insert(0) += 1;
        self.num_incorrect += 1;
    }

    pub fn add_missed(&mut self, word: &str) {
        *self.missed.entry(word.to_string()).or_insert(0) += 1;
        self.num_missed += 1;
    }

    pub fn add_question_correct(&mut self, word: &str) {
        if self.question_correct.insert(word.to_string()) {
            self.num_correct += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_responses() {
        let mut progress = QuizProgress::default();
        assert!(progress.is_empty());

        progress.add_question_correct("CAT");
        progress.add_question_correct("CAT");
        progress.add_incorrect("TCA");
        progress.add_incorrect("TCA");
        progress.add_missed("ACT");

        assert_eq!(progress.num_correct, 1);
        assert_eq!(progress.num_incorrect, 2);
        assert_eq!(progress.incorrect.get("TCA"), Some(&2));
        assert_eq!(progress.num_missed, 1);
        assert!(!progress.is_empty());
    }
}
