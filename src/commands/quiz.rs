//! Quiz command
//!
//! Lists a quiz's questions with their answers in quiz order.

use std::path::Path;

use crate::engine::WordEngine;
use crate::error::{SpecError, SpecResult};
use crate::quiz::{QuestionOrder, QuizEngine, QuizSpec, QuizType};

pub struct QuizQuestion {
    pub question: String,
    pub answers: Vec<String>,
}

pub struct QuizListing {
    pub lexicon: String,
    pub quiz_type: QuizType,
    pub order: QuestionOrder,
    /// Seed that reproduces a random order
    pub seed: u64,
    pub total_questions: usize,
    pub questions: Vec<QuizQuestion>,
}

/// # Errors
/// Returns `SpecError` if the file cannot be read or parsed.
pub fn read_quiz_spec(path: &Path) -> SpecResult<QuizSpec> {
    let json = std::fs::read_to_string(path).map_err(|source| SpecError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    QuizSpec::from_json(&json)
}

/// Walk a quiz from its saved position, up to `limit` questions
///
/// `None` when the quiz has no questions.
#[must_use]
pub fn list_quiz(engine: &WordEngine, spec: QuizSpec, limit: Option<usize>) -> Option<QuizListing> {
    let mut quiz = QuizEngine::new(engine, spec)?;
    let limit = limit.unwrap_or(usize::MAX);

    let mut questions = Vec::new();
    while questions.len() < limit {
        questions.push(QuizQuestion {
            question: quiz.question().unwrap_or_default().to_string(),
            answers: quiz.answers().iter().cloned().collect(),
        });
        if !quiz.next_question() {
            break;
        }
    }

    let spec = quiz.spec();
    Some(QuizListing {
        lexicon: spec.lexicon.clone(),
        quiz_type: spec.quiz_type,
        order: spec.order,
        seed: spec.random_seed,
        total_questions: quiz.questions().len(),
        questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchCondition, SearchSpec};
    use crate::wordlists::loader::parse_word_list;

    #[test]
    fn listing_respects_limit() {
        let mut engine = WordEngine::default();
        let entries = parse_word_list("CAT\nACT\nDOG\nGOD\nEMU\n").unwrap();
        engine.import_word_list("TEST", &entries, false);

        let mut spec = QuizSpec::new(
            "TEST",
            QuizType::Anagrams,
            SearchSpec::all_of(vec![SearchCondition::length(3, 3)]),
        );
        spec.order = QuestionOrder::Alphabetical;

        let listing = list_quiz(&engine, spec.clone(), Some(2)).unwrap();
        assert_eq!(listing.total_questions, 3);
        assert_eq!(listing.questions.len(), 2);
        assert_eq!(listing.questions[0].question, "ACT");
        assert_eq!(listing.questions[0].answers, ["ACT", "CAT"]);

        let all = list_quiz(&engine, spec, None).unwrap();
        assert_eq!(all.questions.len(), 3);
        assert_eq!(all.questions[2].answers, ["EMU"]);
    }

    #[test]
    fn reads_spec_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.json");
        std::fs::write(&path, r#"{"lexicon": "TEST", "type": "Hooks"}"#).unwrap();
        let spec = read_quiz_spec(&path).unwrap();
        assert_eq!(spec.quiz_type, QuizType::Hooks);
        assert!(read_quiz_spec(&dir.path().join("missing.json")).is_err());
    }
}
