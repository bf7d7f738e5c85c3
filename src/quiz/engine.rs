//! Quiz question generation and response checking

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use super::spec::{QuestionOrder, QuizSpec, QuizType};
use crate::core::{alphagram, time_pid_seed};
use crate::engine::WordEngine;
use crate::search::{SearchCondition, SearchSpec};

/// Outcome of one response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    Correct,
    Incorrect,
    /// A correct answer already given for this question
    Duplicate,
}

/// A running quiz over one lexicon of a [`WordEngine`]
#[derive(Debug, Clone)]
pub struct QuizEngine<'a> {
    engine: &'a WordEngine,
    spec: QuizSpec,
    questions: Vec<String>,
    index: usize,
    answers: BTreeSet<String>,
    given: BTreeSet<String>,
    wrong: Vec<String>,
    total: usize,
    correct: usize,
    incorrect: usize,
}

impl<'a> QuizEngine<'a> {
    /// Start (or resume) a quiz; `None` when the search finds no questions
    ///
    /// A random order with seed 0 picks a seed and records it in the spec,
    /// so the same question order can be reproduced later.
    #[must_use]
    pub fn new(engine: &'a WordEngine, spec: QuizSpec) -> Option<Self> {
        let mut spec = spec;
        let (questions, playability) = match spec.quiz_type {
            QuizType::WordListRecall => (vec![spec.search.to_string()], FxHashMap::default()),
            quiz_type => {
                let mut words = engine.search(&spec.lexicon, &spec.search, true).words;
                words.sort_unstable();
                let key = |word: &str| {
                    if quiz_type.asks_alphagrams() {
                        alphagram(word)
                    } else {
                        word.to_string()
                    }
                };
                let mut best: FxHashMap<String, i64> = FxHashMap::default();
                for word in &words {
                    let value = engine.playability(&spec.lexicon, word);
                    best.entry(key(word))
                        .and_modify(|v| *v = (*v).max(value))
                        .or_insert(value);
                }
                let questions = if quiz_type.asks_alphagrams() {
                    WordEngine::alphagrams(&words)
                } else {
                    words
                };
                (questions, best)
            }
        };
        if questions.is_empty() || questions.iter().all(String::is_empty) {
            return None;
        }

        let mut quiz = Self {
            engine,
            questions,
            index: 0,
            answers: BTreeSet::new(),
            given: BTreeSet::new(),
            wrong: Vec::new(),
            total: 0,
            correct: 0,
            incorrect: 0,
            spec: QuizSpec::default(),
        };
        quiz.order_questions(&mut spec, &playability);

        quiz.index = spec.progress.question.min(quiz.questions.len() - 1);
        quiz.correct = spec.progress.num_correct;
        quiz.incorrect = spec.progress.num_incorrect;
        quiz.total = quiz.correct + spec.progress.num_missed;
        quiz.spec = spec;
        quiz.prepare_question();

        // Answers already given were counted in `correct` and again here
        quiz.given.clone_from(&quiz.spec.progress.question_correct);
        quiz.total = quiz.total.saturating_sub(quiz.given.len());
        Some(quiz)
    }

    fn order_questions(&mut self, spec: &mut QuizSpec, playability: &FxHashMap<String, i64>) {
        match spec.order {
            QuestionOrder::Alphabetical => self.questions.sort(),
            QuestionOrder::Random => {
                if spec.random_seed == 0 {
                    spec.random_seed = time_pid_seed();
                }
                let mut rng = StdRng::seed_from_u64(spec.random_seed);
                self.questions.shuffle(&mut rng);
            }
            QuestionOrder::Probability => {
                let engine = self.engine;
                let bag = engine.letter_bag();
                let blanks = engine.config().quiz_probability_blanks;
                let mut keyed: Vec<(f64, String)> = self
                    .questions
                    .drain(..)
                    .map(|q| (bag.num_combinations(&q, blanks), q))
                    .collect();
                keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
                self.questions = keyed.into_iter().map(|(_, q)| q).collect();
            }
            QuestionOrder::Playability => {
                self.questions.sort_by(|a, b| {
                    let value = |q: &String| playability.get(q).copied().unwrap_or(0);
                    value(b).cmp(&value(a)).then_with(|| a.cmp(b))
                });
            }
            QuestionOrder::Schedule => {
                let position: FxHashMap<&str, usize> = spec
                    .schedule
                    .iter()
                    .enumerate()
                    .map(|(i, q)| (q.as_str(), i))
                    .collect();
                self.questions.sort_by(|a, b| {
                    let rank = |q: &String| position.get(q.as_str()).copied().unwrap_or(usize::MAX);
                    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
                });
            }
        }
    }

    fn prepare_question(&mut self) {
        self.answers.clear();
        self.given.clear();
        self.wrong.clear();
        let Some(question) = self.question().map(str::to_string) else {
            return;
        };

        let lexicon = &self.spec.lexicon;
        let search = |conditions: Vec<SearchCondition>| {
            self.engine
                .search(lexicon, &SearchSpec::all_of(conditions), true)
                .words
        };
        let answers: Vec<String> = match self.spec.quiz_type {
            QuizType::WordListRecall => self.engine.search(lexicon, &self.spec.search, true).words,
            QuizType::Anagrams | QuizType::AnagramsWithHooks => {
                SearchCondition::anagram(&question).map_or_else(|_| Vec::new(), |c| search(vec![c]))
            }
            QuizType::Hooks => [format!("?{question}"), format!("{question}?")]
                .iter()
                .filter_map(|p| SearchCondition::pattern(p).ok())
                .flat_map(|c| search(vec![c]))
                .collect(),
        };
        self.answers.extend(answers);
        self.total += self.answers.len();
    }

    #[must_use]
    pub const fn spec(&self) -> &QuizSpec {
        &self.spec
    }

    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    #[must_use]
    pub const fn question_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.questions.get(self.index).map(String::as_str)
    }

    /// Every acceptable answer to the current question
    #[must_use]
    pub const fn answers(&self) -> &BTreeSet<String> {
        &self.answers
    }

    #[must_use]
    pub fn on_last_question(&self) -> bool {
        self.index + 1 >= self.questions.len()
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub const fn num_correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub const fn num_incorrect(&self) -> usize {
        self.incorrect
    }

    /// Wrong responses to the current question
    #[must_use]
    pub fn incorrect_responses(&self) -> &[String] {
        &self.wrong
    }

    /// Answers to the current question not yet given
    #[must_use]
    pub fn missed(&self) -> Vec<String> {
        self.answers.difference(&self.given).cloned().collect()
    }

    /// Judge a response to the current question
    ///
    /// Hook quizzes with anagrams expect `front:WORD:back`; the hook
    /// sections must list exactly the word's hook letters in any order.
    pub fn respond(&mut self, response: &str) -> ResponseStatus {
        let response = response.trim();
        let word = if self.spec.quiz_type == QuizType::AnagramsWithHooks {
            let sections: Vec<&str> = response.split(':').collect();
            let [front, word, back] = sections.as_slice() else {
                return self.reject(response);
            };
            let word = word.to_ascii_uppercase();
            if !self.hooks_match(front, &word, true) || !self.hooks_match(back, &word, false) {
                return self.reject(response);
            }
            word
        } else {
            response.to_ascii_uppercase()
        };

        if !self.answers.contains(&word) {
            return self.reject(response);
        }
        if self.given.contains(&word) {
            return ResponseStatus::Duplicate;
        }
        self.correct += 1;
        self.spec.progress.add_question_correct(&word);
        self.given.insert(word);
        ResponseStatus::Correct
    }

    fn reject(&mut self, response: &str) -> ResponseStatus {
        self.incorrect += 1;
        self.wrong.push(response.to_string());
        self.spec.progress.add_incorrect(response);
        ResponseStatus::Incorrect
    }

    /// Compare a response's hook section with the word's hooks
    fn hooks_match(&self, section: &str, word: &str, front: bool) -> bool {
        let lexicon = &self.spec.lexicon;
        let letters = if front {
            self.engine.front_hook_letters(lexicon, word)
        } else {
            self.engine.back_hook_letters(lexicon, word)
        };

        if !self.spec.require_symbols {
            let given: String = section
                .chars()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_lowercase())
                .collect();
            return alphagram(&given).to_ascii_lowercase() == letters;
        }

        let expected: BTreeSet<(char, String)> = letters
            .chars()
            .map(|letter| {
                let hook = if front {
                    format!("{}{word}", letter.to_ascii_uppercase())
                } else {
                    format!("{word}{}", letter.to_ascii_uppercase())
                };
                (letter, sorted_chars(&self.engine.lexicon_symbols(lexicon, &hook)))
            })
            .collect();
        parse_symbol_hooks(section).is_some_and(|given| given == expected)
    }

    /// Give up on the current question: its correct answers stop counting
    pub fn mark_missed(&mut self) {
        let given = self.given.len();
        self.correct = self.correct.saturating_sub(given);
        self.given.clear();
        let progress = &mut self.spec.progress;
        progress.num_correct = progress.num_correct.saturating_sub(given);
        progress.question_correct.clear();
    }

    pub fn complete_question(&mut self) {
        self.spec.progress.question_complete = true;
    }

    /// Move on, recording unanswered answers as missed
    ///
    /// Returns false on the last question.
    pub fn next_question(&mut self) -> bool {
        if self.on_last_question() {
            return false;
        }
        for word in self.missed() {
            self.spec.progress.add_missed(&word);
        }
        self.index += 1;
        let progress = &mut self.spec.progress;
        progress.question = self.index;
        progress.question_complete = false;
        progress.question_correct.clear();
        self.prepare_question();
        true
    }
}

/// `(letter, symbols)` pairs from a section like `"b#ds"`
///
/// Symbols follow the letter they mark; a leading symbol is malformed.
fn parse_symbol_hooks(section: &str) -> Option<BTreeSet<(char, String)>> {
    let mut hooks: Vec<(char, String)> = Vec::new();
    for c in section.chars().filter(|c| !c.is_whitespace()) {
        if c.is_ascii_alphabetic() {
            hooks.push((c.to_ascii_lowercase(), String::new()));
        } else {
            hooks.last_mut()?.1.push(c);
        }
    }
    Some(
        hooks
            .into_iter()
            .map(|(letter, symbols)| (letter, sorted_chars(&symbols)))
            .collect(),
    )
}

fn sorted_chars(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::search::SearchSpec;
    use crate::wordlists::loader::parse_word_list;

    fn engine() -> WordEngine {
        let mut engine = WordEngine::default();
        let entries =
            parse_word_list("CAT\nACT\nCATS\nACTS\nSCAT\nTACT\nDOG\nGOD\nDOGS\nGODS\nAT\nTA\n")
                .unwrap();
        engine.import_word_list("TEST", &entries, false);
        engine
    }

    fn quiz_spec(quiz_type: QuizType, order: QuestionOrder, pattern: &str) -> QuizSpec {
        let mut spec = QuizSpec::new(
            "TEST",
            quiz_type,
            SearchSpec::all_of(vec![SearchCondition::pattern(pattern).unwrap()]),
        );
        spec.order = order;
        spec
    }

    #[test]
    fn anagram_quiz_asks_alphagrams() {
        let e = engine();
        let spec = quiz_spec(QuizType::Anagrams, QuestionOrder::Alphabetical, "???");
        let quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.questions(), ["ACT", "DGO"]);
        assert_eq!(quiz.question(), Some("ACT"));
        assert_eq!(quiz.answers().len(), 2);
        assert_eq!(quiz.total(), 2);
    }

    #[test]
    fn responses_are_classified() {
        let e = engine();
        let spec = quiz_spec(QuizType::Anagrams, QuestionOrder::Alphabetical, "???");
        let mut quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.respond("cat"), ResponseStatus::Correct);
        assert_eq!(quiz.respond("CAT"), ResponseStatus::Duplicate);
        assert_eq!(quiz.respond("TAC"), ResponseStatus::Incorrect);
        assert_eq!(quiz.missed(), ["ACT"]);
        assert_eq!(quiz.num_correct(), 1);
        assert_eq!(quiz.num_incorrect(), 1);
        assert_eq!(quiz.incorrect_responses(), ["TAC"]);

        assert!(quiz.next_question());
        assert_eq!(quiz.question(), Some("DGO"));
        assert_eq!(quiz.spec().progress.missed.get("ACT"), Some(&1));
        assert_eq!(quiz.spec().progress.question, 1);
        assert!(!quiz.next_question());
    }

    #[test]
    fn mark_missed_discounts_answers() {
        let e = engine();
        let spec = quiz_spec(QuizType::Anagrams, QuestionOrder::Alphabetical, "???");
        let mut quiz = QuizEngine::new(&e, spec).unwrap();
        quiz.respond("ACT");
        quiz.mark_missed();
        assert_eq!(quiz.num_correct(), 0);
        assert_eq!(quiz.missed().len(), 2);
        assert_eq!(quiz.spec().progress.num_correct, 0);
    }

    #[test]
    fn hook_quiz_answers_are_extensions() {
        let e = engine();
        let spec = quiz_spec(QuizType::Hooks, QuestionOrder::Alphabetical, "C?T");
        let quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.questions(), ["CAT"]);
        let answers: Vec<&str> = quiz.answers().iter().map(String::as_str).collect();
        assert_eq!(answers, ["CATS", "SCAT"]);
    }

    #[test]
    fn anagrams_with_hooks_check_hook_sections() {
        let e = engine();
        let spec = quiz_spec(QuizType::AnagramsWithHooks, QuestionOrder::Alphabetical, "???");
        let mut quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.respond("s:CAT:s"), ResponseStatus::Correct);
        assert_eq!(quiz.respond(":ACT:"), ResponseStatus::Incorrect);
        assert_eq!(quiz.respond("t:ACT:s"), ResponseStatus::Correct);
        assert_eq!(quiz.respond("ACT"), ResponseStatus::Incorrect);
    }

    #[test]
    fn hook_symbols_can_be_required() {
        let mut config = EngineConfig::default();
        config.lexicon_styles = vec!["TEST and not OLD: symbol #".into()];
        let mut e = WordEngine::new(config);
        let words = parse_word_list("CAT\nCATS\nSCAT\n").unwrap();
        e.import_word_list("TEST", &words, false);
        let old = parse_word_list("CAT\nCATS\n").unwrap();
        e.import_word_list("OLD", &old, false);

        let mut spec = quiz_spec(QuizType::AnagramsWithHooks, QuestionOrder::Alphabetical, "C?T");
        spec.require_symbols = true;
        let mut quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.respond("s:CAT:s"), ResponseStatus::Incorrect);
        assert_eq!(quiz.respond("s#:CAT:s"), ResponseStatus::Correct);
    }

    #[test]
    fn random_order_is_reproducible() {
        let e = engine();
        let spec = quiz_spec(QuizType::Hooks, QuestionOrder::Random, "*");
        let first = QuizEngine::new(&e, spec).unwrap();
        let seed = first.spec().random_seed;
        assert_ne!(seed, 0);

        let mut again = quiz_spec(QuizType::Hooks, QuestionOrder::Random, "*");
        again.random_seed = seed;
        let second = QuizEngine::new(&e, again).unwrap();
        assert_eq!(first.questions(), second.questions());
    }

    #[test]
    fn probability_order_puts_likely_racks_first() {
        let e = engine();
        let spec = quiz_spec(QuizType::Anagrams, QuestionOrder::Probability, "???");
        let quiz = QuizEngine::new(&e, spec).unwrap();
        let bag = e.letter_bag();
        let act = bag.num_combinations("ACT", 2);
        let dgo = bag.num_combinations("DGO", 2);
        let expected = if act >= dgo { ["ACT", "DGO"] } else { ["DGO", "ACT"] };
        assert_eq!(quiz.questions(), expected);
    }

    #[test]
    fn schedule_order_follows_the_schedule() {
        let e = engine();
        let mut spec = quiz_spec(QuizType::Hooks, QuestionOrder::Schedule, "???");
        spec.schedule = vec!["GOD".into(), "CAT".into()];
        let quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.questions(), ["GOD", "CAT", "ACT", "DOG"]);
    }

    #[test]
    fn recall_quiz_has_one_question() {
        let e = engine();
        let spec = quiz_spec(QuizType::WordListRecall, QuestionOrder::Random, "??");
        let mut quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.questions(), ["Pattern Match: ??"]);
        assert_eq!(quiz.total(), 2);
        assert_eq!(quiz.respond("ta"), ResponseStatus::Correct);
    }

    #[test]
    fn empty_search_gives_no_quiz() {
        let e = engine();
        let spec = quiz_spec(QuizType::Anagrams, QuestionOrder::Random, "Q*");
        assert!(QuizEngine::new(&e, spec).is_none());
    }

    #[test]
    fn resumed_progress_restores_counters() {
        let e = engine();
        let mut spec = quiz_spec(QuizType::Anagrams, QuestionOrder::Alphabetical, "???");
        spec.progress.question = 1;
        spec.progress.add_question_correct("DOG");
        let mut quiz = QuizEngine::new(&e, spec).unwrap();
        assert_eq!(quiz.question(), Some("DGO"));
        assert_eq!(quiz.num_correct(), 1);
        assert_eq!(quiz.respond("DOG"), ResponseStatus::Duplicate);
        assert_eq!(quiz.total(), 2);
    }
}
