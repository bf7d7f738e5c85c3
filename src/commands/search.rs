//! Search command
//!
//! Runs a search specification against one lexicon.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::engine::WordEngine;
use crate::error::{SpecError, SpecResult};
use crate::search::{SearchCondition, SearchSpec};
use crate::store::ValueOrder;

/// Where the search specification comes from
#[derive(Debug, Clone, Default)]
pub struct SearchRequest<'a> {
    pub spec_file: Option<&'a Path>,
    pub pattern: Option<&'a str>,
    pub anagram: Option<&'a str>,
    pub subanagram: Option<&'a str>,
}

impl SearchRequest<'_> {
    /// Build the specification: the file's conditions ANDed with any
    /// shortcut conditions
    ///
    /// # Errors
    /// Returns `SpecError` for an unreadable or malformed specification.
    pub fn to_spec(&self) -> SpecResult<SearchSpec> {
        let mut spec = match self.spec_file {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| SpecError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })?;
                SearchSpec::from_json(&json)?
            }
            None => SearchSpec::default(),
        };
        let shortcuts = [
            self.pattern.map(SearchCondition::pattern),
            self.anagram.map(SearchCondition::anagram),
            self.subanagram.map(SearchCondition::subanagram),
        ];
        for condition in shortcuts.into_iter().flatten() {
            spec.conditions.push(condition?);
        }
        Ok(spec)
    }
}

/// One result word with its display details
#[derive(Debug, Clone)]
pub struct WordLine {
    pub word: String,
    pub front_hooks: String,
    pub back_hooks: String,
    pub symbols: String,
    pub probability: Option<ValueOrder>,
}

pub struct SearchResult {
    pub lexicon: String,
    pub description: String,
    pub words: Vec<WordLine>,
    pub duration: Duration,
}

/// Run `spec` against `lexicon`, sorted alphabetically
#[must_use]
pub fn run_search(engine: &WordEngine, lexicon: &str, spec: &SearchSpec) -> SearchResult {
    let start = Instant::now();
    let results = engine.search(lexicon, spec, true);
    let duration = start.elapsed();

    let blanks = engine.config().quiz_probability_blanks;
    let mut words: Vec<WordLine> = results
        .words
        .iter()
        .map(|word| WordLine {
            word: word.clone(),
            front_hooks: engine.front_hook_letters(lexicon, word),
            back_hooks: engine.back_hook_letters(lexicon, word),
            symbols: engine.lexicon_symbols(lexicon, word),
            probability: results.info(word).map(|r| r.probability(blanks)),
        })
        .collect();
    words.sort_by(|a, b| a.word.cmp(&b.word));

    SearchResult {
        lexicon: lexicon.to_string(),
        description: spec.to_string(),
        words,
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlists::loader::parse_word_list;

    #[test]
    fn shortcuts_are_anded() {
        let request = SearchRequest {
            pattern: Some("C*"),
            anagram: Some("TAC"),
            ..SearchRequest::default()
        };
        let spec = request.to_spec().unwrap();
        assert!(spec.conjunction);
        assert_eq!(spec.conditions.len(), 2);
    }

    #[test]
    fn bad_shortcut_is_an_error() {
        let request = SearchRequest {
            pattern: Some("C[AT"),
            ..SearchRequest::default()
        };
        assert!(request.to_spec().is_err());
    }

    #[test]
    fn results_carry_hooks() {
        let mut engine = WordEngine::default();
        let entries = parse_word_list("CAT\nCATS\nSCAT\nACT\n").unwrap();
        engine.import_word_list("TEST", &entries, false);

        let spec = SearchSpec::all_of(vec![SearchCondition::anagram("CAT").unwrap()]);
        let result = run_search(&engine, "TEST", &spec);
        let words: Vec<&str> = result.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, ["ACT", "CAT"]);
        assert_eq!(result.words[1].front_hooks, "s");
        assert_eq!(result.words[1].back_hooks, "s");
        assert!(result.words[1].probability.is_none());
    }
}
