//! The word engine: named lexicons and the search pipeline
//!
//! A search runs in up to three phases. Graph conditions walk the word
//! graph, side-store conditions become one SQL query over the word table
//! (restricted to the graph results when there are any), and post
//! conditions check each remaining candidate against other lexicons, set
//! classifications and rank limits. Probability limits always rank by the
//! standard tile bag.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use super::lexicon::Lexicon;
use super::limits::{LimitKey, RankLimits};
use super::sets::{STANDARD_BAG, is_set_member};
use crate::config::EngineConfig;
use crate::core::{LetterBag, alphagram, num_unique_letters, num_vowels};
use crate::error::LoadError;
use crate::graph::{compiled, graph_matches};
use crate::search::{Condition, Phase, SearchCondition, SearchSpec};
use crate::store::{LexiconStyle, SideStore, StoreBuilder, StoreMeta, ValueOrder, WordRecord};
use crate::wordlists::{WordEntry, loader};

/// Words found by a search plus the records fetched for them
///
/// The records are scoped to this result; nothing is cached on the engine.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub words: Vec<String>,
    pub info: FxHashMap<String, WordRecord>,
}

impl SearchResults {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn info(&self, word: &str) -> Option<&WordRecord> {
        self.info.get(&word.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct WordEngine {
    config: EngineConfig,
    bag: LetterBag,
    styles: Vec<LexiconStyle>,
    lexicons: FxHashMap<String, Lexicon>,
}

impl Default for WordEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl WordEngine {
    /// Create an engine; an invalid tile distribution falls back to the
    /// standard bag
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let bag = config.letter_bag().unwrap_or_else(|e| {
            log::warn!("Invalid letter distribution ({e}), using the standard bag");
            LetterBag::default()
        });
        let styles = config.style_rules();
        Self {
            config,
            bag,
            styles,
            lexicons: FxHashMap::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn letter_bag(&self) -> &LetterBag {
        &self.bag
    }

    #[must_use]
    pub fn lexicon(&self, name: &str) -> Option<&Lexicon> {
        self.lexicons.get(name)
    }

    /// Names of the loaded lexicons, sorted
    #[must_use]
    pub fn lexicon_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.lexicons.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Add a lexicon, replacing any of the same name
    pub fn insert_lexicon(&mut self, lexicon: Lexicon) {
        if self.lexicons.contains_key(lexicon.name()) {
            log::info!("Replacing lexicon {}", lexicon.name());
        }
        self.lexicons.insert(lexicon.name().to_string(), lexicon);
    }

    /// Import parsed word list entries; returns the word count
    pub fn import_word_list(
        &mut self,
        name: &str,
        entries: &[WordEntry],
        load_definitions: bool,
    ) -> usize {
        let started = Instant::now();
        let lexicon = Lexicon::from_entries(name, entries, load_definitions);
        let count = lexicon.graph().len();
        log::info!(
            "Imported {count} words into {name} in {:.2}s",
            started.elapsed().as_secs_f64()
        );
        self.insert_lexicon(lexicon);
        count
    }

    /// Import a word list file
    ///
    /// # Errors
    /// Returns `LoadError` if the file is missing, unreadable or malformed;
    /// the engine is unchanged on failure.
    pub fn import_text_file(
        &mut self,
        name: &str,
        path: &Path,
        load_definitions: bool,
    ) -> Result<usize, LoadError> {
        let entries = loader::load_word_list(path)?;
        let started = Instant::now();
        let lexicon = Lexicon::from_entries(name, &entries, load_definitions)
            .with_source_file(path.to_path_buf());
        let count = lexicon.graph().len();
        log::info!(
            "Imported {count} words into {name} from {} in {:.2}s",
            path.display(),
            started.elapsed().as_secs_f64()
        );
        self.insert_lexicon(lexicon);
        Ok(count)
    }

    /// Import a compiled word graph, verifying its checksum if given
    ///
    /// # Errors
    /// Returns `LoadError` for a missing, corrupt or mismatched graph file.
    pub fn import_compiled_graph(
        &mut self,
        name: &str,
        path: &Path,
        expected_checksum: Option<&str>,
    ) -> Result<usize, LoadError> {
        let graph = compiled::load(path, expected_checksum)?;
        let count = graph.len();
        self.insert_lexicon(Lexicon::from_graph(name, graph).with_source_file(path.to_path_buf()));
        Ok(count)
    }

    /// Import a stem list into a loaded lexicon; returns the stems added
    ///
    /// # Errors
    /// Returns `LoadError::UnknownLexicon` or a file error.
    pub fn import_stems(&mut self, name: &str, path: &Path) -> Result<usize, LoadError> {
        let stems = loader::load_stems(path)?;
        let lexicon = self
            .lexicons
            .get_mut(name)
            .ok_or_else(|| LoadError::UnknownLexicon(name.to_string()))?;
        let added = lexicon.add_stems(stems);
        log::info!("Imported {added} stems into {name}");
        Ok(added)
    }

    /// Attach a side store to a loaded lexicon, replacing any attached one
    ///
    /// # Errors
    /// Returns `LoadError::UnknownLexicon` if the lexicon is not loaded.
    pub fn attach_store(&mut self, name: &str, store: SideStore) -> Result<(), LoadError> {
        let lexicon = self
            .lexicons
            .get_mut(name)
            .ok_or_else(|| LoadError::UnknownLexicon(name.to_string()))?;
        lexicon.set_store(Some(store));
        Ok(())
    }

    /// Load a persisted side store and attach it
    ///
    /// # Errors
    /// Returns `LoadError::UnknownLexicon`, or `LoadError::Store` if the file
    /// cannot be read or has another schema.
    pub fn load_store(&mut self, name: &str, path: &Path) -> Result<(), LoadError> {
        if !self.lexicons.contains_key(name) {
            return Err(LoadError::UnknownLexicon(name.to_string()));
        }
        let store = SideStore::load(path)?;
        self.attach_store(name, store)
    }

    pub fn detach_store(&mut self, name: &str) -> Option<SideStore> {
        self.lexicons.get_mut(name)?.set_store(None)
    }

    /// Drop a lexicon; returns whether it was loaded
    pub fn unload(&mut self, name: &str) -> bool {
        self.lexicons.remove(name).is_some()
    }

    /// A side-store builder for a loaded lexicon, configured from the engine
    ///
    /// Style rules compare against whichever other lexicons are loaded.
    #[must_use]
    pub fn store_builder(&self, name: &str) -> Option<StoreBuilder> {
        let lexicon = self.lexicons.get(name)?;
        let compare_graphs = self
            .styles
            .iter()
            .filter(|style| style.lexicon == name)
            .filter_map(|style| {
                self.lexicons
                    .get(&style.compare_lexicon)
                    .map(|other| (style.compare_lexicon.clone(), other.shared_graph()))
            })
            .collect();
        let meta = StoreMeta {
            lexicon_date: lexicon.date(),
            lexicon_file: lexicon.source_file().map(|p| p.display().to_string()),
            ..StoreMeta::default()
        };
        Some(
            StoreBuilder::new(name, lexicon.shared_graph(), self.bag.clone())
                .definitions(lexicon.definitions().clone())
                .styles(self.styles.clone(), compare_graphs)
                .meta(meta)
                .link_depth(self.config.definition_link_depth)
                .cancel_check_interval(self.config.cancel_check_interval),
        )
    }

    /// Whether `word` is in `lexicon`; unknown lexicons accept nothing
    #[must_use]
    pub fn is_acceptable(&self, lexicon: &str, word: &str) -> bool {
        self.lexicons
            .get(lexicon)
            .is_some_and(|lex| lex.contains(word))
    }

    /// Evaluate a search specification against a lexicon
    ///
    /// Unknown lexicons and contradictory specifications give empty
    /// results. Disjunctive specifications return the union of the
    /// single-condition searches.
    ///
    /// # Examples
    /// ```
    /// use zyzzyva::engine::WordEngine;
    /// use zyzzyva::search::{SearchCondition, SearchSpec};
    /// use zyzzyva::wordlists::loader::parse_word_list;
    ///
    /// let mut engine = WordEngine::default();
    /// let entries = parse_word_list("CAT\nACT\nTACO\n").unwrap();
    /// engine.import_word_list("TEST", &entries, false);
    ///
    /// let spec = SearchSpec::all_of(vec![SearchCondition::anagram("CAT").unwrap()]);
    /// let mut found = engine.search("TEST", &spec, true).words;
    /// found.sort();
    /// assert_eq!(found, ["ACT", "CAT"]);
    /// ```
    #[must_use]
    pub fn search(&self, lexicon: &str, spec: &SearchSpec, all_caps: bool) -> SearchResults {
        let Some(lex) = self.lexicons.get(lexicon) else {
            log::debug!("Search against unknown lexicon {lexicon}");
            return SearchResults::default();
        };

        let mut words = if spec.conjunction {
            self.search_conjunction(lex, spec)
        } else {
            let mut union = BTreeSet::new();
            for sc in &spec.conditions {
                union.extend(self.search_conjunction(lex, &SearchSpec::all_of(vec![sc.clone()])));
            }
            union.into_iter().collect()
        };

        if all_caps {
            for word in &mut words {
                word.make_ascii_uppercase();
            }
        }
        let mut seen = FxHashSet::default();
        words.retain(|w| seen.insert(w.clone()));

        let info = lex
            .store()
            .map(|store| {
                store.get_many(&words).unwrap_or_else(|e| {
                    log::warn!("Reading side-store rows for {lexicon} failed: {e}");
                    Vec::new()
                })
            })
            .unwrap_or_default()
            .into_iter()
            .map(|r| (r.word.clone(), r))
            .collect();
        SearchResults { words, info }
    }

    fn search_conjunction(&self, lex: &Lexicon, spec: &SearchSpec) -> Vec<String> {
        let Some(optimized) = spec.optimize(lex.name()) else {
            return Vec::new();
        };
        let conditions = &optimized.conditions;
        if conditions.is_empty() {
            return Vec::new();
        }

        let count = |phase: Phase| conditions.iter().filter(|sc| sc.phase() == phase).count();
        let graph_count = count(Phase::Graph);
        let mut store_count = count(Phase::SideStore);
        let post_count = count(Phase::PostFilter);

        // Length alone never needs the side store; the graph walk bounds it
        let length_count = conditions
            .iter()
            .filter(|sc| matches!(sc.condition, Condition::Length(_)))
            .count();
        if store_count == length_count {
            store_count = 0;
        }

        let mut words = None;
        if graph_count > 0 || store_count == 0 {
            let found = lex.graph().search(conditions);
            if found.is_empty() {
                return found;
            }
            words = Some(found);
        }

        if store_count > 0 {
            let Some(store) = lex.store() else {
                log::warn!(
                    "Search on {} needs a side store, but none is attached",
                    lex.name()
                );
                return Vec::new();
            };
            let found = match store.query(conditions, words.as_deref()) {
                Ok(found) => found,
                Err(e) => {
                    log::warn!("Side-store query on {} failed: {e}", lex.name());
                    return Vec::new();
                }
            };
            if found.is_empty() {
                return found;
            }
            words = Some(found);
        }

        let words = words.unwrap_or_default();
        if post_count > 0 {
            self.apply_post_conditions(lex, conditions, words)
        } else {
            words
        }
    }

    fn apply_post_conditions(
        &self,
        lex: &Lexicon,
        conditions: &[SearchCondition],
        mut words: Vec<String>,
    ) -> Vec<String> {
        words.retain(|word| {
            conditions
                .iter()
                .filter(|sc| sc.phase() == Phase::PostFilter)
                .all(|sc| self.post_matches(lex, word, sc).unwrap_or(true))
        });
        if words.is_empty() {
            return words;
        }

        let limits = RankLimits::from_conditions(conditions);
        if limits.is_empty() {
            return words;
        }
        if limits.keys().any(|k| k == LimitKey::Playability) && lex.store().is_none() {
            log::warn!(
                "Playability limits on {} need a side store, but none is attached",
                lex.name()
            );
            return words;
        }
        limits.apply(&words, |key, word| match key {
            LimitKey::Probability { blanks } => Some(STANDARD_BAG.num_combinations(word, blanks)),
            LimitKey::Playability => lex
                .store()
                .and_then(|s| s.get(word))
                .map(|r| r.playability as f64),
        })
    }

    /// Per-word post condition; `None` for limits and other phases
    fn post_matches(&self, lex: &Lexicon, word: &str, sc: &SearchCondition) -> Option<bool> {
        let hit = match &sc.condition {
            Condition::Prefix(prefix) => lex.contains(&format!("{prefix}{word}")),
            Condition::Suffix(suffix) => lex.contains(&format!("{word}{suffix}")),
            Condition::InLexicon(other) => self.is_acceptable(other, word),
            Condition::BelongToGroup(set) => is_set_member(lex, word, *set),
            _ => return None,
        };
        Some(hit != sc.negated)
    }

    /// Check one acceptable word against one condition directly
    ///
    /// Bypasses phase planning, so it serves as a reference for the search
    /// pipeline. Rank limits depend on the whole candidate set and always
    /// match here; side-store conditions fail without a record.
    #[must_use]
    pub fn matches_condition(&self, lexicon: &str, word: &str, sc: &SearchCondition) -> bool {
        let Some(lex) = self.lexicons.get(lexicon) else {
            return false;
        };
        let word = word.to_ascii_uppercase();
        match sc.phase() {
            Phase::Graph => graph_matches(sc, &word).unwrap_or(true),
            Phase::SideStore => {
                if let Some(hit) = graph_matches(sc, &word) {
                    return hit;
                }
                lex.store()
                    .and_then(|s| s.get(&word))
                    .and_then(|r| r.matches(sc))
                    .unwrap_or(false)
            }
            Phase::PostFilter => self.post_matches(lex, &word, sc).unwrap_or(true),
        }
    }

    /// Distinct alphagrams of `words`, sorted
    #[must_use]
    pub fn alphagrams(words: &[String]) -> Vec<String> {
        words
            .iter()
            .map(|w| alphagram(w))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn record(&self, lexicon: &str, word: &str) -> Option<WordRecord> {
        self.lexicons.get(lexicon)?.store()?.get(word)
    }

    #[must_use]
    pub fn num_words(&self, lexicon: &str) -> usize {
        self.lexicons.get(lexicon).map_or(0, |lex| lex.graph().len())
    }

    #[must_use]
    pub fn lexicon_date(&self, lexicon: &str) -> Option<chrono::NaiveDate> {
        self.lexicons.get(lexicon)?.date()
    }

    /// Definition text for every part of speech, links resolved
    #[must_use]
    pub fn definition(&self, lexicon: &str, word: &str) -> Option<String> {
        if let Some(record) = self.record(lexicon, word)
            && !record.definition.is_empty()
        {
            return Some(record.definition);
        }
        self.lexicons
            .get(lexicon)?
            .definitions()
            .resolved(word, self.config.definition_link_depth)
    }

    /// Lowercase letters that can be prepended to `word`
    #[must_use]
    pub fn front_hook_letters(&self, lexicon: &str, word: &str) -> String {
        if let Some(record) = self.record(lexicon, word) {
            return record.front_hooks;
        }
        self.hook_letters(lexicon, word, true)
    }

    /// Lowercase letters that can be appended to `word`
    #[must_use]
    pub fn back_hook_letters(&self, lexicon: &str, word: &str) -> String {
        if let Some(record) = self.record(lexicon, word) {
            return record.back_hooks;
        }
        self.hook_letters(lexicon, word, false)
    }

    fn hook_letters(&self, lexicon: &str, word: &str, front: bool) -> String {
        let Some(lex) = self.lexicons.get(lexicon) else {
            return String::new();
        };
        let word = word.to_ascii_uppercase();
        ('A'..='Z')
            .filter(|&letter| {
                let candidate = if front {
                    format!("{letter}{word}")
                } else {
                    format!("{word}{letter}")
                };
                lex.contains(&candidate)
            })
            .map(|letter| letter.to_ascii_lowercase())
            .collect()
    }

    /// The word minus its first letter is acceptable
    #[must_use]
    pub fn is_front_hook(&self, lexicon: &str, word: &str) -> bool {
        match self.record(lexicon, word) {
            Some(record) => record.is_front_hook,
            None => word.len() > 1 && self.is_acceptable(lexicon, &word[1..]),
        }
    }

    /// The word minus its last letter is acceptable
    #[must_use]
    pub fn is_back_hook(&self, lexicon: &str, word: &str) -> bool {
        match self.record(lexicon, word) {
            Some(record) => record.is_back_hook,
            None => word.len() > 1 && self.is_acceptable(lexicon, &word[..word.len() - 1]),
        }
    }

    /// Symbols the style rules attach to `word` in `lexicon`
    ///
    /// Uses the stored column when present, otherwise evaluates the rules
    /// against the other loaded lexicons. Works for words not in `lexicon`
    /// too, such as hook words.
    #[must_use]
    pub fn lexicon_symbols(&self, lexicon: &str, word: &str) -> String {
        if let Some(record) = self.record(lexicon, word) {
            return record.lexicon_symbols;
        }
        self.styles
            .iter()
            .filter(|style| style.lexicon == lexicon)
            .filter(|style| self.lexicons.contains_key(&style.compare_lexicon))
            .filter(|style| style.applies(self.is_acceptable(&style.compare_lexicon, word)))
            .map(|style| style.symbol.as_str())
            .collect()
    }

    #[must_use]
    pub fn point_value(&self, lexicon: &str, word: &str) -> u32 {
        self.record(lexicon, word)
            .map_or_else(|| self.bag.word_value(word), |r| r.point_value)
    }

    #[must_use]
    pub fn num_vowels(&self, lexicon: &str, word: &str) -> usize {
        self.record(lexicon, word)
            .map_or_else(|| num_vowels(word), |r| r.num_vowels as usize)
    }

    #[must_use]
    pub fn num_unique_letters(&self, lexicon: &str, word: &str) -> usize {
        self.record(lexicon, word)
            .map_or_else(|| num_unique_letters(word), |r| r.num_unique_letters as usize)
    }

    /// Words sharing the alphagram of `word` in `lexicon`, itself included
    #[must_use]
    pub fn num_anagrams(&self, lexicon: &str, word: &str) -> u32 {
        if let Some(record) = self.record(lexicon, word) {
            return record.num_anagrams;
        }
        self.lexicons
            .get(lexicon)
            .map_or(0, |lex| lex.anagram_count(word))
    }

    /// Probability order of `word` assuming `blanks` blanks
    #[must_use]
    pub fn probability_order(&self, lexicon: &str, word: &str, blanks: i32) -> Option<ValueOrder> {
        self.record(lexicon, word).map(|r| r.probability(blanks))
    }

    #[must_use]
    pub fn playability_order(&self, lexicon: &str, word: &str) -> Option<ValueOrder> {
        self.record(lexicon, word).map(|r| r.playability_order)
    }

    #[must_use]
    pub fn playability(&self, lexicon: &str, word: &str) -> i64 {
        self.record(lexicon, word).map_or(0, |r| r.playability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WordGraph;
    use crate::search::{Range, SearchSet};
    use crate::wordlists::loader::parse_word_list;
    use std::sync::atomic::{AtomicBool, AtomicU64};

    const WORDS: &str = "CAT a feline [n CATS]\nCATS\nACT to perform [v ACTED]\nACTS\nTACO a filled tortilla [n TACOS]\n\
                         TACOS\nAT\nTA\nSCAT to leave hastily [v SCATTED]\nCOAT\nTACT\nOCTAS\nCOATS\nCOSTA\nASCOT\n";

    fn engine() -> WordEngine {
        let mut engine = WordEngine::default();
        let entries = parse_word_list(WORDS).unwrap();
        engine.import_word_list("TEST", &entries, true);
        engine
    }

    fn engine_with_store() -> WordEngine {
        let mut engine = engine();
        let store = engine
            .store_builder("TEST")
            .unwrap()
            .build(&AtomicBool::new(false), &AtomicU64::new(0))
            .unwrap();
        engine.attach_store("TEST", store).unwrap();
        engine
    }

    fn empty_store() -> SideStore {
        SideStore::from_records(StoreMeta::default(), &[]).unwrap()
    }

    fn sorted(mut words: Vec<String>) -> Vec<String> {
        words.sort();
        words
    }

    fn find(engine: &WordEngine, conditions: Vec<SearchCondition>) -> Vec<String> {
        sorted(engine.search("TEST", &SearchSpec::all_of(conditions), true).words)
    }

    #[test]
    fn anagram_search_needs_no_store() {
        let e = engine();
        let found = find(&e, vec![SearchCondition::anagram("CAT").unwrap()]);
        assert_eq!(found, ["ACT", "CAT"]);
    }

    #[test]
    fn subanagram_with_length_range() {
        let e = engine();
        let found = find(
            &e,
            vec![
                SearchCondition::subanagram("TACOS").unwrap(),
                SearchCondition::length(3, 4),
            ],
        );
        assert_eq!(found, ["ACT", "ACTS", "CAT", "CATS", "COAT", "SCAT", "TACO"]);
    }

    #[test]
    fn length_only_search_walks_the_graph() {
        let e = engine();
        assert_eq!(find(&e, vec![SearchCondition::length(2, 2)]), ["AT", "TA"]);
    }

    #[test]
    fn side_store_conditions_without_store_are_empty() {
        let e = engine();
        let found = find(
            &e,
            vec![
                SearchCondition::anagram("CAT").unwrap(),
                SearchCondition::new(Condition::NumVowels(Range::new(1, 1))),
            ],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn side_store_phase_is_restricted_to_graph_results() {
        let e = engine_with_store();
        let found = find(
            &e,
            vec![
                SearchCondition::pattern("?A??").unwrap(),
                SearchCondition::new(Condition::BelongToGroup(SearchSet::HookWords)),
            ],
        );
        assert_eq!(found, ["CATS", "TACT"]);
    }

    #[test]
    fn post_conditions_filter_candidates() {
        let e = engine_with_store();
        let found = find(
            &e,
            vec![
                SearchCondition::length(3, 3),
                SearchCondition::new(Condition::Suffix("S".into())),
            ],
        );
        assert_eq!(found, ["ACT", "CAT"]);

        let found = find(
            &e,
            vec![
                SearchCondition::anagram("CAT").unwrap(),
                SearchCondition::negated(Condition::Prefix("S".into())),
            ],
        );
        assert_eq!(found, ["ACT"]);
    }

    #[test]
    fn disjunction_is_a_union() {
        let e = engine();
        let spec = SearchSpec::any_of(vec![
            SearchCondition::anagram("AT").unwrap(),
            SearchCondition::pattern("C?T").unwrap(),
        ]);
        assert_eq!(sorted(e.search("TEST", &spec, true).words), ["AT", "CAT", "TA"]);
    }

    #[test]
    fn unknown_lexicon_and_contradictions_are_empty() {
        let e = engine();
        let spec = SearchSpec::all_of(vec![SearchCondition::anagram("CAT").unwrap()]);
        assert!(e.search("NOPE", &spec, true).is_empty());

        let spec = SearchSpec::all_of(vec![
            SearchCondition::new(Condition::IncludeLetters("Q".into())),
            SearchCondition::negated(Condition::IncludeLetters("Q".into())),
        ]);
        assert!(e.search("TEST", &spec, true).is_empty());
        assert!(e.search("TEST", &SearchSpec::default(), true).is_empty());
    }

    #[test]
    fn in_lexicon_compares_other_lexicons() {
        let mut e = engine();
        let other = parse_word_list("CAT\nDOG\n").unwrap();
        e.import_word_list("OTHER", &other, false);
        let found = find(
            &e,
            vec![
                SearchCondition::anagram("CAT").unwrap(),
                SearchCondition::negated(Condition::InLexicon("OTHER".into())),
            ],
        );
        assert_eq!(found, ["ACT"]);
    }

    #[test]
    fn strict_probability_order_returns_one_word() {
        let e = engine_with_store();
        let spec = SearchSpec::all_of(vec![
            SearchCondition::length(4, 4),
            SearchCondition::new(Condition::ProbabilityOrder {
                range: Range::new(1, 1),
                blanks: 0,
                lax: false,
            }),
        ]);
        assert_eq!(e.search("TEST", &spec, true).len(), 1);
    }

    #[test]
    fn limits_rank_the_candidates() {
        let e = engine();
        let limit = |lax| {
            SearchCondition::new(Condition::LimitByProbabilityOrder {
                range: Range::new(1, 1),
                blanks: 0,
                lax,
                legacy: false,
            })
        };
        // CAT and ACT share letters, so their draw counts tie
        let anagrams = SearchCondition::anagram("CAT").unwrap();
        assert_eq!(find(&e, vec![anagrams.clone(), limit(true)]), ["ACT", "CAT"]);
        assert_eq!(find(&e, vec![anagrams, limit(false)]), ["ACT"]);
    }

    #[test]
    fn probability_limits_use_standard_tiles() {
        let config = EngineConfig {
            letter_distribution: "A:9 E:1 T:1 X:20 Z:20".to_string(),
            ..EngineConfig::default()
        };
        let mut e = WordEngine::new(config);
        let entries = parse_word_list("EAT\nZAX\n").unwrap();
        e.import_word_list("TEST", &entries, false);
        let limit = SearchCondition::new(Condition::LimitByProbabilityOrder {
            range: Range::new(1, 1),
            blanks: 0,
            lax: false,
            legacy: false,
        });
        // ZAX draws far more often from the configured bag
        assert_eq!(find(&e, vec![SearchCondition::length(3, 3), limit]), ["EAT"]);
    }

    #[test]
    fn results_carry_records() {
        let e = engine_with_store();
        let spec = SearchSpec::all_of(vec![SearchCondition::anagram("CAT").unwrap()]);
        let results = e.search("TEST", &spec, true);
        assert_eq!(results.info.len(), 2);
        assert_eq!(results.info("cat").map(|r| r.back_hooks.as_str()), Some("s"));
    }

    #[test]
    fn getters_fall_back_without_store() {
        let e = engine();
        assert_eq!(e.front_hook_letters("TEST", "CAT"), "s");
        assert_eq!(e.back_hook_letters("TEST", "CAT"), "s");
        assert!(e.is_back_hook("TEST", "CATS"));
        assert!(!e.is_front_hook("TEST", "CATS"));
        assert_eq!(e.num_anagrams("TEST", "CAT"), 2);
        assert_eq!(e.point_value("TEST", "CAT"), 5);
        assert_eq!(e.num_vowels("TEST", "TACO"), 2);
        assert_eq!(e.probability_order("TEST", "CAT", 2), None);
        assert_eq!(e.playability("TEST", "CAT"), 0);
        assert_eq!(e.definition("TEST", "CAT").as_deref(), Some("a feline [n CATS]"));
        assert_eq!(e.num_words("NOPE"), 0);
    }

    #[test]
    fn getters_prefer_store_records() {
        let e = engine_with_store();
        assert_eq!(e.front_hook_letters("TEST", "CAT"), "s");
        assert_eq!(e.num_anagrams("TEST", "COSTA"), 5);
        let order = e.probability_order("TEST", "AT", 0).unwrap();
        assert!(order.min <= order.order && order.order <= order.max);
        assert!(e.definition("TEST", "SCAT").unwrap().starts_with("to leave"));
    }

    #[test]
    fn matches_condition_agrees_with_search() {
        let e = engine_with_store();
        let condition = SearchCondition::new(Condition::NumVowels(Range::new(2, 2)));
        let found = find(&e, vec![condition.clone()]);
        for word in e.lexicon("TEST").unwrap().graph().words() {
            assert_eq!(
                e.matches_condition("TEST", &word, &condition),
                found.contains(&word),
                "{word}"
            );
        }
    }

    #[test]
    fn stores_attach_only_to_loaded_lexicons() {
        let mut e = engine();
        assert!(matches!(
            e.attach_store("NOPE", empty_store()),
            Err(LoadError::UnknownLexicon(_))
        ));
        e.attach_store("TEST", empty_store()).unwrap();
        assert!(e.detach_store("TEST").is_some());
        assert!(e.detach_store("TEST").is_none());
        assert!(e.unload("TEST"));
        assert!(!e.is_acceptable("TEST", "CAT"));
    }

    #[test]
    fn compiled_graph_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.zgraph");
        let graph = WordGraph::from_words(["QI", "ZA"]);
        compiled::save(&graph, &path).unwrap();

        let mut e = WordEngine::default();
        assert_eq!(e.import_compiled_graph("TWO", &path, None).unwrap(), 2);
        assert!(e.is_acceptable("TWO", "qi"));
        assert!(e.import_compiled_graph("BAD", &path, Some("0000")).is_err());
        assert!(e.lexicon("BAD").is_none());
    }
}
