//! A loaded lexicon
//!
//! Owns the word graph, the optional side store, stem alphagrams per length,
//! anagram counts and inline definitions. Everything here is read-only once
//! an import has finished.

use chrono::NaiveDate;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::alphagram;
use crate::graph::WordGraph;
use crate::store::{Definitions, SideStore};
use crate::wordlists::WordEntry;

/// Effective date of the lexicons known by name
#[must_use]
pub fn lexicon_date(name: &str) -> Option<NaiveDate> {
    let (y, m, d) = match name {
        "OWL+LWL" => (2003, 7, 1),
        "OWL2+LWL" => (2006, 3, 1),
        "SOWPODS" => (2002, 1, 14),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(y, m, d)
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    name: String,
    graph: Arc<WordGraph>,
    store: Option<SideStore>,
    anagram_counts: FxHashMap<String, u32>,
    stems: FxHashMap<usize, Vec<String>>,
    stem_alphagrams: FxHashMap<usize, FxHashSet<String>>,
    definitions: Definitions,
    source_file: Option<PathBuf>,
}

impl Lexicon {
    /// Wrap a graph, counting anagrams from its words
    #[must_use]
    pub fn from_graph(name: &str, graph: WordGraph) -> Self {
        let mut anagram_counts: FxHashMap<String, u32> = FxHashMap::default();
        for word in graph.words() {
            *anagram_counts.entry(alphagram(&word)).or_insert(0) += 1;
        }
        Self {
            name: name.to_string(),
            graph: Arc::new(graph),
            store: None,
            anagram_counts,
            stems: FxHashMap::default(),
            stem_alphagrams: FxHashMap::default(),
            definitions: Definitions::new(),
            source_file: None,
        }
    }

    /// Build from word list entries, keeping inline definitions if asked
    #[must_use]
    pub fn from_entries(name: &str, entries: &[WordEntry], load_definitions: bool) -> Self {
        let graph = WordGraph::from_words(entries.iter().map(|e| e.word.as_str()));
        let mut lexicon = Self::from_graph(name, graph);
        if load_definitions {
            for entry in entries {
                if let Some(definition) = &entry.definition {
                    lexicon.definitions.insert(&entry.word, definition);
                }
            }
        }
        lexicon
    }

    #[must_use]
    pub fn with_source_file(mut self, path: PathBuf) -> Self {
        self.source_file = Some(path);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn graph(&self) -> &WordGraph {
        &self.graph
    }

    /// Shared handle to the graph, for builders running on other threads
    #[must_use]
    pub fn shared_graph(&self) -> Arc<WordGraph> {
        Arc::clone(&self.graph)
    }

    #[must_use]
    pub const fn store(&self) -> Option<&SideStore> {
        self.store.as_ref()
    }

    /// Replace the attached store, returning the previous one
    pub fn set_store(&mut self, store: Option<SideStore>) -> Option<SideStore> {
        std::mem::replace(&mut self.store, store)
    }

    #[must_use]
    pub const fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    #[must_use]
    pub fn source_file(&self) -> Option<&PathBuf> {
        self.source_file.as_ref()
    }

    /// Store date if recorded, otherwise the known date for the name
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.store
            .as_ref()
            .and_then(|s| s.meta().lexicon_date)
            .or_else(|| lexicon_date(&self.name))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.graph.contains(word)
    }

    /// Words sharing the alphagram of `word`, itself included
    #[must_use]
    pub fn anagram_count(&self, word: &str) -> u32 {
        self.anagram_counts
            .get(&alphagram(word))
            .copied()
            .unwrap_or(0)
    }

    /// Add stems of one length; returns how many were added
    pub fn add_stems(&mut self, stems: Vec<String>) -> usize {
        let Some(length) = stems.first().map(String::len) else {
            return 0;
        };
        let alphagrams = self.stem_alphagrams.entry(length).or_default();
        alphagrams.extend(stems.iter().map(|s| alphagram(s)));
        let added = stems.len();
        self.stems.entry(length).or_default().extend(stems);
        added
    }

    #[must_use]
    pub fn stems(&self, length: usize) -> &[String] {
        self.stems.get(&length).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn stem_alphagrams(&self, length: usize) -> Option<&FxHashSet<String>> {
        self.stem_alphagrams.get(&length)
    }
}
