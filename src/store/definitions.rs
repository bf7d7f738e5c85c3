//! Word definitions and cross-reference links
//!
//! A definition line holds one or more parts separated by `" / "`, each
//! normally tagged with its part of speech as `[n ...]`, `[v ...]` and so
//! on. Parts may reference other entries: `{WORD=pos}` follows the link and
//! yields `word (definition)`, `<WORD=pos>` replaces the link with the bare
//! definition.

use regex::{Captures, Regex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Separator between the parts of a definition line
pub const PART_SEPARATOR: &str = " / ";

static POS_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\w+)").unwrap());
static POS_BRACKET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\[\w+[^\]]*\]").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)=(\w+)\}|<(\w+)=(\w+)>").unwrap());

/// Part of speech tag of one definition part, empty when untagged
#[must_use]
pub fn part_of_speech(part: &str) -> String {
    POS_TAG
        .captures(part)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
        .unwrap_or_default()
}

/// Definitions of every word in a lexicon, grouped by part of speech
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    entries: FxHashMap<String, BTreeMap<String, Vec<String>>>,
}

impl Definitions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the definition line of a word, replacing any earlier one
    pub fn insert(&mut self, word: &str, definition: &str) {
        let definition = definition.trim();
        if word.is_empty() || definition.is_empty() {
            return;
        }
        let mut by_pos: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for part in definition.split(PART_SEPARATOR) {
            by_pos
                .entry(part_of_speech(part))
                .or_default()
                .push(part.trim().to_string());
        }
        self.entries.insert(word.to_ascii_uppercase(), by_pos);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(&word.to_ascii_uppercase())
    }

    /// All parts of a word's definition joined with `separator`
    #[must_use]
    pub fn joined(&self, word: &str, separator: &str) -> Option<String> {
        let by_pos = self.entries.get(&word.to_ascii_uppercase())?;
        Some(
            by_pos
                .values()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(separator),
        )
    }

    /// Definition text for one part of speech, with the tag brackets removed
    #[must_use]
    pub fn sub_definition(&self, word: &str, pos: &str) -> Option<String> {
        let parts = self
            .entries
            .get(&word.to_ascii_uppercase())?
            .get(&pos.to_ascii_uppercase())?;
        let text = parts
            .iter()
            .map(|part| POS_BRACKET.replace_all(part, "").trim().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        (!text.is_empty()).then_some(text)
    }

    /// Resolve every cross-reference in a word's definition
    ///
    /// Links nest up to `max_depth` levels; a word is never expanded twice
    /// along one chain, so cyclic references terminate.
    #[must_use]
    pub fn resolved(&self, word: &str, max_depth: usize) -> Option<String> {
        let text = self.joined(word, PART_SEPARATOR)?;
        let mut replaced = FxHashSet::default();
        replaced.insert(word.to_ascii_uppercase());
        Some(self.resolve_links(&text, max_depth, &mut replaced))
    }

    /// Substitute the links in `text`
    #[must_use]
    pub fn resolve_links(
        &self,
        text: &str,
        max_depth: usize,
        replaced: &mut FxHashSet<String>,
    ) -> String {
        if max_depth == 0 || !LINK.is_match(text) {
            return text.to_string();
        }
        LINK.replace_all(text, |caps: &Captures<'_>| {
            let (word, pos, follow) = match (caps.get(1), caps.get(2)) {
                (Some(w), Some(p)) => (w.as_str(), p.as_str(), true),
                _ => (
                    caps.get(3).map_or("", |m| m.as_str()),
                    caps.get(4).map_or("", |m| m.as_str()),
                    false,
                ),
            };
            let upper = word.to_ascii_uppercase();
            if replaced.contains(&upper) {
                return word.to_string();
            }
            let Some(sub) = self.sub_definition(&upper, pos) else {
                return word.to_string();
            };

            replaced.insert(upper.clone());
            let sub = self.resolve_links(&sub, max_depth - 1, replaced);
            replaced.remove(&upper);

            if follow {
                format!("{word} ({sub})")
            } else {
                sub
            }
        })
        .into_owned()
    }
}
