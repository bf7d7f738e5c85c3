//! Graph-phase evaluation of search conditions

use crate::core::MAX_WORD_LEN;
use crate::search::{Condition, SearchCondition};

use super::word_graph::WordGraph;

/// Evaluate a condition the graph can answer from the word alone
///
/// Returns `None` for conditions that need other data, so callers can treat
/// them as handled elsewhere.
#[must_use]
pub fn graph_matches(sc: &SearchCondition, word: &str) -> Option<bool> {
    let hit = match &sc.condition {
        Condition::PatternMatch(p) => p.matches(word),
        Condition::AnagramMatch(p) => p.matches_anagram(word),
        Condition::SubanagramMatch(p) => p.matches_subanagram(word),
        Condition::ConsistOf { letters, percent } => {
            let len = word.len() as i64;
            let in_set = word
                .bytes()
                .filter(|b| letters.as_bytes().contains(&b.to_ascii_uppercase()))
                .count() as i64;
            percent.min * len <= in_set * 100 && in_set * 100 <= percent.max * len
        }
        Condition::Length(r) => r.contains(word.len() as i64),
        _ => return None,
    };
    Some(hit != sc.negated)
}

impl WordGraph {
    /// Words satisfying every graph-answerable condition in `conditions`
    ///
    /// Positive length bounds limit the traversal; the first positive
    /// pattern-like condition drives it. Everything else filters the
    /// candidates, so conditions this phase cannot answer are ignored.
    ///
    /// # Examples
    /// ```
    /// use zyzzyva::graph::WordGraph;
    /// use zyzzyva::search::SearchCondition;
    ///
    /// let graph = WordGraph::from_words(["CAT", "ACT", "TACO"]);
    /// let found = graph.search(&[SearchCondition::anagram("CAT").unwrap()]);
    /// assert_eq!(found, ["ACT", "CAT"]);
    /// ```
    #[must_use]
    pub fn search(&self, conditions: &[SearchCondition]) -> Vec<String> {
        let mut min_len: i64 = 1;
        let mut max_len = MAX_WORD_LEN as i64;
        for sc in conditions {
            if let Condition::Length(r) = sc.condition
                && !sc.negated
            {
                min_len = min_len.max(r.min);
                max_len = max_len.min(r.max);
            }
        }
        if min_len > max_len {
            return Vec::new();
        }
        let (min_len, max_len) = (min_len as usize, max_len as usize);

        let driver = conditions.iter().find(|sc| {
            !sc.negated
                && match &sc.condition {
                    Condition::PatternMatch(p) => !p.is_substring_search(),
                    Condition::AnagramMatch(_) | Condition::SubanagramMatch(_) => true,
                    _ => false,
                }
        });
        let candidates = match driver.map(|sc| &sc.condition) {
            Some(Condition::PatternMatch(p)) => self.match_pattern(p, min_len, max_len),
            Some(Condition::AnagramMatch(p)) => self.match_anagram(p, min_len, max_len),
            Some(Condition::SubanagramMatch(p)) => self.match_subanagram(p, min_len, max_len),
            _ => self.words_in_range(min_len, max_len),
        };

        candidates
            .into_iter()
            .filter(|word| {
                conditions
                    .iter()
                    .all(|sc| graph_matches(sc, word).unwrap_or(true))
            })
            .collect()
    }
}
