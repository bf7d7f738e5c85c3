//! Per-word metadata records

use rusqlite::Row;

use crate::core::{LetterBag, LetterCounts, alphagram, num_unique_letters, num_vowels};
use crate::search::{Condition, SearchCondition, SearchSet};

/// Position of a word in a value ordering, with the span of its tie group
///
/// `order` is the word's 1-based position within its length bucket; every
/// word tied on the underlying value shares the same `[min, max]` window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValueOrder {
    pub order: u32,
    pub min: u32,
    pub max: u32,
}

impl ValueOrder {
    /// Strict test on the exact position, or lax test on the tie window
    #[inline]
    #[must_use]
    pub fn within(self, min: i64, max: i64, lax: bool) -> bool {
        if lax {
            i64::from(self.max) >= min && i64::from(self.min) <= max
        } else {
            let order = i64::from(self.order);
            min <= order && order <= max
        }
    }
}

/// One row of the side store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordRecord {
    pub word: String,
    pub alphagram: String,
    pub length: u32,
    /// Draw combinations assuming 0, 1 and 2 blanks
    pub combinations: [f64; 3],
    pub probability_order: [ValueOrder; 3],
    pub playability: i64,
    pub playability_order: ValueOrder,
    pub point_value: u32,
    pub num_vowels: u32,
    pub num_unique_letters: u32,
    /// Words sharing this alphagram, the word itself included
    pub num_anagrams: u32,
    /// Lowercase letters that can be prepended
    pub front_hooks: String,
    /// Lowercase letters that can be appended
    pub back_hooks: String,
    /// The word minus its first letter is acceptable
    pub is_front_hook: bool,
    /// The word minus its last letter is acceptable
    pub is_back_hook: bool,
    pub lexicon_symbols: String,
    /// Definitions for every part of speech, joined with `" / "`
    pub definition: String,
}

impl WordRecord {
    /// Columns derivable from the word and the tile bag alone
    #[must_use]
    pub fn new(word: &str, bag: &LetterBag) -> Self {
        let word = word.to_ascii_uppercase();
        Self {
            alphagram: alphagram(&word),
            length: word.len() as u32,
            combinations: [
                bag.num_combinations(&word, 0),
                bag.num_combinations(&word, 1),
                bag.num_combinations(&word, 2),
            ],
            point_value: bag.word_value(&word),
            num_vowels: num_vowels(&word) as u32,
            num_unique_letters: num_unique_letters(&word) as u32,
            word,
            ..Self::default()
        }
    }

    /// Read a row of the `words` table
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let order = |column: &str| -> rusqlite::Result<ValueOrder> {
            Ok(ValueOrder {
                order: row.get(column)?,
                min: row.get(format!("min_{column}").as_str())?,
                max: row.get(format!("max_{column}").as_str())?,
            })
        };
        Ok(Self {
            word: row.get("word")?,
            alphagram: row.get("alphagram")?,
            length: row.get("length")?,
            combinations: [
                row.get("combinations0")?,
                row.get("combinations1")?,
                row.get("combinations2")?,
            ],
            probability_order: [
                order("probability_order0")?,
                order("probability_order1")?,
                order("probability_order2")?,
            ],
            playability: row.get("playability")?,
            playability_order: order("playability_order")?,
            point_value: row.get("point_value")?,
            num_vowels: row.get("num_vowels")?,
            num_unique_letters: row.get("num_unique_letters")?,
            num_anagrams: row.get("num_anagrams")?,
            front_hooks: row.get("front_hooks")?,
            back_hooks: row.get("back_hooks")?,
            is_front_hook: row.get("is_front_hook")?,
            is_back_hook: row.get("is_back_hook")?,
            lexicon_symbols: row.get("lexicon_symbols")?,
            definition: row.get("definition")?,
        })
    }

    /// Probability ordering for a blank count, clamped to `[0, 2]`
    #[inline]
    #[must_use]
    pub fn probability(&self, blanks: i32) -> ValueOrder {
        self.probability_order[blanks.clamp(0, 2) as usize]
    }

    /// Evaluate a condition the side store can answer for this row alone
    ///
    /// Gives the same answers as the store's SQL filter, for checking single
    /// words outside a search. Returns `None` for conditions that belong to
    /// another phase.
    #[must_use]
    pub fn matches(&self, sc: &SearchCondition) -> Option<bool> {
        let hit = match &sc.condition {
            Condition::PatternMatch(p) if p.is_substring_search() => p.matches(&self.word),
            Condition::Length(r) => r.contains(i64::from(self.length)),
            Condition::NumVowels(r) => r.contains(i64::from(self.num_vowels)),
            Condition::NumUniqueLetters(r) => r.contains(i64::from(self.num_unique_letters)),
            Condition::PointValue(r) => r.contains(i64::from(self.point_value)),
            Condition::NumAnagrams(r) => r.contains(i64::from(self.num_anagrams)),
            Condition::InWordList(words) => words.contains(&self.word),
            Condition::IncludeLetters(letters) => {
                // Negated means none of the letters appear at all
                let word = LetterCounts::from_word(&self.word);
                return Some(if sc.negated {
                    letters.bytes().all(|l| word.get(l) == 0)
                } else {
                    LetterCounts::from_word(letters).is_subset_of(&word)
                });
            }
            Condition::ProbabilityOrder { range, blanks, lax } => {
                self.probability(*blanks).within(range.min, range.max, *lax)
            }
            Condition::PlayabilityOrder { range, lax } => {
                self.playability_order.within(range.min, range.max, *lax)
            }
            Condition::PartOfSpeech(pos) => {
                let pos = pos.to_ascii_uppercase();
                let definition = self.definition.to_ascii_uppercase();
                definition.contains(&format!("[{pos} ")) || definition.contains(&format!("[{pos}]"))
            }
            Condition::Definition(text) => self
                .definition
                .to_lowercase()
                .contains(&text.to_lowercase()),
            Condition::BelongToGroup(set) => match set {
                SearchSet::FrontHooks => self.is_front_hook,
                SearchSet::BackHooks => self.is_back_hook,
                SearchSet::HookWords => self.is_front_hook || self.is_back_hook,
                _ => return None,
            },
            _ => return None,
        };
        Some(hit != sc.negated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Range;

    fn record(word: &str) -> WordRecord {
        WordRecord::new(word, &LetterBag::default())
    }

    #[test]
    fn intrinsic_columns() {
        let r = record("quiz");
        assert_eq!(r.word, "QUIZ");
        assert_eq!(r.alphagram, "IQUZ");
        assert_eq!(r.length, 4);
        assert_eq!(r.point_value, 22);
        assert_eq!(r.num_vowels, 2);
        assert_eq!(r.num_unique_letters, 4);
        assert!(r.combinations[2] >= r.combinations[0]);
    }

    #[test]
    fn include_letters_counts_repeats() {
        let r = record("TATTOO");
        let two_t = SearchCondition::new(Condition::IncludeLetters("TT".into()));
        let four_t = SearchCondition::new(Condition::IncludeLetters("TTTT".into()));
        assert_eq!(r.matches(&two_t), Some(true));
        assert_eq!(r.matches(&four_t), Some(false));

        let no_q = SearchCondition::negated(Condition::IncludeLetters("QT".into()));
        assert_eq!(r.matches(&no_q), Some(false));
        let no_qz = SearchCondition::negated(Condition::IncludeLetters("QZ".into()));
        assert_eq!(r.matches(&no_qz), Some(true));
    }

    #[test]
    fn lax_order_uses_tie_window() {
        let order = ValueOrder {
            order: 3,
            min: 1,
            max: 4,
        };
        assert!(!order.within(1, 1, false));
        assert!(order.within(1, 1, true));
        assert!(order.within(3, 3, false));
        assert!(!order.within(5, 9, true));
    }

    #[test]
    fn part_of_speech_matches_bracket_tag() {
        let mut r = record("CAT");
        r.definition = "a small feline [n CATS] / to vomit [v CATTED, CATTING, CATS]".into();
        let noun = SearchCondition::new(Condition::PartOfSpeech("N".into()));
        let adj = SearchCondition::new(Condition::PartOfSpeech("ADJ".into()));
        assert_eq!(r.matches(&noun), Some(true));
        assert_eq!(r.matches(&adj), Some(false));

        let def = SearchCondition::new(Condition::Definition("FELINE".into()));
        assert_eq!(r.matches(&def), Some(true));
    }

    #[test]
    fn hook_groups_and_negation() {
        let mut r = record("CATS");
        r.is_back_hook = true;
        let back = SearchCondition::new(Condition::BelongToGroup(SearchSet::BackHooks));
        let not_front = SearchCondition::negated(Condition::BelongToGroup(SearchSet::FrontHooks));
        let any = SearchCondition::new(Condition::BelongToGroup(SearchSet::HookWords));
        assert_eq!(r.matches(&back), Some(true));
        assert_eq!(r.matches(&not_front), Some(true));
        assert_eq!(r.matches(&any), Some(true));

        let sevens = SearchCondition::new(Condition::BelongToGroup(SearchSet::TypeOneSevens));
        assert_eq!(r.matches(&sevens), None);
    }

    #[test]
    fn other_phases_are_not_answered() {
        let r = record("CAT");
        let prefix = SearchCondition::new(Condition::Prefix("S".into()));
        assert_eq!(r.matches(&prefix), None);
        let graph_pattern = SearchCondition::pattern("C?T").unwrap();
        assert_eq!(r.matches(&graph_pattern), None);
        let length = SearchCondition::negated(Condition::Length(Range::new(3, 3)));
        assert_eq!(r.matches(&length), Some(false));
    }
}
