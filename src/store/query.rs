//! Side-store conditions as an SQL `WHERE` clause
//!
//! Every value is bound as a parameter; word lists go through the `rarray`
//! table-valued function so large candidate sets need no placeholders.

use rusqlite::ToSql;
use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::graph::Token;
use crate::search::{Condition, Phase, Range, SearchCondition, SearchSet};

#[derive(Default)]
pub(super) struct WhereClause {
    terms: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl WhereClause {
    /// Terms for the side-store conditions of `conditions`
    pub(super) fn from_conditions(conditions: &[SearchCondition]) -> Self {
        let mut clause = Self::default();
        for sc in conditions.iter().filter(|sc| sc.phase() == Phase::SideStore) {
            clause.push(sc);
        }
        clause
    }

    /// Only rows for `words` (any case)
    pub(super) fn restrict_to(&mut self, words: &[String]) {
        let values: Vec<Value> = words
            .iter()
            .map(|w| Value::from(w.to_ascii_uppercase()))
            .collect();
        let list = self.bind(Rc::new(values));
        self.terms.push(format!("word IN rarray({list})"));
    }

    pub(super) fn sql(&self) -> String {
        if self.terms.is_empty() {
            "1".to_string()
        } else {
            self.terms.join(" AND ")
        }
    }

    pub(super) fn params(&self) -> impl rusqlite::Params + '_ {
        rusqlite::params_from_iter(self.params.iter())
    }

    fn bind(&mut self, value: impl ToSql + 'static) -> String {
        self.params.push(Box::new(value));
        format!("?{}", self.params.len())
    }

    fn range(&mut self, column: &str, range: Range) -> String {
        let min = self.bind(range.min);
        let max = self.bind(range.max);
        format!("{column} BETWEEN {min} AND {max}")
    }

    /// Rank window test on an order column and its tie bounds
    fn order(&mut self, column: &str, range: Range, lax: bool) -> String {
        if lax {
            let min = self.bind(range.min);
            let max = self.bind(range.max);
            format!("max_{column} >= {min} AND min_{column} <= {max}")
        } else {
            self.range(column, range)
        }
    }

    fn like(&mut self, column: &str, pattern: String) -> String {
        let pattern = self.bind(pattern);
        format!("{column} LIKE {pattern} ESCAPE '\\'")
    }

    fn push(&mut self, sc: &SearchCondition) {
        let term = match &sc.condition {
            Condition::PatternMatch(pattern) => {
                let like: String = pattern
                    .tokens()
                    .iter()
                    .map(|token| match token {
                        Token::Star => '%',
                        Token::Letter(l) => char::from(*l),
                        Token::Any | Token::Class { .. } => '_',
                    })
                    .collect();
                self.like("word", like)
            }
            Condition::Length(r) => self.range("length", *r),
            Condition::NumVowels(r) => self.range("num_vowels", *r),
            Condition::NumUniqueLetters(r) => self.range("num_unique_letters", *r),
            Condition::PointValue(r) => self.range("point_value", *r),
            Condition::NumAnagrams(r) => self.range("num_anagrams", *r),
            Condition::InWordList(words) => {
                let values: Vec<Value> = words.iter().map(|w| Value::from(w.clone())).collect();
                let list = self.bind(Rc::new(values));
                format!("word IN rarray({list})")
            }
            Condition::IncludeLetters(letters) => {
                // Negation is part of the term: none of the letters at all
                let term = self.include_letters(letters, sc.negated);
                self.terms.push(term);
                return;
            }
            Condition::ProbabilityOrder { range, blanks, lax } => {
                let column = format!("probability_order{}", (*blanks).clamp(0, 2));
                self.order(&column, *range, *lax)
            }
            Condition::PlayabilityOrder { range, lax } => {
                self.order("playability_order", *range, *lax)
            }
            Condition::PartOfSpeech(pos) => {
                let pos = escape_like(&pos.to_ascii_uppercase());
                let spaced = self.like("definition", format!("%[{pos} %"));
                let closed = self.like("definition", format!("%[{pos}]%"));
                format!("{spaced} OR {closed}")
            }
            Condition::Definition(text) => {
                self.like("definition", format!("%{}%", escape_like(text)))
            }
            Condition::BelongToGroup(set) => match set {
                SearchSet::FrontHooks => "is_front_hook = 1".to_string(),
                SearchSet::BackHooks => "is_back_hook = 1".to_string(),
                SearchSet::HookWords => "is_front_hook = 1 OR is_back_hook = 1".to_string(),
                _ => return,
            },
            _ => return,
        };
        self.terms.push(if sc.negated {
            format!("NOT ({term})")
        } else {
            format!("({term})")
        });
    }

    /// Each distinct letter at least as often as it is listed, or with
    /// `negated` none of them
    fn include_letters(&mut self, letters: &str, negated: bool) -> String {
        let mut counts: BTreeMap<char, usize> = BTreeMap::new();
        for letter in letters.chars().filter(char::is_ascii_alphabetic) {
            *counts.entry(letter.to_ascii_uppercase()).or_insert(0) += 1;
        }
        let terms: Vec<String> = counts
            .into_iter()
            .map(|(letter, count)| {
                if negated {
                    let pattern = self.bind(format!("%{letter}%"));
                    format!("word NOT LIKE {pattern}")
                } else {
                    let tail = format!("{letter}%").repeat(count);
                    let pattern = self.bind(format!("%{tail}"));
                    format!("word LIKE {pattern}")
                }
            })
            .collect();
        if terms.is_empty() {
            "1".to_string()
        } else {
            format!("({})", terms.join(" AND "))
        }
    }
}

/// Escape LIKE wildcards so `text` matches literally under `ESCAPE '\'`
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_anded_with_bound_values() {
        let clause = WhereClause::from_conditions(&[
            SearchCondition::length(2, 5),
            SearchCondition::negated(Condition::PointValue(Range::new(0, 9))),
        ]);
        assert_eq!(
            clause.sql(),
            "(length BETWEEN ?1 AND ?2) AND NOT (point_value BETWEEN ?3 AND ?4)"
        );
        assert_eq!(clause.params.len(), 4);
    }

    #[test]
    fn other_phases_add_nothing() {
        let clause = WhereClause::from_conditions(&[
            SearchCondition::anagram("CAT").unwrap(),
            SearchCondition::new(Condition::Prefix("S".into())),
        ]);
        assert_eq!(clause.sql(), "1");
    }

    #[test]
    fn substring_pattern_becomes_like() {
        let clause = WhereClause::from_conditions(&[SearchCondition::pattern("*A?T*").unwrap()]);
        assert_eq!(clause.sql(), "(word LIKE ?1 ESCAPE '\\')");
    }

    #[test]
    fn lax_order_uses_tie_columns() {
        let clause = WhereClause::from_conditions(&[SearchCondition::new(
            Condition::ProbabilityOrder {
                range: Range::new(1, 100),
                blanks: 5,
                lax: true,
            },
        )]);
        assert_eq!(
            clause.sql(),
            "(max_probability_order2 >= ?1 AND min_probability_order2 <= ?2)"
        );
    }

    #[test]
    fn negated_include_letters_excludes_each_letter() {
        let clause = WhereClause::from_conditions(&[SearchCondition::negated(
            Condition::IncludeLetters("QZQ".into()),
        )]);
        assert_eq!(clause.sql(), "(word NOT LIKE ?1 AND word NOT LIKE ?2)");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
