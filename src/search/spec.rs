//! Search specifications and their optimization
//!
//! A specification is an ordered list of conditions joined by AND or OR.
//! Before execution a conjunctive specification is optimized: range
//! conditions are merged, implied length bounds are derived from patterns
//! and set memberships, and contradictions collapse the whole thing to
//! "no results".

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::condition::{Condition, Range, SearchCondition};
use crate::core::MAX_WORD_LEN;
use crate::error::SpecResult;
use crate::graph::Token;

/// Version written by this crate
pub const CURRENT_SPEC_VERSION: u32 = 1;

/// Largest anagram count a range condition can meaningfully ask for
pub const MAX_ANAGRAMS: i64 = 65_535;

const fn current_version() -> u32 {
    CURRENT_SPEC_VERSION
}

const fn default_conjunction() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(default = "current_version")]
    pub version: u32,
    /// AND when true, OR otherwise
    #[serde(default = "default_conjunction")]
    pub conjunction: bool,
    #[serde(default)]
    pub conditions: Vec<SearchCondition>,
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self {
            version: CURRENT_SPEC_VERSION,
            conjunction: true,
            conditions: Vec::new(),
        }
    }
}

impl fmt::Display for SearchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joiner = if self.conjunction { " AND " } else { " OR " };
        for (i, sc) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(joiner)?;
            }
            write!(f, "{sc}")?;
        }
        Ok(())
    }
}

impl SearchSpec {
    /// Conjunction of the given conditions
    #[must_use]
    pub fn all_of(conditions: Vec<SearchCondition>) -> Self {
        Self {
            conditions,
            ..Self::default()
        }
    }

    /// Disjunction of the given conditions
    #[must_use]
    pub fn any_of(conditions: Vec<SearchCondition>) -> Self {
        Self {
            conjunction: false,
            conditions,
            ..Self::default()
        }
    }

    /// Parse a JSON document and bring it up to the current version
    ///
    /// # Errors
    /// Returns `SpecError` for malformed JSON or unknown condition types.
    ///
    /// # Examples
    /// ```
    /// use zyzzyva::search::SearchSpec;
    ///
    /// let spec = SearchSpec::from_json(
    ///     r#"{"conditions": [{"type": "Anagram Match", "string": "CAT"}]}"#,
    /// ).unwrap();
    /// assert!(spec.conjunction);
    /// assert_eq!(spec.conditions.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> SpecResult<Self> {
        let mut spec: Self = serde_json::from_str(json)?;
        spec.update();
        Ok(spec)
    }

    /// # Errors
    /// Returns `SpecError::Json` if serialization fails.
    pub fn to_json(&self) -> SpecResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rewrite conditions whose meaning changed between versions
    ///
    /// Version 0 "Probability Order" meant what "Limit by Probability Order"
    /// means now, ranking by word order.
    pub fn update(&mut self) {
        if self.version == 0 {
            for sc in &mut self.conditions {
                if let Condition::ProbabilityOrder { range, blanks, lax } = sc.condition {
                    sc.condition = Condition::LimitByProbabilityOrder {
                        range,
                        blanks,
                        lax,
                        legacy: true,
                    };
                }
            }
        }
        self.version = CURRENT_SPEC_VERSION;
    }

    /// Optimize a conjunctive specification for `lexicon`
    ///
    /// Returns `None` when the conditions contradict each other and nothing
    /// can match. Negated range conditions are kept as they are.
    #[must_use]
    pub fn optimize(&self, lexicon: &str) -> Option<Self> {
        let max_len = MAX_WORD_LEN as i64;
        let mut length = Range::new(0, max_len + 1);
        let mut anagrams = Range::new(0, MAX_ANAGRAMS);
        let mut vowels = Range::new(0, max_len + 1);
        let mut unique = Range::new(0, max_len + 1);
        let mut points = Range::new(0, i64::MAX);
        let mut points_bounded = false;

        let mut must_include = String::new();
        let mut must_exclude = String::new();
        // Required membership per lexicon; the searched lexicon is implied
        let mut in_lexicons: FxHashMap<String, bool> = FxHashMap::default();
        in_lexicons.insert(lexicon.to_string(), true);
        let mut parts_of_speech: FxHashMap<String, bool> = FxHashMap::default();

        let mut wildcard_conditions = Vec::new();
        let mut conditions = Vec::new();

        for sc in &self.conditions {
            let negated = sc.negated;
            match &sc.condition {
                Condition::PatternMatch(p)
                | Condition::AnagramMatch(p)
                | Condition::SubanagramMatch(p) => {
                    if p.has_star() {
                        conditions.push(sc.clone());
                        continue;
                    }
                    if !negated {
                        let len = p.fixed_len() as i64;
                        if matches!(sc.condition, Condition::SubanagramMatch(_)) {
                            if len < length.min {
                                return None;
                            }
                            length.max = length.max.min(len);
                        } else {
                            if len < length.min || len > length.max {
                                return None;
                            }
                            length = Range::new(len, len);
                        }
                    }
                    let wildcard = p
                        .tokens()
                        .iter()
                        .any(|t| matches!(t, Token::Any | Token::Class { .. }));
                    if wildcard {
                        wildcard_conditions.push(sc.clone());
                    } else {
                        conditions.push(sc.clone());
                    }
                }

                Condition::Length(r) if !negated => {
                    length = intersect(length, *r);
                    if length.min > max_len || length.max <= 0 || length.min > length.max {
                        return None;
                    }
                }

                Condition::IncludeLetters(letters) => {
                    let (mine, other) = if negated {
                        (&mut must_exclude, &must_include)
                    } else {
                        (&mut must_include, &must_exclude)
                    };
                    if letters.chars().any(|c| other.contains(c)) {
                        return None;
                    }
                    mine.push_str(letters);
                    conditions.push(sc.clone());
                }

                Condition::BelongToGroup(set) => {
                    if !negated && let Some(len) = set.implied_length() {
                        if len < length.min || len > length.max {
                            return None;
                        }
                        length = Range::new(len, len);
                    }
                    conditions.push(sc.clone());
                }

                Condition::InLexicon(name) => {
                    let required = !negated;
                    if in_lexicons.get(name).is_some_and(|&prev| prev != required) {
                        return None;
                    }
                    in_lexicons.insert(name.clone(), required);
                    conditions.push(sc.clone());
                }

                Condition::PartOfSpeech(pos) => {
                    let required = !negated;
                    if parts_of_speech
                        .get(pos)
                        .is_some_and(|&prev| prev != required)
                    {
                        return None;
                    }
                    parts_of_speech.insert(pos.clone(), required);
                    conditions.push(sc.clone());
                }

                Condition::NumAnagrams(r) if !negated => {
                    anagrams = intersect(anagrams, *r);
                    if anagrams.min > MAX_ANAGRAMS || anagrams.max <= 0 || anagrams.min > anagrams.max
                    {
                        return None;
                    }
                }

                Condition::NumVowels(r) if !negated => {
                    vowels = intersect(vowels, *r);
                    if vowels.min > max_len || vowels.max < 0 || vowels.min > vowels.max {
                        return None;
                    }
                }

                Condition::NumUniqueLetters(r) if !negated => {
                    unique = intersect(unique, *r);
                    if unique.min > max_len || unique.max <= 0 || unique.min > unique.max {
                        return None;
                    }
                }

                Condition::PointValue(r) if !negated => {
                    points = intersect(points, *r);
                    points_bounded = true;
                    if points.max < 0 || points.min > points.max {
                        return None;
                    }
                }

                _ => conditions.push(sc.clone()),
            }
        }

        if vowels.min > length.max || unique.min > length.max {
            return None;
        }

        let mut merged = Vec::new();
        if length.min > 0 || length.max < max_len + 1 {
            merged.push(SearchCondition::new(Condition::Length(length)));
        }
        if vowels.min > 0 || vowels.max < max_len + 1 {
            merged.push(SearchCondition::new(Condition::NumVowels(vowels)));
        }
        if unique.min > 0 || unique.max < max_len + 1 {
            merged.push(SearchCondition::new(Condition::NumUniqueLetters(unique)));
        }
        if points_bounded {
            merged.push(SearchCondition::new(Condition::PointValue(points)));
        }
        if anagrams.min > 0 || anagrams.max < MAX_ANAGRAMS {
            merged.push(SearchCondition::new(Condition::NumAnagrams(anagrams)));
        }

        let mut optimized = wildcard_conditions;
        optimized.extend(merged);
        optimized.extend(conditions);
        Some(Self {
            version: self.version,
            conjunction: true,
            conditions: optimized,
        })
    }
}

fn intersect(a: Range, b: Range) -> Range {
    Range::new(a.min.max(b.min), a.max.min(b.max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::condition::SearchSet;

    fn length_of(spec: &SearchSpec) -> Option<Range> {
        spec.conditions.iter().find_map(|sc| match sc.condition {
            Condition::Length(r) if !sc.negated => Some(r),
            _ => None,
        })
    }

    #[test]
    fn pattern_implies_exact_length() {
        let spec = SearchSpec::all_of(vec![SearchCondition::pattern("C[AO]T").unwrap()]);
        let opt = spec.optimize("OWL2").unwrap();
        assert_eq!(length_of(&opt), Some(Range::new(3, 3)));
        // Wildcard conditions run first
        assert!(matches!(opt.conditions[0].condition, Condition::PatternMatch(_)));
    }

    #[test]
    fn subanagram_caps_length() {
        let spec = SearchSpec::all_of(vec![
            SearchCondition::subanagram("TACOS").unwrap(),
            SearchCondition::length(3, 9),
        ]);
        let opt = spec.optimize("OWL2").unwrap();
        assert_eq!(length_of(&opt), Some(Range::new(3, 5)));
    }

    #[test]
    fn star_patterns_leave_length_alone() {
        let spec = SearchSpec::all_of(vec![SearchCondition::pattern("CAT*").unwrap()]);
        let opt = spec.optimize("OWL2").unwrap();
        assert_eq!(length_of(&opt), None);
    }

    #[test]
    fn contradictory_lengths_are_impossible() {
        let spec = SearchSpec::all_of(vec![
            SearchCondition::anagram("CAT").unwrap(),
            SearchCondition::length(4, 4),
        ]);
        assert!(spec.optimize("OWL2").is_none());
    }

    #[test]
    fn merges_ranges() {
        let spec = SearchSpec::all_of(vec![
            SearchCondition::length(2, 8),
            SearchCondition::length(4, 10),
            SearchCondition::new(Condition::NumVowels(Range::new(1, 5))),
            SearchCondition::new(Condition::NumVowels(Range::new(2, 3))),
        ]);
        let opt = spec.optimize("OWL2").unwrap();
        assert_eq!(opt.conditions.len(), 2);
        assert_eq!(length_of(&opt), Some(Range::new(4, 8)));
        assert_eq!(
            opt.conditions[1].condition,
            Condition::NumVowels(Range::new(2, 3))
        );
    }

    #[test]
    fn include_exclude_conflict() {
        let spec = SearchSpec::all_of(vec![
            SearchCondition::new(Condition::IncludeLetters("QU".into())),
            SearchCondition::negated(Condition::IncludeLetters("U".into())),
        ]);
        assert!(spec.optimize("OWL2").is_none());
    }

    #[test]
    fn lexicon_membership_conflicts() {
        let not_self = SearchSpec::all_of(vec![SearchCondition::negated(Condition::InLexicon(
            "OWL2".into(),
        ))]);
        assert!(not_self.optimize("OWL2").is_none());

        let twice = SearchSpec::all_of(vec![
            SearchCondition::new(Condition::InLexicon("CSW".into())),
            SearchCondition::new(Condition::InLexicon("CSW".into())),
        ]);
        assert!(twice.optimize("OWL2").is_some());

        let both = SearchSpec::all_of(vec![
            SearchCondition::new(Condition::InLexicon("CSW".into())),
            SearchCondition::negated(Condition::InLexicon("CSW".into())),
        ]);
        assert!(both.optimize("OWL2").is_none());
    }

    #[test]
    fn part_of_speech_conflict() {
        let spec = SearchSpec::all_of(vec![
            SearchCondition::new(Condition::PartOfSpeech("N".into())),
            SearchCondition::negated(Condition::PartOfSpeech("N".into())),
        ]);
        assert!(spec.optimize("OWL2").is_none());
    }

    #[test]
    fn group_implies_length() {
        let spec = SearchSpec::all_of(vec![SearchCondition::new(Condition::BelongToGroup(
            SearchSet::TypeThreeSevens,
        ))]);
        let opt = spec.optimize("OWL2").unwrap();
        assert_eq!(length_of(&opt), Some(Range::new(7, 7)));

        let clash = SearchSpec::all_of(vec![
            SearchCondition::length(8, 8),
            SearchCondition::new(Condition::BelongToGroup(SearchSet::HighFives)),
        ]);
        assert!(clash.optimize("OWL2").is_none());
    }

    #[test]
    fn negated_ranges_are_untouched() {
        let spec = SearchSpec::all_of(vec![SearchCondition::negated(Condition::Length(
            Range::new(3, 3),
        ))]);
        let opt = spec.optimize("OWL2").unwrap();
        assert_eq!(opt.conditions, spec.conditions);
    }

    #[test]
    fn version_zero_probability_becomes_limit() {
        let spec = SearchSpec::from_json(
            r#"{"version": 0, "conditions": [
                {"type": "Probability Order", "min": 1, "max": 100, "int": 0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(spec.version, CURRENT_SPEC_VERSION);
        assert_eq!(
            spec.conditions[0].condition,
            Condition::LimitByProbabilityOrder {
                range: Range::new(1, 100),
                blanks: 0,
                lax: false,
                legacy: true,
            }
        );
    }

    #[test]
    fn json_round_trip_keeps_conjunction() {
        let spec = SearchSpec::any_of(vec![
            SearchCondition::anagram("CAT").unwrap(),
            SearchCondition::length(2, 2),
        ]);
        let back = SearchSpec::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn display_joins_conditions() {
        let spec = SearchSpec::any_of(vec![
            SearchCondition::anagram("CAT").unwrap(),
            SearchCondition::length(2, 2),
        ]);
        assert_eq!(spec.to_string(), "Anagram Match: CAT OR Length: Min 2, Max 2");
    }
}
