//! Rank window limits over a candidate list
//!
//! "Limit by Probability Order" and "Limit by Playability Order" rank the
//! words that survived every other condition, not the whole lexicon. Limits
//! are grouped by kind and blank count; each group keeps the tightest strict
//! bounds and the tightest lax bounds. A lax window widens to take in words
//! tied with its edges, but never past the strict bounds.

use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::{alphagram, ranks_tied};
use crate::search::{Condition, SearchCondition};

/// Open upper bound of a limit group before any condition narrows it
const LIMIT_RANGE_MAX: i64 = 999_999;

/// What a limit group ranks by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LimitKey {
    Probability { blanks: i32 },
    Playability,
}

/// Combined 1-based bounds of one limit group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    min: i64,
    max: i64,
    min_lax: i64,
    max_lax: i64,
    /// Rank by word instead of alphagram within equal values
    legacy: bool,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            min: 0,
            max: LIMIT_RANGE_MAX,
            min_lax: 0,
            max_lax: LIMIT_RANGE_MAX,
            legacy: false,
        }
    }
}

/// Limit conditions of a specification, grouped by rank kind
#[derive(Debug, Clone, Default)]
pub struct RankLimits {
    groups: BTreeMap<LimitKey, Window>,
}

impl RankLimits {
    /// Collect the limit conditions; negation does not apply to limits
    #[must_use]
    pub fn from_conditions(conditions: &[SearchCondition]) -> Self {
        let mut groups: BTreeMap<LimitKey, Window> = BTreeMap::new();
        for sc in conditions {
            let (key, range, lax, legacy) = match &sc.condition {
                Condition::LimitByProbabilityOrder {
                    range,
                    blanks,
                    lax,
                    legacy,
                } => (LimitKey::Probability { blanks: *blanks }, range, *lax, *legacy),
                Condition::LimitByPlayabilityOrder { range, lax } => {
                    (LimitKey::Playability, range, *lax, false)
                }
                _ => continue,
            };
            let window = groups.entry(key).or_default();
            window.legacy |= legacy;
            if lax {
                window.min_lax = window.min_lax.max(range.min);
                window.max_lax = window.max_lax.min(range.max);
            } else {
                window.min = window.min.max(range.min);
                window.max = window.max.min(range.max);
            }
        }
        Self { groups }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Keys of the groups present, for callers preparing value lookups
    pub fn keys(&self) -> impl Iterator<Item = LimitKey> + '_ {
        self.groups.keys().copied()
    }

    /// Keep the candidates inside every group's window
    ///
    /// `value` gives a word's ranking value for a key; words without one are
    /// left out of that group's ranking. The result keeps candidate order.
    #[must_use]
    pub fn apply<F>(&self, candidates: &[String], value: F) -> Vec<String>
    where
        F: Fn(LimitKey, &str) -> Option<f64>,
    {
        if self.groups.is_empty() {
            return candidates.to_vec();
        }
        let total = candidates.len() as i64;
        let mut keep: FxHashSet<&str> = candidates.iter().map(String::as_str).collect();

        for (&key, window) in &self.groups {
            if window.min > window.max || window.min > total || window.min_lax > total {
                return Vec::new();
            }

            let mut ranked: Vec<Ranked<'_>> = candidates
                .iter()
                .filter_map(|word| {
                    value(key, word.as_str()).map(|v| Ranked {
                        value: v,
                        alphagram: if window.legacy {
                            String::new()
                        } else {
                            alphagram(word)
                        },
                        word,
                    })
                })
                .collect();
            ranked.sort_by(Ranked::by_rank);

            let Some((lo, hi)) = window.span(&ranked) else {
                return Vec::new();
            };
            let inside: FxHashSet<&str> =
                ranked[lo..=hi].iter().map(|r| r.word.as_str()).collect();
            keep.retain(|word| inside.contains(word));
        }

        candidates
            .iter()
            .filter(|word| keep.contains(word.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
struct Ranked<'a> {
    value: f64,
    alphagram: String,
    word: &'a String,
}

impl Ranked<'_> {
    /// Value descending, then alphagram, then word
    fn by_rank(a: &Self, b: &Self) -> Ordering {
        b.value
            .total_cmp(&a.value)
            .then_with(|| a.alphagram.cmp(&b.alphagram))
            .then_with(|| a.word.cmp(b.word))
    }
}

impl Window {
    /// 0-based inclusive index span over `ranked`, after tie snapping
    fn span(&self, ranked: &[Ranked<'_>]) -> Option<(usize, usize)> {
        let last = ranked.len() as i64 - 1;
        if last < 0 {
            return None;
        }
        let strict_min = (self.min - 1).max(0);
        let strict_max = (self.max - 1).min(last);
        let lax_min = (self.min_lax - 1).max(0);
        let lax_max = (self.max_lax - 1).min(last);

        let mut lo = strict_min.max(lax_min);
        let mut hi = strict_max.min(lax_max);
        if lo > last || hi < 0 {
            return None;
        }

        let tied = |a: i64, b: i64| ranks_tied(ranked[a as usize].value, ranked[b as usize].value);
        while lo > 0 && lo > strict_min && tied(lo - 1, lo) {
            lo -= 1;
        }
        while hi < last && hi < strict_max && tied(hi + 1, hi) {
            hi += 1;
        }

        (lo <= hi).then_some((lo as usize, hi as usize))
    }
}
