//! Execution phase classification

use std::fmt;

use super::condition::{Condition, SearchCondition};

/// Stage of the query pipeline that evaluates a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Answered by traversing the word graph
    Graph,
    /// Answered by predicates over word records
    SideStore,
    /// Answered per candidate after the other phases narrowed the set
    PostFilter,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Graph => "graph",
            Self::SideStore => "side store",
            Self::PostFilter => "post filter",
        })
    }
}

impl Condition {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::PatternMatch(p) if p.is_substring_search() => Phase::SideStore,
            Self::PatternMatch(_)
            | Self::AnagramMatch(_)
            | Self::SubanagramMatch(_)
            | Self::ConsistOf { .. } => Phase::Graph,
            Self::Length(_)
            | Self::InWordList(_)
            | Self::NumVowels(_)
            | Self::IncludeLetters(_)
            | Self::ProbabilityOrder { .. }
            | Self::PlayabilityOrder { .. }
            | Self::NumUniqueLetters(_)
            | Self::PointValue(_)
            | Self::NumAnagrams(_)
            | Self::PartOfSpeech(_)
            | Self::Definition(_) => Phase::SideStore,
            Self::BelongToGroup(set) if set.is_hook_set() => Phase::SideStore,
            Self::BelongToGroup(_)
            | Self::Prefix(_)
            | Self::Suffix(_)
            | Self::InLexicon(_)
            | Self::LimitByProbabilityOrder { .. }
            | Self::LimitByPlayabilityOrder { .. } => Phase::PostFilter,
        }
    }
}

impl SearchCondition {
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.condition.phase()
    }
}
