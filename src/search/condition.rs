//! Search conditions
//!
//! A condition is a tagged variant over every supported condition type plus
//! a negation flag. Documents use a flat field layout (`type`, `string`,
//! `min`, `max`, `int`, `bool`, `negated`); conversion to and from that
//! layout goes through [`RawCondition`], which is also where legacy type
//! names are translated and unknown ones rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::MAX_WORD_LEN;
use crate::error::{SpecError, SpecResult};
use crate::graph::Pattern;

/// Upper bound used by open-ended legacy anagram conditions
const OPEN_MAX: i64 = 999_999;

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub min: i64,
    pub max: i64,
}

impl Range {
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Word classifications usable with "Belongs to Group"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSet {
    HookWords,
    FrontHooks,
    BackHooks,
    HighFives,
    TypeOneSevens,
    TypeTwoSevens,
    TypeThreeSevens,
    TypeOneEights,
    TypeTwoEights,
    TypeThreeEights,
    EightsFromSevenLetterStems,
}

impl SearchSet {
    pub const ALL: [Self; 11] = [
        Self::HookWords,
        Self::FrontHooks,
        Self::BackHooks,
        Self::HighFives,
        Self::TypeOneSevens,
        Self::TypeTwoSevens,
        Self::TypeThreeSevens,
        Self::TypeOneEights,
        Self::TypeTwoEights,
        Self::TypeThreeEights,
        Self::EightsFromSevenLetterStems,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HookWords => "Hook Words",
            Self::FrontHooks => "Front Hooks",
            Self::BackHooks => "Back Hooks",
            Self::HighFives => "High Fives",
            Self::TypeOneSevens => "Type I Sevens",
            Self::TypeTwoSevens => "Type II Sevens",
            Self::TypeThreeSevens => "Type III Sevens",
            Self::TypeOneEights => "Type I Eights",
            Self::TypeTwoEights => "Type II Eights",
            Self::TypeThreeEights => "Type III Eights",
            Self::EightsFromSevenLetterStems => "Eights From Seven-Letter Stems",
        }
    }

    /// Sets answered by the precomputed hook columns of the side store
    #[must_use]
    pub const fn is_hook_set(self) -> bool {
        matches!(self, Self::HookWords | Self::FrontHooks | Self::BackHooks)
    }

    /// Word length every member of the set has, if fixed
    #[must_use]
    pub const fn implied_length(self) -> Option<i64> {
        match self {
            Self::HighFives => Some(5),
            Self::TypeOneSevens | Self::TypeTwoSevens | Self::TypeThreeSevens => Some(7),
            Self::TypeOneEights
            | Self::TypeTwoEights
            | Self::TypeThreeEights
            | Self::EightsFromSevenLetterStems => Some(8),
            Self::HookWords | Self::FrontHooks | Self::BackHooks => None,
        }
    }
}

impl FromStr for SearchSet {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|set| set.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SpecError::UnknownSearchSet(s.to_string()))
    }
}

impl fmt::Display for SearchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition payloads, one variant per condition type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    PatternMatch(Pattern),
    AnagramMatch(Pattern),
    SubanagramMatch(Pattern),
    /// Share of the word's letters (in percent) drawn from `letters`
    ConsistOf {
        letters: String,
        percent: Range,
    },
    Length(Range),
    Prefix(String),
    Suffix(String),
    IncludeLetters(String),
    BelongToGroup(SearchSet),
    InLexicon(String),
    InWordList(BTreeSet<String>),
    NumAnagrams(Range),
    NumVowels(Range),
    NumUniqueLetters(Range),
    PointValue(Range),
    ProbabilityOrder {
        range: Range,
        blanks: i32,
        lax: bool,
    },
    /// `legacy` limits rank candidates by word order instead of value
    LimitByProbabilityOrder {
        range: Range,
        blanks: i32,
        lax: bool,
        legacy: bool,
    },
    PlayabilityOrder {
        range: Range,
        lax: bool,
    },
    LimitByPlayabilityOrder {
        range: Range,
        lax: bool,
    },
    PartOfSpeech(String),
    Definition(String),
}

impl Condition {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::PatternMatch(_) => "Pattern Match",
            Self::AnagramMatch(_) => "Anagram Match",
            Self::SubanagramMatch(_) => "Subanagram Match",
            Self::ConsistOf { .. } => "Consists of",
            Self::Length(_) => "Length",
            Self::Prefix(_) => "Takes Prefix",
            Self::Suffix(_) => "Takes Suffix",
            Self::IncludeLetters(_) => "Includes Letters",
            Self::BelongToGroup(_) => "Belongs to Group",
            Self::InLexicon(_) => "In Lexicon",
            Self::InWordList(_) => "In Word List",
            Self::NumAnagrams(_) => "Number of Anagrams",
            Self::NumVowels(_) => "Number of Vowels",
            Self::NumUniqueLetters(_) => "Number of Unique Letters",
            Self::PointValue(_) => "Point Value",
            Self::ProbabilityOrder { .. } => "Probability Order",
            Self::LimitByProbabilityOrder { .. } => "Limit by Probability Order",
            Self::PlayabilityOrder { .. } => "Playability Order",
            Self::LimitByPlayabilityOrder { .. } => "Limit by Playability Order",
            Self::PartOfSpeech(_) => "Part of Speech",
            Self::Definition(_) => "Definition",
        }
    }
}

/// A condition with its negation flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub struct SearchCondition {
    pub condition: Condition,
    pub negated: bool,
}

impl SearchCondition {
    #[must_use]
    pub const fn new(condition: Condition) -> Self {
        Self {
            condition,
            negated: false,
        }
    }

    #[must_use]
    pub const fn negated(condition: Condition) -> Self {
        Self {
            condition,
            negated: true,
        }
    }

    /// Shorthand for a pattern-bearing condition
    ///
    /// # Errors
    /// Returns `SpecError::InvalidPattern` if the pattern does not parse.
    pub fn pattern(text: &str) -> SpecResult<Self> {
        Ok(Self::new(Condition::PatternMatch(Pattern::parse(text)?)))
    }

    /// # Errors
    /// Returns `SpecError::InvalidPattern` if the pattern does not parse.
    pub fn anagram(text: &str) -> SpecResult<Self> {
        Ok(Self::new(Condition::AnagramMatch(Pattern::parse(text)?)))
    }

    /// # Errors
    /// Returns `SpecError::InvalidPattern` if the pattern does not parse.
    pub fn subanagram(text: &str) -> SpecResult<Self> {
        Ok(Self::new(Condition::SubanagramMatch(Pattern::parse(text)?)))
    }

    #[must_use]
    pub const fn length(min: i64, max: i64) -> Self {
        Self::new(Condition::Length(Range::new(min, max)))
    }
}

impl fmt::Display for SearchCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT ")?;
        }
        write!(f, "{}: ", self.condition.type_name())?;
        match &self.condition {
            Condition::PatternMatch(p) | Condition::AnagramMatch(p) | Condition::SubanagramMatch(p) => {
                write!(f, "{p}")
            }
            Condition::ConsistOf { letters, percent } => {
                write!(f, "Min {}%, Max {}% {letters}", percent.min, percent.max)
            }
            Condition::Prefix(s)
            | Condition::Suffix(s)
            | Condition::IncludeLetters(s)
            | Condition::InLexicon(s)
            | Condition::PartOfSpeech(s)
            | Condition::Definition(s) => f.write_str(s),
            Condition::BelongToGroup(set) => write!(f, "{set}"),
            Condition::InWordList(words) => {
                write!(f, "{}", words.iter().cloned().collect::<Vec<_>>().join(" "))
            }
            Condition::Length(r)
            | Condition::NumAnagrams(r)
            | Condition::NumVowels(r)
            | Condition::NumUniqueLetters(r)
            | Condition::PointValue(r) => write!(f, "Min {}, Max {}", r.min, r.max),
            Condition::ProbabilityOrder { range, blanks, lax }
            | Condition::LimitByProbabilityOrder {
                range, blanks, lax, ..
            } => {
                write!(f, "Min {}, Max {}", range.min, range.max)?;
                let plural = if *blanks == 1 { "" } else { "s" };
                write!(f, " ({blanks} blank{plural})")?;
                if *lax {
                    write!(f, " (Lax)")?;
                }
                Ok(())
            }
            Condition::PlayabilityOrder { range, lax }
            | Condition::LimitByPlayabilityOrder { range, lax } => {
                write!(f, "Min {}, Max {}", range.min, range.max)?;
                if *lax {
                    write!(f, " (Lax)")?;
                }
                Ok(())
            }
        }
    }
}

/// Flat document form of a condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCondition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    /// Legacy single-number field of the old length and anagram conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    /// Legacy field of the old "Must Consist of" condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
    /// Set on probability limits rewritten from version 0 documents
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub legacy: bool,
}

impl RawCondition {
    fn string(&self) -> SpecResult<String> {
        let value = self.string.as_deref().ok_or_else(|| SpecError::MissingField {
            condition: self.kind.clone(),
            field: "string",
        })?;
        if value.trim().is_empty() {
            return Err(SpecError::EmptyValue(self.kind.clone()));
        }
        Ok(value.trim().to_string())
    }

    fn upper_string(&self) -> SpecResult<String> {
        Ok(self.string()?.to_ascii_uppercase())
    }

    fn range(&self) -> SpecResult<Range> {
        let min = self.min.ok_or_else(|| SpecError::MissingField {
            condition: self.kind.clone(),
            field: "min",
        })?;
        let max = self.max.ok_or_else(|| SpecError::MissingField {
            condition: self.kind.clone(),
            field: "max",
        })?;
        Ok(Range::new(min, max))
    }

    fn number(&self) -> SpecResult<i64> {
        self.number.ok_or_else(|| SpecError::MissingField {
            condition: self.kind.clone(),
            field: "number",
        })
    }

    /// Probability conditions assume two blanks when unspecified
    fn blanks(&self) -> i32 {
        self.int.map_or(2, |n| n.clamp(0, 2) as i32)
    }

    fn pattern(&self) -> SpecResult<Pattern> {
        Pattern::parse(&self.string()?)
    }
}

impl TryFrom<RawCondition> for SearchCondition {
    type Error = SpecError;

    fn try_from(raw: RawCondition) -> SpecResult<Self> {
        let mut negated = raw.negated;
        let lax = raw.bool.unwrap_or(false);
        let condition = match raw.kind.trim() {
            "Pattern Match" => Condition::PatternMatch(raw.pattern()?),
            "Anagram Match" => Condition::AnagramMatch(raw.pattern()?),
            "Subanagram Match" => Condition::SubanagramMatch(raw.pattern()?),
            "Consists of" | "Must Consist of" => {
                let percent = match raw.percent {
                    Some(p) => Range::new(p, 100),
                    None => raw.range()?,
                };
                Condition::ConsistOf {
                    letters: raw.upper_string()?,
                    percent,
                }
            }
            "Length" => Condition::Length(raw.range()?),
            "Exact Length" => {
                let n = raw.number()?;
                Condition::Length(Range::new(n, n))
            }
            "Minimum Length" => Condition::Length(Range::new(raw.number()?, MAX_WORD_LEN as i64)),
            "Maximum Length" => Condition::Length(Range::new(0, raw.number()?)),
            "Takes Prefix" => Condition::Prefix(raw.upper_string()?),
            "Does Not Take Prefix" => {
                negated = true;
                Condition::Prefix(raw.upper_string()?)
            }
            "Takes Suffix" => Condition::Suffix(raw.upper_string()?),
            "Does Not Take Suffix" => {
                negated = true;
                Condition::Suffix(raw.upper_string()?)
            }
            "Includes Letters" | "Must Include" => {
                Condition::IncludeLetters(raw.upper_string()?)
            }
            "Must Exclude" => {
                negated = true;
                Condition::IncludeLetters(raw.upper_string()?)
            }
            "Belongs to Group" | "Must Belong to" => {
                Condition::BelongToGroup(raw.string()?.parse()?)
            }
            "In Lexicon" => Condition::InLexicon(raw.string()?),
            "In Word List" | "Must Be in Word List" => Condition::InWordList(word_set(&raw.string()?)),
            "Must Not Be in Word List" => {
                negated = true;
                Condition::InWordList(word_set(&raw.string()?))
            }
            "Number of Anagrams" => Condition::NumAnagrams(raw.range()?),
            "Exact Anagrams" => {
                let n = raw.number()?;
                Condition::NumAnagrams(Range::new(n, n))
            }
            "Minimum Anagrams" => Condition::NumAnagrams(Range::new(raw.number()?, OPEN_MAX)),
            "Maximum Anagrams" => Condition::NumAnagrams(Range::new(0, raw.number()?)),
            "Number of Vowels" => Condition::NumVowels(raw.range()?),
            "Number of Unique Letters" => Condition::NumUniqueLetters(raw.range()?),
            "Point Value" => Condition::PointValue(raw.range()?),
            "Probability Order" => Condition::ProbabilityOrder {
                range: raw.range()?,
                blanks: raw.blanks(),
                lax,
            },
            "Limit by Probability Order" => Condition::LimitByProbabilityOrder {
                range: raw.range()?,
                blanks: raw.blanks(),
                lax,
                legacy: raw.legacy,
            },
            "Playability Order" => Condition::PlayabilityOrder {
                range: raw.range()?,
                lax,
            },
            "Limit by Playability Order" => Condition::LimitByPlayabilityOrder {
                range: raw.range()?,
                lax,
            },
            "Part of Speech" => Condition::PartOfSpeech(raw.upper_string()?),
            "Definition" => Condition::Definition(raw.string()?),
            other => return Err(SpecError::UnknownConditionType(other.to_string())),
        };
        Ok(Self { condition, negated })
    }
}

fn word_set(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect()
}

impl From<SearchCondition> for RawCondition {
    fn from(sc: SearchCondition) -> Self {
        let mut raw = Self {
            kind: sc.condition.type_name().to_string(),
            negated: sc.negated,
            ..Self::default()
        };
        match sc.condition {
            Condition::PatternMatch(p) | Condition::AnagramMatch(p) | Condition::SubanagramMatch(p) => {
                raw.string = Some(p.to_string());
            }
            Condition::ConsistOf { letters, percent } => {
                raw.string = Some(letters);
                raw.min = Some(percent.min);
                raw.max = Some(percent.max);
            }
            Condition::Prefix(s)
            | Condition::Suffix(s)
            | Condition::IncludeLetters(s)
            | Condition::InLexicon(s)
            | Condition::PartOfSpeech(s)
            | Condition::Definition(s) => raw.string = Some(s),
            Condition::BelongToGroup(set) => raw.string = Some(set.as_str().to_string()),
            Condition::InWordList(words) => {
                raw.string = Some(words.into_iter().collect::<Vec<_>>().join(" "));
            }
            Condition::Length(r)
            | Condition::NumAnagrams(r)
            | Condition::NumVowels(r)
            | Condition::NumUniqueLetters(r)
            | Condition::PointValue(r) => {
                raw.min = Some(r.min);
                raw.max = Some(r.max);
            }
            Condition::ProbabilityOrder { range, blanks, lax } => {
                raw.min = Some(range.min);
                raw.max = Some(range.max);
                raw.int = Some(i64::from(blanks));
                raw.bool = Some(lax);
            }
            Condition::LimitByProbabilityOrder {
                range,
                blanks,
                lax,
                legacy,
            } => {
                raw.min = Some(range.min);
                raw.max = Some(range.max);
                raw.int = Some(i64::from(blanks));
                raw.bool = Some(lax);
                raw.legacy = legacy;
            }
            Condition::PlayabilityOrder { range, lax }
            | Condition::LimitByPlayabilityOrder { range, lax } => {
                raw.min = Some(range.min);
                raw.max = Some(range.max);
                raw.bool = Some(lax);
            }
        }
        raw
    }
}
