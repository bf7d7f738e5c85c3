//! Wildcard patterns
//!
//! Patterns use `?` for any single letter, `*` for any run of letters and
//! `[ABC]` / `[^ABC]` for a letter class. The same token stream drives
//! positional pattern matching and (sub)anagram matching; the word-level
//! matchers here are the reference semantics the graph traversals must agree
//! with.

use std::fmt;

use crate::core::LetterCounts;
use crate::error::{SpecError, SpecResult};

const ALL_LETTERS: u32 = (1 << 26) - 1;

#[inline]
fn letter_bit(letter: u8) -> u32 {
    1 << (letter - b'A')
}

/// One position of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Letter(u8),
    /// Letters listed in `mask`, or all others when `negated`
    Class { mask: u32, negated: bool },
    Any,
    Star,
}

impl Token {
    /// Bit mask of letters this single-letter token accepts
    #[must_use]
    pub const fn accepts_mask(self) -> u32 {
        match self {
            Self::Letter(l) => 1 << (l - b'A'),
            Self::Class { mask, negated } => {
                if negated {
                    ALL_LETTERS & !mask
                } else {
                    mask
                }
            }
            Self::Any | Self::Star => ALL_LETTERS,
        }
    }

    #[inline]
    #[must_use]
    pub fn accepts(self, letter: u8) -> bool {
        letter.is_ascii_uppercase() && self.accepts_mask() & letter_bit(letter) != 0
    }
}

/// A parsed wildcard pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    tokens: Vec<Token>,
}

impl Pattern {
    /// Parse a pattern string, case-insensitively
    ///
    /// `.` is accepted as a synonym for `?` and `@` for `*`. Consecutive
    /// stars collapse into one.
    ///
    /// # Errors
    /// Returns `SpecError::InvalidPattern` on unknown characters, empty or
    /// unterminated classes.
    ///
    /// # Examples
    /// ```
    /// use zyzzyva::graph::Pattern;
    ///
    /// let p = Pattern::parse("c?t*").unwrap();
    /// assert!(p.matches("CAT"));
    /// assert!(p.matches("COTTAGE"));
    /// assert!(!p.matches("ACT"));
    /// ```
    pub fn parse(text: &str) -> SpecResult<Self> {
        let invalid = |reason: &str| SpecError::InvalidPattern {
            pattern: text.to_string(),
            reason: reason.to_string(),
        };

        let upper: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase())
            .collect();
        let mut tokens = Vec::with_capacity(upper.len());
        let mut i = 0;
        while i < upper.len() {
            let token = match upper[i] {
                b'?' | b'.' => Token::Any,
                b'*' | b'@' => {
                    if tokens.last() == Some(&Token::Star) {
                        i += 1;
                        continue;
                    }
                    Token::Star
                }
                b'[' => {
                    let close = upper[i..]
                        .iter()
                        .position(|&b| b == b']')
                        .ok_or_else(|| invalid("unterminated letter class"))?;
                    let mut body = &upper[i + 1..i + close];
                    let negated = body.first() == Some(&b'^');
                    if negated {
                        body = &body[1..];
                    }
                    let mut mask = 0u32;
                    for &b in body {
                        if !b.is_ascii_uppercase() {
                            return Err(invalid("letter classes may only contain letters"));
                        }
                        mask |= letter_bit(b);
                    }
                    if mask == 0 {
                        return Err(invalid("empty letter class"));
                    }
                    i += close;
                    Token::Class { mask, negated }
                }
                b if b.is_ascii_uppercase() => Token::Letter(b),
                _ => return Err(invalid("unexpected character")),
            };
            tokens.push(token);
            i += 1;
        }
        Ok(Self { tokens })
    }

    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn has_star(&self) -> bool {
        self.tokens.contains(&Token::Star)
    }

    #[must_use]
    pub fn has_class(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Class { .. }))
    }

    /// Number of tokens that consume exactly one letter
    #[must_use]
    pub fn fixed_len(&self) -> usize {
        self.tokens.iter().filter(|&&t| t != Token::Star).count()
    }

    /// True when the pattern is `*...*` with no letter classes, i.e. a plain
    /// substring search
    #[must_use]
    pub fn is_substring_search(&self) -> bool {
        self.tokens.len() >= 2
            && self.tokens.first() == Some(&Token::Star)
            && self.tokens.last() == Some(&Token::Star)
            && !self.has_class()
    }

    /// Positional match of the whole word
    #[must_use]
    pub fn matches(&self, word: &str) -> bool {
        let word = word.as_bytes();
        // Classic wildcard matching with single-star backtracking
        let (mut t, mut w) = (0usize, 0usize);
        let mut star: Option<(usize, usize)> = None;
        while w < word.len() {
            match self.tokens.get(t) {
                Some(Token::Star) => {
                    star = Some((t, w));
                    t += 1;
                }
                Some(&tok) if tok.accepts(word[w].to_ascii_uppercase()) => {
                    t += 1;
                    w += 1;
                }
                _ => match star {
                    Some((st, sw)) => {
                        t = st + 1;
                        w = sw + 1;
                        star = Some((st, sw + 1));
                    }
                    None => return false,
                },
            }
        }
        self.tokens[t..].iter().all(|&tok| tok == Token::Star)
    }

    /// Split into exact letters and single-letter wildcards for anagram work
    #[must_use]
    pub fn anagram_pool(&self) -> AnagramPool {
        let mut letters = LetterCounts::default();
        let mut wildcards = Vec::new();
        let mut star = false;
        for &tok in &self.tokens {
            match tok {
                Token::Letter(l) => letters.add(l),
                Token::Star => star = true,
                other => wildcards.push(other.accepts_mask()),
            }
        }
        AnagramPool {
            letters,
            wildcards,
            star,
        }
    }

    /// Word uses exactly the pattern's letters (plus anything for `*`)
    #[must_use]
    pub fn matches_anagram(&self, word: &str) -> bool {
        self.anagram_pool().accepts(word, false)
    }

    /// Word uses only letters available in the pattern
    #[must_use]
    pub fn matches_subanagram(&self, word: &str) -> bool {
        self.anagram_pool().accepts(word, true)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &tok in &self.tokens {
            match tok {
                Token::Letter(l) => write!(f, "{}", char::from(l))?,
                Token::Any => write!(f, "?")?,
                Token::Star => write!(f, "*")?,
                Token::Class { mask, negated } => {
                    write!(f, "[")?;
                    if negated {
                        write!(f, "^")?;
                    }
                    for i in 0..26u8 {
                        if mask & (1 << i) != 0 {
                            write!(f, "{}", char::from(b'A' + i))?;
                        }
                    }
                    write!(f, "]")?;
                }
            }
        }
        Ok(())
    }
}

/// Letters available to an anagram search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnagramPool {
    pub letters: LetterCounts,
    /// Accept masks of the single-letter wildcards
    pub wildcards: Vec<u32>,
    pub star: bool,
}

impl AnagramPool {
    /// Check a whole word against the pool
    ///
    /// With `partial` the word may leave pool entries unused (subanagram);
    /// otherwise every exact letter and wildcard must be consumed.
    #[must_use]
    pub fn accepts(&self, word: &str, partial: bool) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut remaining = self.letters;
        let mut leftover: Vec<u8> = Vec::new();
        for b in word.bytes() {
            let upper = b.to_ascii_uppercase();
            if !upper.is_ascii_uppercase() {
                return false;
            }
            if !remaining.take(upper) {
                leftover.push(upper);
            }
        }

        if partial {
            if self.star {
                return true;
            }
            if leftover.len() > self.wildcards.len() {
                return false;
            }
            return max_matching(&leftover, &self.wildcards) == leftover.len();
        }

        if remaining.total() > 0 {
            return false;
        }
        if self.star {
            leftover.len() >= self.wildcards.len()
                && max_matching(&leftover, &self.wildcards) == self.wildcards.len()
        } else {
            leftover.len() == self.wildcards.len()
                && max_matching(&leftover, &self.wildcards) == leftover.len()
        }
    }
}

/// Maximum bipartite matching between letters and wildcard masks
fn max_matching(letters: &[u8], wildcards: &[u32]) -> usize {
    fn augment(
        letter: usize,
        letters: &[u8],
        wildcards: &[u32],
        owner: &mut [Option<usize>],
        seen: &mut [bool],
    ) -> bool {
        for (w, &mask) in wildcards.iter().enumerate() {
            if seen[w] || mask & letter_bit(letters[letter]) == 0 {
                continue;
            }
            seen[w] = true;
            let free = match owner[w] {
                None => true,
                Some(other) => augment(other, letters, wildcards, owner, seen),
            };
            if free {
                owner[w] = Some(letter);
                return true;
            }
        }
        false
    }

    let mut owner = vec![None; wildcards.len()];
    let mut matched = 0;
    for letter in 0..letters.len() {
        let mut seen = vec![false; wildcards.len()];
        if augment(letter, letters, wildcards, &mut owner, &mut seen) {
            matched += 1;
        }
    }
    matched
}
