//! Word normalization and letter statistics
//!
//! Every word handled by the engine is stored in canonical uppercase form.
//! The helpers here derive the per-word attributes that both the word graph
//! and the side store rely on: alphagrams, vowel counts and letter multisets.

use std::fmt;

/// Longest word the engine indexes
pub const MAX_WORD_LEN: usize = 15;

/// Error type for words that cannot be indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    Empty,
    TooLong(usize),
    InvalidCharacter(char),
}

impl fmt::Display for WordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Word is empty"),
            Self::TooLong(len) => {
                write!(f, "Word has {len} letters, maximum is {MAX_WORD_LEN}")
            }
            Self::InvalidCharacter(c) => write!(f, "Word contains invalid character '{c}'"),
        }
    }
}

impl std::error::Error for WordError {}

/// Normalize a word to canonical uppercase form
///
/// # Errors
/// Returns `WordError` if the word is empty, longer than [`MAX_WORD_LEN`],
/// or contains anything other than ASCII letters.
///
/// # Examples
/// ```
/// use zyzzyva::core::canonical_word;
///
/// assert_eq!(canonical_word(" cat ").unwrap(), "CAT");
/// assert!(canonical_word("c4t").is_err());
/// ```
pub fn canonical_word(text: &str) -> Result<String, WordError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WordError::Empty);
    }

    if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_alphabetic()) {
        return Err(WordError::InvalidCharacter(bad));
    }

    if trimmed.len() > MAX_WORD_LEN {
        return Err(WordError::TooLong(trimmed.len()));
    }

    Ok(trimmed.to_ascii_uppercase())
}

/// Letters of a word sorted into canonical order
#[must_use]
pub fn alphagram(word: &str) -> String {
    let mut bytes: Vec<u8> = word.bytes().map(|b| b.to_ascii_uppercase()).collect();
    bytes.sort_unstable();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Vowels are A, E, I, O and U (Y is not a vowel)
#[inline]
#[must_use]
pub const fn is_vowel(letter: u8) -> bool {
    matches!(
        letter.to_ascii_uppercase(),
        b'A' | b'E' | b'I' | b'O' | b'U'
    )
}

#[must_use]
pub fn num_vowels(word: &str) -> usize {
    word.bytes().filter(|&b| is_vowel(b)).count()
}

#[must_use]
pub fn num_unique_letters(word: &str) -> usize {
    LetterCounts::from_word(word).distinct()
}

/// Multiset of the letters A-Z in a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LetterCounts([u8; 26]);

impl LetterCounts {
    /// Count the letters of a word, ignoring anything outside A-Z
    #[must_use]
    pub fn from_word(word: &str) -> Self {
        let mut counts = [0u8; 26];
        for b in word.bytes() {
            let upper = b.to_ascii_uppercase();
            if upper.is_ascii_uppercase() {
                counts[usize::from(upper - b'A')] += 1;
            }
        }
        Self(counts)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, letter: u8) -> u8 {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            self.0[usize::from(upper - b'A')]
        } else {
            0
        }
    }

    #[inline]
    pub fn add(&mut self, letter: u8) {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            self.0[usize::from(upper - b'A')] += 1;
        }
    }

    /// Remove one occurrence of a letter, returning false if none was present
    #[inline]
    pub fn take(&mut self, letter: u8) -> bool {
        let upper = letter.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return false;
        }
        let slot = &mut self.0[usize::from(upper - b'A')];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().map(|&c| usize::from(c)).sum()
    }

    #[must_use]
    pub fn distinct(&self) -> usize {
        self.0.iter().filter(|&&c| c > 0).count()
    }

    /// Iterate over `(letter, count)` pairs with a non-zero count, in A-Z order
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(i, &count)| (b'A' + i as u8, count))
    }

    /// True if every letter of `self` is available in `other` with enough copies
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_word_uppercases_and_trims() {
        assert_eq!(canonical_word("cat").unwrap(), "CAT");
        assert_eq!(canonical_word("  QuIz\n").unwrap(), "QUIZ");
    }

    #[test]
    fn canonical_word_rejects_bad_input() {
        assert_eq!(canonical_word(""), Err(WordError::Empty));
        assert_eq!(canonical_word("   "), Err(WordError::Empty));
        assert_eq!(canonical_word("ca t"), Err(WordError::InvalidCharacter(' ')));
        assert_eq!(canonical_word("caté"), Err(WordError::InvalidCharacter('é')));
        assert!(matches!(
            canonical_word("ABCDEFGHIJKLMNOP"),
            Err(WordError::TooLong(16))
        ));
    }

    #[test]
    fn alphagram_sorts_letters() {
        assert_eq!(alphagram("CAT"), "ACT");
        assert_eq!(alphagram("act"), "ACT");
        assert_eq!(alphagram("BANANA"), "AAABNN");
        assert_eq!(alphagram(""), "");
    }

    #[test]
    fn vowels_exclude_y() {
        assert_eq!(num_vowels("RHYTHM"), 0);
        assert_eq!(num_vowels("QUEUE"), 4);
        assert_eq!(num_vowels("aerie"), 4);
    }

    #[test]
    fn unique_letters() {
        assert_eq!(num_unique_letters("BANANA"), 3);
        assert_eq!(num_unique_letters("CAT"), 3);
        assert_eq!(num_unique_letters("AAAA"), 1);
    }

    #[test]
    fn letter_counts_subset() {
        let tacos = LetterCounts::from_word("TACOS");
        assert!(LetterCounts::from_word("CAT").is_subset_of(&tacos));
        assert!(LetterCounts::from_word("COATS").is_subset_of(&tacos));
        assert!(!LetterCounts::from_word("TACT").is_subset_of(&tacos));
    }

    #[test]
    fn letter_counts_take_and_add() {
        let mut counts = LetterCounts::from_word("AAB");
        assert_eq!(counts.get(b'a'), 2);
        assert!(counts.take(b'A'));
        assert!(counts.take(b'B'));
        assert!(!counts.take(b'B'));
        counts.add(b'z');
        assert_eq!(counts.total(), 2);
        assert_eq!(
            counts.iter().collect::<Vec<_>>(),
            vec![(b'A', 1), (b'Z', 1)]
        );
    }
}
