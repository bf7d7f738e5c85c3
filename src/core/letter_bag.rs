//! Tile distribution and draw combinatorics
//!
//! A `LetterBag` holds per-letter tile counts (including the blank `_`) and
//! per-letter point values. Binomial tables are precomputed once so that the
//! number of ways to draw a word from a full bag can be answered in time
//! proportional to the word length.
//!
//! Counts are kept as `f64`: the magnitudes overflow integers for long words
//! and callers only ever compare them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use super::letters::MAX_WORD_LEN;

/// Tile standing in for any letter
pub const BLANK: u8 = b'_';

/// Standard English tile distribution
pub const DEFAULT_DISTRIBUTION: &str = "A:9 B:2 C:2 D:4 E:12 F:2 G:3 H:2 I:9 J:1 K:1 L:4 M:2 \
     N:6 O:8 P:2 Q:1 R:6 S:4 T:6 U:4 V:2 W:2 X:1 Y:2 Z:1 _:2";

/// Standard English tile values
pub const DEFAULT_LETTER_VALUES: [(u8, u32); 27] = [
    (b'A', 1),
    (b'B', 3),
    (b'C', 3),
    (b'D', 2),
    (b'E', 1),
    (b'F', 4),
    (b'G', 2),
    (b'H', 4),
    (b'I', 1),
    (b'J', 8),
    (b'K', 5),
    (b'L', 1),
    (b'M', 3),
    (b'N', 1),
    (b'O', 1),
    (b'P', 3),
    (b'Q', 10),
    (b'R', 1),
    (b'S', 1),
    (b'T', 1),
    (b'U', 1),
    (b'V', 4),
    (b'W', 4),
    (b'X', 8),
    (b'Y', 4),
    (b'Z', 10),
    (BLANK, 0),
];

/// Error type for unparseable distribution strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BagError {
    MalformedEntry(String),
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEntry(entry) => {
                write!(f, "Malformed letter distribution entry '{entry}'")
            }
        }
    }
}

impl std::error::Error for BagError {}

/// A bag of tiles with precomputed draw combinatorics
#[derive(Debug, Clone)]
pub struct LetterBag {
    /// Frequencies at construction, used for combinatorics and `reset`
    initial: BTreeMap<u8, u32>,
    /// Current contents, mutated by draws
    frequencies: BTreeMap<u8, u32>,
    total: u32,
    values: FxHashMap<u8, u32>,
    /// `sub_choose[f][k]` = f choose k
    sub_choose: Vec<Vec<f64>>,
    /// `full_choose[k]` = (total tiles) choose k
    full_choose: Vec<f64>,
    rng: StdRng,
}

/// Whether two combination counts or playability values rank as a tie
///
/// Counts accumulate in floating point, so equal draws can differ by
/// rounding in the last place.
#[must_use]
pub fn ranks_tied(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON * a.abs().max(1.0)
}

impl Default for LetterBag {
    fn default() -> Self {
        Self::from_frequencies(parse_pairs(DEFAULT_DISTRIBUTION).unwrap_or_default())
    }
}

fn parse_pairs(distribution: &str) -> Result<Vec<(u8, u32)>, BagError> {
    distribution
        .split_whitespace()
        .map(|entry| {
            let (letter, count) = entry
                .split_once(':')
                .ok_or_else(|| BagError::MalformedEntry(entry.to_string()))?;
            let letter = match letter.as_bytes() {
                [b] if b.is_ascii_alphabetic() || *b == BLANK => b.to_ascii_uppercase(),
                _ => return Err(BagError::MalformedEntry(entry.to_string())),
            };
            let count = count
                .parse::<u32>()
                .map_err(|_| BagError::MalformedEntry(entry.to_string()))?;
            Ok((letter, count))
        })
        .collect()
}

/// Seed derived from wall-clock time and process id
#[must_use]
pub fn time_pid_seed() -> u64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    secs ^ (u64::from(std::process::id()) << 32)
}

impl LetterBag {
    /// Create a bag from a distribution string such as `"A:9 B:2 _:2"`
    ///
    /// An empty string yields the standard distribution.
    ///
    /// # Errors
    /// Returns `BagError` if an entry is not of the form `L:count`.
    ///
    /// # Examples
    /// ```
    /// use zyzzyva::core::LetterBag;
    ///
    /// let bag = LetterBag::new("A:1 B:1").unwrap();
    /// assert_eq!(bag.num_combinations("AB", 0), 1.0);
    /// ```
    pub fn new(distribution: &str) -> Result<Self, BagError> {
        if distribution.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self::from_frequencies(parse_pairs(distribution)?))
    }

    /// Create a bag from `(letter, count)` pairs
    #[must_use]
    pub fn from_frequencies(pairs: impl IntoIterator<Item = (u8, u32)>) -> Self {
        let mut frequencies = BTreeMap::new();
        for (letter, count) in pairs {
            *frequencies.entry(letter.to_ascii_uppercase()).or_insert(0) += count;
        }
        let total: u32 = frequencies.values().sum();
        let max_frequency = frequencies
            .values()
            .map(|&f| f as usize)
            .max()
            .unwrap_or(0)
            .max(MAX_WORD_LEN);

        // Pascal's triangle up to the largest tile count
        let mut sub_choose: Vec<Vec<f64>> = Vec::with_capacity(max_frequency + 1);
        for n in 0..=max_frequency {
            let row = (0..=max_frequency)
                .map(|k| {
                    if k == 0 || k == n {
                        1.0
                    } else if n == 0 {
                        0.0
                    } else {
                        sub_choose[n - 1][k - 1] + sub_choose[n - 1][k]
                    }
                })
                .collect();
            sub_choose.push(row);
        }

        let mut full_choose = Vec::with_capacity(max_frequency + 1);
        let mut acc = 1.0_f64;
        for k in 1..=max_frequency + 1 {
            full_choose.push(acc);
            acc *= (f64::from(total) + 1.0 - k as f64) / k as f64;
        }

        Self {
            initial: frequencies.clone(),
            frequencies,
            total,
            values: DEFAULT_LETTER_VALUES.iter().copied().collect(),
            sub_choose,
            full_choose,
            rng: StdRng::seed_from_u64(time_pid_seed()),
        }
    }

    /// Replace the random source with a deterministic one
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[inline]
    fn initial_frequency(&self, letter: u8) -> usize {
        self.initial.get(&letter).copied().unwrap_or(0) as usize
    }

    #[inline]
    fn choose(&self, n: usize, k: usize) -> f64 {
        self.sub_choose
            .get(n)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of distinct draws that form `word`, allowing up to
    /// `num_blanks` (clamped to 0..=2) blanks to stand in for letters
    ///
    /// Words sharing an alphagram always produce the same count.
    #[must_use]
    pub fn num_combinations(&self, word: &str, num_blanks: i32) -> f64 {
        let num_blanks = num_blanks.clamp(0, 2);

        let mut letters: Vec<u8> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        for b in word.bytes() {
            let c = b.to_ascii_uppercase();
            if let Some(pos) = letters.iter().position(|&l| l == c) {
                counts[pos] += 1;
            } else {
                letters.push(c);
                counts.push(1);
            }
        }
        let freqs: Vec<usize> = letters
            .iter()
            .map(|&l| self.initial_frequency(l))
            .collect();

        let product = |counts: &[usize]| -> f64 {
            freqs
                .iter()
                .zip(counts)
                .map(|(&f, &c)| self.choose(f, c))
                .product()
        };

        let mut total = product(&counts);
        if num_blanks == 0 {
            return total;
        }

        let blank_freq = self.initial_frequency(BLANK);
        for i in 0..letters.len() {
            counts[i] -= 1;
            total += self.choose(blank_freq, 1) * product(&counts);
            counts[i] += 1;
        }
        if num_blanks == 1 {
            return total;
        }

        for i in 0..letters.len() {
            counts[i] -= 1;
            for j in i..letters.len() {
                if counts[j] == 0 {
                    continue;
                }
                counts[j] -= 1;
                total += self.choose(blank_freq, 2) * product(&counts);
                counts[j] += 1;
            }
            counts[i] += 1;
        }

        total
    }

    /// Draw probability of a word scaled by 1e9
    #[must_use]
    pub fn probability(&self, word: &str, num_blanks: i32) -> f64 {
        match self.full_choose.get(word.len()) {
            Some(&full) if full > 0.0 => 1e9 * self.num_combinations(word, num_blanks) / full,
            _ => 0.0,
        }
    }

    /// Point value of a letter, case-insensitive
    #[must_use]
    pub fn letter_value(&self, letter: u8) -> u32 {
        self.values
            .get(&letter.to_ascii_uppercase())
            .copied()
            .unwrap_or(0)
    }

    pub fn set_letter_value(&mut self, letter: u8, value: u32) {
        self.values.insert(letter.to_ascii_uppercase(), value);
    }

    /// Sum of the letter values of a word
    #[must_use]
    pub fn word_value(&self, word: &str) -> u32 {
        word.bytes().map(|b| self.letter_value(b)).sum()
    }

    /// Tiles currently in the bag
    #[must_use]
    pub const fn num_letters(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn letter_count(&self, letter: u8) -> u32 {
        self.frequencies
            .get(&letter.to_ascii_uppercase())
            .copied()
            .unwrap_or(0)
    }

    /// All tiles currently in the bag, alphabetized
    #[must_use]
    pub fn letters(&self) -> String {
        self.frequencies
            .iter()
            .flat_map(|(&l, &f)| std::iter::repeat_n(char::from(l), f as usize))
            .collect()
    }

    /// Put one tile back in the bag
    pub fn insert_letter(&mut self, letter: u8) {
        *self
            .frequencies
            .entry(letter.to_ascii_uppercase())
            .or_insert(0) += 1;
        self.total += 1;
    }

    /// Remove one specific tile, returning false if none is left
    pub fn draw_letter(&mut self, letter: u8) -> bool {
        match self.frequencies.get_mut(&letter.to_ascii_uppercase()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                self.total -= 1;
                true
            }
            _ => false,
        }
    }

    /// Preview `num` random tiles without removing them
    ///
    /// Uses selection sampling over the tiles in letter order, so each tile
    /// is chosen with probability proportional to its remaining count.
    /// Returns `None` if the bag holds fewer than `num` tiles.
    pub fn look_random_letters(&mut self, num: usize) -> Option<String> {
        if (self.total as usize) < num {
            return None;
        }
        if num == 0 {
            return Some(String::new());
        }

        let mut letters = String::with_capacity(num);
        let mut choose = num;
        let mut choose_from = self.total as usize;
        for (&letter, &frequency) in &self.frequencies {
            for _ in 0..frequency {
                let r = self.rng.random_range(0..choose_from);
                choose_from -= 1;
                if r >= choose {
                    continue;
                }
                letters.push(char::from(letter));
                choose -= 1;
                if choose == 0 {
                    return Some(letters);
                }
            }
        }
        None
    }

    /// Draw `num` random tiles, removing them from the bag
    pub fn draw_random_letters(&mut self, num: usize) -> Option<String> {
        let letters = self.look_random_letters(num)?;
        for b in letters.bytes() {
            self.draw_letter(b);
        }
        Some(letters)
    }

    /// Restore the bag to its original contents
    pub fn reset(&mut self) {
        self.frequencies.clone_from(&self.initial);
        self.total = self.frequencies.values().sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_distribution() {
        let bag = LetterBag::new("A:9 B:2 _:2").unwrap();
        assert_eq!(bag.num_letters(), 13);
        assert_eq!(bag.letter_count(b'a'), 9);
        assert_eq!(bag.letter_count(BLANK), 2);
        assert_eq!(bag.letters(), "AAAAAAAAABB__");
    }

    #[test]
    fn rejects_malformed_distribution() {
        assert!(LetterBag::new("A9").is_err());
        assert!(LetterBag::new("A:x").is_err());
        assert!(LetterBag::new("AB:2").is_err());
    }

    #[test]
    fn empty_distribution_is_standard() {
        let bag = LetterBag::new("").unwrap();
        assert_eq!(bag.num_letters(), 100);
        assert_eq!(bag.letter_count(b'E'), 12);
    }

    /// With no blanks in the bag, allowing one adds no draws: "AB" still
    /// draws exactly once.
    #[test]
    fn two_distinct_tiles_draw_once() {
        let bag = LetterBag::new("A:1 B:1").unwrap();
        assert!((bag.num_combinations("AB", 0) - 1.0).abs() < f64::EPSILON);
        assert!((bag.num_combinations("AB", 1) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_blank_substitutes_for_either_letter() {
        let bag = LetterBag::new("A:1 B:1 _:1").unwrap();
        let plain = bag.num_combinations("AB", 0);
        let one_blank = bag.num_combinations("AB", 1);
        // A + blank-as-B, or B + blank-as-A
        assert!((one_blank - plain - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_bag_word_draws_exactly_once() {
        let bag = LetterBag::new("C:1 A:1 T:1").unwrap();
        assert!((bag.num_combinations("CAT", 0) - 1.0).abs() < f64::EPSILON);
        assert!((bag.probability("CAT", 0) - 1e9).abs() < 1e-3);
    }

    #[test]
    fn repeated_letters_use_binomials() {
        let bag = LetterBag::default();
        // E:12 choose 2 times T:6 choose 1
        assert!((bag.num_combinations("TEE", 0) - 66.0 * 6.0).abs() < 1e-9);
    }

    #[test]
    fn anagrams_share_combinations() {
        let bag = LetterBag::default();
        for blanks in 0..=2 {
            let a = bag.num_combinations("STARE", blanks);
            let b = bag.num_combinations("TEARS", blanks);
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn common_letters_are_more_probable() {
        let bag = LetterBag::default();
        assert!(bag.num_combinations("EAT", 0) >= bag.num_combinations("ZAX", 0));
    }

    #[test]
    fn blanks_are_clamped() {
        let bag = LetterBag::default();
        assert!(
            (bag.num_combinations("QUIZ", 5) - bag.num_combinations("QUIZ", 2)).abs() < 1e-9
        );
        assert!(
            (bag.num_combinations("QUIZ", -1) - bag.num_combinations("QUIZ", 0)).abs() < 1e-9
        );
    }

    #[test]
    fn more_blanks_never_reduce_combinations() {
        let bag = LetterBag::default();
        let zero = bag.num_combinations("JUKEBOX", 0);
        let one = bag.num_combinations("JUKEBOX", 1);
        let two = bag.num_combinations("JUKEBOX", 2);
        assert!(zero <= one && one <= two);
        assert!(zero < two);
    }

    #[test]
    fn letter_values_are_case_insensitive() {
        let mut bag = LetterBag::default();
        assert_eq!(bag.letter_value(b'q'), 10);
        assert_eq!(bag.letter_value(b'Q'), 10);
        assert_eq!(bag.word_value("QUIZ"), 22);
        bag.set_letter_value(b'q', 11);
        assert_eq!(bag.letter_value(b'Q'), 11);
    }

    #[test]
    fn look_does_not_mutate() {
        let mut bag = LetterBag::default().with_seed(7);
        let before = bag.letters();
        let rack = bag.look_random_letters(7).unwrap();
        assert_eq!(rack.len(), 7);
        assert_eq!(bag.letters(), before);
        assert_eq!(bag.num_letters(), 100);
    }

    #[test]
    fn draw_removes_tiles() {
        let mut bag = LetterBag::default().with_seed(11);
        let rack = bag.draw_random_letters(7).unwrap();
        assert_eq!(rack.len(), 7);
        assert_eq!(bag.num_letters(), 93);
        bag.reset();
        assert_eq!(bag.num_letters(), 100);
    }

    #[test]
    fn drawing_everything_empties_the_bag() {
        let mut bag = LetterBag::new("A:2 B:1").unwrap().with_seed(3);
        let all = bag.draw_random_letters(3).unwrap();
        assert_eq!(all, "AAB");
        assert_eq!(bag.num_letters(), 0);
        assert!(bag.look_random_letters(1).is_none());
    }
}
