//! Core domain types for lexicon work
//!
//! Word normalization, letter statistics and tile-bag combinatorics. Nothing
//! here knows about lexicons or searches; everything is pure and cheap to test.

mod letter_bag;
mod letters;

pub use letter_bag::{
    BLANK, BagError, DEFAULT_DISTRIBUTION, DEFAULT_LETTER_VALUES, LetterBag, ranks_tied,
    time_pid_seed,
};
pub use letters::{
    LetterCounts, MAX_WORD_LEN, WordError, alphagram, canonical_word, is_vowel, num_unique_letters,
    num_vowels,
};
