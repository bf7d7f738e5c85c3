//! Word set classifications
//!
//! Membership tests for the "Belongs to Group" condition. Hook sets only
//! need the lexicon's graph; the Type sets also use its stem alphagrams and
//! always score against the standard tile bag, whatever the configured one.

use std::sync::LazyLock;

use super::lexicon::Lexicon;
use crate::core::{LetterBag, alphagram};
use crate::search::SearchSet;

/// Letters a Type II word's alphagram must be drawn from
const TYPE_TWO_LETTERS: &[u8] = b"AAADEEEEGIIILNNOORRSSTTU";

/// Standard tiles, whatever bag the engine is configured with
pub(super) static STANDARD_BAG: LazyLock<LetterBag> = LazyLock::new(LetterBag::default);
static TYPE_THREE_SEVEN_COMBOS: LazyLock<f64> =
    LazyLock::new(|| STANDARD_BAG.num_combinations("HUNTERS", 2));
static TYPE_THREE_EIGHT_COMBOS: LazyLock<f64> =
    LazyLock::new(|| STANDARD_BAG.num_combinations("NOTIFIED", 2));

/// Whether `word` (assumed acceptable) belongs to `set` in `lexicon`
#[must_use]
pub fn is_set_member(lexicon: &Lexicon, word: &str, set: SearchSet) -> bool {
    let word = word.to_ascii_uppercase();
    let len = word.len();
    match set {
        SearchSet::HookWords => {
            len > 1 && (lexicon.contains(&word[..len - 1]) || lexicon.contains(&word[1..]))
        }
        SearchSet::FrontHooks => len > 1 && lexicon.contains(&word[1..]),
        SearchSet::BackHooks => len > 1 && lexicon.contains(&word[..len - 1]),
        SearchSet::HighFives => is_high_five(&word),
        SearchSet::TypeOneSevens => len == 7 && missing_one_from_stem(lexicon, &word, 6),
        SearchSet::TypeOneEights => len == 8 && is_type_one_eight(lexicon, &word),
        SearchSet::TypeTwoSevens => {
            len == 7
                && is_type_two_alphagram(&word)
                && !is_set_member(lexicon, &word, SearchSet::TypeOneSevens)
        }
        SearchSet::TypeTwoEights => {
            len == 8
                && is_type_two_alphagram(&word)
                && !is_set_member(lexicon, &word, SearchSet::TypeOneEights)
        }
        SearchSet::TypeThreeSevens => {
            len == 7
                && STANDARD_BAG.num_combinations(&word, 2) >= *TYPE_THREE_SEVEN_COMBOS
                && !is_set_member(lexicon, &word, SearchSet::TypeOneSevens)
                && !is_set_member(lexicon, &word, SearchSet::TypeTwoSevens)
        }
        SearchSet::TypeThreeEights => {
            len == 8
                && STANDARD_BAG.num_combinations(&word, 2) >= *TYPE_THREE_EIGHT_COMBOS
                && !is_set_member(lexicon, &word, SearchSet::TypeOneEights)
                && !is_set_member(lexicon, &word, SearchSet::TypeTwoEights)
        }
        SearchSet::EightsFromSevenLetterStems => {
            len == 8 && missing_one_from_stem(lexicon, &word, 7)
        }
    }
}

/// Five letters, no tile above 5 points, a 4 or 5 on either end
fn is_high_five(word: &str) -> bool {
    let bytes = word.as_bytes();
    if bytes.len() != 5 {
        return false;
    }
    let mut anchored = false;
    for (i, &letter) in bytes.iter().enumerate() {
        let value = STANDARD_BAG.letter_value(letter);
        if value > 5 {
            return false;
        }
        if (value == 4 || value == 5) && (i == 0 || i == 4) {
            anchored = true;
        }
    }
    anchored
}

/// Dropping one letter of the alphagram yields a stem alphagram of `stem_len`
fn missing_one_from_stem(lexicon: &Lexicon, word: &str, stem_len: usize) -> bool {
    let Some(stems) = lexicon.stem_alphagrams(stem_len) else {
        return false;
    };
    let agram = alphagram(word);
    (0..agram.len()).any(|i| {
        let mut reduced = String::with_capacity(agram.len() - 1);
        reduced.push_str(&agram[..i]);
        reduced.push_str(&agram[i + 1..]);
        stems.contains(&reduced)
    })
}

/// At most two letters of the alphagram fall outside some six-letter stem
fn is_type_one_eight(lexicon: &Lexicon, word: &str) -> bool {
    let Some(stems) = lexicon.stem_alphagrams(6) else {
        return false;
    };
    let agram = alphagram(word);
    let agram = agram.as_bytes();
    stems.iter().any(|stem| {
        let stem = stem.as_bytes();
        let mut missing = 0;
        let mut matched = 0;
        for &letter in agram {
            if matched == stem.len() {
                break;
            }
            if letter == stem[matched] {
                matched += 1;
            } else {
                missing += 1;
                if missing > 2 {
                    break;
                }
            }
        }
        missing <= 2
    })
}

fn is_type_two_alphagram(word: &str) -> bool {
    let agram = alphagram(word);
    let mut wanted = agram.bytes().peekable();
    for &letter in TYPE_TWO_LETTERS {
        if wanted.peek() == Some(&letter) {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}
