//! Lookup command
//!
//! Everything the engine knows about one word.

use crate::core::{WordError, alphagram, canonical_word};
use crate::engine::WordEngine;
use crate::store::ValueOrder;

pub struct LookupResult {
    pub lexicon: String,
    pub word: String,
    pub alphagram: String,
    pub acceptable: bool,
    pub front_hooks: String,
    pub back_hooks: String,
    pub is_front_hook: bool,
    pub is_back_hook: bool,
    pub symbols: String,
    pub definition: Option<String>,
    pub point_value: u32,
    pub num_anagrams: u32,
    pub blanks: i32,
    pub probability: Option<ValueOrder>,
    pub playability: i64,
    pub playability_order: Option<ValueOrder>,
}

/// Look up `word` in `lexicon`
///
/// # Errors
/// Returns `WordError` if `word` is not a valid word string.
pub fn lookup_word(engine: &WordEngine, lexicon: &str, word: &str) -> Result<LookupResult, WordError> {
    let word = canonical_word(word)?;
    let blanks = engine.config().quiz_probability_blanks;
    Ok(LookupResult {
        lexicon: lexicon.to_string(),
        alphagram: alphagram(&word),
        acceptable: engine.is_acceptable(lexicon, &word),
        front_hooks: engine.front_hook_letters(lexicon, &word),
        back_hooks: engine.back_hook_letters(lexicon, &word),
        is_front_hook: engine.is_front_hook(lexicon, &word),
        is_back_hook: engine.is_back_hook(lexicon, &word),
        symbols: engine.lexicon_symbols(lexicon, &word),
        definition: engine.definition(lexicon, &word),
        point_value: engine.point_value(lexicon, &word),
        num_anagrams: engine.num_anagrams(lexicon, &word),
        blanks,
        probability: engine.probability_order(lexicon, &word, blanks),
        playability: engine.playability(lexicon, &word),
        playability_order: engine.playability_order(lexicon, &word),
        word,
    })
}
