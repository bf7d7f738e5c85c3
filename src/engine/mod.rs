//! Lexicon management and the search pipeline

mod lexicon;
mod limits;
mod sets;
mod word_engine;

pub use lexicon::{Lexicon, lexicon_date};
pub use limits::{LimitKey, RankLimits};
pub use sets::is_set_member;
pub use word_engine::{SearchResults, WordEngine};
