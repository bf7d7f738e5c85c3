//! Acceptability index
//!
//! The word graph answers exact membership in time proportional to the
//! word length and drives pattern, anagram and subanagram searches.

pub mod compiled;
mod pattern;
mod search;
mod word_graph;

pub use pattern::{AnagramPool, Pattern, Token};
pub use search::graph_matches;
pub use word_graph::{GraphNode, WordGraph};
