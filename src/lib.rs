//! Zyzzyva lexicon engine
//!
//! Word-game lexicon search, scoring and quizzing: acceptability lookups
//! over a compact word graph, a per-word metadata side store, a search
//! planner that splits specifications across the two, and a quiz engine
//! built on top.
//!
//! # Quick Start
//!
//! ```rust
//! use zyzzyva::engine::WordEngine;
//! use zyzzyva::search::{SearchCondition, SearchSpec};
//! use zyzzyva::wordlists::loader::parse_word_list;
//!
//! let mut engine = WordEngine::default();
//! let entries = parse_word_list("CAT\nACT\nCATS\n").unwrap();
//! engine.import_word_list("DEMO", &entries, false);
//!
//! let spec = SearchSpec::all_of(vec![SearchCondition::anagram("TAC").unwrap()]);
//! let results = engine.search("DEMO", &spec, true);
//! assert_eq!(results.len(), 2);
//! ```

// Core domain types
pub mod core;

// Engine configuration
pub mod config;

// Error types
pub mod error;

// Word graph and compiled graph files
pub mod graph;

// Search conditions and specifications
pub mod search;

// Metadata side store
pub mod store;

// Word list files
pub mod wordlists;

// Lexicons and the search pipeline
pub mod engine;

// Quizzes
pub mod quiz;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;
