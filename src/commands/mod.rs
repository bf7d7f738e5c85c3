//! Command implementations

pub mod build;
pub mod compile;
pub mod lookup;
pub mod quiz;
pub mod search;

pub use build::{BuildConfig, BuildResult, build_store};
pub use compile::{CompileResult, compile_graph};
pub use lookup::{LookupResult, lookup_word};
pub use quiz::{QuizListing, QuizQuestion, list_quiz, read_quiz_spec};
pub use search::{SearchRequest, SearchResult, WordLine, run_search};
