//! Terminal output formatting
//!
//! Display utilities for CLI results and pretty-printing.

pub mod display;
pub mod formatters;

pub use display::{
    print_build_result, print_compile_result, print_lookup_result, print_quiz_listing,
    print_search_result,
};
