//! Search specifications
//!
//! Conditions, their execution phases and the specification document that
//! groups them.

mod condition;
mod phase;
mod spec;

pub use condition::{Condition, Range, RawCondition, SearchCondition, SearchSet};
pub use phase::Phase;
pub use spec::{CURRENT_SPEC_VERSION, MAX_ANAGRAMS, SearchSpec};
