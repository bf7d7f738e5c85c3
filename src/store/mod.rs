//! Metadata side store
//!
//! One SQLite row per acceptable word with everything the planner's
//! side-store phase filters on, built offline from the word graph and data
//! feeds.

mod builder;
pub mod definitions;
mod query;
mod record;
pub mod styles;
mod table;

pub use builder::{BuildHandle, StoreBuilder};
pub use definitions::Definitions;
pub use record::{ValueOrder, WordRecord};
pub use styles::{DEFAULT_LEXICON_STYLES, LexiconStyle};
pub use table::{SCHEMA_VERSION, SideStore, StoreMeta};
