//! Word list, stem and playability input files

pub mod loader;

pub use loader::{MAX_INPUT_LINE_LEN, WordEntry};
