//! Error types
//!
//! Query-time absence (unknown lexicon, unacceptable word, empty result) is
//! never an error; these types cover loading, building and parsing only.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to bring a lexicon into memory
///
/// A failed load leaves no partial lexicon behind.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Corrupt word graph: {0}")]
    InvalidGraph(String),

    #[error("Checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Incompatible format version {found} (expected {expected})")]
    IncompatibleVersion { found: u32, expected: u32 },

    #[error("Decoding error: {0}")]
    Decode(#[from] bincode::Error),

    #[error("Lexicon {0} is not loaded")]
    UnknownLexicon(String),

    #[error("Side store error: {0}")]
    Store(#[from] StoreError),
}

impl LoadError {
    /// Classify an I/O error against the path that produced it
    #[must_use]
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound(path.to_path_buf())
        } else {
            Self::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Failure of the offline side-store build
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Database could not be created at {}: {reason}", .path.display())]
    DatabaseOpen { path: PathBuf, reason: String },

    #[error("Build cancelled")]
    Cancelled,

    #[error("Input error: {0}")]
    Input(#[from] LoadError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Build worker panicked")]
    WorkerPanicked,
}

/// Failure to read or write a persisted side store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Could not replace store file: {0}")]
    Persist(#[from] tempfile::PathPersistError),

    #[error("Incompatible store schema version {found} (expected {expected})")]
    IncompatibleVersion { found: u32, expected: u32 },
}

/// Malformed search or quiz specification
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Unknown search condition type: {0}")]
    UnknownConditionType(String),

    #[error("Unknown search set: {0}")]
    UnknownSearchSet(String),

    #[error("Condition '{condition}' is missing field '{field}'")]
    MissingField {
        condition: String,
        field: &'static str,
    },

    #[error("Condition '{0}' has an empty string value")]
    EmptyValue(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Unknown quiz type: {0}")]
    UnknownQuizType(String),

    #[error("Cannot read specification {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for specification parsing
pub type SpecResult<T> = std::result::Result<T, SpecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_classified() {
        let err = LoadError::from_io(
            Path::new("/no/such/words.txt"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, LoadError::FileNotFound(_)));
        assert_eq!(err.to_string(), "File not found: /no/such/words.txt");
    }

    #[test]
    fn unreadable_file_is_classified() {
        let err = LoadError::from_io(
            Path::new("words.txt"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, LoadError::Unreadable { .. }));
        assert!(err.to_string().starts_with("Cannot read words.txt"));
    }

    #[test]
    fn build_errors_have_distinct_messages() {
        let open = BuildError::DatabaseOpen {
            path: PathBuf::from("lex.db"),
            reason: "read-only".into(),
        };
        assert_eq!(
            open.to_string(),
            "Database could not be created at lex.db: read-only"
        );
        assert_eq!(BuildError::Cancelled.to_string(), "Build cancelled");
    }
}
