//! Line-oriented data feeds
//!
//! Word lists, stem lists and playability tables share one format: one entry
//! per line, blank lines and lines starting with `#` skipped, overlong lines
//! truncated rather than rejected.

use std::fs;
use std::path::Path;

use crate::core::canonical_word;
use crate::error::LoadError;

/// Characters of a line considered before truncation
pub const MAX_INPUT_LINE_LEN: usize = 640;

/// A word list entry with its optional inline definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub definition: Option<String>,
}

/// Non-comment lines, truncated and whitespace-collapsed, with 1-based numbers
fn content_lines(text: &str) -> impl Iterator<Item = (usize, String)> + '_ {
    text.lines().enumerate().filter_map(|(i, line)| {
        let truncated: String = line.chars().take(MAX_INPUT_LINE_LEN).collect();
        let simplified = truncated.split_whitespace().collect::<Vec<_>>().join(" ");
        if simplified.is_empty() || simplified.starts_with('#') {
            None
        } else {
            Some((i + 1, simplified))
        }
    })
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|e| LoadError::from_io(path, e))
}

/// Parse a word list; any malformed word fails the whole list
///
/// # Errors
/// Returns `LoadError::Malformed` naming the first bad line.
///
/// # Examples
/// ```
/// use zyzzyva::wordlists::loader::parse_word_list;
///
/// let entries = parse_word_list("# OWL\ncat a small feline\nza\n").unwrap();
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].word, "CAT");
/// assert_eq!(entries[0].definition.as_deref(), Some("a small feline"));
/// assert_eq!(entries[1].definition, None);
/// ```
pub fn parse_word_list(text: &str) -> Result<Vec<WordEntry>, LoadError> {
    content_lines(text)
        .map(|(line, content)| {
            let (word, definition) = match content.split_once(' ') {
                Some((w, d)) => (w, Some(d.to_string())),
                None => (content.as_str(), None),
            };
            let word = canonical_word(word).map_err(|e| LoadError::Malformed {
                line,
                reason: e.to_string(),
            })?;
            Ok(WordEntry { word, definition })
        })
        .collect()
}

/// # Errors
/// Returns `LoadError` if the file cannot be read or a line is malformed.
pub fn load_word_list(path: &Path) -> Result<Vec<WordEntry>, LoadError> {
    let entries = parse_word_list(&read(path)?)?;
    log::info!("Read {} words from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse a stem list, keeping only stems as long as the first one
///
/// # Errors
/// Returns `LoadError::Malformed` for a stem that is not a word.
pub fn parse_stems(text: &str) -> Result<Vec<String>, LoadError> {
    let mut stems = Vec::new();
    let mut length = None;
    for (line, content) in content_lines(text) {
        let first = content.split(' ').next().unwrap_or_default();
        let stem = canonical_word(first).map_err(|e| LoadError::Malformed {
            line,
            reason: e.to_string(),
        })?;
        let expected = *length.get_or_insert(stem.len());
        if stem.len() == expected {
            stems.push(stem);
        }
    }
    Ok(stems)
}

/// # Errors
/// Returns `LoadError` if the file cannot be read or a stem is malformed.
pub fn load_stems(path: &Path) -> Result<Vec<String>, LoadError> {
    parse_stems(&read(path)?)
}

/// Parse `<playability> <WORD>` lines, skipping rows that do not parse
#[must_use]
pub fn parse_playability(text: &str) -> Vec<(String, i64)> {
    content_lines(text)
        .filter_map(|(line, content)| {
            let parsed = content.split_once(' ').and_then(|(value, word)| {
                let value = value.parse::<i64>().ok()?;
                let word = canonical_word(word.split(' ').next()?).ok()?;
                Some((word, value))
            });
            if parsed.is_none() {
                log::warn!("Skipping malformed playability line {line}: {content}");
            }
            parsed
        })
        .collect()
}

/// # Errors
/// Returns `LoadError` if the file cannot be read.
pub fn load_playability(path: &Path) -> Result<Vec<(String, i64)>, LoadError> {
    Ok(parse_playability(&read(path)?))
}
