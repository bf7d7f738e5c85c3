//! Engine configuration
//!
//! Replaces a global settings store with an explicit value handed to the
//! engine at construction. Missing fields take their defaults, so partial
//! JSON files are fine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::{BagError, DEFAULT_DISTRIBUTION, DEFAULT_LETTER_VALUES, LetterBag, MAX_WORD_LEN};
use crate::store::styles::{DEFAULT_LEXICON_STYLES, LexiconStyle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tile distribution, e.g. `"A:9 B:2 ... _:2"`
    pub letter_distribution: String,
    /// Point value per tile
    pub letter_values: BTreeMap<char, u32>,
    /// Lexicon comparison rules, e.g. `"CSW and not OWL2+LWL: symbol #"`
    pub lexicon_styles: Vec<String>,
    pub max_word_length: usize,
    /// Recursion limit for definition cross-references
    pub definition_link_depth: usize,
    /// Rows between cancellation checks during a build
    pub cancel_check_interval: usize,
    /// Blanks assumed when a quiz orders questions by probability
    pub quiz_probability_blanks: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            letter_distribution: DEFAULT_DISTRIBUTION.to_string(),
            letter_values: DEFAULT_LETTER_VALUES
                .iter()
                .map(|&(letter, value)| (char::from(letter), value))
                .collect(),
            lexicon_styles: DEFAULT_LEXICON_STYLES
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_word_length: MAX_WORD_LEN,
            definition_link_depth: 3,
            cancel_check_interval: 1000,
            quiz_probability_blanks: 2,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file, falling back to defaults
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write configuration as pretty JSON
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Build a tile bag from the configured distribution and values
    ///
    /// # Errors
    /// Returns `BagError` if the distribution string is malformed.
    pub fn letter_bag(&self) -> Result<LetterBag, BagError> {
        let mut bag = LetterBag::new(&self.letter_distribution)?;
        for (&letter, &value) in &self.letter_values {
            if letter.is_ascii() {
                bag.set_letter_value(letter as u8, value);
            }
        }
        Ok(bag)
    }

    /// Parse the configured style rules, skipping malformed ones
    #[must_use]
    pub fn style_rules(&self) -> Vec<LexiconStyle> {
        self.lexicon_styles
            .iter()
            .filter_map(|text| match text.parse::<LexiconStyle>() {
                Ok(style) => Some(style),
                Err(e) => {
                    log::warn!("Ignoring lexicon style '{text}': {e}");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_standard_bag() {
        let config = EngineConfig::default();
        let bag = config.letter_bag().unwrap();
        assert_eq!(bag.num_letters(), 100);
        assert_eq!(bag.letter_value(b'Z'), 10);
        assert_eq!(config.definition_link_depth, 3);
        assert_eq!(config.style_rules().len(), 4);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = EngineConfig::load(Path::new("/nonexistent/zyzzyva.json"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"letter_distribution": "A:1 B:1"}"#).unwrap();
        assert_eq!(config.letter_distribution, "A:1 B:1");
        assert_eq!(config.max_word_length, MAX_WORD_LEN);
        assert_eq!(config.cancel_check_interval, 1000);
    }

    #[test]
    fn custom_letter_values_apply() {
        let mut config = EngineConfig::default();
        config.letter_values.insert('Q', 1);
        let bag = config.letter_bag().unwrap();
        assert_eq!(bag.letter_value(b'q'), 1);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = EngineConfig::default();
        config.definition_link_depth = 5;
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path), config);
    }

    #[test]
    fn malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(EngineConfig::load(&path), EngineConfig::default());
    }
}
