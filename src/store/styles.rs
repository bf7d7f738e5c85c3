//! Lexicon comparison styles
//!
//! A style rule marks words of one lexicon that are (or are not) also valid
//! in another, e.g. `"CSW and not OWL2+LWL: symbol #"` flags every CSW word
//! missing from OWL2+LWL with `#`.

use std::fmt;
use std::str::FromStr;

/// Rules applied when no configuration overrides them
pub const DEFAULT_LEXICON_STYLES: &[&str] = &[
    "OWL2+LWL and not OWL+LWL: symbol %",
    "OWL2+LWL and not OSPD4+LWL: symbol !",
    "CSW and not OWL2+LWL: symbol #",
    "CSW and not OSWI: symbol ^",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconStyle {
    pub lexicon: String,
    pub compare_lexicon: String,
    /// True for "and", false for "and not"
    pub inclusive: bool,
    pub symbol: String,
}

impl LexiconStyle {
    /// Whether a word of `self.lexicon` gets the symbol, given its
    /// acceptability in the comparison lexicon
    #[inline]
    #[must_use]
    pub const fn applies(&self, in_compare_lexicon: bool) -> bool {
        in_compare_lexicon == self.inclusive
    }
}

/// Reason a style string did not parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleParseError(String);

impl fmt::Display for StyleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected '<lexicon> and [not ]<lexicon>: symbol <symbol>', got '{}'", self.0)
    }
}

impl std::error::Error for StyleParseError {}

impl FromStr for LexiconStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || StyleParseError(s.to_string());
        let (lexicons, symbol) = s.split_once(':').ok_or_else(err)?;
        let symbol = symbol
            .trim()
            .strip_prefix("symbol")
            .map(str::trim)
            .filter(|sym| !sym.is_empty())
            .ok_or_else(err)?;

        let mut words = lexicons.split_whitespace();
        let lexicon = words.next().ok_or_else(err)?;
        if words.next() != Some("and") {
            return Err(err());
        }
        let (inclusive, compare) = match (words.next(), words.next()) {
            (Some("not"), Some(compare)) => (false, compare),
            (Some(compare), None) => (true, compare),
            _ => return Err(err()),
        };
        if words.next().is_some() {
            return Err(err());
        }

        Ok(Self {
            lexicon: lexicon.to_string(),
            compare_lexicon: compare.to_string(),
            inclusive,
            symbol: symbol.to_string(),
        })
    }
}

impl fmt::Display for LexiconStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let not = if self.inclusive { "" } else { "not " };
        write!(
            f,
            "{} and {not}{}: symbol {}",
            self.lexicon, self.compare_lexicon, self.symbol
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exclusive_rule() {
        let style: LexiconStyle = "CSW and not OWL2+LWL: symbol #".parse().unwrap();
        assert_eq!(style.lexicon, "CSW");
        assert_eq!(style.compare_lexicon, "OWL2+LWL");
        assert!(!style.inclusive);
        assert_eq!(style.symbol, "#");
        assert!(style.applies(false));
        assert!(!style.applies(true));
    }

    #[test]
    fn parses_inclusive_rule() {
        let style: LexiconStyle = "OWL2+LWL and CSW: symbol +".parse().unwrap();
        assert!(style.inclusive);
        assert!(style.applies(true));
        assert_eq!(style.to_string(), "OWL2+LWL and CSW: symbol +");
    }

    #[test]
    fn defaults_all_parse() {
        for text in DEFAULT_LEXICON_STYLES {
            let style: LexiconStyle = text.parse().unwrap();
            assert_eq!(&style.to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_rules() {
        for bad in [
            "",
            "CSW: symbol #",
            "CSW or OWL2: symbol #",
            "CSW and not OWL2",
            "CSW and not OWL2: symbol",
            "CSW and not OWL2 extra: symbol #",
        ] {
            assert!(bad.parse::<LexiconStyle>().is_err(), "{bad:?} parsed");
        }
    }
}
