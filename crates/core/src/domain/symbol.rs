use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Canonical ticker shape: 1-5 letters, optional ".X"/".XX" class suffix.
    static ref SYMBOL_SHAPE: Regex = Regex::new(r"^[A-Z]{1,5}(?:\.[A-Z]{1,2})?$").unwrap();
}

/// True when `s` is already a canonical uppercase ticker.
pub fn is_symbol_shaped(s: &str) -> bool {
    SYMBOL_SHAPE.is_match(s)
}

/// A symbol-shaped token pulled out of story text, tagged with every
/// heuristic that proposed it. Reasons only accumulate within a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub reasons: Vec<String>,
}

/// Per-symbol keep/cut/sell counts from recommendation-list lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub ticker: String,
    pub keep: u32,
    pub cut: u32,
    pub sell: u32,
}

impl Tally {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            keep: 0,
            cut: 0,
            sell: 0,
        }
    }
}

/// A symbol confirmed by the external search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedSymbol {
    pub symbol: String,
    pub shortname: Option<String>,
    pub longname: Option<String>,
    pub exchange: Option<String>,
    #[serde(rename = "type")]
    pub quote_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_suffixed_symbols() {
        assert!(is_symbol_shaped("A"));
        assert!(is_symbol_shaped("NVDA"));
        assert!(is_symbol_shaped("BRK.B"));
        assert!(is_symbol_shaped("RDS.A"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(!is_symbol_shaped(""));
        assert!(!is_symbol_shaped("nvda"));
        assert!(!is_symbol_shaped("TOOLONG"));
        assert!(!is_symbol_shaped("BRK.ABC"));
        assert!(!is_symbol_shaped("1234"));
        assert!(!is_symbol_shaped("AB-C"));
    }
}
