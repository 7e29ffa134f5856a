use crate::domain::symbol::{is_symbol_shaped, Tally};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    // "Keep: NVDA, AMZN" / "sell: TSLA; PLTR"
    static ref ACTION_LINE: Regex = Regex::new(r"(?i)^\s*(keep|cut|sell)\s*:\s*(.+)$").unwrap();
    static ref SYMBOL_DELIMS: Regex = Regex::new(r"[,\s;/]+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Keep,
    Cut,
    Sell,
}

impl Action {
    fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "keep" => Some(Self::Keep),
            "cut" => Some(Self::Cut),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }

    /// Capitalized label used in `list:<Label>` reason tags.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Keep => "Keep",
            Self::Cut => "Cut",
            Self::Sell => "Sell",
        }
    }
}

/// Scan line-oriented text for recommendation-list lines, yielding the
/// verb and the symbol-shaped tokens of each qualifying line. Shared by
/// the tally below and the `list:` candidate matcher.
pub(crate) fn action_lines(text: &str) -> Vec<(Action, Vec<String>)> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        let Some(caps) = ACTION_LINE.captures(line) else {
            continue;
        };
        let Some(action) = Action::parse(&caps[1]) else {
            continue;
        };
        let symbols = split_symbols(&caps[2]);
        if !symbols.is_empty() {
            out.push((action, symbols));
        }
    }
    out
}

fn split_symbols(s: &str) -> Vec<String> {
    SYMBOL_DELIMS
        .split(s.trim())
        .map(|p| p.trim().to_ascii_uppercase())
        .filter(|p| is_symbol_shaped(p))
        .collect()
}

/// Per-symbol keep/cut/sell counts across every qualifying line,
/// accumulated additively and sorted by ticker.
pub fn tally_actions(text: &str) -> Vec<Tally> {
    let mut tallies = BTreeMap::<String, Tally>::new();
    for (action, symbols) in action_lines(text) {
        for sym in symbols {
            let t = tallies
                .entry(sym.clone())
                .or_insert_with(|| Tally::new(sym.clone()));
            match action {
                Action::Keep => t.keep += 1,
                Action::Cut => t.cut += 1,
                Action::Sell => t.sell += 1,
            }
        }
    }
    tallies.into_values().collect()
}
