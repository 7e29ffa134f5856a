use crate::extract::tally::action_lines;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    // $NVDA, $BRK.B
    static ref CASHTAG: Regex = Regex::new(r"\$([A-Z]{1,5}(?:\.[A-Z]{1,2})?)\b").unwrap();
    // (OXY) or (RDS:NYSE) with the exchange code discarded
    static ref PAREN: Regex = Regex::new(r"\(([A-Z]{1,5})(?::[A-Z]+)?\)").unwrap();
    // standalone uppercase runs; the dot suffix is matched but discarded
    static ref BARE_UPPER: Regex = Regex::new(r"\b([A-Z]{2,5})(?:\.[A-Z]{1,2})?\b").unwrap();
    // /quote/NVDA, /symbol/BRK.B, /ticker/TSLA
    static ref URL_TICKER: Regex =
        Regex::new(r"/(quote|symbol|ticker)/([A-Z]{1,5}(?:\.[A-Z]{1,2})?)").unwrap();
}

/// Common finance acronyms that read like tickers in running text.
pub const DEFAULT_STOP_TOKENS: &[&str] = &[
    "AI", "CEO", "EPS", "ETF", "GDP", "USD", "IPO", "YOY", "EBIT", "EBITDA", "FCF", "FED", "SEC",
    "CPI", "PPI", "PE", "EV", "PS", "GAAP", "ADR", "OTC", "BTC", "ETH", "EUR", "NET", "FIG",
];

/// One extraction heuristic. Each matcher scans the full joined story
/// text independently and proposes (token, reason) pairs; admission
/// (shape/length checks) happens in the extractor, so new matchers can
/// be added to the table without touching the merge logic.
pub trait Matcher: Send + Sync {
    fn scan(&self, text: &str) -> Vec<(String, String)>;
}

pub struct Cashtags;

impl Matcher for Cashtags {
    fn scan(&self, text: &str) -> Vec<(String, String)> {
        CASHTAG
            .captures_iter(text)
            .map(|c| (c[1].to_string(), "cashtag".to_string()))
            .collect()
    }
}

pub struct Parentheticals;

impl Matcher for Parentheticals {
    fn scan(&self, text: &str) -> Vec<(String, String)> {
        PAREN
            .captures_iter(text)
            .map(|c| (c[1].to_string(), "paren".to_string()))
            .collect()
    }
}

pub struct UrlSegments;

impl Matcher for UrlSegments {
    fn scan(&self, text: &str) -> Vec<(String, String)> {
        URL_TICKER
            .captures_iter(text)
            .map(|c| (c[2].to_string(), "url".to_string()))
            .collect()
    }
}

/// Recommendation-list lines ("Keep/Cut/Sell: SYM, SYM") contribute a
/// `list:<Verb>` reason per symbol; the counts themselves live in the
/// tally module.
pub struct ActionLists;

impl Matcher for ActionLists {
    fn scan(&self, text: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (action, symbols) in action_lines(text) {
            for sym in symbols {
                out.push((sym, format!("list:{}", action.label())));
            }
        }
        out
    }
}

/// Standalone 2-5 letter uppercase runs. This is the noisiest rule, so
/// it alone consults the stop list of common finance acronyms.
pub struct BareUppercase {
    stop: HashSet<String>,
}

impl BareUppercase {
    pub fn new(stop: HashSet<String>) -> Self {
        Self { stop }
    }
}

impl Matcher for BareUppercase {
    fn scan(&self, text: &str) -> Vec<(String, String)> {
        BARE_UPPER
            .captures_iter(text)
            .filter(|c| !self.stop.contains(&c[1]))
            .map(|c| (c[1].to_string(), "allcaps".to_string()))
            .collect()
    }
}
