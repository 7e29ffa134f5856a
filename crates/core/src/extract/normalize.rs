use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Decode HTML entities and collapse all whitespace runs to a single
/// space. Total: never fails, empty input yields empty output.
pub fn normalize(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    WHITESPACE_RUN
        .replace_all(decoded.as_ref(), " ")
        .trim()
        .to_string()
}
