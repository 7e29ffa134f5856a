pub mod matchers;
pub mod normalize;
pub mod tally;

use crate::domain::story::Story;
use crate::domain::symbol::{is_symbol_shaped, Candidate, Tally};
use matchers::{ActionLists, BareUppercase, Cashtags, Matcher, Parentheticals, UrlSegments};
use normalize::normalize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const MAX_SYMBOL_LEN: usize = 6;

/// Extraction output for a single story.
#[derive(Debug, Clone)]
pub struct StoryDetection {
    pub url: String,
    pub title: String,
    pub candidates: Vec<Candidate>,
    pub tallies: Vec<Tally>,
}

/// Ordered table of extraction heuristics sharing one symbol→reasons
/// map per story. Extraction is total: malformed tokens are dropped
/// silently and no input can make it fail.
pub struct Extractor {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_stop_list(
            matchers::DEFAULT_STOP_TOKENS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// Build the matcher table with a custom stop list for the bare
    /// uppercase rule.
    pub fn with_stop_list(stop: HashSet<String>) -> Self {
        Self {
            matchers: vec![
                Box::new(Cashtags),
                Box::new(Parentheticals),
                Box::new(UrlSegments),
                Box::new(ActionLists),
                Box::new(BareUppercase::new(stop)),
            ],
        }
    }

    pub fn detect_story(&self, story: &Story) -> StoryDetection {
        let joined = joined_story_text(story);

        let mut reasons = BTreeMap::<String, BTreeSet<String>>::new();
        for matcher in &self.matchers {
            for (token, reason) in matcher.scan(&joined) {
                if let Some(sym) = admit(&token) {
                    reasons.entry(sym).or_default().insert(reason);
                }
            }
        }

        let candidates = reasons
            .into_iter()
            .map(|(symbol, reasons)| Candidate {
                symbol,
                reasons: reasons.into_iter().collect(),
            })
            .collect();

        StoryDetection {
            url: story.url.clone(),
            title: story.title.clone(),
            candidates,
            tallies: tally::tally_actions(&joined),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Title, excerpt, combined text, then every comment body, each
/// normalized and joined with a spaced newline so the line-oriented
/// rules keep working.
fn joined_story_text(story: &Story) -> String {
    let mut blocks = vec![
        story.title.as_str(),
        story.excerpt.as_str(),
        story.combined_text.as_str(),
    ];
    blocks.extend(story.comments.iter().map(|c| c.body.as_str()));

    blocks
        .iter()
        .map(|b| normalize(b))
        .collect::<Vec<_>>()
        .join(" \n ")
}

/// Canonicalize a proposed token, or drop it. Rejections are silent.
fn admit(token: &str) -> Option<String> {
    let sym = token.trim().to_ascii_uppercase();
    if sym.len() > MAX_SYMBOL_LEN || !is_symbol_shaped(&sym) {
        return None;
    }
    Some(sym)
}
