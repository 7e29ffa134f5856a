use crate::domain::story::Story;
use crate::domain::symbol::{Candidate, Tally, VerifiedSymbol};
use crate::extract::Extractor;
use crate::verify::{VerificationClient, VerificationOutcome};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

const DEFAULT_FANOUT_LIMIT: usize = 16;

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverRequest {
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default = "default_verify")]
    pub verify: bool,
}

fn default_verify() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryResult {
    pub url: String,
    pub title: String,
    pub candidates: Vec<Candidate>,
    pub tallies: Vec<Tally>,
    pub allowed_tickers: Vec<String>,
}

/// A union candidate that did not confirm, with the reason split out:
/// `confirmed-absent` (the provider answered, no match) vs
/// `lookup-failed` (the lookup could not complete).
#[derive(Debug, Clone, Serialize)]
pub struct UnverifiedSymbol {
    pub symbol: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverResponse {
    pub per_story: Vec<StoryResult>,
    pub union_candidates: Vec<String>,
    pub verified: Vec<VerifiedSymbol>,
    pub unverified: Vec<UnverifiedSymbol>,
    pub allowed_tickers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub verified: Vec<VerifiedSymbol>,
    pub mapped: Vec<VerifiedSymbol>,
    pub allowed_tickers: Vec<String>,
}

/// Runs extraction per story, unions candidates across the batch and
/// drives concurrent verification. Extraction is synchronous and total;
/// only the verification fan-out awaits, and the request completes once
/// every in-flight lookup has returned.
pub struct DiscoveryService {
    extractor: Extractor,
    verifier: Arc<VerificationClient>,
    fanout_limit: usize,
}

impl DiscoveryService {
    pub fn new(verifier: Arc<VerificationClient>) -> Self {
        let fanout_limit = std::env::var("VERIFY_FANOUT_LIMIT")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_FANOUT_LIMIT);

        Self {
            extractor: Extractor::new(),
            verifier,
            fanout_limit,
        }
    }

    pub async fn discover(&self, req: DiscoverRequest) -> DiscoverResponse {
        let detections: Vec<_> = req
            .stories
            .iter()
            .map(|s| self.extractor.detect_story(s))
            .collect();

        let union: BTreeSet<String> = detections
            .iter()
            .flat_map(|d| d.candidates.iter().map(|c| c.symbol.clone()))
            .collect();

        let mut verified = Vec::new();
        let mut unverified = Vec::new();
        let allowed: BTreeSet<String> = if req.verify && !union.is_empty() {
            let outcomes = self
                .fan_out(union.iter().cloned(), |v, sym| async move {
                    v.verify_symbol(&sym).await
                })
                .await;

            let mut allowed = BTreeSet::new();
            for (sym, outcome) in outcomes {
                match outcome {
                    VerificationOutcome::Confirmed(v) => {
                        allowed.insert(v.symbol.to_ascii_uppercase());
                        verified.push(v);
                    }
                    other => unverified.push(UnverifiedSymbol {
                        symbol: sym,
                        status: other.status_label().to_string(),
                    }),
                }
            }
            allowed
        } else {
            union.clone()
        };

        let per_story = detections
            .into_iter()
            .map(|d| {
                let allowed_tickers = d
                    .candidates
                    .iter()
                    .map(|c| c.symbol.clone())
                    .filter(|s| allowed.contains(s))
                    .collect();
                StoryResult {
                    url: d.url,
                    title: d.title,
                    candidates: d.candidates,
                    tallies: d.tallies,
                    allowed_tickers,
                }
            })
            .collect();

        DiscoverResponse {
            per_story,
            union_candidates: union.into_iter().collect(),
            verified,
            unverified,
            allowed_tickers: allowed.into_iter().collect(),
        }
    }

    /// Direct resolution: explicit tickers through symbol verification,
    /// free-text names through name mapping, all concurrently.
    pub async fn resolve(&self, req: ResolveRequest) -> ResolveResponse {
        let tickers: BTreeSet<String> = req
            .tickers
            .iter()
            .map(|t| t.trim().to_ascii_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
        let names: BTreeSet<String> = req
            .names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let (ticker_outcomes, name_outcomes) = tokio::join!(
            self.fan_out(tickers.into_iter(), |v, sym| async move {
                v.verify_symbol(&sym).await
            }),
            self.fan_out(names.into_iter(), |v, name| async move {
                v.resolve_name(&name).await
            }),
        );

        let verified: Vec<VerifiedSymbol> = ticker_outcomes
            .into_iter()
            .filter_map(|(_, o)| o.into_confirmed())
            .collect();
        let mapped: Vec<VerifiedSymbol> = name_outcomes
            .into_iter()
            .filter_map(|(_, o)| o.into_confirmed())
            .collect();

        let allowed: BTreeSet<String> = verified
            .iter()
            .chain(mapped.iter())
            .map(|v| v.symbol.to_ascii_uppercase())
            .collect();

        ResolveResponse {
            verified,
            mapped,
            allowed_tickers: allowed.into_iter().collect(),
        }
    }

    /// Bounded fan-out: one independent lookup per input, at most
    /// `fanout_limit` in flight, joined before returning. Results come
    /// back unordered and are re-sorted by input for determinism.
    async fn fan_out<F, Fut>(
        &self,
        inputs: impl Iterator<Item = String>,
        lookup: F,
    ) -> Vec<(String, VerificationOutcome)>
    where
        F: Fn(Arc<VerificationClient>, String) -> Fut,
        Fut: std::future::Future<Output = VerificationOutcome>,
    {
        let lookup = &lookup;
        let mut results: Vec<(String, VerificationOutcome)> = stream::iter(inputs.map(|input| {
            let verifier = Arc::clone(&self.verifier);
            async move {
                let outcome = lookup(verifier, input.clone()).await;
                (input, outcome)
            }
        }))
        .buffer_unordered(self.fanout_limit)
        .collect()
        .await;

        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}
