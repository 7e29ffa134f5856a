pub mod yahoo;

use crate::cache::TtlCache;
use crate::domain::symbol::VerifiedSymbol;
use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;

/// Quote types a free-text name may resolve to.
const MAPPABLE_QUOTE_TYPES: &[&str] = &["EQUITY", "ETF", "MUTUALFUND", "INDEX", "CRYPTO"];

/// One hit from the external symbol/name search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteHit {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub longname: Option<String>,
    #[serde(default, rename = "exchDisp")]
    pub exchange: Option<String>,
    #[serde(default, rename = "quoteType")]
    pub quote_type: Option<String>,
}

impl QuoteHit {
    fn into_verified(self) -> VerifiedSymbol {
        VerifiedSymbol {
            symbol: self.symbol,
            shortname: self.shortname,
            longname: self.longname,
            exchange: self.exchange,
            quote_type: self.quote_type,
        }
    }
}

/// The outbound search collaborator, substitutable in tests.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<QuoteHit>>;
}

/// Result of a single verification lookup. Confirmed absence and a
/// lookup that could not complete are kept apart instead of both
/// collapsing into silent omission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Confirmed(VerifiedSymbol),
    ConfirmedAbsent,
    LookupFailed,
}

impl VerificationOutcome {
    pub fn into_confirmed(self) -> Option<VerifiedSymbol> {
        match self {
            Self::Confirmed(v) => Some(v),
            _ => None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Confirmed(_) => "confirmed",
            Self::ConfirmedAbsent => "confirmed-absent",
            Self::LookupFailed => "lookup-failed",
        }
    }
}

/// Resolves symbols and company names against the search provider,
/// consulting the shared TTL cache first. Lookup failures are swallowed
/// here: callers only ever see an outcome, never an error.
pub struct VerificationClient {
    provider: Arc<dyn SearchProvider>,
    cache: Arc<TtlCache<VerifiedSymbol>>,
}

impl VerificationClient {
    pub fn new(provider: Arc<dyn SearchProvider>, cache: Arc<TtlCache<VerifiedSymbol>>) -> Self {
        Self { provider, cache }
    }

    /// Confirm that `symbol` names a real instrument: the first search
    /// hit whose symbol matches case-insensitively wins. Only confirmed
    /// payloads are cached, so absent and failed lookups are retried on
    /// the next call.
    pub async fn verify_symbol(&self, symbol: &str) -> VerificationOutcome {
        let sym = symbol.trim().to_ascii_uppercase();
        let key = format!("symbol:{sym}");
        if let Some(hit) = self.cache.get(&key).await {
            return VerificationOutcome::Confirmed(hit);
        }

        let quotes = match self.provider.search(&sym).await {
            Ok(quotes) => quotes,
            Err(err) => {
                tracing::warn!(
                    symbol = %sym,
                    provider = self.provider.provider_name(),
                    error = %err,
                    "symbol verification lookup failed"
                );
                return VerificationOutcome::LookupFailed;
            }
        };

        for q in quotes {
            if q.symbol.eq_ignore_ascii_case(&sym) {
                let verified = q.into_verified();
                self.cache.put(&key, verified.clone()).await;
                return VerificationOutcome::Confirmed(verified);
            }
        }
        VerificationOutcome::ConfirmedAbsent
    }

    /// Map a free-text company name to a symbol: the first hit with a
    /// mappable quote type wins.
    pub async fn resolve_name(&self, name: &str) -> VerificationOutcome {
        let name = name.trim();
        let key = format!("name:{name}");
        if let Some(hit) = self.cache.get(&key).await {
            return VerificationOutcome::Confirmed(hit);
        }

        let quotes = match self.provider.search(name).await {
            Ok(quotes) => quotes,
            Err(err) => {
                tracing::warn!(
                    name,
                    provider = self.provider.provider_name(),
                    error = %err,
                    "name resolution lookup failed"
                );
                return VerificationOutcome::LookupFailed;
            }
        };

        for q in quotes {
            let mappable = q
                .quote_type
                .as_deref()
                .is_some_and(|t| MAPPABLE_QUOTE_TYPES.contains(&t));
            if mappable {
                let verified = q.into_verified();
                self.cache.put(&key, verified.clone()).await;
                return VerificationOutcome::Confirmed(verified);
            }
        }
        VerificationOutcome::ConfirmedAbsent
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{equity_hit, FakeSearch};
    use super::*;
    use std::time::Duration;

    fn client_with(provider: Arc<FakeSearch>, ttl: Duration) -> VerificationClient {
        VerificationClient::new(provider, Arc::new(TtlCache::new(ttl)))
    }

    #[tokio::test]
    async fn verify_symbol_matches_case_insensitively() {
        let provider = Arc::new(FakeSearch::with_hits(vec![
            equity_hit("NVDA", "NVIDIA Corporation"),
        ]));
        let client = client_with(provider, Duration::from_secs(900));

        let out = client.verify_symbol("nvda").await;
        let v = out.into_confirmed().expect("confirmed");
        assert_eq!(v.symbol, "NVDA");
        assert_eq!(v.shortname.as_deref(), Some("NVIDIA Corporation"));
    }

    #[tokio::test]
    async fn repeated_verifications_within_ttl_hit_the_cache() {
        let provider = Arc::new(FakeSearch::with_hits(vec![equity_hit("NVDA", "NVIDIA")]));
        let client = client_with(provider.clone(), Duration::from_secs(900));

        client.verify_symbol("NVDA").await;
        client.verify_symbol("NVDA").await;
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn expired_cache_entry_triggers_a_fresh_lookup() {
        let provider = Arc::new(FakeSearch::with_hits(vec![equity_hit("NVDA", "NVIDIA")]));
        // Tiny TTL so the wait below is guaranteed to outlive it.
        let client = client_with(provider.clone(), Duration::from_millis(10));

        client.verify_symbol("NVDA").await;
        client.verify_symbol("NVDA").await;
        assert_eq!(provider.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        client.verify_symbol("NVDA").await;
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn no_match_is_confirmed_absent_and_not_cached() {
        let provider = Arc::new(FakeSearch::with_hits(vec![equity_hit("AMD", "AMD")]));
        let client = client_with(provider.clone(), Duration::from_secs(900));

        assert_eq!(
            client.verify_symbol("NVDA").await,
            VerificationOutcome::ConfirmedAbsent
        );
        assert_eq!(
            client.verify_symbol("NVDA").await,
            VerificationOutcome::ConfirmedAbsent
        );
        // No negative caching: both calls reached the provider.
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_lookup_failed() {
        let provider = Arc::new(FakeSearch::failing());
        let client = client_with(provider.clone(), Duration::from_secs(900));

        assert_eq!(
            client.verify_symbol("NVDA").await,
            VerificationOutcome::LookupFailed
        );
        // Failures are never cached, so the next call retries.
        assert_eq!(
            client.verify_symbol("NVDA").await,
            VerificationOutcome::LookupFailed
        );
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn resolve_name_picks_first_mappable_quote_type() {
        let mut option_hit = equity_hit("NVDA260C", "some option");
        option_hit.quote_type = Some("OPTION".to_string());
        let provider = Arc::new(FakeSearch::with_hits(vec![
            option_hit,
            equity_hit("NVDA", "NVIDIA Corporation"),
        ]));
        let client = client_with(provider, Duration::from_secs(900));

        let v = client
            .resolve_name("nvidia")
            .await
            .into_confirmed()
            .expect("confirmed");
        assert_eq!(v.symbol, "NVDA");
    }

    #[tokio::test]
    async fn resolve_name_without_mappable_hits_is_confirmed_absent() {
        let mut hit = equity_hit("X", "weird");
        hit.quote_type = Some("FUTURE".to_string());
        let provider = Arc::new(FakeSearch::with_hits(vec![hit]));
        let client = client_with(provider, Duration::from_secs(900));

        assert_eq!(
            client.resolve_name("weird co").await,
            VerificationOutcome::ConfirmedAbsent
        );
    }

    #[tokio::test]
    async fn symbol_and_name_keys_do_not_collide() {
        let provider = Arc::new(FakeSearch::with_hits(vec![equity_hit("NVDA", "NVIDIA")]));
        let client = client_with(provider.clone(), Duration::from_secs(900));

        client.verify_symbol("NVDA").await;
        client.resolve_name("NVDA").await;
        // Same query text, different cache namespaces: two lookups.
        assert_eq!(provider.call_count(), 2);
    }
}
