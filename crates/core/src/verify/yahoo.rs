use crate::config::Settings;
use crate::verify::{QuoteHit, SearchProvider};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const SEARCH_PATH: &str = "/v1/finance/search";
const USER_AGENT: &str = "tickerscout/1.0";

#[derive(Debug, Clone)]
pub struct YahooSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooSearchClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .search_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("SEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build search http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }
}

#[async_trait::async_trait]
impl SearchProvider for YahooSearchClient {
    fn provider_name(&self) -> &'static str {
        "yahoo_search"
    }

    async fn search(&self, query: &str) -> Result<Vec<QuoteHit>> {
        let res = self
            .http
            .get(self.url())
            // A few ranked quotes, no news items.
            .query(&[("q", query), ("quotesCount", "5"), ("newsCount", "0")])
            .send()
            .await
            .context("search request failed")?;

        let status = res.status();
        let text = res.text().await.context("failed to read search response")?;
        if !status.is_success() {
            anyhow::bail!("search HTTP {status}: {text}");
        }

        let body = serde_json::from_str::<SearchResponse>(&text)
            .context("failed to parse search response")?;
        Ok(body.quotes)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<QuoteHit>,
}
