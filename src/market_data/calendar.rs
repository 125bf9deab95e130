// =============================================================================
// Trading calendar client
// =============================================================================
//
// Fetches a plain-text, comma-separated list of `YYYY-MM-DD` trading days once
// and keeps the parsed list for the lifetime of the client.  Failed fetches
// are not cached, so the next call retries.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{debug, info, instrument};

use super::provider::TradingCalendar;
use crate::types::Market;

pub struct CalendarClient {
    url: String,
    market: Market,
    client: reqwest::Client,
    cache: RwLock<Option<Arc<Vec<NaiveDate>>>>,
}

impl CalendarClient {
    pub fn new(url: impl Into<String>, market: Market, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            url: url.into(),
            market,
            client,
            cache: RwLock::new(None),
        })
    }

    /// Cached list, if a previous fetch succeeded.
    pub fn cached(&self) -> Option<Arc<Vec<NaiveDate>>> {
        self.cache.read().clone()
    }

    #[instrument(skip(self), name = "calendar::fetch", fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<NaiveDate>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("GET trading calendar request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("trading calendar endpoint returned {}", status);
        }

        let body = resp
            .text()
            .await
            .context("failed to read trading calendar body")?;
        parse_calendar(&body)
    }
}

#[async_trait]
impl TradingCalendar for CalendarClient {
    fn market(&self) -> Market {
        self.market
    }

    async fn trading_days(&self) -> Result<Vec<NaiveDate>> {
        if let Some(days) = self.cached() {
            debug!(count = days.len(), "trading calendar served from cache");
            return Ok(days.as_ref().clone());
        }

        let days = Arc::new(self.fetch().await?);
        info!(market = %self.market, count = days.len(), "trading calendar loaded");
        *self.cache.write() = Some(Arc::clone(&days));
        Ok(days.as_ref().clone())
    }
}

/// Parse a comma / whitespace separated list of dates into an ascending,
/// duplicate-free vector.
pub(crate) fn parse_calendar(body: &str) -> Result<Vec<NaiveDate>> {
    let mut days = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid trading day '{s}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    days.sort_unstable();
    days.dedup();
    Ok(days)
}
