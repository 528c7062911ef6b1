//! Kicker roster percentages scraped from a season stats table.

use super::html;
use super::types::Ownership;
use super::{OwnershipFeed, BROWSER_UA};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// "78.5%" → 78.5. Anything unparseable counts as unowned.
fn parse_pct(raw: &str) -> f64 {
    raw.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Rows from the first table that has both a player and a rostered/owned
/// column.
pub fn parse_ownership_page(page: &str) -> Result<Vec<Ownership>> {
    for table in html::tables(page)? {
        let (Some(player), Some(rost)) = (table.column(&["player"]), table.column(&["rost", "own"]))
        else {
            continue;
        };
        let rows = (0..table.rows.len())
            .filter_map(|row| {
                let name = html::strip_parenthetical(table.cell(row, player)?).to_string();
                let pct = table.cell(row, rost).map(parse_pct).unwrap_or(0.0);
                (!name.is_empty()).then_some(Ownership { name, pct })
            })
            .collect();
        return Ok(rows);
    }
    Ok(Vec::new())
}

pub struct ScrapedOwnershipFeed {
    client: Client,
    url: String,
}

impl ScrapedOwnershipFeed {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(BROWSER_UA)
            .build()
            .context("failed to build ownership client")?;
        Ok(Self { client, url: url.to_string() })
    }

    async fn fetch(&self) -> Result<Vec<Ownership>> {
        let resp = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await
            .context("ownership page request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("ownership page HTTP {}", resp.status());
        }
        let body = resp.text().await.context("ownership page read failed")?;
        parse_ownership_page(&body)
    }
}

#[async_trait]
impl OwnershipFeed for ScrapedOwnershipFeed {
    async fn fetch_ownership(&self) -> Vec<Ownership> {
        match self.fetch().await {
            Ok(rows) => {
                tracing::info!(count = rows.len(), "ownership scraped");
                rows
            }
            Err(e) => {
                tracing::warn!(error = %e, "ownership scrape failed, defaulting to 0%");
                Vec::new()
            }
        }
    }
}
