//! League-wide injury report scraped from a per-team table page.

use super::html::{self, HtmlTable};
use super::types::InjuryReport;
use super::{InjuryFeed, BROWSER_UA};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

struct Columns {
    name: usize,
    status: Option<usize>,
    detail: Option<usize>,
    position: Option<usize>,
}

/// A header is claimed by the first role it matches: player, then status,
/// then injury. "Injury Status" is therefore the status column.
fn sniff_columns(table: &HtmlTable) -> Option<Columns> {
    let mut name = None;
    let (mut status, mut detail, mut position) = (None, None, None);
    for (i, header) in table.headers.iter().enumerate() {
        if header.contains("player") {
            name.get_or_insert(i);
        } else if header.contains("status") {
            status.get_or_insert(i);
        } else if header.contains("injury") {
            detail.get_or_insert(i);
        } else if header.starts_with("pos") {
            position.get_or_insert(i);
        }
    }
    Some(Columns { name: name?, status, detail, position })
}

/// Parse every team table on the page into reports. Tables without a player
/// column are ignored; a page with none yields an empty list.
pub fn parse_injury_page(page: &str) -> Result<Vec<InjuryReport>> {
    let mut reports = Vec::new();
    for table in html::tables(page)? {
        let Some(cols) = sniff_columns(&table) else {
            continue;
        };
        for row in 0..table.rows.len() {
            let Some(raw_name) = table.cell(row, cols.name) else {
                continue;
            };
            let name = html::strip_parenthetical(raw_name).to_string();
            if name.is_empty() {
                continue;
            }
            let pick = |col: Option<usize>| {
                col.and_then(|c| table.cell(row, c)).unwrap_or_default().to_string()
            };
            reports.push(InjuryReport {
                name,
                status: pick(cols.status),
                detail: pick(cols.detail),
                position: cols.position.and_then(|c| table.cell(row, c)).map(str::to_string),
            });
        }
    }
    Ok(reports)
}

pub struct ScrapedInjuryFeed {
    client: Client,
    url: String,
}

impl ScrapedInjuryFeed {
    pub fn new(url: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(BROWSER_UA)
            .build()
            .context("failed to build injury client")?;
        Ok(Self { client, url: url.to_string() })
    }

    async fn fetch(&self) -> Result<Vec<InjuryReport>> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("injury page request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("injury page HTTP {}", resp.status());
        }
        let body = resp.text().await.context("injury page read failed")?;
        parse_injury_page(&body)
    }
}

#[async_trait]
impl InjuryFeed for ScrapedInjuryFeed {
    async fn fetch_injury_reports(&self) -> Vec<InjuryReport> {
        match self.fetch().await {
            Ok(reports) => {
                tracing::info!(count = reports.len(), "injury reports scraped");
                reports
            }
            Err(e) => {
                tracing::warn!(error = %e, "injury scrape failed, assuming everyone healthy");
                Vec::new()
            }
        }
    }
}
