//! nflverse release tables over HTTP.
//!
//! Tables are published as CSV, play-by-play gzip-compressed. Rows that fail
//! to deserialize are skipped and counted rather than failing the whole
//! table; an HTTP or decode failure fails the call so the retry helper sees it.

use super::types::{Game, Play, PlayerInfo, RosterEntry};
use super::StatsProvider;
use crate::config::ProviderConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use flate2::read::MultiGzDecoder;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::time::Duration;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decode a CSV table, transparently gunzipping when the payload starts with
/// the gzip magic bytes.
pub fn parse_csv_rows<T: DeserializeOwned>(bytes: &[u8], table: &str) -> Result<Vec<T>> {
    let text: Vec<u8> = if bytes.starts_with(&GZIP_MAGIC) {
        let mut out = Vec::new();
        MultiGzDecoder::new(bytes)
            .read_to_end(&mut out)
            .with_context(|| format!("{} gunzip failed", table))?;
        out
    } else {
        bytes.to_vec()
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_slice());
    reader
        .headers()
        .with_context(|| format!("{} has no header row", table))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<T>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                if skipped == 1 {
                    tracing::warn!(table, error = %e, "skipping malformed row");
                }
            }
        }
    }
    if skipped > 0 {
        tracing::warn!(table, skipped, kept = rows.len(), "malformed rows skipped");
    }
    Ok(rows)
}

pub struct NflverseProvider {
    client: Client,
    config: ProviderConfig,
}

impl NflverseProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_s))
            .build()
            .context("failed to build provider client")?;
        Ok(Self { client, config: config.clone() })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        if !resp.status().is_success() {
            anyhow::bail!("GET {} returned HTTP {}", url, resp.status());
        }
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("reading {} failed", url))?;
        Ok(bytes.to_vec())
    }

    async fn table<T: DeserializeOwned + Send>(&self, template: &str, season: u32, table: &str) -> Result<Vec<T>> {
        let url = ProviderConfig::url_for(template, season);
        let bytes = self.get_bytes(&url).await?;
        tracing::debug!(table, bytes = bytes.len(), "downloaded");
        parse_csv_rows(&bytes, table)
    }
}

#[async_trait]
impl StatsProvider for NflverseProvider {
    async fn load_plays(&self, season: u32) -> Result<Vec<Play>> {
        self.table(&self.config.pbp_url, season, "play_by_play").await
    }

    async fn load_schedule(&self, season: u32) -> Result<Vec<Game>> {
        let games: Vec<Game> = self.table(&self.config.schedule_url, season, "schedule").await?;
        Ok(games.into_iter().filter(|g| g.season == season).collect())
    }

    async fn load_rosters(&self, season: u32) -> Result<Vec<RosterEntry>> {
        self.table(&self.config.roster_url, season, "rosters").await
    }

    async fn load_players(&self) -> Result<Vec<PlayerInfo>> {
        self.table(&self.config.players_url, 0, "players").await
    }
}
