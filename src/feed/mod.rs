pub mod html;
pub mod injuries;
pub mod nflverse;
pub mod ownership;
pub mod retry;
pub mod stadiums;
pub mod types;
pub mod weather;

use anyhow::Result;
use async_trait::async_trait;
use types::{Game, InjuryReport, Ownership, Play, PlayerInfo, RosterEntry};
use weather::HourlyForecast;

/// User agent for the scraped pages.
pub(crate) const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Season-scoped statistics tables. Each call is a single attempt; the
/// pipeline owns the retry policy.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn load_plays(&self, season: u32) -> Result<Vec<Play>>;
    async fn load_schedule(&self, season: u32) -> Result<Vec<Game>>;
    async fn load_rosters(&self, season: u32) -> Result<Vec<RosterEntry>>;
    async fn load_players(&self) -> Result<Vec<PlayerInfo>>;
}

/// Scraped injury report. Best effort: failures log and yield an empty list.
#[async_trait]
pub trait InjuryFeed: Send + Sync {
    async fn fetch_injury_reports(&self) -> Vec<InjuryReport>;
}

/// Scraped roster-percentage table. Best effort, like [`InjuryFeed`].
#[async_trait]
pub trait OwnershipFeed: Send + Sync {
    async fn fetch_ownership(&self) -> Vec<Ownership>;
}

/// Hourly forecast at a coordinate. One attempt per call; see
/// [`weather::lookup`] for the retry and fallback policy.
#[async_trait]
pub trait WeatherFeed: Send + Sync {
    async fn hourly(&self, lat: f64, lon: f64) -> Result<HourlyForecast>;
}
