use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub season: SeasonConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeasonConfig {
    #[serde(default = "default_year")]
    pub year: u32,
    /// Thursday kickoff of week 1.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    /// Pin the target week (debugging / backfills).
    #[serde(default)]
    pub force_week: Option<u32>,
    #[serde(default = "default_window_weeks")]
    pub window_weeks: u32,
    #[serde(default = "default_form_weeks")]
    pub form_weeks: u32,
}

fn default_year() -> u32 { 2025 }
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 4).unwrap_or_default()
}
fn default_window_weeks() -> u32 { 4 }
fn default_form_weeks() -> u32 { 3 }

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            start_date: default_start_date(),
            force_week: None,
            window_weeks: default_window_weeks(),
            form_weeks: default_form_weeks(),
        }
    }
}

/// Which way the schedule's spread column points.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpreadConvention {
    /// Betting-line form: the home team's line, negative when home is favored.
    HomeLine,
    /// Expected home margin: positive when home is favored (nflverse).
    #[default]
    HomeMargin,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// URL templates; `{season}` is substituted.
    #[serde(default = "default_pbp_url")]
    pub pbp_url: String,
    #[serde(default = "default_schedule_url")]
    pub schedule_url: String,
    #[serde(default = "default_roster_url")]
    pub roster_url: String,
    #[serde(default = "default_players_url")]
    pub players_url: String,
    #[serde(default = "default_provider_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_provider_delay")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_provider_timeout")]
    pub request_timeout_s: u64,
    #[serde(default)]
    pub spread_convention: SpreadConvention,
}

fn default_pbp_url() -> String {
    "https://github.com/nflverse/nflverse-data/releases/download/pbp/play_by_play_{season}.csv.gz".to_string()
}
fn default_schedule_url() -> String {
    "https://github.com/nflverse/nflverse-data/releases/download/schedules/games.csv".to_string()
}
fn default_roster_url() -> String {
    "https://github.com/nflverse/nflverse-data/releases/download/rosters/roster_{season}.csv".to_string()
}
fn default_players_url() -> String {
    "https://github.com/nflverse/nflverse-data/releases/download/players/players.csv".to_string()
}
fn default_provider_attempts() -> u32 { 5 }
fn default_provider_delay() -> u64 { 5000 }
fn default_provider_timeout() -> u64 { 120 }

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            pbp_url: default_pbp_url(),
            schedule_url: default_schedule_url(),
            roster_url: default_roster_url(),
            players_url: default_players_url(),
            max_attempts: default_provider_attempts(),
            retry_delay_ms: default_provider_delay(),
            request_timeout_s: default_provider_timeout(),
            spread_convention: SpreadConvention::default(),
        }
    }
}

impl ProviderConfig {
    pub fn url_for(template: &str, season: u32) -> String {
        template.replace("{season}", &season.to_string())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeConfig {
    #[serde(default = "default_injuries_url")]
    pub injuries_url: String,
    #[serde(default = "default_injuries_timeout")]
    pub injuries_timeout_ms: u64,
    #[serde(default = "default_ownership_url")]
    pub ownership_url: String,
    #[serde(default = "default_ownership_timeout")]
    pub ownership_timeout_ms: u64,
}

fn default_injuries_url() -> String { "https://www.cbssports.com/nfl/injuries/".to_string() }
fn default_injuries_timeout() -> u64 { 10_000 }
fn default_ownership_url() -> String { "https://www.fantasypros.com/nfl/stats/k.php".to_string() }
fn default_ownership_timeout() -> u64 { 15_000 }

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            injuries_url: default_injuries_url(),
            injuries_timeout_ms: default_injuries_timeout(),
            ownership_url: default_ownership_url(),
            ownership_timeout_ms: default_ownership_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base")]
    pub api_base: String,
    #[serde(default = "default_weather_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_weather_backoff")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_weather_timeout")]
    pub timeout_ms: u64,
    /// A game this long past kickoff is treated as finished.
    #[serde(default = "default_game_duration")]
    pub game_duration_hours: i64,
}

fn default_weather_base() -> String { "https://api.open-meteo.com/v1/forecast".to_string() }
fn default_weather_attempts() -> u32 { 4 }
fn default_weather_backoff() -> u64 { 1000 }
fn default_weather_timeout() -> u64 { 5000 }
fn default_game_duration() -> i64 { 4 }

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base: default_weather_base(),
            max_attempts: default_weather_attempts(),
            backoff_base_ms: default_weather_backoff(),
            timeout_ms: default_weather_timeout(),
            game_duration_hours: default_game_duration(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
    #[serde(default = "default_placeholder_headshot")]
    pub placeholder_headshot: String,
}

fn default_output_path() -> String { "public/kicker_data.json".to_string() }
fn default_history_path() -> String { "public/history_data.json".to_string() }
fn default_placeholder_headshot() -> String {
    "https://static.www.nfl.com/image/private/f_auto,q_auto/league/nfl-placeholder.png".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            history_path: default_history_path(),
            placeholder_headshot: default_placeholder_headshot(),
        }
    }
}

/// Fantasy points per kick event. Makes are keyed by distance bucket; misses
/// may be bucketed too for leagues that penalize short misses harder.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    #[serde(default = "three")]
    pub fg_0_19: f64,
    #[serde(default = "three")]
    pub fg_20_29: f64,
    #[serde(default = "three")]
    pub fg_30_39: f64,
    #[serde(default = "four")]
    pub fg_40_49: f64,
    #[serde(default = "five")]
    pub fg_50_59: f64,
    #[serde(default = "five")]
    pub fg_60_plus: f64,
    #[serde(default = "minus_one")]
    pub fg_miss_0_19: f64,
    #[serde(default = "minus_one")]
    pub fg_miss_20_29: f64,
    #[serde(default = "minus_one")]
    pub fg_miss_30_39: f64,
    #[serde(default = "minus_one")]
    pub fg_miss_40_49: f64,
    #[serde(default = "minus_one")]
    pub fg_miss_50_59: f64,
    #[serde(default = "minus_one")]
    pub fg_miss_60_plus: f64,
    #[serde(default = "one")]
    pub xp_made: f64,
    #[serde(default = "minus_one")]
    pub xp_miss: f64,
}

fn one() -> f64 { 1.0 }
fn three() -> f64 { 3.0 }
fn four() -> f64 { 4.0 }
fn five() -> f64 { 5.0 }
fn minus_one() -> f64 { -1.0 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fg_0_19: 3.0,
            fg_20_29: 3.0,
            fg_30_39: 3.0,
            fg_40_49: 4.0,
            fg_50_59: 5.0,
            fg_60_plus: 5.0,
            fg_miss_0_19: -1.0,
            fg_miss_20_29: -1.0,
            fg_miss_30_39: -1.0,
            fg_miss_40_49: -1.0,
            fg_miss_50_59: -1.0,
            fg_miss_60_plus: -1.0,
            xp_made: 1.0,
            xp_miss: -1.0,
        }
    }
}

impl ScoringConfig {
    /// Make values in bucket order (0-19 .. 60+).
    pub fn makes(&self) -> [f64; 6] {
        [self.fg_0_19, self.fg_20_29, self.fg_30_39, self.fg_40_49, self.fg_50_59, self.fg_60_plus]
    }

    /// Miss values in bucket order (0-19 .. 60+).
    pub fn misses(&self) -> [f64; 6] {
        [
            self.fg_miss_0_19,
            self.fg_miss_20_29,
            self.fg_miss_30_39,
            self.fg_miss_40_49,
            self.fg_miss_50_59,
            self.fg_miss_60_plus,
        ]
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }
}
