//! Kickoff-hour conditions from the Open-Meteo hourly forecast.
//!
//! [`lookup`] never fails: finished and dome games short-circuit without a
//! request, and an exhausted retry budget or a forecast that does not cover
//! kickoff both degrade to a neutral outdoor reading with zero wind.

use super::retry::with_backoff;
use super::stadiums;
use super::WeatherFeed;
use crate::config::WeatherConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Hourly series as returned under the `hourly` key. Open-Meteo emits
/// `null` for hours it has no value for.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlyForecast {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlyForecast>,
}

/// Parse a forecast response body. A body without an hourly wind series is
/// an error so the caller retries it.
pub fn parse_forecast(json: &str) -> Result<HourlyForecast> {
    let resp: ForecastResponse =
        serde_json::from_str(json).context("failed to parse forecast JSON")?;
    let hourly = resp.hourly.context("forecast has no hourly block")?;
    if hourly.wind_speed_10m.is_empty() {
        anyhow::bail!("forecast has no wind series");
    }
    Ok(hourly)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sky {
    Clear,
    Windy,
    Rain,
    Snow,
    Dome,
    Finished,
    /// No usable forecast; treated as calm and dry.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditions {
    pub wind_mph: f64,
    pub sky: Sky,
    pub descriptor: String,
}

impl Conditions {
    pub fn dome() -> Self {
        Self { wind_mph: 0.0, sky: Sky::Dome, descriptor: "Dome".to_string() }
    }

    pub fn finished() -> Self {
        Self { wind_mph: 0.0, sky: Sky::Finished, descriptor: "Game Finished".to_string() }
    }

    pub fn unavailable() -> Self {
        Self { wind_mph: 0.0, sky: Sky::Unavailable, descriptor: "Outdoors ☀️".to_string() }
    }
}

/// Classify one forecast hour. Precipitation above 40% wins over wind; it is
/// snow at or below freezing.
pub fn describe(wind_mph: f64, precip_pct: f64, temp_f: Option<f64>) -> Conditions {
    let (sky, icon) = if precip_pct > 40.0 {
        if temp_f.is_some_and(|t| t <= 32.0) {
            (Sky::Snow, "🌨️")
        } else {
            (Sky::Rain, "🌧️")
        }
    } else if wind_mph > 15.0 {
        (Sky::Windy, "🌬️")
    } else {
        (Sky::Clear, "☀️")
    };
    Conditions {
        wind_mph,
        sky,
        descriptor: format!("{}mph {}", wind_mph.trunc() as i64, icon),
    }
}

/// Conditions for the forecast hour that contains kickoff. Times are local
/// `YYYY-MM-DDTHH:MM`, so the match is on the hour prefix.
pub fn conditions_at(forecast: &HourlyForecast, kickoff: NaiveDateTime) -> Option<Conditions> {
    let target = kickoff.format("%Y-%m-%dT%H").to_string();
    let idx = forecast.time.iter().position(|t| t.starts_with(&target))?;
    let wind = forecast.wind_speed_10m.get(idx).copied().flatten()?;
    let precip = forecast
        .precipitation_probability
        .get(idx)
        .copied()
        .flatten()
        .unwrap_or(0.0);
    let temp = forecast.temperature_2m.get(idx).copied().flatten();
    Some(describe(wind, precip, temp))
}

/// Kickoff conditions for a game hosted by `home_team`.
pub async fn lookup(
    feed: &dyn WeatherFeed,
    config: &WeatherConfig,
    home_team: &str,
    kickoff: Option<NaiveDateTime>,
    is_dome: bool,
    now: NaiveDateTime,
) -> Conditions {
    if let Some(kickoff) = kickoff {
        if now - kickoff > ChronoDuration::hours(config.game_duration_hours) {
            return Conditions::finished();
        }
    }
    if is_dome {
        return Conditions::dome();
    }
    let Some(kickoff) = kickoff else {
        tracing::debug!(home_team, "no kickoff time, skipping forecast");
        return Conditions::unavailable();
    };
    let Some((lat, lon)) = stadiums::coords(home_team) else {
        tracing::warn!(home_team, "no stadium coordinates");
        return Conditions::unavailable();
    };

    let label = format!("weather for {}", home_team);
    let forecast = with_backoff(
        &label,
        config.max_attempts,
        Duration::from_millis(config.backoff_base_ms),
        || feed.hourly(lat, lon),
    )
    .await;

    match forecast {
        Ok(forecast) => conditions_at(&forecast, kickoff).unwrap_or_else(|| {
            tracing::debug!(home_team, %kickoff, "forecast does not cover kickoff");
            Conditions::unavailable()
        }),
        Err(e) => {
            tracing::warn!(home_team, error = %e, "weather unavailable, assuming calm");
            Conditions::unavailable()
        }
    }
}

pub struct OpenMeteo {
    client: Client,
    base_url: String,
}

impl OpenMeteo {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build weather client")?;
        Ok(Self { client, base_url: config.api_base.clone() })
    }
}

#[async_trait]
impl WeatherFeed for OpenMeteo {
    async fn hourly(&self, lat: f64, lon: f64) -> Result<HourlyForecast> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("hourly", "temperature_2m,precipitation_probability,wind_speed_10m".to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
                ("wind_speed_unit", "mph".to_string()),
                ("timezone", "America/New_York".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("forecast HTTP {}", resp.status());
        }
        let body = resp.text().await.context("forecast read failed")?;
        parse_forecast(&body)
    }
}
