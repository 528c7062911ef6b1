//! Typed rows for the statistics provider tables and the scraped pages.
//!
//! The provider publishes wide CSV tables whose columns drift between
//! seasons, so every field is either defaulted or optional and numeric cells
//! go through the lenient parsers below ("NA", blanks and "1.0"-style
//! integers are all tolerated). Unknown columns are ignored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lenient cell parsers for provider CSVs.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    fn is_missing(raw: &str) -> bool {
        let raw = raw.trim();
        raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("nan")
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw
            .filter(|s| !is_missing(s))
            .map(|s| s.trim().to_string()))
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw
            .filter(|s| !is_missing(s))
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite()))
    }

    pub fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(opt_f64(d)?.filter(|v| *v >= 0.0).map(|v| v as u32))
    }

    pub fn u32_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(opt_u32(d)?.unwrap_or(0))
    }

    /// 0/1 indicator columns, which the provider sometimes writes as floats.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(opt_f64(d)?.is_some_and(|v| v >= 1.0))
    }
}

/// Coarse play classification; only the variants the engine branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayKind {
    FieldGoal,
    ExtraPoint,
    Pass,
    Run,
    Punt,
    Other,
}

/// Roof values that count as a climate-controlled game.
pub fn is_dome_roof(roof: Option<&str>) -> bool {
    matches!(roof, Some("dome") | Some("closed"))
}

/// One offensive snap from the play-by-play table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Play {
    #[serde(default)]
    pub game_id: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub week: u32,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub posteam: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub defteam: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub play_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub kicker_player_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub kicker_player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub kick_distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub field_goal_result: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub extra_point_result: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub yardline_100: Option<f64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub touchdown: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub interception: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub fumble_lost: bool,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub down: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub drive: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub roof: Option<String>,
}

impl Play {
    pub fn kind(&self) -> PlayKind {
        match self.play_type.as_deref() {
            Some("field_goal") => PlayKind::FieldGoal,
            Some("extra_point") => PlayKind::ExtraPoint,
            Some("pass") => PlayKind::Pass,
            Some("run") => PlayKind::Run,
            Some("punt") => PlayKind::Punt,
            _ => PlayKind::Other,
        }
    }

    pub fn is_dome(&self) -> bool {
        is_dome_roof(self.roof.as_deref())
    }

    /// Snap at or inside the given distance from the opponent goal line.
    pub fn within(&self, yards: f64) -> bool {
        self.yardline_100.is_some_and(|y| y <= yards)
    }
}

/// One schedule row (a game).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Game {
    #[serde(default)]
    pub game_id: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub season: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub week: u32,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub gameday: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub gametime: Option<String>,
    #[serde(default)]
    pub away_team: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub away_score: Option<f64>,
    #[serde(default)]
    pub home_team: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub home_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub spread_line: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_line: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub roof: Option<String>,
}

impl Game {
    pub fn is_completed(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    pub fn is_dome(&self) -> bool {
        is_dome_roof(self.roof.as_deref())
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    pub fn opponent_of(&self, team: &str) -> &str {
        if self.home_team == team {
            &self.away_team
        } else {
            &self.home_team
        }
    }

    /// Kickoff as published, "YYYY-MM-DD HH:MM" Eastern.
    pub fn game_dt(&self) -> Option<String> {
        match (&self.gameday, &self.gametime) {
            (Some(day), Some(time)) => Some(format!("{} {}", day, time)),
            _ => None,
        }
    }

    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        self.game_dt()
            .and_then(|dt| NaiveDateTime::parse_from_str(&dt, "%Y-%m-%d %H:%M").ok())
    }
}

/// One roster row; only kickers matter but the table covers every position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub gsis_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
}

/// Player directory row, used for headshots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerInfo {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub gsis_id: Option<String>,
    #[serde(default, alias = "headshot_url", deserialize_with = "lenient::opt_string")]
    pub headshot: Option<String>,
}

/// One row of the scraped injury report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub name: String,
    pub status: String,
    pub detail: String,
    #[serde(default)]
    pub position: Option<String>,
}

/// One row of the scraped ownership table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ownership {
    pub name: String,
    pub pct: f64,
}
