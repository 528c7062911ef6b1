//! The published JSON document.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::form::{FormSummary, FormWeek};
use crate::engine::kicks::{KickLine, WeekActual};
use crate::engine::status::InjuryStatus;

/// Non-finite floats become `None` (JSON null).
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueAvgs {
    pub fpts: Option<f64>,
    pub off_stall: Option<f64>,
    pub def_stall: Option<f64>,
    pub l4_off_ppg: Option<f64>,
    pub l4_def_pa: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub week: u32,
    pub updated: String,
    pub league_avgs: LeagueAvgs,
    pub history: BTreeMap<u32, Vec<WeekActual>>,
}

/// Season-to-date row for one kicker.
#[derive(Debug, Clone, Serialize)]
pub struct KickerRow {
    pub kicker_player_id: String,
    pub kicker_player_name: String,
    pub team: String,
    pub fg_0_19: u32,
    pub fg_20_29: u32,
    pub fg_30_39: u32,
    pub fg_40_49: u32,
    pub fg_50_59: u32,
    pub fg_60_plus: u32,
    pub fg_miss_0_19: u32,
    pub fg_miss_20_29: u32,
    pub fg_miss_30_39: u32,
    pub fg_miss_40_49: u32,
    pub fg_miss_50_59: u32,
    pub fg_miss_60_plus: u32,
    pub fg_made: u32,
    pub fg_miss: u32,
    pub fg_att: u32,
    pub xp_made: u32,
    pub xp_miss: u32,
    pub fpts: Option<f64>,
    pub real_pts: u32,
    pub games: u32,
    pub avg_pts: Option<f64>,
    pub acc: Option<f64>,
    pub dome_pct: Option<f64>,
    pub rz_trips: u32,
    pub off_stall_rate_ytd: Option<f64>,
    pub def_stall_rate_ytd: Option<f64>,
    pub join_name: String,
    pub headshot_url: String,
    pub own_pct: Option<f64>,
    pub injury_status: InjuryStatus,
    pub injury_color: &'static str,
    pub injury_details: String,
    pub week_line: KickLine,
}

/// A kicker's target-week matchup, grade and projection.
#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    #[serde(flatten)]
    pub kicker: KickerRow,
    pub opponent: String,
    pub is_home: bool,
    pub home_field: String,
    pub game_dt: Option<String>,
    pub is_dome: bool,
    pub wind: Option<f64>,
    pub weather_desc: String,
    pub vegas_total: Option<f64>,
    pub vegas_implied: Option<f64>,
    pub spread_display: String,
    pub off_stall_rate: Option<f64>,
    pub def_stall_rate: Option<f64>,
    pub off_ppg: Option<f64>,
    pub def_pa: Option<f64>,
    pub aggression_pct: Option<f64>,
    pub off_share: Option<f64>,
    pub def_share: Option<f64>,
    pub grade: Option<f64>,
    pub proj: Option<f64>,
    pub grade_details: Vec<String>,
    pub off_score_val: Option<f64>,
    pub def_score_val: Option<f64>,
    pub w_team_score: Option<f64>,
    pub w_def_allowed: Option<f64>,
    pub off_cap_val: Option<f64>,
    pub def_cap_val: Option<f64>,
    pub narrative: String,
    pub history: FormSummary,
    pub form: Vec<FormWeek>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedDocument {
    pub meta: Meta,
    pub rankings: Vec<RankingRow>,
    pub ytd: Vec<KickerRow>,
    pub injuries: Vec<KickerRow>,
}

fn desc(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    b.unwrap_or(f64::MIN).total_cmp(&a.unwrap_or(f64::MIN))
}

impl FeedDocument {
    /// Rankings by projection and ytd by season points, both descending;
    /// injuries are the ytd rows not marked healthy.
    pub fn assemble(meta: Meta, mut rankings: Vec<RankingRow>, mut ytd: Vec<KickerRow>) -> Self {
        rankings.sort_by(|a, b| desc(a.proj, b.proj));
        ytd.sort_by(|a, b| desc(a.fpts, b.fpts));
        let injuries = ytd
            .iter()
            .filter(|k| k.injury_status != InjuryStatus::Healthy)
            .cloned()
            .collect();
        Self { meta, rankings, ytd, injuries }
    }

    /// Serialized through `serde_json::Value`, which cannot hold NaN or
    /// infinity; any that slip past `finite` land as null.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let value = serde_json::to_value(self).context("Failed to build output document")?;
        serde_json::to_vec(&value).context("Failed to serialize output document")
    }
}

/// Write to a sibling temp file and rename over `path`, creating parent
/// directories as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}
