//! Matchup grade and point projection.
//!
//! Grade: stall-rate scores relative to league average (40 points each at
//! average) plus situational bonuses. Projection: season average scaled by
//! grade/90, blended with caps derived from the vegas total and each side's
//! kicker share of scoring. Unavailable kickers are forced to zero.

use crate::engine::kicks::KickerSeason;
use crate::engine::round1;
use crate::engine::status::InjuryStatus;
use crate::feed::weather::Sky;

pub const ELITE_QUANTILE: f64 = 0.8;
pub const ELITE_MIN_ATTEMPTS: u32 = 5;
/// Threshold when no kicker has enough attempts yet.
pub const ELITE_FALLBACK: f64 = 100.0;

const STALL_WEIGHT: f64 = 40.0;
const NEUTRAL_GRADE: f64 = 90.0;
const DEFAULT_SHARE: f64 = 0.45;
const MAX_SHARE: f64 = 0.80;
const SHARE_BOOST: f64 = 1.2;
const MILE_HIGH: &str = "DEN";

/// Linear-interpolated quantile (`q` in 0..=1) of an unsorted sample.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// 80th percentile of season points among kickers with at least five
/// field-goal attempts.
pub fn elite_threshold(kickers: &[KickerSeason]) -> f64 {
    let qualified: Vec<f64> = kickers
        .iter()
        .filter(|k| k.line.fg_att() >= ELITE_MIN_ATTEMPTS)
        .map(|k| k.fpts)
        .collect();
    quantile(&qualified, ELITE_QUANTILE).unwrap_or(ELITE_FALLBACK)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeInputs {
    pub avg_pts: f64,
    pub fpts: f64,
    pub elite_threshold: f64,
    pub off_stall: f64,
    pub def_stall: f64,
    pub league_off_stall: Option<f64>,
    pub league_def_stall: Option<f64>,
    pub is_dome: bool,
    pub wind_mph: f64,
    pub sky: Sky,
    pub home_field: String,
    /// The kicker's team line; only its magnitude matters.
    pub spread: f64,
    pub aggression: f64,
    pub status: InjuryStatus,
    pub vegas_implied: f64,
    pub off_ppg: f64,
    pub def_pa: f64,
    pub off_share: Option<f64>,
    pub def_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    pub grade: f64,
    pub proj: f64,
    pub details: Vec<String>,
    /// Season average scaled by grade/90, before the vegas blend.
    pub base_proj: f64,
    pub off_score: f64,
    pub def_score: f64,
    pub w_team_score: f64,
    pub w_def_allowed: f64,
    pub off_cap: f64,
    pub def_cap: f64,
}

fn stall_score(rate: f64, league: Option<f64>) -> f64 {
    match league {
        Some(avg) if avg != 0.0 && avg.is_finite() => rate / avg * STALL_WEIGHT,
        _ => STALL_WEIGHT,
    }
}

fn blended(vegas_implied: f64, recent: f64) -> f64 {
    if vegas_implied > 0.0 {
        vegas_implied * 0.7 + recent * 0.3
    } else {
        recent
    }
}

fn capped_share(share: Option<f64>) -> f64 {
    match share {
        Some(s) if s > 0.0 && s.is_finite() => s.min(MAX_SHARE),
        _ => DEFAULT_SHARE,
    }
}

pub fn score(inputs: &GradeInputs) -> GradeResult {
    let off_score = stall_score(inputs.off_stall, inputs.league_off_stall);
    let def_score = stall_score(inputs.def_stall, inputs.league_def_stall);

    let mut bonus = 0.0;
    let mut details = Vec::new();
    let mut add = |points: f64, label: &str| {
        bonus += points;
        details.push(label.to_string());
    };

    if inputs.is_dome {
        add(10.0, "+10 Dome");
    } else {
        if inputs.wind_mph > 15.0 {
            add(-10.0, "-10 Heavy Wind");
        } else if inputs.wind_mph > 10.0 {
            add(-5.0, "-5 Wind");
        }
        match inputs.sky {
            Sky::Snow => add(-10.0, "-10 Snow"),
            Sky::Rain => add(-5.0, "-5 Rain"),
            _ => {}
        }
    }
    if inputs.home_field == MILE_HIGH {
        add(5.0, "+5 Mile High");
    }
    let spread = inputs.spread.abs();
    if spread < 3.5 {
        add(5.0, "+5 Tight Game");
    } else if spread > 9.5 {
        add(-5.0, "-5 Blowout Risk");
    }
    if inputs.fpts >= inputs.elite_threshold {
        add(5.0, "+5 Elite Talent");
    }
    if inputs.aggression > 25.0 {
        add(-5.0, "-5 Aggressive Coach");
    }

    let mut grade = round1(off_score + def_score + bonus);
    let base_proj = inputs.avg_pts * (grade / NEUTRAL_GRADE);

    let w_team_score = blended(inputs.vegas_implied, inputs.off_ppg);
    let w_def_allowed = blended(inputs.vegas_implied, inputs.def_pa);
    let off_cap = w_team_score * (capped_share(inputs.off_share) * SHARE_BOOST);
    let def_cap = w_def_allowed * (capped_share(inputs.def_share) * SHARE_BOOST);
    let weighted = base_proj * 0.50 + off_cap * 0.30 + def_cap * 0.20;
    let mut proj = round1(if weighted > 1.0 { weighted } else { base_proj });

    if inputs.status.is_unavailable() {
        grade = 0.0;
        proj = 0.0;
        details.push(format!("Unavailable ({})", inputs.status.label()));
    }

    GradeResult {
        grade,
        proj,
        details,
        base_proj: round1(base_proj),
        off_score: round1(off_score),
        def_score: round1(def_score),
        w_team_score: round1(w_team_score),
        w_def_allowed: round1(w_def_allowed),
        off_cap: round1(off_cap),
        def_cap: round1(def_cap),
    }
}
