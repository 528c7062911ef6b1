//! Team-level context: red-zone stall rates, fourth-down aggression, scoring
//! and kicker share of team points.
//!
//! Every table is keyed by team code. A team with no qualifying sample is
//! absent from the table rather than present with a NaN; callers decide the
//! fallback.

use crate::engine::kicks::{classify, KickLine};
use crate::engine::{mean, ratio_or, round1};
use crate::feed::types::{Game, Play, PlayKind};
use crate::season::Window;
use std::collections::{BTreeMap, HashMap, HashSet};

const RED_ZONE: f64 = 25.0;
const FOURTH_DOWN_ZONE: f64 = 30.0;

pub type TeamTable = HashMap<String, f64>;

fn mean_by_key(samples: BTreeMap<String, Vec<f64>>, scale: f64) -> TeamTable {
    samples
        .into_iter()
        .filter_map(|(team, vals)| mean(&vals).map(|m| (team, round1(m * scale))))
        .collect()
}

fn table_mean(table: &TeamTable) -> Option<f64> {
    let vals: Vec<f64> = table.values().copied().collect();
    mean(&vals)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StallRates {
    pub offense: TeamTable,
    pub defense: TeamTable,
}

impl StallRates {
    pub fn league_offense(&self) -> Option<f64> {
        table_mean(&self.offense)
    }

    pub fn league_defense(&self) -> Option<f64> {
        table_mean(&self.defense)
    }
}

/// Percentage of red-zone drives that ended without a touchdown, interception
/// or lost fumble, by offense and by defense.
pub fn stall_rates<'a>(plays: impl IntoIterator<Item = &'a Play>) -> StallRates {
    // (game, drive, offense, defense) -> scored or turned over
    let mut drives: HashMap<(&str, u32, &str, &str), bool> = HashMap::new();
    for play in plays.into_iter().filter(|p| p.within(RED_ZONE)) {
        let (Some(drive), Some(off), Some(def)) = (play.drive, &play.posteam, &play.defteam) else {
            continue;
        };
        let ended = drives
            .entry((play.game_id.as_str(), drive, off.as_str(), def.as_str()))
            .or_insert(false);
        *ended |= play.touchdown || play.interception || play.fumble_lost;
    }

    let mut offense: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut defense: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for ((_, _, off, def), ended) in drives {
        let stalled = if ended { 0.0 } else { 1.0 };
        offense.entry(off.to_string()).or_default().push(stalled);
        defense.entry(def.to_string()).or_default().push(stalled);
    }
    StallRates {
        offense: mean_by_key(offense, 100.0),
        defense: mean_by_key(defense, 100.0),
    }
}

/// Distinct red-zone drives per offense.
pub fn red_zone_trips<'a>(plays: impl IntoIterator<Item = &'a Play>) -> HashMap<String, u32> {
    let mut seen: HashSet<(&str, u32, &str)> = HashSet::new();
    for play in plays.into_iter().filter(|p| p.within(RED_ZONE)) {
        if let (Some(drive), Some(off)) = (play.drive, &play.posteam) {
            seen.insert((play.game_id.as_str(), drive, off.as_str()));
        }
    }
    let mut trips = HashMap::new();
    for (_, _, off) in seen {
        *trips.entry(off.to_string()).or_insert(0) += 1;
    }
    trips
}

/// Share of 4th downs inside the 30 where the offense ran or passed.
pub fn aggression<'a>(plays: impl IntoIterator<Item = &'a Play>) -> TeamTable {
    let mut counts: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for play in plays
        .into_iter()
        .filter(|p| p.down == Some(4) && p.within(FOURTH_DOWN_ZONE))
    {
        let Some(team) = &play.posteam else { continue };
        let entry = counts.entry(team.clone()).or_default();
        entry.1 += 1;
        if matches!(play.kind(), PlayKind::Pass | PlayKind::Run) {
            entry.0 += 1;
        }
    }
    counts
        .into_iter()
        .map(|(team, (go, total))| (team, round1(ratio_or(go as f64, total as f64, 0.0) * 100.0)))
        .collect()
}

fn completed_in<'a>(games: &'a [Game], window: Window) -> impl Iterator<Item = &'a Game> {
    games
        .iter()
        .filter(move |g| window.contains(g.week) && g.is_completed())
}

/// Points scored and allowed per game over completed games in the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointsWindow {
    pub off_ppg: TeamTable,
    pub def_pa: TeamTable,
}

pub fn points_window(games: &[Game], window: Window) -> PointsWindow {
    let mut scored: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut allowed: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for game in completed_in(games, window) {
        let (Some(home), Some(away)) = (game.home_score, game.away_score) else {
            continue;
        };
        scored.entry(game.home_team.clone()).or_default().push(home);
        scored.entry(game.away_team.clone()).or_default().push(away);
        allowed.entry(game.home_team.clone()).or_default().push(away);
        allowed.entry(game.away_team.clone()).or_default().push(home);
    }
    PointsWindow {
        off_ppg: mean_by_key(scored, 1.0),
        def_pa: mean_by_key(allowed, 1.0),
    }
}

/// Mean fraction of team points scored by its kicker (`offense`) and by
/// kickers facing each defense (`defense`), over completed window games.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KickerShare {
    pub offense: TeamTable,
    pub defense: TeamTable,
}

pub fn kicker_share(plays: &[Play], games: &[Game], window: Window) -> KickerShare {
    let mut kicker_pts: HashMap<(&str, &str), KickLine> = HashMap::new();
    for play in plays {
        let (Some(outcome), Some(team)) = (classify(play), &play.posteam) else {
            continue;
        };
        kicker_pts
            .entry((play.game_id.as_str(), team.as_str()))
            .or_default()
            .record(outcome);
    }

    let mut offense: HashMap<String, Vec<f64>> = HashMap::new();
    let mut defense: HashMap<String, Vec<f64>> = HashMap::new();
    for game in completed_in(games, window) {
        let sides = [
            (&game.home_team, &game.away_team, game.home_score),
            (&game.away_team, &game.home_team, game.away_score),
        ];
        for (team, opp, score) in sides {
            let total = score.unwrap_or(0.0);
            let pts = kicker_pts
                .get(&(game.game_id.as_str(), team.as_str()))
                .map_or(0, KickLine::real_points) as f64;
            let share = if total > 0.0 { pts / total } else { 0.0 };
            offense.entry(team.clone()).or_default().push(share);
            defense.entry(opp.clone()).or_default().push(share);
        }
    }
    let unrounded = |m: HashMap<String, Vec<f64>>| -> TeamTable {
        m.into_iter()
            .filter_map(|(k, v)| mean(&v).map(|x| (k, x)))
            .collect()
    };
    KickerShare {
        offense: unrounded(offense),
        defense: unrounded(defense),
    }
}

/// Everything team-level the scorer needs, computed once per run.
#[derive(Debug, Clone, Default)]
pub struct TeamContext {
    pub window: Option<Window>,
    pub stall_window: StallRates,
    pub stall_season: StallRates,
    pub rz_trips: HashMap<String, u32>,
    pub aggression: TeamTable,
    pub points: PointsWindow,
    pub share: KickerShare,
}

impl TeamContext {
    pub fn build(plays: &[Play], games: &[Game], window: Window) -> Self {
        let in_window: Vec<&Play> = plays.iter().filter(|p| window.contains(p.week)).collect();
        let ctx = Self {
            window: (!window.is_empty()).then_some(window),
            stall_window: stall_rates(in_window.iter().copied()),
            stall_season: stall_rates(plays),
            rz_trips: red_zone_trips(plays),
            aggression: aggression(in_window.iter().copied()),
            points: points_window(games, window),
            share: kicker_share(plays, games, window),
        };
        tracing::info!(
            window_start = window.start,
            window_end = window.end,
            teams_with_stall = ctx.stall_window.offense.len(),
            teams_with_points = ctx.points.off_ppg.len(),
            "team context built"
        );
        ctx
    }

    pub fn league_off_ppg(&self) -> Option<f64> {
        table_mean(&self.points.off_ppg)
    }

    pub fn league_def_pa(&self) -> Option<f64> {
        table_mean(&self.points.def_pa)
    }
}
