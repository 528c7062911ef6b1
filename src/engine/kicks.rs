//! Kick classification and per-kicker aggregates.
//!
//! Field goals are bucketed by distance: 0-19, 20-29, 30-39, 40-49, 50-59 and
//! 60+. Every attempt lands in exactly one bucket, so
//! `fg_att == Σ fg_made[..] + Σ fg_miss[..]` holds by construction.

use crate::config::ScoringConfig;
use crate::engine::round1;
use crate::feed::types::{Play, PlayKind, RosterEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const BUCKETS: usize = 6;

/// Snap depth plus end zone: line of scrimmage to kick distance.
const KICK_DEPTH_YARDS: f64 = 17.0;

/// Bucket index for a kick distance in yards.
pub fn bucket(distance: f64) -> usize {
    match distance {
        d if d < 20.0 => 0,
        d if d < 30.0 => 1,
        d if d < 40.0 => 2,
        d if d < 50.0 => 3,
        d if d < 60.0 => 4,
        _ => 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickOutcome {
    FieldGoal { bucket: usize, made: bool },
    ExtraPoint { made: bool },
}

/// Classify a play as a kick. Plays without a credited kicker are ignored.
pub fn classify(play: &Play) -> Option<KickOutcome> {
    play.kicker_player_name.as_ref()?;
    match play.kind() {
        PlayKind::FieldGoal => {
            let distance = play
                .kick_distance
                .or_else(|| play.yardline_100.map(|y| y + KICK_DEPTH_YARDS))
                .unwrap_or(0.0);
            Some(KickOutcome::FieldGoal {
                bucket: bucket(distance),
                made: play.field_goal_result.as_deref() == Some("made"),
            })
        }
        PlayKind::ExtraPoint => Some(KickOutcome::ExtraPoint {
            made: play.extra_point_result.as_deref() == Some("good"),
        }),
        _ => None,
    }
}

/// Make/miss counts for some span of kicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickLine {
    pub fg_made: [u32; BUCKETS],
    pub fg_miss: [u32; BUCKETS],
    pub xp_made: u32,
    pub xp_miss: u32,
}

impl KickLine {
    pub fn record(&mut self, outcome: KickOutcome) {
        match outcome {
            KickOutcome::FieldGoal { bucket, made: true } => self.fg_made[bucket] += 1,
            KickOutcome::FieldGoal { bucket, made: false } => self.fg_miss[bucket] += 1,
            KickOutcome::ExtraPoint { made: true } => self.xp_made += 1,
            KickOutcome::ExtraPoint { made: false } => self.xp_miss += 1,
        }
    }

    pub fn fg_made_total(&self) -> u32 {
        self.fg_made.iter().sum()
    }

    pub fn fg_miss_total(&self) -> u32 {
        self.fg_miss.iter().sum()
    }

    pub fn fg_att(&self) -> u32 {
        self.fg_made_total() + self.fg_miss_total()
    }

    pub fn fantasy_points(&self, scoring: &ScoringConfig) -> f64 {
        let makes = scoring.makes();
        let misses = scoring.misses();
        let fg: f64 = (0..BUCKETS)
            .map(|i| self.fg_made[i] as f64 * makes[i] + self.fg_miss[i] as f64 * misses[i])
            .sum();
        fg + self.xp_made as f64 * scoring.xp_made + self.xp_miss as f64 * scoring.xp_miss
    }

    /// Points the kicker put on the scoreboard.
    pub fn real_points(&self) -> u32 {
        self.fg_made_total() * 3 + self.xp_made
    }
}

/// Season-to-date aggregate for one kicker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KickerSeason {
    pub id: String,
    pub name: String,
    pub team: String,
    pub line: KickLine,
    pub dome_kicks: u32,
    pub total_kicks: u32,
    pub games: u32,
    pub fpts: f64,
}

impl KickerSeason {
    /// FG percentage; 0 with no attempts.
    pub fn accuracy(&self) -> f64 {
        let att = self.line.fg_att();
        if att == 0 {
            return 0.0;
        }
        round1(self.line.fg_made_total() as f64 / att as f64 * 100.0)
    }

    pub fn avg_pts(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        round1(self.fpts / self.games as f64)
    }

    pub fn dome_pct(&self) -> f64 {
        if self.total_kicks == 0 {
            return 0.0;
        }
        (self.dome_kicks as f64 / self.total_kicks as f64 * 100.0).round()
    }
}

#[derive(Default)]
struct Accum {
    name: String,
    team: Option<(u32, String)>,
    line: KickLine,
    dome_kicks: u32,
    total_kicks: u32,
    games: HashSet<String>,
}

/// One aggregate per kicker id, ordered by id. A kicker's team is the offense
/// on their latest-week kick.
pub fn aggregate_season(plays: &[Play], scoring: &ScoringConfig) -> Vec<KickerSeason> {
    let mut by_id: BTreeMap<String, Accum> = BTreeMap::new();
    for play in plays {
        let Some(outcome) = classify(play) else { continue };
        let (Some(id), Some(name)) = (&play.kicker_player_id, &play.kicker_player_name) else {
            continue;
        };
        let acc = by_id.entry(id.clone()).or_default();
        if acc.name.is_empty() {
            acc.name = name.clone();
        }
        if let Some(team) = &play.posteam {
            let newer = acc.team.as_ref().map_or(true, |(week, _)| play.week >= *week);
            if newer {
                acc.team = Some((play.week, team.clone()));
            }
        }
        acc.line.record(outcome);
        acc.total_kicks += 1;
        if play.is_dome() {
            acc.dome_kicks += 1;
        }
        acc.games.insert(play.game_id.clone());
    }

    by_id
        .into_iter()
        .map(|(id, acc)| KickerSeason {
            fpts: acc.line.fantasy_points(scoring),
            id,
            name: acc.name,
            team: acc.team.map(|(_, t)| t).unwrap_or_default(),
            line: acc.line,
            dome_kicks: acc.dome_kicks,
            total_kicks: acc.total_kicks,
            games: acc.games.len() as u32,
        })
        .collect()
}

/// Latest roster row per player id.
pub fn roster_index(roster: &[RosterEntry]) -> HashMap<&str, &RosterEntry> {
    let mut index = HashMap::new();
    for entry in roster {
        if let Some(id) = entry.gsis_id.as_deref() {
            index.insert(id, entry);
        }
    }
    index
}

/// Roster team wins over play-by-play team; players the roster lists at a
/// position other than K are dropped.
pub fn apply_roster(kickers: Vec<KickerSeason>, roster: &[RosterEntry]) -> Vec<KickerSeason> {
    let index = roster_index(roster);
    kickers
        .into_iter()
        .filter_map(|mut k| {
            if let Some(entry) = index.get(k.id.as_str()) {
                if let Some(pos) = entry.position.as_deref() {
                    if pos != "K" {
                        tracing::debug!(kicker = %k.name, position = pos, "dropping non-kicker");
                        return None;
                    }
                }
                if let Some(team) = &entry.team {
                    k.team = team.clone();
                }
            }
            Some(k)
        })
        .collect()
}

/// Per-kicker counts restricted to one week.
pub fn weekly_line(plays: &[Play], week: u32) -> HashMap<String, KickLine> {
    let mut lines: HashMap<String, KickLine> = HashMap::new();
    for play in plays.iter().filter(|p| p.week == week) {
        let (Some(outcome), Some(id)) = (classify(play), &play.kicker_player_id) else {
            continue;
        };
        lines.entry(id.clone()).or_default().record(outcome);
    }
    lines
}

/// A kicker's scored result for one completed week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekActual {
    pub id: String,
    pub name: String,
    pub act: f64,
    pub fg_made: u32,
    pub fg_miss: u32,
    pub xp_miss: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proj: Option<f64>,
}

pub fn weekly_actuals(plays: &[Play], week: u32, scoring: &ScoringConfig) -> Vec<WeekActual> {
    let lines = weekly_line(plays, week);
    let mut names: HashMap<&str, &str> = HashMap::new();
    for play in plays.iter().filter(|p| p.week == week) {
        if let (Some(id), Some(name)) = (&play.kicker_player_id, &play.kicker_player_name) {
            names.entry(id.as_str()).or_insert(name.as_str());
        }
    }
    let mut out: Vec<WeekActual> = lines
        .into_iter()
        .map(|(id, line)| WeekActual {
            name: names.get(id.as_str()).copied().unwrap_or_default().to_string(),
            act: line.fantasy_points(scoring),
            fg_made: line.fg_made_total(),
            fg_miss: line.fg_miss_total(),
            xp_miss: line.xp_miss,
            proj: None,
            id,
        })
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn kick(week: u32, team: &str, kind: &str, dist: Option<f64>, result: &str) -> Play {
        let mut p = Play {
            game_id: format!("2025_{:02}_{}", week, team),
            week,
            posteam: Some(team.to_string()),
            defteam: Some("OPP".to_string()),
            play_type: Some(kind.to_string()),
            kicker_player_id: Some("00-0001".to_string()),
            kicker_player_name: Some("B.Aubrey".to_string()),
            kick_distance: dist,
            ..Play::default()
        };
        match kind {
            "field_goal" => p.field_goal_result = Some(result.to_string()),
            _ => p.extra_point_result = Some(result.to_string()),
        }
        p
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(bucket(19.0), 0);
        assert_eq!(bucket(20.0), 1);
        assert_eq!(bucket(29.0), 1);
        assert_eq!(bucket(49.0), 3);
        assert_eq!(bucket(50.0), 4);
        assert_eq!(bucket(59.0), 4);
        assert_eq!(bucket(66.0), 5);
    }

    #[test]
    fn test_synthetic_kicker_scores_ten() {
        let plays = vec![
            kick(1, "DAL", "field_goal", Some(45.0), "made"),
            kick(1, "DAL", "field_goal", Some(55.0), "made"),
            kick(1, "DAL", "field_goal", Some(38.0), "missed"),
            kick(1, "DAL", "extra_point", Some(33.0), "good"),
            kick(1, "DAL", "extra_point", Some(33.0), "good"),
        ];
        let season = aggregate_season(&plays, &ScoringConfig::default());
        assert_eq!(season.len(), 1);
        let k = &season[0];
        assert_eq!(k.fpts, 10.0);
        assert_eq!(k.line.fg_att(), 3);
        assert_eq!(k.line.fg_made_total(), 2);
        assert_eq!(k.line.real_points(), 8);
        assert_eq!(k.accuracy(), 66.7);
        assert_eq!(k.games, 1);
        assert_eq!(k.avg_pts(), 10.0);
    }

    #[test]
    fn test_attempt_identity_holds() {
        let plays = vec![
            kick(1, "DAL", "field_goal", Some(18.0), "made"),
            kick(1, "DAL", "field_goal", None, "blocked"),
            kick(2, "DAL", "field_goal", Some(61.0), "missed"),
            kick(2, "DAL", "extra_point", None, "failed"),
        ];
        let k = &aggregate_season(&plays, &ScoringConfig::default())[0];
        assert_eq!(k.line.fg_att(), 3);
        assert!(k.line.fg_made_total() <= k.line.fg_att());
        assert_eq!(k.line.fg_made_total() + k.line.fg_miss_total(), k.line.fg_att());
        assert_eq!(k.line.xp_miss, 1);
        assert_eq!(k.games, 2);
    }

    #[test]
    fn test_missing_distance_uses_yardline() {
        let mut p = kick(1, "DAL", "field_goal", None, "made");
        p.yardline_100 = Some(35.0);
        assert_eq!(classify(&p), Some(KickOutcome::FieldGoal { bucket: 4, made: true }));
        p.yardline_100 = None;
        assert_eq!(classify(&p), Some(KickOutcome::FieldGoal { bucket: 0, made: true }));
    }

    #[test]
    fn test_no_attempts_accuracy_is_zero() {
        let plays = vec![kick(1, "DAL", "extra_point", None, "good")];
        let k = &aggregate_season(&plays, &ScoringConfig::default())[0];
        assert_eq!(k.line.fg_att(), 0);
        assert_eq!(k.accuracy(), 0.0);
    }

    #[test]
    fn test_unnamed_kicks_ignored() {
        let mut p = kick(1, "DAL", "field_goal", Some(30.0), "made");
        p.kicker_player_name = None;
        assert!(classify(&p).is_none());
        assert!(aggregate_season(&[p], &ScoringConfig::default()).is_empty());
    }

    #[test]
    fn test_team_is_latest_week() {
        let plays = vec![
            kick(3, "NYJ", "extra_point", None, "good"),
            kick(1, "LV", "extra_point", None, "good"),
        ];
        let k = &aggregate_season(&plays, &ScoringConfig::default())[0];
        assert_eq!(k.team, "NYJ");
    }

    #[test]
    fn test_roster_overrides_team_and_filters_position() {
        let plays = vec![kick(1, "LV", "extra_point", None, "good")];
        let season = aggregate_season(&plays, &ScoringConfig::default());
        let moved = vec![RosterEntry {
            gsis_id: Some("00-0001".into()),
            team: Some("NYJ".into()),
            position: Some("K".into()),
            ..RosterEntry::default()
        }];
        assert_eq!(apply_roster(season.clone(), &moved)[0].team, "NYJ");

        let punter = vec![RosterEntry {
            gsis_id: Some("00-0001".into()),
            position: Some("P".into()),
            ..RosterEntry::default()
        }];
        assert!(apply_roster(season.clone(), &punter).is_empty());
        assert_eq!(apply_roster(season, &[])[0].team, "LV");
    }

    #[test]
    fn test_dome_pct() {
        let mut a = kick(1, "DET", "extra_point", None, "good");
        a.roof = Some("dome".into());
        let b = kick(2, "DET", "extra_point", None, "good");
        let c = kick(3, "DET", "extra_point", None, "good");
        let k = &aggregate_season(&[a, b, c], &ScoringConfig::default())[0];
        assert_eq!(k.dome_pct(), 33.0);
    }

    #[test]
    fn test_weekly_actuals() {
        let plays = vec![
            kick(4, "DAL", "field_goal", Some(52.0), "made"),
            kick(4, "DAL", "field_goal", Some(41.0), "missed"),
            kick(5, "DAL", "field_goal", Some(30.0), "made"),
        ];
        let actuals = weekly_actuals(&plays, 4, &ScoringConfig::default());
        assert_eq!(actuals.len(), 1);
        assert_eq!(actuals[0].act, 4.0);
        assert_eq!(actuals[0].fg_made, 1);
        assert_eq!(actuals[0].fg_miss, 1);
        assert_eq!(actuals[0].name, "B.Aubrey");
        assert!(weekly_actuals(&plays, 9, &ScoringConfig::default()).is_empty());
    }
}
