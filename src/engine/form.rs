//! Recent-form backtest: what a simple vegas-scaled projection would have
//! said for each of a kicker's last few weeks, against what they scored.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::SpreadConvention;
use crate::engine::kicks::{KickerSeason, WeekActual};
use crate::engine::round1;
use crate::engine::vegas::Lines;
use crate::feed::types::Game;

const HOT_IMPLIED: f64 = 24.0;
const COLD_IMPLIED: f64 = 18.0;

/// Week → kicker id → scored points.
pub type WeeklyPoints = HashMap<u32, HashMap<String, f64>>;

pub fn weekly_points(actuals: &HashMap<u32, Vec<WeekActual>>) -> WeeklyPoints {
    actuals
        .iter()
        .map(|(week, rows)| (*week, rows.iter().map(|r| (r.id.clone(), r.act)).collect()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormStatus {
    Bye,
    Dns,
    Active,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormWeek {
    pub week: u32,
    pub status: FormStatus,
    pub proj: f64,
    pub act: f64,
    pub diff: f64,
    pub opp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormSummary {
    pub l3_actual: f64,
    pub l3_proj: f64,
    pub l3_games: u32,
}

/// Scales season average by the team's implied total for that game.
pub fn implied_multiplier(implied: f64) -> f64 {
    if implied > HOT_IMPLIED {
        1.15
    } else if implied < COLD_IMPLIED {
        0.85
    } else {
        1.0
    }
}

/// One entry per requested week, in the order given.
pub fn backtest(
    kicker: &KickerSeason,
    games: &[Game],
    points: &WeeklyPoints,
    weeks: &[u32],
    convention: SpreadConvention,
) -> Vec<FormWeek> {
    let avg = kicker.avg_pts();
    weeks
        .iter()
        .map(|&week| {
            let game = games.iter().find(|g| g.week == week && g.involves(&kicker.team));
            let Some(game) = game else {
                return FormWeek {
                    week,
                    status: FormStatus::Bye,
                    proj: 0.0,
                    act: 0.0,
                    diff: 0.0,
                    opp: "BYE".to_string(),
                };
            };
            let opp = game.opponent_of(&kicker.team).to_string();
            let Some(act) = points.get(&week).and_then(|w| w.get(&kicker.id)).copied() else {
                return FormWeek { week, status: FormStatus::Dns, proj: 0.0, act: 0.0, diff: 0.0, opp };
            };
            let implied = Lines::from_game(game, convention).implied_for(game.home_team == kicker.team);
            let proj = round1(avg * implied_multiplier(implied));
            FormWeek {
                week,
                status: FormStatus::Active,
                proj,
                act,
                diff: round1(act - proj),
                opp,
            }
        })
        .collect()
}

/// Totals over active weeks only.
pub fn summarize(form: &[FormWeek]) -> FormSummary {
    form.iter()
        .filter(|w| w.status == FormStatus::Active)
        .fold(FormSummary::default(), |mut acc, w| {
            acc.l3_actual += w.act;
            acc.l3_proj = round1(acc.l3_proj + w.proj);
            acc.l3_games += 1;
            acc
        })
}
