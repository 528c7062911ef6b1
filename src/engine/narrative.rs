//! One-paragraph blurb per ranking row.
//!
//! Presentation only: nothing here feeds back into grade or projection. Text
//! is drawn by weighted random choice, so callers inject the RNG and tests
//! assert on which buckets are eligible rather than on the exact sentence.

use crate::engine::status::InjuryStatus;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Elite,
    Strong,
    Solid,
    Streamer,
    Fade,
}

impl Tier {
    pub fn from_grade(grade: f64) -> Self {
        if grade >= 110.0 {
            Tier::Elite
        } else if grade >= 100.0 {
            Tier::Strong
        } else if grade >= 90.0 {
            Tier::Solid
        } else if grade >= 80.0 {
            Tier::Streamer
        } else {
            Tier::Fade
        }
    }

    fn templates(self) -> &'static [(&'static str, u32)] {
        match self {
            Tier::Elite => &[
                ("{name} is a must-start this week.", 3),
                ("{name} sits at the top of the board for Week {week}.", 2),
                ("Lock {name} into lineups.", 1),
            ],
            Tier::Strong => &[
                ("{name} is a strong play in Week {week}.", 3),
                ("{name} brings a high floor into this matchup.", 2),
            ],
            Tier::Solid => &[
                ("{name} is a solid, startable option.", 3),
                ("{name} profiles as a dependable mid-tier kicker this week.", 2),
            ],
            Tier::Streamer => &[
                ("{name} is a viable streamer for Week {week}.", 3),
                ("{name} is a reasonable fill-in if you need one.", 2),
            ],
            Tier::Fade => &[
                ("{name} is a fade this week.", 3),
                ("Look elsewhere than {name} in Week {week}.", 2),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    HighImplied,
    LowImplied,
    Dome,
    HeavyWind,
    HighStall,
    Neutral,
}

impl Context {
    fn templates(self) -> &'static [(&'static str, u32)] {
        match self {
            Context::HighImplied => &[
                ("Vegas expects {team} to put up points, which means plenty of kicking chances.", 3),
                ("A high implied total for {team} keeps the ceiling up.", 2),
            ],
            Context::LowImplied => &[
                ("A low implied total for {team} caps the upside.", 3),
                ("Vegas is not expecting much scoring from {team}.", 2),
            ],
            Context::Dome => &[
                ("Indoor conditions remove any weather concerns.", 3),
                ("Kicking under a roof is a clear boost.", 2),
            ],
            Context::HeavyWind => &[
                ("Heavy wind in the forecast is a real risk on longer attempts.", 3),
                ("Keep an eye on the wind before kickoff.", 2),
            ],
            Context::HighStall => &[
                ("{team} drives stall in the red zone more than most, turning touchdowns into field goals.", 3),
                ("Red-zone struggles for {team} funnel points to the kicker.", 2),
            ],
            Context::Neutral => &[
                ("The matchup sets up as fairly neutral.", 2),
                ("Nothing in the game environment stands out either way.", 1),
            ],
        }
    }

    /// How strongly this context is preferred when several apply.
    fn weight(self) -> u32 {
        match self {
            Context::HeavyWind => 4,
            Context::HighImplied | Context::LowImplied => 3,
            Context::HighStall => 2,
            Context::Dome => 2,
            Context::Neutral => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeInputs<'a> {
    pub name: &'a str,
    pub team: &'a str,
    pub week: u32,
    pub status: InjuryStatus,
    pub grade: f64,
    pub vegas_implied: f64,
    pub is_dome: bool,
    pub wind_mph: f64,
    pub off_stall: f64,
    pub league_off_stall: Option<f64>,
}

/// Context buckets the second sentence may be drawn from. Never empty.
pub fn eligible_contexts(inputs: &NarrativeInputs<'_>) -> Vec<Context> {
    let mut out = Vec::new();
    if inputs.vegas_implied > 24.0 {
        out.push(Context::HighImplied);
    }
    if inputs.vegas_implied > 0.0 && inputs.vegas_implied < 18.0 {
        out.push(Context::LowImplied);
    }
    if inputs.is_dome {
        out.push(Context::Dome);
    } else if inputs.wind_mph > 15.0 {
        out.push(Context::HeavyWind);
    }
    if let Some(avg) = inputs.league_off_stall {
        if inputs.off_stall > avg {
            out.push(Context::HighStall);
        }
    }
    if out.is_empty() {
        out.push(Context::Neutral);
    }
    out
}

/// "Justin Tucker" and "J.Tucker" both shorten to "Tucker".
fn short_name(name: &str) -> &str {
    let tail = name.rsplit('.').next().unwrap_or(name);
    tail.split_whitespace().last().unwrap_or(tail)
}

fn fill(template: &str, inputs: &NarrativeInputs<'_>) -> String {
    template
        .replace("{name}", short_name(inputs.name))
        .replace("{team}", inputs.team)
        .replace("{week}", &inputs.week.to_string())
}

fn pick<R: Rng + ?Sized>(options: &'static [(&'static str, u32)], rng: &mut R) -> &'static str {
    options
        .choose_weighted(rng, |(_, w)| *w)
        .map(|(t, _)| *t)
        .unwrap_or("")
}

pub fn compose<R: Rng + ?Sized>(inputs: &NarrativeInputs<'_>, rng: &mut R) -> String {
    if inputs.status != InjuryStatus::Healthy {
        return format!(
            "Monitor status closely as {} is currently listed as {}. This significantly impacts their viability for Week {}.",
            short_name(inputs.name),
            inputs.status.label(),
            inputs.week
        );
    }

    let verdict = fill(pick(Tier::from_grade(inputs.grade).templates(), rng), inputs);
    let contexts = eligible_contexts(inputs);
    let context = contexts
        .choose_weighted(rng, |c| c.weight())
        .copied()
        .unwrap_or(Context::Neutral);
    let reason = fill(pick(context.templates(), rng), inputs);
    format!("{verdict} {reason}")
}
