//! Target-week matchups, one row per team.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::config::{SpreadConvention, WeatherConfig};
use crate::engine::vegas::Lines;
use crate::feed::types::Game;
use crate::feed::weather::{self, Conditions};
use crate::feed::WeatherFeed;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchupSide {
    pub team: String,
    pub opponent: String,
    pub is_home: bool,
    /// Host team code; decides stadium coordinates and the altitude bonus.
    pub home_field: String,
    pub lines: Lines,
    pub is_dome: bool,
    pub game_dt: Option<String>,
    pub conditions: Conditions,
}

impl MatchupSide {
    pub fn implied(&self) -> f64 {
        self.lines.implied_for(self.is_home)
    }

    pub fn spread(&self) -> f64 {
        self.lines.line_for(self.is_home)
    }

    pub fn spread_display(&self) -> String {
        self.lines.spread_display(self.is_home)
    }
}

/// Both sides of every game in `week`, keyed by team. Weather is fetched once
/// per game, sequentially.
pub async fn build(
    games: &[Game],
    week: u32,
    convention: SpreadConvention,
    feed: &dyn WeatherFeed,
    weather_config: &WeatherConfig,
    now: NaiveDateTime,
) -> HashMap<String, MatchupSide> {
    let mut sides = HashMap::new();
    for game in games.iter().filter(|g| g.week == week) {
        let lines = Lines::from_game(game, convention);
        let is_dome = game.is_dome();
        let conditions = weather::lookup(
            feed,
            weather_config,
            &game.home_team,
            game.kickoff(),
            is_dome,
            now,
        )
        .await;
        tracing::debug!(
            home = %game.home_team,
            away = %game.away_team,
            total = lines.total,
            home_line = lines.home_line,
            weather = %conditions.descriptor,
            "matchup"
        );

        for (team, opponent, is_home) in [
            (&game.home_team, &game.away_team, true),
            (&game.away_team, &game.home_team, false),
        ] {
            sides.insert(
                team.clone(),
                MatchupSide {
                    team: team.clone(),
                    opponent: opponent.clone(),
                    is_home,
                    home_field: game.home_team.clone(),
                    lines,
                    is_dome,
                    game_dt: game.game_dt(),
                    conditions: conditions.clone(),
                },
            );
        }
    }
    tracing::info!(week, teams = sides.len(), "matchups built");
    sides
}
