//! Vegas-implied team totals.
//!
//! Lines are held in one canonical form: the home team's betting line,
//! negative when home is favored. Source data in the other orientation is
//! flipped once on ingest (see [`SpreadConvention`]), so nothing downstream
//! branches on sign conventions.

use crate::config::SpreadConvention;
use crate::feed::types::Game;

pub const DEFAULT_TOTAL: f64 = 44.0;
pub const DEFAULT_SPREAD: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lines {
    pub total: f64,
    /// Home team's line; -6.0 means home is a 6-point favorite.
    pub home_line: f64,
}

impl Lines {
    pub fn from_raw(total: Option<f64>, spread: Option<f64>, convention: SpreadConvention) -> Self {
        let spread = spread.unwrap_or(DEFAULT_SPREAD);
        let home_line = match convention {
            SpreadConvention::HomeLine => spread,
            SpreadConvention::HomeMargin => -spread,
        };
        Self {
            total: total.unwrap_or(DEFAULT_TOTAL),
            // -0.0 + 0.0 == +0.0, keeps pick'em displays unsigned
            home_line: home_line + 0.0,
        }
    }

    pub fn from_game(game: &Game, convention: SpreadConvention) -> Self {
        Self::from_raw(game.total_line, game.spread_line, convention)
    }

    pub fn home_implied(&self) -> f64 {
        (self.total - self.home_line) / 2.0
    }

    pub fn away_implied(&self) -> f64 {
        (self.total + self.home_line) / 2.0
    }

    pub fn implied_for(&self, is_home: bool) -> f64 {
        if is_home {
            self.home_implied()
        } else {
            self.away_implied()
        }
    }

    /// The side's own betting line.
    pub fn line_for(&self, is_home: bool) -> f64 {
        if is_home {
            self.home_line
        } else {
            -self.home_line + 0.0
        }
    }

    /// `"-6.0"` for a 6-point favorite, `"+6.0"` for the dog.
    pub fn spread_display(&self, is_home: bool) -> String {
        format!("{:+.1}", self.line_for(is_home))
    }
}
