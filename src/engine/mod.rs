pub mod form;
pub mod grade;
pub mod kicks;
pub mod matchup;
pub mod narrative;
pub mod status;
pub mod team_stats;
pub mod vegas;

pub use grade::{GradeInputs, GradeResult};
pub use kicks::{KickLine, KickerSeason};
pub use status::{InjuryStatus, StatusResolution};
pub use team_stats::TeamContext;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `num / den`, or `fallback` when the denominator is zero or the result is
/// not finite.
pub fn ratio_or(num: f64, den: f64, fallback: f64) -> f64 {
    if den == 0.0 {
        return fallback;
    }
    let r = num / den;
    if r.is_finite() {
        r
    } else {
        fallback
    }
}
