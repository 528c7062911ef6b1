//! Week arithmetic: which week we are projecting and which completed weeks
//! feed the trailing-window metrics.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};

pub const LAST_REGULAR_WEEK: u32 = 18;

/// Target week from calendar math. Weeks roll over on Tuesday so Monday
/// night games still belong to the week being played.
pub fn target_week(today: NaiveDate, season_start: NaiveDate, force_week: Option<u32>) -> u32 {
    if let Some(week) = force_week {
        return week;
    }
    if today < season_start {
        return 1;
    }
    let days_since_start = (today - season_start).num_days() + 2;
    let week = (days_since_start / 7) as u32 + 1;
    week.clamp(1, LAST_REGULAR_WEEK)
}

/// Wall-clock time in US Eastern, matching the schedule's kickoff strings.
pub fn eastern_now() -> NaiveDateTime {
    eastern_from_utc(Utc::now().naive_utc())
}

/// UTC to US Eastern. Daylight time runs from 2am local on the second
/// Sunday of March to 2am local on the first Sunday of November.
pub fn eastern_from_utc(utc: NaiveDateTime) -> NaiveDateTime {
    let year = utc.year();
    let sunday_at = |month, n, hour| {
        NaiveDate::from_weekday_of_month_opt(year, month, Weekday::Sun, n).and_then(|d| d.and_hms_opt(hour, 0, 0))
    };
    let daylight = match (sunday_at(3, 2, 7), sunday_at(11, 1, 6)) {
        (Some(start), Some(end)) => utc >= start && utc < end,
        _ => false,
    };
    utc - Duration::hours(if daylight { 4 } else { 5 })
}

/// Inclusive range of completed weeks used for trailing metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: u32,
    pub end: u32,
}

impl Window {
    /// The last `weeks` completed weeks before `target`, capped at the latest
    /// week the play-by-play actually covers.
    pub fn trailing(target: u32, latest_data_week: u32, weeks: u32) -> Self {
        let end = latest_data_week.min(target.saturating_sub(1));
        let start = end.saturating_sub(weeks.saturating_sub(1)).max(1);
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < 1 || self.end < self.start
    }

    pub fn contains(&self, week: u32) -> bool {
        !self.is_empty() && week >= self.start && week <= self.end
    }
}

/// Most recent first: `target-1, target-2, ...`, never below week 1.
pub fn recent_weeks(target: u32, count: u32) -> Vec<u32> {
    (1..=count)
        .filter_map(|back| target.checked_sub(back))
        .filter(|week| *week >= 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_eastern_follows_daylight_time() {
        assert_eq!(eastern_from_utc(at(2025, 9, 21, 17, 0)), at(2025, 9, 21, 13, 0));
        assert_eq!(eastern_from_utc(at(2025, 12, 7, 18, 0)), at(2025, 12, 7, 13, 0));
        // 2025 switches on March 9 and November 2.
        assert_eq!(eastern_from_utc(at(2025, 3, 9, 6, 59)), at(2025, 3, 9, 1, 59));
        assert_eq!(eastern_from_utc(at(2025, 3, 9, 7, 0)), at(2025, 3, 9, 3, 0));
        assert_eq!(eastern_from_utc(at(2025, 11, 2, 5, 59)), at(2025, 11, 2, 1, 59));
        assert_eq!(eastern_from_utc(at(2025, 11, 2, 6, 0)), at(2025, 11, 2, 1, 0));
    }

    #[test]
    fn test_before_season_is_week_one() {
        assert_eq!(target_week(date(2025, 8, 20), date(2025, 9, 4), None), 1);
    }

    #[test]
    fn test_opening_thursday_is_week_one() {
        assert_eq!(target_week(date(2025, 9, 4), date(2025, 9, 4), None), 1);
    }

    #[test]
    fn test_rolls_over_on_tuesday() {
        // Monday after week 1 is still week 1; Tuesday is week 2.
        assert_eq!(target_week(date(2025, 9, 8), date(2025, 9, 4), None), 1);
        assert_eq!(target_week(date(2025, 9, 9), date(2025, 9, 4), None), 2);
    }

    #[test]
    fn test_clamped_to_last_week() {
        assert_eq!(target_week(date(2026, 3, 1), date(2025, 9, 4), None), 18);
    }

    #[test]
    fn test_force_week_wins() {
        assert_eq!(target_week(date(2025, 8, 1), date(2025, 9, 4), Some(12)), 12);
    }

    #[test]
    fn test_window_trailing_four() {
        let w = Window::trailing(10, 10, 4);
        assert_eq!(w, Window { start: 6, end: 9 });
        assert!(w.contains(6) && w.contains(9));
        assert!(!w.contains(10) && !w.contains(5));
    }

    #[test]
    fn test_window_capped_by_data() {
        // Provider lags a week behind.
        assert_eq!(Window::trailing(10, 8, 4), Window { start: 5, end: 8 });
    }

    #[test]
    fn test_window_early_season() {
        assert_eq!(Window::trailing(3, 3, 4), Window { start: 1, end: 2 });
        let empty = Window::trailing(1, 0, 4);
        assert!(empty.is_empty());
        assert!(!empty.contains(0));
        assert!(!empty.contains(1));
    }

    #[test]
    fn test_recent_weeks() {
        assert_eq!(recent_weeks(10, 3), vec![9, 8, 7]);
        assert_eq!(recent_weeks(2, 3), vec![1]);
        assert!(recent_weeks(1, 3).is_empty());
    }
}
