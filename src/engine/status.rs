//! Availability resolution for kickers.
//!
//! Precedence: roster status code, then the scraped injury report, then
//! Healthy. Scraped reports are joined on a lossy `"<initial>.<surname>"` key;
//! when that key is shared by more than one kicker or more than one report
//! the match is flagged ambiguous and the scraped status is not applied.

use crate::engine::kicks::{roster_index, KickerSeason};
use crate::feed::types::{InjuryReport, RosterEntry};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InjuryStatus {
    Healthy,
    Questionable,
    Doubtful,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "IR")]
    Ir,
    #[serde(rename = "CUT")]
    Cut,
    #[serde(rename = "Practice Squad")]
    PracticeSquad,
    Inactive,
}

impl InjuryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Questionable => "Questionable",
            Self::Doubtful => "Doubtful",
            Self::Out => "OUT",
            Self::Ir => "IR",
            Self::Cut => "CUT",
            Self::PracticeSquad => "Practice Squad",
            Self::Inactive => "Inactive",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Ir | Self::Cut | Self::Out | Self::Inactive => "red-700",
            Self::Doubtful => "red-400",
            Self::Questionable | Self::PracticeSquad => "yellow-500",
            Self::Healthy => "green",
        }
    }

    /// Statuses that zero out grade and projection.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Out | Self::Cut | Self::Ir | Self::PracticeSquad | Self::Inactive
        )
    }
}

const SUFFIXES: [&str; 5] = ["jr", "sr", "ii", "iii", "iv"];

/// `"Harrison Butker Jr."` → `"H.Butker"`. A single token (already in
/// `"J.Tucker"` form) comes back unchanged.
pub fn normalize_name(name: &str) -> String {
    let mut parts: Vec<&str> = name.split_whitespace().collect();
    while parts.len() > 1 {
        let last = parts[parts.len() - 1].trim_end_matches('.').to_lowercase();
        if SUFFIXES.contains(&last.as_str()) {
            parts.pop();
        } else {
            break;
        }
    }
    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) if parts.len() >= 2 => {
            let initial: String = first.chars().take(1).collect();
            format!("{}.{}", initial, last)
        }
        _ => parts.join(" "),
    }
}

fn join_key(name: &str) -> String {
    normalize_name(name).to_lowercase()
}

/// Roster status codes that override everything else.
pub fn roster_status(code: &str) -> Option<(InjuryStatus, String)> {
    match code {
        "RES" | "NON" | "SUS" | "PUP" => Some((InjuryStatus::Ir, format!("Roster: {}", code))),
        "WAIVED" | "REL" | "CUT" | "RET" => Some((InjuryStatus::Cut, "Released".to_string())),
        "DEV" => Some((InjuryStatus::PracticeSquad, "Roster: Practice Squad".to_string())),
        "INA" => Some((InjuryStatus::Inactive, "Roster: Inactive".to_string())),
        _ => None,
    }
}

/// Map free-text designations ("Out", "Injured Reserve", "Expected to be
/// out until at least Week 8") onto a status by whole-word match.
pub fn scraped_status(status: &str, detail: &str) -> Option<(InjuryStatus, String)> {
    let lower = status.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has = |w: &str| words.contains(&w);
    let parsed = if has("out") || has("ir") || has("inactive") || lower.contains("injured reserve") {
        InjuryStatus::Out
    } else if has("doubtful") {
        InjuryStatus::Doubtful
    } else if has("questionable") {
        InjuryStatus::Questionable
    } else {
        return None;
    };
    let status = status.trim();
    let details = if detail.trim().is_empty() {
        status.to_string()
    } else {
        format!("{} ({})", status, detail.trim())
    };
    Some((parsed, details))
}

/// Entries grouped by normalized name key.
pub struct NameIndex<'a, T> {
    entries: HashMap<String, Vec<&'a T>>,
}

pub enum NameMatch<'a, T> {
    None,
    One(&'a T),
    Many(usize),
}

impl<'a, T> NameIndex<'a, T> {
    pub fn build(items: impl IntoIterator<Item = &'a T>, name: impl Fn(&T) -> &str) -> Self {
        let mut entries: HashMap<String, Vec<&'a T>> = HashMap::new();
        for item in items {
            entries.entry(join_key(name(item))).or_default().push(item);
        }
        Self { entries }
    }

    pub fn lookup(&self, name: &str) -> NameMatch<'a, T> {
        match self.entries.get(&join_key(name)).map(Vec::as_slice) {
            None | Some([]) => NameMatch::None,
            Some([one]) => NameMatch::One(*one),
            Some(many) => NameMatch::Many(many.len()),
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.entries.get(&join_key(name)).map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusResolution {
    pub status: InjuryStatus,
    pub details: String,
    /// The scraped report could not be tied to exactly one kicker.
    pub ambiguous: bool,
}

impl StatusResolution {
    pub fn healthy() -> Self {
        Self { status: InjuryStatus::Healthy, details: "Active".to_string(), ambiguous: false }
    }

    pub fn color(&self) -> &'static str {
        self.status.color()
    }
}

/// Resolve every kicker's availability, keyed by kicker id.
pub fn resolve_kickers(
    kickers: &[KickerSeason],
    roster: &[RosterEntry],
    reports: &[InjuryReport],
) -> HashMap<String, StatusResolution> {
    let roster = roster_index(roster);
    let kicker_reports = reports
        .iter()
        .filter(|r| r.position.as_deref().map_or(true, |p| p.eq_ignore_ascii_case("K")));
    let report_index = NameIndex::build(kicker_reports, |r: &InjuryReport| r.name.as_str());
    let kicker_index = NameIndex::build(kickers, |k: &KickerSeason| k.name.as_str());

    kickers
        .iter()
        .map(|k| {
            let from_roster = roster
                .get(k.id.as_str())
                .and_then(|e| e.status.as_deref())
                .and_then(roster_status);
            if let Some((status, details)) = from_roster {
                return (k.id.clone(), StatusResolution { status, details, ambiguous: false });
            }

            let resolution = match report_index.lookup(&k.name) {
                NameMatch::None => StatusResolution::healthy(),
                NameMatch::One(report) if kicker_index.count(&k.name) == 1 => {
                    match scraped_status(&report.status, &report.detail) {
                        Some((status, details)) => StatusResolution { status, details, ambiguous: false },
                        None => StatusResolution::healthy(),
                    }
                }
                NameMatch::One(_) | NameMatch::Many(_) => {
                    let n = report_index.count(&k.name);
                    tracing::warn!(
                        kicker = %k.name,
                        reports = n,
                        kickers = kicker_index.count(&k.name),
                        "ambiguous injury name match, status not applied"
                    );
                    StatusResolution {
                        status: InjuryStatus::Healthy,
                        details: format!("Ambiguous name match ({} reports)", n),
                        ambiguous: true,
                    }
                }
            };
            (k.id.clone(), resolution)
        })
        .collect()
}
