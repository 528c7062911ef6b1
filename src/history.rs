//! Week-keyed store of per-kicker actuals, kept across runs so the front
//! end can show projection accuracy week over week.
//!
//! Lifecycle per run: load at start, add last week if it is not stored yet,
//! stamp backtest projections, save at end.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::kicks::WeekActual;
use crate::output::write_atomic;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub history: BTreeMap<u32, Vec<WeekActual>>,
}

impl History {
    pub fn get(&self, week: u32) -> Option<&[WeekActual]> {
        self.history.get(&week).map(Vec::as_slice)
    }

    pub fn put(&mut self, week: u32, records: Vec<WeekActual>) {
        self.history.insert(week, records);
    }

    /// Stored weeks are never recomputed. Returns whether `records` was added.
    pub fn merge_if_absent(&mut self, week: u32, records: Vec<WeekActual>) -> bool {
        if self.history.contains_key(&week) {
            return false;
        }
        self.put(week, records);
        true
    }

    /// Set `proj` on the stored record for `id` in `week`, if there is one.
    pub fn stamp_proj(&mut self, week: u32, id: &str, proj: f64) -> bool {
        let Some(records) = self.history.get_mut(&week) else {
            return false;
        };
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.proj = Some(proj);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

pub trait HistoryStore {
    fn load(&self) -> Result<History>;
    fn save(&self, history: &History) -> Result<()>;
}

/// `{"history": {"<week>": [...]}}` on disk.
pub struct JsonFileHistory {
    path: PathBuf,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryStore for JsonFileHistory {
    fn load(&self) -> Result<History> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no history file, starting empty");
            return Ok(History::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history file: {}", self.path.display()))?;
        match serde_json::from_str::<History>(&raw) {
            Ok(history) => {
                tracing::info!(weeks = history.len(), "history loaded");
                Ok(history)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable history, starting empty");
                Ok(History::default())
            }
        }
    }

    fn save(&self, history: &History) -> Result<()> {
        let body = serde_json::to_vec(history).context("Failed to serialize history")?;
        write_atomic(&self.path, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actual(id: &str, act: f64) -> WeekActual {
        WeekActual {
            id: id.into(),
            name: "J.Doe".into(),
            act,
            fg_made: 2,
            fg_miss: 0,
            xp_miss: 0,
            proj: None,
        }
    }

    #[test]
    fn test_merge_if_absent_keeps_stored_week() {
        let mut h = History::default();
        assert!(h.merge_if_absent(5, vec![actual("a", 9.0)]));
        assert!(!h.merge_if_absent(5, vec![actual("a", 1.0)]));
        assert_eq!(h.get(5).unwrap()[0].act, 9.0);
        assert!(h.get(6).is_none());
    }

    #[test]
    fn test_stamp_proj() {
        let mut h = History::default();
        h.put(4, vec![actual("a", 7.0), actual("b", 3.0)]);
        assert!(h.stamp_proj(4, "b", 8.1));
        assert!(!h.stamp_proj(4, "zzz", 1.0));
        assert!(!h.stamp_proj(9, "a", 1.0));
        assert_eq!(h.get(4).unwrap()[1].proj, Some(8.1));
        assert_eq!(h.get(4).unwrap()[0].proj, None);
    }

    #[test]
    fn test_file_store_round_trip_and_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history_data.json");
        let store = JsonFileHistory::new(&path);

        assert!(store.load().unwrap().is_empty());

        let mut h = History::default();
        h.put(3, vec![actual("a", 12.0)]);
        h.stamp_proj(3, "a", 9.5);
        store.save(&h).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["history"]["3"][0]["act"], 12.0);
        assert_eq!(raw["history"]["3"][0]["proj"], 9.5);

        assert_eq!(store.load().unwrap(), h);
    }

    #[test]
    fn test_records_without_proj_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        std::fs::write(
            &path,
            r#"{"history":{"2":[{"id":"x","name":"A.B","act":5.0,"fg_made":1,"fg_miss":0,"xp_miss":0}]}}"#,
        )
        .unwrap();
        let h = JsonFileHistory::new(&path).load().unwrap();
        assert_eq!(h.get(2).unwrap()[0].proj, None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileHistory::new(&path).load().unwrap().is_empty());
    }
}
