//! End-to-end runs of the pipeline against in-memory feeds.

use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use kicker_feed::config::Config;
use kicker_feed::engine::InjuryStatus;
use kicker_feed::feed::types::{Game, InjuryReport, Ownership, Play, PlayerInfo, RosterEntry};
use kicker_feed::feed::weather::HourlyForecast;
use kicker_feed::feed::{InjuryFeed, OwnershipFeed, StatsProvider, WeatherFeed};
use kicker_feed::history::{HistoryStore, JsonFileHistory};
use kicker_feed::pipeline::{self, Feeds, RunOutput};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Fixtures ──

fn kick(game: &str, week: u32, off: &str, def: &str, who: (&str, &str), kind: &str, dist: f64, result: &str) -> Play {
    let mut p = Play {
        game_id: game.to_string(),
        week,
        posteam: Some(off.to_string()),
        defteam: Some(def.to_string()),
        play_type: Some(kind.to_string()),
        kicker_player_id: Some(who.0.to_string()),
        kicker_player_name: Some(who.1.to_string()),
        kick_distance: Some(dist),
        ..Play::default()
    };
    if kind == "field_goal" {
        p.field_goal_result = Some(result.to_string());
    } else {
        p.extra_point_result = Some(result.to_string());
    }
    p
}

fn red_zone(game: &str, week: u32, off: &str, def: &str, drive: u32, yardline: f64, touchdown: bool) -> Play {
    Play {
        game_id: game.to_string(),
        week,
        posteam: Some(off.to_string()),
        defteam: Some(def.to_string()),
        play_type: Some("run".to_string()),
        yardline_100: Some(yardline),
        drive: Some(drive),
        touchdown,
        ..Play::default()
    }
}

const AUBREY: (&str, &str) = ("00-A", "B.Aubrey");
const TUCKER: (&str, &str) = ("00-B", "J.Tucker");
const BUTKER: (&str, &str) = ("00-C", "H.Butker");

fn plays() -> Vec<Play> {
    let g1 = "2025_01_NYG_DAL";
    let g2 = "2025_01_KC_BAL";
    let g3 = "2025_02_DAL_PHI";
    let g4 = "2025_02_BAL_KC";
    vec![
        // Aubrey: 12 in week 1, 4 in week 2.
        kick(g1, 1, "DAL", "NYG", AUBREY, "field_goal", 45.0, "made"),
        kick(g1, 1, "DAL", "NYG", AUBREY, "field_goal", 55.0, "made"),
        kick(g1, 1, "DAL", "NYG", AUBREY, "extra_point", 33.0, "good"),
        kick(g1, 1, "DAL", "NYG", AUBREY, "extra_point", 33.0, "good"),
        kick(g1, 1, "DAL", "NYG", AUBREY, "extra_point", 33.0, "good"),
        kick(g3, 2, "DAL", "PHI", AUBREY, "field_goal", 30.0, "made"),
        kick(g3, 2, "DAL", "PHI", AUBREY, "field_goal", 40.0, "missed"),
        kick(g3, 2, "DAL", "PHI", AUBREY, "extra_point", 33.0, "good"),
        kick(g3, 2, "DAL", "PHI", AUBREY, "extra_point", 33.0, "good"),
        // Tucker: 5 and 5.
        kick(g2, 1, "BAL", "KC", TUCKER, "field_goal", 25.0, "made"),
        kick(g2, 1, "BAL", "KC", TUCKER, "extra_point", 33.0, "good"),
        kick(g2, 1, "BAL", "KC", TUCKER, "extra_point", 33.0, "good"),
        kick(g4, 2, "BAL", "KC", TUCKER, "field_goal", 50.0, "made"),
        // Butker: 5 and 6.
        kick(g2, 1, "KC", "BAL", BUTKER, "field_goal", 33.0, "made"),
        kick(g2, 1, "KC", "BAL", BUTKER, "extra_point", 33.0, "good"),
        kick(g2, 1, "KC", "BAL", BUTKER, "extra_point", 33.0, "good"),
        kick(g4, 2, "KC", "BAL", BUTKER, "field_goal", 20.0, "made"),
        kick(g4, 2, "KC", "BAL", BUTKER, "extra_point", 33.0, "good"),
        kick(g4, 2, "KC", "BAL", BUTKER, "extra_point", 33.0, "good"),
        kick(g4, 2, "KC", "BAL", BUTKER, "extra_point", 33.0, "good"),
        // Red-zone drives.
        red_zone(g1, 1, "DAL", "NYG", 3, 10.0, true),
        red_zone(g1, 1, "DAL", "NYG", 5, 20.0, false),
        red_zone(g2, 1, "BAL", "KC", 2, 15.0, false),
        red_zone(g2, 1, "KC", "BAL", 4, 8.0, true),
        red_zone(g3, 2, "DAL", "PHI", 6, 12.0, false),
        red_zone(g3, 2, "PHI", "DAL", 7, 5.0, true),
        red_zone(g4, 2, "KC", "BAL", 1, 22.0, true),
        red_zone(g4, 2, "BAL", "KC", 9, 18.0, false),
    ]
}

fn game(id: &str, week: u32, away: &str, home: &str, scores: Option<(f64, f64)>, lines: (Option<f64>, Option<f64>), roof: &str) -> Game {
    Game {
        game_id: id.to_string(),
        season: 2025,
        week,
        away_team: away.to_string(),
        home_team: home.to_string(),
        away_score: scores.map(|s| s.0),
        home_score: scores.map(|s| s.1),
        spread_line: lines.0,
        total_line: lines.1,
        roof: Some(roof.to_string()),
        ..Game::default()
    }
}

fn schedule() -> Vec<Game> {
    let mut week3 = game("2025_03_PHI_DAL", 3, "PHI", "DAL", None, (Some(6.0), Some(44.0)), "outdoors");
    week3.gameday = Some("2025-09-21".to_string());
    week3.gametime = Some("13:00".to_string());
    let mut indoor = game("2025_03_KC_BAL", 3, "KC", "BAL", None, (None, None), "closed");
    indoor.gameday = Some("2025-09-21".to_string());
    indoor.gametime = Some("16:25".to_string());
    vec![
        game("2025_01_NYG_DAL", 1, "NYG", "DAL", Some((20.0, 27.0)), (Some(7.0), Some(40.0)), "outdoors"),
        game("2025_01_KC_BAL", 1, "KC", "BAL", Some((17.0, 20.0)), (Some(1.5), Some(46.0)), "outdoors"),
        game("2025_02_DAL_PHI", 2, "DAL", "PHI", Some((23.0, 24.0)), (Some(2.5), Some(47.0)), "outdoors"),
        game("2025_02_BAL_KC", 2, "BAL", "KC", Some((10.0, 30.0)), (Some(3.0), Some(45.0)), "outdoors"),
        week3,
        indoor,
    ]
}

fn roster_row(id: &str, team: &str, status: &str) -> RosterEntry {
    RosterEntry {
        gsis_id: Some(id.to_string()),
        team: Some(team.to_string()),
        status: Some(status.to_string()),
        position: Some("K".to_string()),
    }
}

// ── Stubs ──

#[derive(Default)]
struct StubStats {
    fail_plays: bool,
    fail_roster: bool,
    /// Game left off the schedule, idling both teams that week.
    drop_game: Option<&'static str>,
    play_calls: AtomicU32,
}

#[async_trait]
impl StatsProvider for StubStats {
    async fn load_plays(&self, _season: u32) -> Result<Vec<Play>> {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_plays {
            bail!("503 Service Unavailable");
        }
        Ok(plays())
    }

    async fn load_schedule(&self, _season: u32) -> Result<Vec<Game>> {
        Ok(schedule()
            .into_iter()
            .filter(|g| Some(g.game_id.as_str()) != self.drop_game)
            .collect())
    }

    async fn load_rosters(&self, _season: u32) -> Result<Vec<RosterEntry>> {
        if self.fail_roster {
            bail!("connection reset");
        }
        Ok(vec![
            roster_row("00-A", "DAL", "ACT"),
            roster_row("00-B", "BAL", "ACT"),
            roster_row("00-C", "KC", "RES"),
        ])
    }

    async fn load_players(&self) -> Result<Vec<PlayerInfo>> {
        Ok(vec![PlayerInfo {
            gsis_id: Some("00-A".to_string()),
            headshot: Some("https://img.example/aubrey.png".to_string()),
        }])
    }
}

struct StubInjuries;

#[async_trait]
impl InjuryFeed for StubInjuries {
    async fn fetch_injury_reports(&self) -> Vec<InjuryReport> {
        vec![
            InjuryReport {
                name: "Justin Tucker".to_string(),
                status: "Questionable".to_string(),
                detail: "Hip".to_string(),
                position: Some("K".to_string()),
            },
            InjuryReport {
                name: "Brandon Aiyuk".to_string(),
                status: "Out".to_string(),
                detail: "Knee".to_string(),
                position: Some("WR".to_string()),
            },
        ]
    }
}

struct StubOwnership;

#[async_trait]
impl OwnershipFeed for StubOwnership {
    async fn fetch_ownership(&self) -> Vec<Ownership> {
        vec![Ownership { name: "Brandon Aubrey".to_string(), pct: 88.0 }]
    }
}

#[derive(Default)]
struct CalmWeather {
    calls: AtomicU32,
}

#[async_trait]
impl WeatherFeed for CalmWeather {
    async fn hourly(&self, _lat: f64, _lon: f64) -> Result<HourlyForecast> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HourlyForecast {
            time: vec!["2025-09-21T12:00".to_string(), "2025-09-21T13:00".to_string()],
            temperature_2m: vec![Some(72.0), Some(74.0)],
            precipitation_probability: vec![Some(0.0), Some(5.0)],
            wind_speed_10m: vec![Some(3.0), Some(5.2)],
        })
    }
}

// ── Harness ──

fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.season.force_week = Some(3);
    config.provider.max_attempts = 2;
    config.provider.retry_delay_ms = 0;
    config.weather.backoff_base_ms = 0;
    config.output.path = dir.join("kicker_data.json").to_string_lossy().into_owned();
    config.output.history_path = dir.join("history_data.json").to_string_lossy().into_owned();
    config
}

fn friday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 19)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

async fn run_with(stats: &StubStats, weather: &CalmWeather, config: &Config) -> Result<RunOutput> {
    let feeds = Feeds {
        stats,
        injuries: &StubInjuries,
        ownership: &StubOwnership,
        weather,
    };
    let store = JsonFileHistory::new(&config.output.history_path);
    pipeline::run(config, &feeds, &store, 3, friday_morning(), &mut StdRng::seed_from_u64(5)).await
}

// ── Tests ──

#[tokio::test]
async fn test_full_run_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let stats = StubStats::default();
    let weather = CalmWeather::default();

    let out = run_with(&stats, &weather, &config).await.unwrap();
    let doc = &out.document;

    assert_eq!(doc.meta.week, 3);
    assert_eq!(doc.meta.updated, "2025-09-19 10:00");
    // Only the open-air game needs a forecast.
    assert_eq!(weather.calls.load(Ordering::SeqCst), 1);

    assert_eq!(doc.ytd.len(), 3);
    assert_eq!(doc.ytd[0].kicker_player_id, "00-A");
    assert_eq!(doc.ytd[0].fpts, Some(16.0));
    assert_eq!(doc.rankings.len(), 3);

    let aubrey = doc.rankings.iter().find(|r| r.kicker.kicker_player_id == "00-A").unwrap();
    assert_eq!(aubrey.opponent, "PHI");
    assert!(aubrey.is_home);
    assert_eq!(aubrey.vegas_total, Some(44.0));
    assert_eq!(aubrey.vegas_implied, Some(25.0));
    assert_eq!(aubrey.spread_display, "-6.0");
    assert_eq!(aubrey.weather_desc, "5mph ☀️");
    assert_eq!(aubrey.kicker.own_pct, Some(88.0));
    assert_eq!(aubrey.kicker.headshot_url, "https://img.example/aubrey.png");
    assert_eq!(aubrey.kicker.avg_pts, Some(8.0));
    assert_eq!(aubrey.history.l3_games, 2);
    assert_eq!(aubrey.history.l3_actual, 16.0);
    assert_eq!(aubrey.history.l3_proj, 16.0);
    assert!(aubrey.proj.unwrap() > 0.0);
    assert!(!aubrey.narrative.is_empty());

    let tucker = doc.rankings.iter().find(|r| r.kicker.kicker_player_id == "00-B").unwrap();
    assert_eq!(tucker.kicker.injury_status, InjuryStatus::Questionable);
    assert_eq!(tucker.kicker.injury_details, "Questionable (Hip)");
    assert_eq!(tucker.kicker.headshot_url, config.output.placeholder_headshot);
    assert!(tucker.is_dome);
    assert!(tucker.grade_details.contains(&"+10 Dome".to_string()));
    assert_eq!(tucker.spread_display, "+0.0");
    assert_eq!(tucker.vegas_implied, Some(22.0));

    // Reserve list zeroes the row and sorts it last.
    let last = doc.rankings.last().unwrap();
    assert_eq!(last.kicker.kicker_player_id, "00-C");
    assert_eq!(last.kicker.injury_status, InjuryStatus::Ir);
    assert_eq!(last.grade, Some(0.0));
    assert_eq!(last.proj, Some(0.0));
    assert_eq!(last.grade_details.last().map(String::as_str), Some("Unavailable (IR)"));

    let projs: Vec<f64> = doc.rankings.iter().filter_map(|r| r.proj).collect();
    assert!(projs.windows(2).all(|w| w[0] >= w[1]));

    let hurt: Vec<&str> = doc.injuries.iter().map(|k| k.kicker_player_id.as_str()).collect();
    assert_eq!(hurt.len(), 2);
    assert!(hurt.contains(&"00-B") && hurt.contains(&"00-C"));

    // Last week's actuals are stored and stamped with the backtest projection.
    let week2 = out.history.get(2).unwrap();
    let stored = week2.iter().find(|r| r.id == "00-A").unwrap();
    assert_eq!(stored.act, 4.0);
    assert_eq!(stored.proj, Some(8.0));
    assert!(out.history.get(1).is_none());
    assert!(doc.meta.history.contains_key(&2));
}

#[tokio::test]
async fn test_publish_writes_clean_json_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let stats = StubStats::default();
    let weather = CalmWeather::default();

    let out = run_with(&stats, &weather, &config).await.unwrap();
    let store = JsonFileHistory::new(&config.output.history_path);
    pipeline::publish(&config, &out, &store).unwrap();

    let text = std::fs::read_to_string(&config.output.path).unwrap();
    assert!(!text.contains("NaN"));
    assert!(!text.contains("Infinity"));
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["meta"]["week"], 3);
    assert!(parsed["meta"]["league_avgs"]["fpts"].is_number());
    assert_eq!(parsed["rankings"].as_array().unwrap().len(), 3);
    assert_eq!(parsed["meta"]["history"]["2"].as_array().unwrap().len(), 3);

    // A second run keeps the stored week rather than recomputing it.
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, out.history);
    let again = run_with(&stats, &weather, &config).await.unwrap();
    assert_eq!(again.history, out.history);
}

#[tokio::test]
async fn test_provider_exhaustion_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let stats = StubStats { fail_plays: true, ..StubStats::default() };
    let weather = CalmWeather::default();

    let err = run_with(&stats, &weather, &config).await.err().unwrap();
    assert!(format!("{:#}", err).contains("play-by-play failed after 2 attempts"));
    assert_eq!(stats.play_calls.load(Ordering::SeqCst), 2);
    assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    assert!(!std::path::Path::new(&config.output.path).exists());
}

#[tokio::test]
async fn test_roster_failure_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let stats = StubStats { fail_roster: true, ..StubStats::default() };
    let weather = CalmWeather::default();

    let out = run_with(&stats, &weather, &config).await.unwrap();
    let butker = out
        .document
        .rankings
        .iter()
        .find(|r| r.kicker.kicker_player_id == "00-C")
        .unwrap();
    assert_eq!(butker.kicker.injury_status, InjuryStatus::Healthy);
    assert!(butker.grade.unwrap() > 0.0);
    assert_eq!(out.document.injuries.len(), 1);
}

#[tokio::test]
async fn test_idle_teams_still_stamp_past_projections() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let stats = StubStats { drop_game: Some("2025_03_KC_BAL"), ..StubStats::default() };
    let weather = CalmWeather::default();

    let out = run_with(&stats, &weather, &config).await.unwrap();
    let ranked: Vec<&str> = out
        .document
        .rankings
        .iter()
        .map(|r| r.kicker.kicker_player_id.as_str())
        .collect();
    assert_eq!(ranked, vec!["00-A"]);
    assert_eq!(out.document.ytd.len(), 3);

    // Week 2 BAL at KC: 45 total, KC -3, so 24 / 21 and a flat multiplier.
    let week2 = out.history.get(2).unwrap();
    let proj = |id: &str| week2.iter().find(|r| r.id == id).and_then(|r| r.proj);
    assert_eq!(proj("00-A"), Some(8.0));
    assert_eq!(proj("00-B"), Some(5.0));
    assert_eq!(proj("00-C"), Some(5.5));
}
