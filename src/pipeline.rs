//! One sequential run: ingest, aggregate, score, assemble the document.
//!
//! Provider retry exhaustion for plays, schedule or players is fatal and
//! propagates out of [`run`]. Everything else degrades with a warning.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use rand::Rng;

use crate::config::Config;
use crate::engine::form::{self, FormStatus, FormWeek};
use crate::engine::grade::{self, GradeInputs, GradeResult};
use crate::engine::kicks::{self, KickLine, KickerSeason, WeekActual};
use crate::engine::matchup::{self, MatchupSide};
use crate::engine::narrative::{self, NarrativeInputs};
use crate::engine::status::{self, NameIndex, NameMatch, StatusResolution};
use crate::engine::{mean, round1, TeamContext};
use crate::feed::retry::with_backoff;
use crate::feed::types::{Ownership, Play};
use crate::feed::{InjuryFeed, OwnershipFeed, StatsProvider, WeatherFeed};
use crate::history::{History, HistoryStore};
use crate::output::{finite, write_atomic, FeedDocument, KickerRow, LeagueAvgs, Meta, RankingRow};
use crate::season::{self, Window};

/// The external collaborators a run reads from.
pub struct Feeds<'a> {
    pub stats: &'a dyn StatsProvider,
    pub injuries: &'a dyn InjuryFeed,
    pub ownership: &'a dyn OwnershipFeed,
    pub weather: &'a dyn WeatherFeed,
}

pub struct RunOutput {
    pub document: FeedDocument,
    pub history: History,
}

pub async fn run<R: Rng + ?Sized>(
    config: &Config,
    feeds: &Feeds<'_>,
    store: &dyn HistoryStore,
    target_week: u32,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<RunOutput> {
    let year = config.season.year;
    let attempts = config.provider.max_attempts;
    let delay = Duration::from_millis(config.provider.retry_delay_ms);
    tracing::info!(season = year, week = target_week, "starting run");

    // ── Ingestion ──
    let plays = with_backoff("play-by-play", attempts, delay, || feeds.stats.load_plays(year)).await?;
    let games = with_backoff("schedule", attempts, delay, || feeds.stats.load_schedule(year)).await?;
    let roster = match with_backoff("rosters", attempts, delay, || feeds.stats.load_rosters(year)).await {
        Ok(roster) => roster,
        Err(e) => {
            tracing::warn!(error = %e, "roster unavailable, treating every kicker as active");
            Vec::new()
        }
    };
    let players = with_backoff("players", attempts, delay, || feeds.stats.load_players()).await?;
    let reports = feeds.injuries.fetch_injury_reports().await;
    let ownership = feeds.ownership.fetch_ownership().await;
    tracing::info!(
        plays = plays.len(),
        games = games.len(),
        roster = roster.len(),
        players = players.len(),
        injury_reports = reports.len(),
        ownership_rows = ownership.len(),
        "ingested"
    );

    // ── Aggregation ──
    let kickers = kicks::apply_roster(kicks::aggregate_season(&plays, &config.scoring), &roster);
    let latest_week = plays.iter().map(|p| p.week).max().unwrap_or(0);
    let window = Window::trailing(target_week, latest_week, config.season.window_weeks);
    let ctx = TeamContext::build(&plays, &games, window);
    let statuses = status::resolve_kickers(&kickers, &roster, &reports);
    let elite = grade::elite_threshold(&kickers);
    tracing::info!(kickers = kickers.len(), elite_threshold = elite, "kickers aggregated");

    // ── History and recent form ──
    let mut history = store.load()?;
    record_last_week(&mut history, &plays, target_week, config);
    let form_weeks = season::recent_weeks(target_week, config.season.form_weeks);
    let actuals: HashMap<u32, Vec<WeekActual>> = form_weeks
        .iter()
        .map(|&w| (w, kicks::weekly_actuals(&plays, w, &config.scoring)))
        .collect();
    let points = form::weekly_points(&actuals);

    // ── Matchups ──
    let convention = config.provider.spread_convention;
    let sides = matchup::build(&games, target_week, convention, feeds.weather, &config.weather, now).await;

    // ── Rows ──
    let week_lines = kicks::weekly_line(&plays, target_week);
    let headshots: HashMap<&str, &str> = players
        .iter()
        .filter_map(|p| Some((p.gsis_id.as_deref()?, p.headshot.as_deref()?)))
        .collect();
    let own_index = NameIndex::build(&ownership, |o: &Ownership| o.name.as_str());

    let mut ytd = Vec::with_capacity(kickers.len());
    let mut rankings = Vec::new();
    for kicker in &kickers {
        let resolution = statuses.get(&kicker.id).cloned().unwrap_or_else(StatusResolution::healthy);
        let own_pct = match own_index.lookup(&kicker.name) {
            NameMatch::One(o) => o.pct,
            NameMatch::None | NameMatch::Many(_) => 0.0,
        };
        let headshot = headshots
            .get(kicker.id.as_str())
            .map(|h| h.to_string())
            .unwrap_or_else(|| config.output.placeholder_headshot.clone());
        let week_line = week_lines.get(&kicker.id).copied().unwrap_or_default();
        let row = kicker_row(kicker, &ctx, &resolution, headshot, own_pct, week_line);

        // Past weeks are backtested even for teams idle in the target week.
        let form = form::backtest(kicker, &games, &points, &form_weeks, convention);
        for week in form.iter().filter(|w| w.status == FormStatus::Active) {
            history.stamp_proj(week.week, &kicker.id, week.proj);
        }
        if let Some(side) = sides.get(&kicker.team) {
            rankings.push(ranking_row(
                row.clone(),
                kicker,
                side,
                &ctx,
                &resolution,
                elite,
                target_week,
                form,
                rng,
            ));
        }
        ytd.push(row);
    }

    let fpts: Vec<f64> = kickers.iter().map(|k| k.fpts).collect();
    let meta = Meta {
        week: target_week,
        updated: now.format("%Y-%m-%d %H:%M").to_string(),
        league_avgs: LeagueAvgs {
            fpts: mean(&fpts).map(round1).and_then(finite),
            off_stall: ctx.stall_window.league_offense().map(round1).and_then(finite),
            def_stall: ctx.stall_window.league_defense().map(round1).and_then(finite),
            l4_off_ppg: ctx.league_off_ppg().map(round1).and_then(finite),
            l4_def_pa: ctx.league_def_pa().map(round1).and_then(finite),
        },
        history: history.history.clone(),
    };
    let document = FeedDocument::assemble(meta, rankings, ytd);
    tracing::info!(
        rankings = document.rankings.len(),
        ytd = document.ytd.len(),
        injuries = document.injuries.len(),
        "document assembled"
    );
    Ok(RunOutput { document, history })
}

/// Store last week's actuals unless that week is already stored. A week the
/// provider has no kicks for yet is left for a later run.
fn record_last_week(history: &mut History, plays: &[Play], target_week: u32, config: &Config) {
    let Some(last) = target_week.checked_sub(1).filter(|w| *w >= 1) else {
        return;
    };
    if history.get(last).is_some() {
        return;
    }
    let actuals = kicks::weekly_actuals(plays, last, &config.scoring);
    if actuals.is_empty() {
        tracing::debug!(week = last, "no actuals yet for last week");
        return;
    }
    tracing::info!(week = last, kickers = actuals.len(), "recording weekly actuals");
    history.merge_if_absent(last, actuals);
}

fn kicker_row(
    k: &KickerSeason,
    ctx: &TeamContext,
    resolution: &StatusResolution,
    headshot_url: String,
    own_pct: f64,
    week_line: KickLine,
) -> KickerRow {
    let line = &k.line;
    KickerRow {
        kicker_player_id: k.id.clone(),
        kicker_player_name: k.name.clone(),
        team: k.team.clone(),
        fg_0_19: line.fg_made[0],
        fg_20_29: line.fg_made[1],
        fg_30_39: line.fg_made[2],
        fg_40_49: line.fg_made[3],
        fg_50_59: line.fg_made[4],
        fg_60_plus: line.fg_made[5],
        fg_miss_0_19: line.fg_miss[0],
        fg_miss_20_29: line.fg_miss[1],
        fg_miss_30_39: line.fg_miss[2],
        fg_miss_40_49: line.fg_miss[3],
        fg_miss_50_59: line.fg_miss[4],
        fg_miss_60_plus: line.fg_miss[5],
        fg_made: line.fg_made_total(),
        fg_miss: line.fg_miss_total(),
        fg_att: line.fg_att(),
        xp_made: line.xp_made,
        xp_miss: line.xp_miss,
        fpts: finite(round1(k.fpts)),
        real_pts: line.real_points(),
        games: k.games,
        avg_pts: finite(k.avg_pts()),
        acc: finite(k.accuracy()),
        dome_pct: finite(k.dome_pct()),
        rz_trips: ctx.rz_trips.get(&k.team).copied().unwrap_or(0),
        off_stall_rate_ytd: finite(ctx.stall_season.offense.get(&k.team).copied().unwrap_or(0.0)),
        def_stall_rate_ytd: finite(ctx.stall_season.defense.get(&k.team).copied().unwrap_or(0.0)),
        join_name: status::normalize_name(&k.name),
        headshot_url,
        own_pct: finite(own_pct),
        injury_status: resolution.status,
        injury_color: resolution.color(),
        injury_details: resolution.details.clone(),
        week_line,
    }
}

#[allow(clippy::too_many_arguments)]
fn ranking_row<R: Rng + ?Sized>(
    kicker_row: KickerRow,
    k: &KickerSeason,
    side: &MatchupSide,
    ctx: &TeamContext,
    resolution: &StatusResolution,
    elite: f64,
    target_week: u32,
    form: Vec<FormWeek>,
    rng: &mut R,
) -> RankingRow {
    let team = |table: &HashMap<String, f64>, key: &str| table.get(key).copied().unwrap_or(0.0);
    let inputs = GradeInputs {
        avg_pts: k.avg_pts(),
        fpts: k.fpts,
        elite_threshold: elite,
        off_stall: team(&ctx.stall_window.offense, &k.team),
        def_stall: team(&ctx.stall_window.defense, &side.opponent),
        league_off_stall: ctx.stall_window.league_offense(),
        league_def_stall: ctx.stall_window.league_defense(),
        is_dome: side.is_dome,
        wind_mph: side.conditions.wind_mph,
        sky: side.conditions.sky,
        home_field: side.home_field.clone(),
        spread: side.spread(),
        aggression: team(&ctx.aggression, &k.team),
        status: resolution.status,
        vegas_implied: side.implied(),
        off_ppg: team(&ctx.points.off_ppg, &k.team),
        def_pa: team(&ctx.points.def_pa, &side.opponent),
        off_share: ctx.share.offense.get(&k.team).copied(),
        def_share: ctx.share.defense.get(&side.opponent).copied(),
    };
    let GradeResult {
        grade,
        proj,
        details,
        off_score,
        def_score,
        w_team_score,
        w_def_allowed,
        off_cap,
        def_cap,
        ..
    } = grade::score(&inputs);
    tracing::debug!(kicker = %k.name, grade, proj, ?details, "graded");

    let narrative = narrative::compose(
        &NarrativeInputs {
            name: &k.name,
            team: &k.team,
            week: target_week,
            status: resolution.status,
            grade,
            vegas_implied: inputs.vegas_implied,
            is_dome: side.is_dome,
            wind_mph: side.conditions.wind_mph,
            off_stall: inputs.off_stall,
            league_off_stall: inputs.league_off_stall,
        },
        rng,
    );

    RankingRow {
        kicker: kicker_row,
        opponent: side.opponent.clone(),
        is_home: side.is_home,
        home_field: side.home_field.clone(),
        game_dt: side.game_dt.clone(),
        is_dome: side.is_dome,
        wind: finite(side.conditions.wind_mph),
        weather_desc: side.conditions.descriptor.clone(),
        vegas_total: finite(side.lines.total),
        vegas_implied: finite(inputs.vegas_implied),
        spread_display: side.spread_display(),
        off_stall_rate: finite(inputs.off_stall),
        def_stall_rate: finite(inputs.def_stall),
        off_ppg: finite(inputs.off_ppg),
        def_pa: finite(inputs.def_pa),
        aggression_pct: finite(inputs.aggression),
        off_share: inputs.off_share.and_then(finite),
        def_share: inputs.def_share.and_then(finite),
        grade: finite(grade),
        proj: finite(proj),
        grade_details: details,
        off_score_val: finite(off_score),
        def_score_val: finite(def_score),
        w_team_score: finite(w_team_score),
        w_def_allowed: finite(w_def_allowed),
        off_cap_val: finite(off_cap),
        def_cap_val: finite(def_cap),
        narrative,
        history: form::summarize(&form),
        form,
    }
}

/// Write the document, then persist history. Nothing is written if
/// serialization fails.
pub fn publish(config: &Config, output: &RunOutput, store: &dyn HistoryStore) -> Result<()> {
    let body = output.document.to_json()?;
    write_atomic(Path::new(&config.output.path), &body)?;
    store.save(&output.history)?;
    tracing::info!(
        path = %config.output.path,
        history_weeks = output.history.len(),
        "published"
    );
    Ok(())
}
