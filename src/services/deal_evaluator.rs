//! Decides whether the Rays strikeout deal is live.
//!
//! The deal turns on after a completed regular-season home game in which the
//! Rays pitching staff struck out at least [`STRIKEOUT_THRESHOLD`] batters, and
//! stays on for [`ACTIVE_WINDOW_DAYS`] days. Once the latest home game is more
//! than [`RECENCY_WINDOW_DAYS`] days old the team is treated as out of season.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::error::DealError;
use crate::models::{
    raw_abbreviation, raw_is_home, Assessment, DealStatus, Event, GameSummary, RawEvent,
    ScheduleResponse,
};
use crate::services::schedule_fetcher::{parse_schedule, FetchConfig, ScheduleFetcher};
use crate::utils::{days_between, parse_game_date};

pub const TARGET_TEAM: &str = "TB";
pub const STRIKEOUT_THRESHOLD: i64 = 10;
pub const ACTIVE_WINDOW_DAYS: i64 = 5;
pub const RECENCY_WINDOW_DAYS: i64 = 7;

const PITCHING: &str = "pitching";
const STRIKEOUTS: &str = "strikeouts";

/// How a game is recognised as a home game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeCheck {
    /// The first listed competitor is home. Does not look at who that
    /// competitor is.
    #[default]
    FirstSlot,
    /// The target team's own competitor entry is home.
    TargetTeam,
}

impl HomeCheck {
    fn is_home_game(&self, event: RawEvent<'_>) -> Result<bool> {
        let competitors = event.competitors()?;
        Ok(match self {
            HomeCheck::FirstSlot => competitors.first().is_some_and(raw_is_home),
            HomeCheck::TargetTeam => competitors
                .iter()
                .find(|c| raw_abbreviation(c) == Some(TARGET_TEAM))
                .is_some_and(raw_is_home),
        })
    }
}

/// Latest completed regular-season home game, scanning from the end of the
/// (chronologically ascending) schedule. Only the events the scan passes
/// over are inspected, and only the selected one is fully parsed.
pub fn latest_home_game(schedule: &ScheduleResponse, home_check: HomeCheck) -> Result<Option<Event>> {
    for raw in schedule.events.iter().rev().map(RawEvent) {
        if home_check.is_home_game(raw)? && raw.is_regular_season() && raw.is_completed() {
            return raw.parse().map(Some);
        }
    }
    Ok(None)
}

/// Strikeouts recorded by the target team's pitching line, 0 when absent.
pub fn team_strikeouts(event: &Event) -> Result<i64> {
    let Some(team) = event.competitor(TARGET_TEAM) else {
        tracing::debug!("No {} competitor in game {:?}", TARGET_TEAM, event.date);
        return Ok(0);
    };

    let mut strikeouts = 0;
    for category in team.stat_category(PITCHING) {
        for stat in category.stats.iter().filter(|s| s.name.as_deref() == Some(STRIKEOUTS)) {
            strikeouts = stat.value.as_ref().map_or(Ok(0), stat_as_int)
                .with_context(|| format!("bad {} value", STRIKEOUTS))?;
        }
    }
    Ok(strikeouts)
}

fn stat_as_int(value: &serde_json::Value) -> Result<i64> {
    use serde_json::Value;

    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
                .ok_or_else(|| anyhow!("number {} out of range", n)),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("invalid literal for int: '{}'", s)),
        other => Err(anyhow!("expected an integer, got {}", other)),
    }
}

/// Classify a parsed schedule as of `now`.
pub fn assess_schedule(
    schedule: &ScheduleResponse,
    now: DateTime<Utc>,
    home_check: HomeCheck,
) -> Result<Assessment> {
    let Some(game) = latest_home_game(schedule, home_check)? else {
        tracing::info!("No completed regular-season home game in {} events", schedule.events.len());
        return Ok(Assessment::offseason());
    };

    let raw_date = game.date.as_deref().ok_or_else(|| anyhow!("latest home game has no date"))?;
    let game_date = parse_game_date(raw_date)?;
    let days_since = days_between(game_date, now);

    if days_since > RECENCY_WINDOW_DAYS {
        tracing::info!("Latest home game {} is {} days old", raw_date, days_since);
        return Ok(Assessment::offseason());
    }

    let strikeouts = team_strikeouts(&game)?;
    tracing::info!(
        "Latest home game {}: {} strikeouts, {} days ago",
        raw_date, strikeouts, days_since
    );

    let status = if strikeouts >= STRIKEOUT_THRESHOLD && days_since <= ACTIVE_WINDOW_DAYS {
        DealStatus::Active
    } else {
        DealStatus::NotActive
    };

    Ok(Assessment {
        status,
        game: Some(GameSummary {
            game_date,
            days_since,
            strikeouts,
            opponent: game
                .opponent_of(TARGET_TEAM)
                .and_then(|c| c.team.abbreviation.clone()),
        }),
    })
}

/// Parse a raw schedule body and classify it.
pub fn assess_schedule_json(body: &str, now: DateTime<Utc>, home_check: HomeCheck) -> Result<Assessment> {
    let schedule = parse_schedule(body)?;
    assess_schedule(&schedule, now, home_check)
}

// ── DealEvaluator ────────────────────────────────────────────────────────────

pub struct DealEvaluator {
    config: FetchConfig,
    home_check: HomeCheck,
}

impl DealEvaluator {
    pub fn new(config: FetchConfig) -> Self {
        Self { config, home_check: HomeCheck::default() }
    }

    pub fn with_home_check(mut self, home_check: HomeCheck) -> Self {
        self.home_check = home_check;
        self
    }

    /// Fetch the schedule and assess it as of `now`. Every failure on the way,
    /// including building the client, comes back as a `DealError`.
    pub async fn assess(&self, now: DateTime<Utc>) -> Result<Assessment, DealError> {
        let result: Result<Assessment> = async {
            let fetcher = ScheduleFetcher::new(self.config.clone())?;
            let body = fetcher.fetch_schedule_body().await?;
            assess_schedule_json(&body, now, self.home_check)
        }
        .await;

        result.map_err(|e| {
            tracing::debug!("Deal check failed: {:#}", e);
            DealError::from(e)
        })
    }
}
