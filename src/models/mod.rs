use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ── ESPN schedule structures ────────────────────────────────────────────────
//
// The site API drops keys and sends `null` freely. Missing or null keys fall
// back to their defaults. Events stay raw JSON until the scan reaches them, so
// a malformed event the scan never inspects cannot fail the check.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScheduleResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub events: Vec<Value>,
}

/// Treat an explicit `null` like an absent key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keep an explicit `null` as `Some(Value::Null)`, so it can be told apart
/// from an absent key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Non-null member of a JSON object.
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Read-only view over one raw schedule event, exposing only what the scan
/// for the latest home game looks at.
#[derive(Debug, Clone, Copy)]
pub struct RawEvent<'a>(pub &'a Value);

impl<'a> RawEvent<'a> {
    pub fn date(&self) -> Option<&'a str> {
        field(self.0, "date").and_then(Value::as_str)
    }

    pub fn is_regular_season(&self) -> bool {
        field(self.0, "season")
            .and_then(|s| field(s, "type"))
            .and_then(Value::as_f64)
            == Some(2.0)
    }

    pub fn is_completed(&self) -> bool {
        field(self.0, "status")
            .and_then(|s| field(s, "type"))
            .and_then(|t| field(t, "completed"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Competitors of the first competition. Missing lists read as empty; a
    /// list that is present but empty has no first element and is an error.
    pub fn competitors(&self) -> Result<&'a [Value]> {
        let Some(competitions) = field(self.0, "competitions") else {
            return Ok(&[]);
        };
        let first = first_entry(competitions, "competitions")?;
        match field(first, "competitors") {
            Some(competitors) => {
                first_entry(competitors, "competitors")?;
                Ok(competitors.as_array().map(Vec::as_slice).unwrap_or(&[]))
            }
            None => Ok(&[]),
        }
    }

    /// Full typed view of the event, built once the scan has selected it.
    pub fn parse(&self) -> Result<Event> {
        Event::deserialize(self.0)
            .map_err(|e| anyhow!("malformed event {}: {}", self.date().unwrap_or("?"), e))
    }
}

fn first_entry<'a>(list: &'a Value, key: &str) -> Result<&'a Value> {
    let items = list
        .as_array()
        .ok_or_else(|| anyhow!("`{}` is not a list", key))?;
    items
        .first()
        .ok_or_else(|| anyhow!("`{}` list index out of range", key))
}

/// `homeAway` of a raw competitor entry.
pub fn raw_is_home(competitor: &Value) -> bool {
    field(competitor, "homeAway").and_then(Value::as_str) == Some("home")
}

/// `team.abbreviation` of a raw competitor entry.
pub fn raw_abbreviation(competitor: &Value) -> Option<&str> {
    field(competitor, "team")
        .and_then(|t| field(t, "abbreviation"))
        .and_then(Value::as_str)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Event {
    pub date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Competition {
    #[serde(deserialize_with = "null_as_default")]
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Competitor {
    #[serde(deserialize_with = "null_as_default")]
    pub team: TeamRef,
    #[serde(deserialize_with = "null_as_default")]
    pub statistics: Vec<StatCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatCategory {
    pub name: Option<String>, // "pitching", "batting", ...
    #[serde(deserialize_with = "null_as_default")]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub name: Option<String>,
    /// ESPN sends numbers here, occasionally numeric strings. `None` when the
    /// key is absent, `Some(Null)` when it is sent as `null`.
    #[serde(deserialize_with = "present")]
    pub value: Option<Value>,
}

impl Event {
    /// Competitors of the first competition, empty when there is none.
    pub fn competitors(&self) -> &[Competitor] {
        self.competitions
            .first()
            .map(|c| c.competitors.as_slice())
            .unwrap_or(&[])
    }

    pub fn competitor(&self, abbreviation: &str) -> Option<&Competitor> {
        self.competitors()
            .iter()
            .find(|c| c.team.abbreviation.as_deref() == Some(abbreviation))
    }

    pub fn opponent_of(&self, abbreviation: &str) -> Option<&Competitor> {
        self.competitors()
            .iter()
            .find(|c| c.team.abbreviation.as_deref() != Some(abbreviation))
    }
}

impl Competitor {
    pub fn stat_category(&self, name: &str) -> impl Iterator<Item = &StatCategory> {
        let name = name.to_string();
        self.statistics
            .iter()
            .filter(move |s| s.name.as_deref() == Some(name.as_str()))
    }
}

// ── Deal domain ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Active,
    NotActive,
    Offseason,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Active    => "active",
            DealStatus::NotActive => "not active",
            DealStatus::Offseason => "offseason",
        }
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The game the decision was based on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub game_date: DateTime<Utc>,
    pub days_since: i64,
    pub strikeouts: i64,
    pub opponent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub status: DealStatus,
    pub game: Option<GameSummary>,
}

impl Assessment {
    pub fn offseason() -> Self {
        Self { status: DealStatus::Offseason, game: None }
    }
}

/// Static description of a promotion, as shown on the deals page.
#[derive(Debug, Clone, Serialize)]
pub struct Deal {
    pub team: &'static str,
    pub name: &'static str,
    pub condition: &'static str,
    pub instructions: &'static str,
}

pub const TIJUANA_FLATS: Deal = Deal {
    team:         "Tampa Bay Rays",
    name:         "Tijuana Flats Taco & Chips",
    condition:    "10+ strikeouts during a regular season home game",
    instructions: "Bring qualifying ticket or voucher to Kane's Showroom within 5 days. See kanesstrikeout.com.",
};

// JSON output envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_keys_default() {
        let schedule: ScheduleResponse = serde_json::from_value(json!({})).unwrap();
        assert!(schedule.events.is_empty());
        let schedule: ScheduleResponse = serde_json::from_value(json!({ "events": null })).unwrap();
        assert!(schedule.events.is_empty());

        let raw = json!({ "season": null, "status": { "type": { "completed": null } } });
        let event = RawEvent(&raw);
        assert!(event.date().is_none());
        assert!(!event.is_regular_season());
        assert!(!event.is_completed());
        assert!(event.competitors().unwrap().is_empty());

        let raw = json!({ "competitions": [{ "competitors": null }] });
        assert!(RawEvent(&raw).competitors().unwrap().is_empty());
    }

    #[test]
    fn test_unread_events_stay_raw() {
        let schedule: ScheduleResponse = serde_json::from_value(json!({
            "events": [{ "competitions": "tbd", "status": { "type": { "completed": "yes" } } }]
        }))
        .unwrap();
        assert_eq!(schedule.events.len(), 1);
    }

    #[test]
    fn test_empty_lists_have_no_first_entry() {
        let raw = json!({ "competitions": [] });
        let err = RawEvent(&raw).competitors().unwrap_err();
        assert!(err.to_string().contains("index out of range"));

        let raw = json!({ "competitions": [{ "competitors": [] }] });
        assert!(RawEvent(&raw).competitors().is_err());
    }

    #[test]
    fn test_raw_event_accessors() {
        let raw = json!({
            "date": "2025-06-01T17:10Z",
            "season": { "type": 2 },
            "status": { "type": { "completed": true } },
            "competitions": [{
                "competitors": [
                    { "homeAway": "home", "team": { "abbreviation": "TB" } },
                    { "homeAway": "away", "team": { "abbreviation": "NYY" } }
                ]
            }]
        });
        let event = RawEvent(&raw);

        assert!(event.is_regular_season());
        assert!(event.is_completed());
        let competitors = event.competitors().unwrap();
        assert!(raw_is_home(&competitors[0]));
        assert_eq!(raw_abbreviation(&competitors[1]), Some("NYY"));

        let parsed = event.parse().unwrap();
        assert!(parsed.competitor("TB").is_some());
        assert_eq!(
            parsed.opponent_of("TB").and_then(|c| c.team.abbreviation.as_deref()),
            Some("NYY")
        );
    }

    #[test]
    fn test_season_type_string_is_not_regular() {
        let raw = json!({ "season": { "type": "2" } });
        assert!(!RawEvent(&raw).is_regular_season());
    }

    #[test]
    fn test_stat_value_absent_vs_null() {
        let absent: Stat = serde_json::from_value(json!({ "name": "strikeouts" })).unwrap();
        assert!(absent.value.is_none());

        let null: Stat = serde_json::from_value(json!({ "name": "strikeouts", "value": null })).unwrap();
        assert_eq!(null.value, Some(Value::Null));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(DealStatus::Active.to_string(), "active");
        assert_eq!(DealStatus::NotActive.to_string(), "not active");
        assert_eq!(DealStatus::Offseason.to_string(), "offseason");
    }
}
