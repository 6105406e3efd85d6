use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// ESPN schedule timestamps carry minutes but no seconds, e.g. `2025-06-01T17:10Z`.
pub const ESPN_DATE_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

/// Calculate the difference between two dates in whole days, truncated toward zero
pub fn days_between(date1: DateTime<Utc>, date2: DateTime<Utc>) -> i64 {
    (date2 - date1).num_days()
}

/// Parse an ESPN game date. Anything other than the exact minute-precision
/// UTC format is rejected.
pub fn parse_game_date(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, ESPN_DATE_FORMAT)
        .with_context(|| format!("time data '{}' does not match format '{}'", raw, ESPN_DATE_FORMAT))?;
    Ok(naive.and_utc())
}
