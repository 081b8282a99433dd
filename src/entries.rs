//! Journal entries and the rules deciding when the next one may be written

use chrono::Days;
use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::kind::Kind;

/// Interval in days used when the author does not pick one
pub const DEFAULT_ENTRY_INTERVAL: i64 = 30;

/// Journal entry
#[derive(Clone, Debug)]
pub struct Entry {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: Kind,
    pub is_public: bool,
    pub video_url: Option<String>,
    pub entry_interval: i64,
    pub next_entry_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Public journal entry, with the name of its author
#[derive(Clone, Debug)]
pub struct PublicEntry {
    pub entry: Entry,
    pub author_name: String,
}

/// Reasons an interval is refused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalError {
    /// Interval is zero or negative
    NotPositive,
}

/// Resolve the interval of a new entry
///
/// Falls back to [`DEFAULT_ENTRY_INTERVAL`](DEFAULT_ENTRY_INTERVAL), an interval has to be at
/// least one day
pub fn entry_interval(interval: Option<i64>) -> Result<i64, IntervalError> {
    match interval {
        None => Ok(DEFAULT_ENTRY_INTERVAL),
        Some(interval) if interval >= 1 => Ok(interval),
        Some(_) => Err(IntervalError::NotPositive),
    }
}

/// Date from which the next entry may be written
///
/// Adds calendar days, the time of day is kept. `None` when the interval is negative or the
/// date would overflow.
pub fn next_allowed_date(created_at: NaiveDateTime, interval_days: i64) -> Option<NaiveDateTime> {
    let days = u64::try_from(interval_days).ok()?;

    created_at.checked_add_days(Days::new(days))
}

/// Can a new entry be written at `now`?
///
/// Only the most recent entry of the author matters, the boundary itself is allowed
pub fn can_create_entry(last_entry: Option<&Entry>, now: NaiveDateTime) -> bool {
    last_entry.is_none_or(|entry| now >= entry.next_entry_date)
}
