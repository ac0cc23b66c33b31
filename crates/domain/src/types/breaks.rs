//! Break ledger records
//!
//! A break is opened with a start time and closed exactly once with an end
//! time and a whole-minute duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_wire_name;

/// Identifier assigned to a break record by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakId(String);

impl BreakId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BreakId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of break. The idle monitor only ever creates `AutoIdle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    Manual,
    AutoIdle,
}

impl_wire_name!(BreakType {
    Manual => "manual",
    AutoIdle => "auto_idle",
});

/// Break record as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRecord {
    pub id: BreakId,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    pub break_type: BreakType,
}

impl BreakRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Insert payload for a new open break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBreak {
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub break_type: BreakType,
}

impl NewBreak {
    pub fn auto_idle(user_id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self { user_id: user_id.into(), start_time, break_type: BreakType::AutoIdle }
    }
}

/// Patch payload that closes an open break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakClosure {
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl BreakClosure {
    /// Build the closure for a break that started at `started_at`.
    pub fn between(started_at: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self { end_time, duration_minutes: elapsed_whole_minutes(started_at, end_time) }
    }
}

/// Whole minutes from `start` to `end`, floored. Clock skew yields 0.
pub fn elapsed_whole_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes().max(0)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap()
    }

    #[test]
    fn minutes_are_floored() {
        let start = t0();
        assert_eq!(elapsed_whole_minutes(start, start + Duration::milliseconds(125_000)), 2);
        assert_eq!(elapsed_whole_minutes(start, start + Duration::milliseconds(59_999)), 0);
        assert_eq!(elapsed_whole_minutes(start, start + Duration::minutes(7)), 7);
    }

    #[test]
    fn negative_elapsed_clamps_to_zero() {
        let start = t0();
        assert_eq!(elapsed_whole_minutes(start, start - Duration::minutes(3)), 0);
    }

    #[test]
    fn closure_between_computes_duration() {
        let start = t0();
        let end = start + Duration::seconds(605);
        let closure = BreakClosure::between(start, end);
        assert_eq!(closure.end_time, end);
        assert_eq!(closure.duration_minutes, 10);
    }

    #[test]
    fn break_type_wire_names() {
        assert_eq!(serde_json::to_value(BreakType::AutoIdle).unwrap(), "auto_idle");
        assert_eq!(BreakType::AutoIdle.to_string(), crate::constants::AUTO_IDLE_BREAK_TYPE);
        assert_eq!(BreakType::from_str("AUTO_IDLE").unwrap(), BreakType::AutoIdle);
    }

    #[test]
    fn record_deserializes_open_row() {
        let json = r#"{
            "id": "8d1c0f0e-5c55-4b43-9d0f-6d1d0c2f9a10",
            "user_id": "u-42",
            "start_time": "2025-03-04T09:00:00Z",
            "end_time": null,
            "duration_minutes": null,
            "break_type": "auto_idle"
        }"#;
        let record: BreakRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_open());
        assert_eq!(record.id.as_str(), "8d1c0f0e-5c55-4b43-9d0f-6d1d0c2f9a10");
        assert_eq!(record.break_type, BreakType::AutoIdle);
    }

    #[test]
    fn break_id_is_transparent() {
        let id = BreakId::new("b-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"b-1\"");
    }
}
