//! Idle tracking state exposed to display components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::breaks::BreakId;

/// Read-only view of a monitor's session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleSnapshot {
    pub is_idle: bool,
    pub idle_break_id: Option<BreakId>,
    pub idle_started_at: Option<DateTime<Utc>>,
    pub last_activity: DateTime<Utc>,
}
