//! Idle/active state machine
//!
//! Pure bookkeeping for one monitored session. The machine never performs
//! I/O; every transition returns the ledger request the caller must issue.
//!
//! Invariants:
//! - `is_idle` is true exactly while an idle period is in progress.
//! - At most one break id is held, and only while idle.
//! - A break is closed once; its duration is computed at close time.
//!
//! Open requests are asynchronous, so a period can end before its break id
//! arrives. Such periods are remembered until the open resolves and are then
//! closed with the resume timestamp.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use opsdesk_domain::{BreakClosure, BreakId, IdleSnapshot};

/// Ledger request produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdleEffect {
    /// Open an `auto_idle` break for idle period `period`.
    OpenBreak { period: u64, started_at: DateTime<Utc> },
    /// Close `id`. `notify` asks for the informational resume notice.
    CloseBreak { id: BreakId, closure: BreakClosure, notify: bool },
}

#[derive(Debug, Clone, Copy)]
struct UnresolvedOpen {
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    notify: bool,
}

/// Session state for the idle monitor.
#[derive(Debug, Clone)]
pub struct IdleMachine {
    is_idle: bool,
    idle_break_id: Option<BreakId>,
    idle_started_at: Option<DateTime<Utc>>,
    last_activity_at: DateTime<Utc>,
    period: u64,
    unresolved: BTreeMap<u64, UnresolvedOpen>,
}

impl IdleMachine {
    /// Active session whose last activity is `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            is_idle: false,
            idle_break_id: None,
            idle_started_at: None,
            last_activity_at: now,
            period: 0,
            unresolved: BTreeMap::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    pub fn idle_break_id(&self) -> Option<&BreakId> {
        self.idle_break_id.as_ref()
    }

    /// Whether any open request has not resolved yet.
    pub fn awaiting_open(&self) -> bool {
        !self.unresolved.is_empty()
    }

    pub fn snapshot(&self) -> IdleSnapshot {
        IdleSnapshot {
            is_idle: self.is_idle,
            idle_break_id: self.idle_break_id.clone(),
            idle_started_at: self.idle_started_at,
            last_activity: self.last_activity_at,
        }
    }

    /// The inactivity threshold elapsed.
    pub fn on_threshold(&mut self, now: DateTime<Utc>) -> Option<IdleEffect> {
        if self.is_idle {
            return None;
        }

        self.is_idle = true;
        self.idle_started_at = Some(now);
        self.period += 1;
        let pending = UnresolvedOpen { started_at: now, ended_at: None, notify: false };
        self.unresolved.insert(self.period, pending);

        Some(IdleEffect::OpenBreak { period: self.period, started_at: now })
    }

    /// A qualifying activity event arrived.
    pub fn on_activity(&mut self, now: DateTime<Utc>) -> Option<IdleEffect> {
        self.last_activity_at = now;
        if !self.is_idle {
            return None;
        }
        self.end_period(now, true)
    }

    /// The open request for `period` resolved.
    ///
    /// `opened` is `None` when the ledger call failed.
    pub fn on_open_resolved(&mut self, period: u64, opened: Option<BreakId>) -> Option<IdleEffect> {
        let pending = self.unresolved.remove(&period)?;
        let id = opened?;

        match pending.ended_at {
            Some(ended_at) => Some(IdleEffect::CloseBreak {
                id,
                closure: BreakClosure::between(pending.started_at, ended_at),
                notify: pending.notify,
            }),
            None if self.is_idle && self.period == period => {
                self.idle_break_id = Some(id);
                None
            }
            None => None,
        }
    }

    /// The monitor is being torn down.
    ///
    /// Returns the best-effort close for an idle period whose break is known.
    /// A period still waiting for its open is marked ended so the close can
    /// follow once the id arrives.
    pub fn on_dispose(&mut self, now: DateTime<Utc>) -> Option<IdleEffect> {
        if !self.is_idle {
            return None;
        }
        self.end_period(now, false)
    }

    fn end_period(&mut self, now: DateTime<Utc>, notify: bool) -> Option<IdleEffect> {
        self.is_idle = false;
        let started_at = self.idle_started_at.take().unwrap_or(now);

        if let Some(id) = self.idle_break_id.take() {
            return Some(IdleEffect::CloseBreak {
                id,
                closure: BreakClosure::between(started_at, now),
                notify,
            });
        }

        if let Some(pending) = self.unresolved.get_mut(&self.period) {
            pending.ended_at = Some(now);
            pending.notify = notify;
        }
        None
    }
}
