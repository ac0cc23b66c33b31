//! Port interfaces for idle tracking
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsdesk_domain::{ActivityKind, BreakClosure, BreakId, Result};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Remote persistence for break records
#[async_trait]
pub trait BreakLedger: Send + Sync {
    /// Create an open `auto_idle` break for the user and return its id.
    async fn open_auto_idle_break(&self, user_id: &str, started_at: DateTime<Utc>)
        -> Result<BreakId>;

    /// Close a previously opened break.
    async fn close_break(&self, id: &BreakId, closure: BreakClosure) -> Result<()>;
}

/// Channel end the activity source pushes qualifying events into.
pub type ActivitySink = mpsc::UnboundedSender<ActivityKind>;

/// Host input-event notifications
pub trait ActivitySource: Send + Sync {
    /// Start delivering events of the given kinds into `sink`.
    ///
    /// Delivery stops when the returned subscription is dropped or
    /// unsubscribed.
    fn subscribe(&self, kinds: &[ActivityKind], sink: ActivitySink)
        -> Result<ActivitySubscription>;
}

/// Guard for an active activity subscription.
pub struct ActivitySubscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ActivitySubscription {
    /// Wrap the routine that removes the listeners.
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self { detach: Some(Box::new(detach)) }
    }

    /// Detach now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.detach_once();
    }

    fn detach_once(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ActivitySubscription {
    fn drop(&mut self) {
        self.detach_once();
    }
}

impl std::fmt::Debug for ActivitySubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivitySubscription").field("attached", &self.detach.is_some()).finish()
    }
}

/// Informational notices shown to the user
pub trait BreakNotifier: Send + Sync {
    /// An idle period was closed and recorded as `minutes` of break.
    fn break_recorded(&self, user_id: &str, minutes: i64);
}

/// Wall-clock source for ledger timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock anchored once and advanced by the tokio monotonic clock.
///
/// Durations between two readings follow the same clock as the idle timer,
/// so they are immune to wall-clock jumps and to paused test time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::anchored_at(Utc::now())
    }

    pub fn anchored_at(anchor_wall: DateTime<Utc>) -> Self {
        Self { anchor_wall, anchor: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.anchor.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor_wall + elapsed
    }
}
