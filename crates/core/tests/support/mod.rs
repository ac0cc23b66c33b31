//! Shared test helpers for `opsdesk-core` integration tests.
//!
//! In-memory stand-ins for the idle ports: a recording ledger whose open and
//! close calls can be made to fail or stall, a manually driven activity
//! source, and a notifier that records resume notices.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsdesk_core::{
    ActivitySink, ActivitySource, ActivitySubscription, BreakLedger, BreakNotifier,
    IdleDependencies, MonotonicClock,
};
use opsdesk_domain::{ActivityKind, BreakClosure, BreakId, IdleConfig, OpsDeskError, Result};
use parking_lot::Mutex;
use uuid::Uuid;

/// Recorded `open_auto_idle_break` call.
#[derive(Debug, Clone)]
pub struct OpenCall {
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub issued: BreakId,
}

/// Recorded `close_break` call.
#[derive(Debug, Clone)]
pub struct CloseCall {
    pub id: BreakId,
    pub closure: BreakClosure,
}

/// Ledger double that records every call.
#[derive(Default)]
pub struct RecordingLedger {
    opens: Mutex<Vec<OpenCall>>,
    closes: Mutex<Vec<CloseCall>>,
    fail_open: AtomicBool,
    fail_close: AtomicBool,
    open_delay: Mutex<Option<Duration>>,
    close_delay: Mutex<Option<Duration>>,
}

impl RecordingLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_open() -> Arc<Self> {
        let ledger = Self::default();
        ledger.fail_open.store(true, Ordering::SeqCst);
        Arc::new(ledger)
    }

    pub fn failing_close() -> Arc<Self> {
        let ledger = Self::default();
        ledger.fail_close.store(true, Ordering::SeqCst);
        Arc::new(ledger)
    }

    /// Make open requests take `delay` of (tokio) time before answering.
    pub fn delay_open(&self, delay: Duration) {
        *self.open_delay.lock() = Some(delay);
    }

    /// Make close requests take `delay` before they are recorded.
    pub fn delay_close(&self, delay: Duration) {
        *self.close_delay.lock() = Some(delay);
    }

    pub fn opens(&self) -> Vec<OpenCall> {
        self.opens.lock().clone()
    }

    pub fn closes(&self) -> Vec<CloseCall> {
        self.closes.lock().clone()
    }
}

#[async_trait]
impl BreakLedger for RecordingLedger {
    async fn open_auto_idle_break(
        &self,
        user_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<BreakId> {
        let delay = *self.open_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_open.load(Ordering::SeqCst) {
            return Err(OpsDeskError::Network("backend unreachable".into()));
        }

        let issued = BreakId::new(Uuid::new_v4().to_string());
        self.opens.lock().push(OpenCall {
            user_id: user_id.to_string(),
            started_at,
            issued: issued.clone(),
        });
        Ok(issued)
    }

    async fn close_break(&self, id: &BreakId, closure: BreakClosure) -> Result<()> {
        let delay = *self.close_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.closes.lock().push(CloseCall { id: id.clone(), closure });
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(OpsDeskError::Backend("503 service unavailable".into()));
        }
        Ok(())
    }
}

/// Activity source driven by the test.
#[derive(Default)]
pub struct ManualActivitySource {
    sinks: Arc<Mutex<Vec<(u64, ActivitySink)>>>,
    next_id: AtomicU64,
    subscribed_kinds: Mutex<Vec<ActivityKind>>,
}

impl ManualActivitySource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver one event to every subscriber.
    pub fn emit(&self, kind: ActivityKind) {
        for (_, sink) in self.sinks.lock().iter() {
            let _ = sink.send(kind);
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.sinks.lock().len()
    }

    pub fn subscribed_kinds(&self) -> Vec<ActivityKind> {
        self.subscribed_kinds.lock().clone()
    }
}

impl ActivitySource for ManualActivitySource {
    fn subscribe(
        &self,
        kinds: &[ActivityKind],
        sink: ActivitySink,
    ) -> Result<ActivitySubscription> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sinks.lock().push((id, sink));
        *self.subscribed_kinds.lock() = kinds.to_vec();

        let sinks = Arc::clone(&self.sinks);
        Ok(ActivitySubscription::new(move || {
            sinks.lock().retain(|(existing, _)| *existing != id);
        }))
    }
}

/// Notifier that records `(user_id, minutes)` pairs.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, i64)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<(String, i64)> {
        self.notices.lock().clone()
    }
}

impl BreakNotifier for RecordingNotifier {
    fn break_recorded(&self, user_id: &str, minutes: i64) {
        self.notices.lock().push((user_id.to_string(), minutes));
    }
}

/// Wired doubles plus the dependency bundle built from them.
pub struct Harness {
    pub ledger: Arc<RecordingLedger>,
    pub source: Arc<ManualActivitySource>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_ledger(RecordingLedger::new())
    }

    pub fn with_ledger(ledger: Arc<RecordingLedger>) -> Self {
        Self { ledger, source: ManualActivitySource::new(), notifier: RecordingNotifier::new() }
    }

    /// Must be called inside the (paused) test runtime so the clock anchors
    /// to tokio time.
    pub fn deps(&self) -> IdleDependencies {
        IdleDependencies {
            ledger: self.ledger.clone(),
            source: self.source.clone(),
            notifier: self.notifier.clone(),
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}

pub const THRESHOLD: Duration = Duration::from_secs(300);

pub fn config() -> IdleConfig {
    IdleConfig::default()
}

/// Let spawned tasks run to completion without moving time meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
