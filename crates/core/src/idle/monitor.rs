//! Idle monitor task
//!
//! One tokio task per monitored session. It owns the [`IdleMachine`], a
//! single resettable threshold timer and the activity subscription, and it
//! publishes the read-only [`IdleSnapshot`] through a watch channel.
//!
//! Ledger requests run in their own tasks so a slow backend never delays
//! activity handling. Open results come back to the monitor over a channel;
//! close failures are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use opsdesk_domain::{
    ActivityKind, BreakClosure, BreakId, IdleConfig, IdleSnapshot, OpsDeskError, Result,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, trace, warn};

use super::machine::{IdleEffect, IdleMachine};
use super::ports::{ActivitySource, ActivitySubscription, BreakLedger, BreakNotifier, Clock};

/// Collaborators shared by every monitor a supervisor starts.
#[derive(Clone)]
pub struct IdleDependencies {
    pub ledger: Arc<dyn BreakLedger>,
    pub source: Arc<dyn ActivitySource>,
    pub notifier: Arc<dyn BreakNotifier>,
    pub clock: Arc<dyn Clock>,
}

/// Read-only view of a running monitor.
#[derive(Debug, Clone)]
pub struct IdleStatusView {
    receiver: watch::Receiver<IdleSnapshot>,
}

impl IdleStatusView {
    /// Latest published state.
    pub fn current(&self) -> IdleSnapshot {
        self.receiver.borrow().clone()
    }

    pub fn is_idle(&self) -> bool {
        self.receiver.borrow().is_idle
    }

    /// Wait for the next state change.
    ///
    /// Fails with [`OpsDeskError::MonitorInactive`] once the monitor is gone.
    pub async fn changed(&mut self) -> Result<IdleSnapshot> {
        self.receiver.changed().await.map_err(|_| OpsDeskError::MonitorInactive)?;
        Ok(self.receiver.borrow_and_update().clone())
    }
}

/// Handle to a running idle monitor.
///
/// Dropping the handle cancels the monitor; [`IdleMonitorHandle::shutdown`]
/// additionally waits for its teardown (including the best-effort close).
pub struct IdleMonitorHandle {
    user_id: String,
    status: watch::Receiver<IdleSnapshot>,
    cancellation: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl IdleMonitorHandle {
    /// Subscribe to activity and start monitoring `user_id`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(user_id: String, config: &IdleConfig, deps: IdleDependencies) -> Result<Self> {
        config.validate()?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let subscription = deps.source.subscribe(&ActivityKind::ALL, events_tx)?;

        let machine = IdleMachine::new(deps.clock.now());
        let (status_tx, status_rx) = watch::channel(machine.snapshot());
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();

        let monitor = MonitorTask {
            user_id: user_id.clone(),
            threshold: config.threshold(),
            close_timeout: config.close_timeout(),
            machine,
            deps,
            events: events_rx,
            subscription: Some(subscription),
            outcomes_tx,
            outcomes: outcomes_rx,
            closes: TaskTracker::new(),
            status: status_tx,
            cancellation: cancellation.clone(),
        };

        info!(user_id = %user_id, threshold_secs = config.threshold_seconds, "idle monitor started");
        let task = tokio::spawn(monitor.run());

        Ok(Self { user_id, status: status_rx, cancellation, task: Some(task) })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn status(&self) -> IdleStatusView {
        IdleStatusView { receiver: self.status.clone() }
    }

    /// Cancel the monitor and wait until it has detached and settled.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancellation.cancel();
        if let Some(task) = self.task.take() {
            task.await.map_err(|err| {
                OpsDeskError::Internal(format!("idle monitor task failed: {err}"))
            })?;
        }
        Ok(())
    }
}

impl Drop for IdleMonitorHandle {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

impl std::fmt::Debug for IdleMonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdleMonitorHandle")
            .field("user_id", &self.user_id)
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}

/// Result of an open request, routed back to the monitor.
struct OpenOutcome {
    period: u64,
    opened: Option<BreakId>,
}

struct MonitorTask {
    user_id: String,
    threshold: Duration,
    close_timeout: Duration,
    machine: IdleMachine,
    deps: IdleDependencies,
    events: mpsc::UnboundedReceiver<ActivityKind>,
    subscription: Option<ActivitySubscription>,
    outcomes_tx: mpsc::UnboundedSender<OpenOutcome>,
    outcomes: mpsc::UnboundedReceiver<OpenOutcome>,
    /// In-flight close requests; disposal waits for them.
    closes: TaskTracker,
    status: watch::Sender<IdleSnapshot>,
    cancellation: CancellationToken,
}

impl MonitorTask {
    async fn run(mut self) {
        // The only threshold timer; every activity moves its deadline.
        let timer = tokio::time::sleep(self.threshold);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                () = self.cancellation.cancelled() => break,

                Some(outcome) = self.outcomes.recv() => {
                    self.handle_open_outcome(outcome);
                }

                event = self.events.recv() => match event {
                    Some(kind) => {
                        timer.as_mut().reset(Instant::now() + self.threshold);
                        self.handle_activity(kind);
                    }
                    None => {
                        warn!(user_id = %self.user_id, "activity source closed; stopping idle monitor");
                        break;
                    }
                },

                () = &mut timer, if !self.machine.is_idle() => {
                    self.handle_threshold();
                }
            }
        }

        self.dispose().await;
    }

    fn handle_activity(&mut self, kind: ActivityKind) {
        trace!(user_id = %self.user_id, %kind, "activity");
        let now = self.deps.clock.now();
        let was_idle = self.machine.is_idle();
        let effect = self.machine.on_activity(now);

        if was_idle {
            info!(user_id = %self.user_id, %kind, "user active again");
            self.publish();
        } else {
            self.status.send_modify(|snapshot| snapshot.last_activity = now);
        }

        if let Some(effect) = effect {
            self.dispatch(effect);
        }
    }

    fn handle_threshold(&mut self) {
        let now = self.deps.clock.now();
        if let Some(effect) = self.machine.on_threshold(now) {
            info!(
                user_id = %self.user_id,
                threshold_secs = self.threshold.as_secs(),
                "no activity within threshold; user idle"
            );
            self.publish();
            self.dispatch(effect);
        }
    }

    fn handle_open_outcome(&mut self, outcome: OpenOutcome) {
        let effect = self.machine.on_open_resolved(outcome.period, outcome.opened);
        self.publish();

        if let Some(effect) = effect {
            debug!(
                user_id = %self.user_id,
                period = outcome.period,
                "idle period ended before its break opened"
            );
            self.dispatch(effect);
        }
    }

    fn publish(&self) {
        self.status.send_replace(self.machine.snapshot());
    }

    fn dispatch(&self, effect: IdleEffect) {
        match effect {
            IdleEffect::OpenBreak { period, started_at } => {
                let ledger = Arc::clone(&self.deps.ledger);
                let outcomes = self.outcomes_tx.clone();
                let user_id = self.user_id.clone();

                tokio::spawn(async move {
                    let opened = match ledger.open_auto_idle_break(&user_id, started_at).await {
                        Ok(id) => {
                            info!(user_id = %user_id, break_id = %id, "auto-idle break opened");
                            Some(id)
                        }
                        Err(err) => {
                            warn!(
                                user_id = %user_id,
                                error = %err,
                                error_kind = err.label(),
                                "failed to open auto-idle break; idle period not recorded"
                            );
                            None
                        }
                    };

                    if let Err(mpsc::error::SendError(outcome)) =
                        outcomes.send(OpenOutcome { period, opened })
                    {
                        if let Some(id) = outcome.opened {
                            error!(
                                user_id = %user_id,
                                break_id = %id,
                                "auto-idle break opened after monitor stopped; record left open"
                            );
                        }
                    }
                });
            }
            IdleEffect::CloseBreak { id, closure, notify } => {
                let ledger = Arc::clone(&self.deps.ledger);
                let notifier = Arc::clone(&self.deps.notifier);
                let user_id = self.user_id.clone();

                self.closes.spawn(async move {
                    if close_break(ledger.as_ref(), &user_id, &id, closure).await && notify {
                        notifier.break_recorded(&user_id, closure.duration_minutes);
                    }
                });
            }
        }
    }

    /// Detach from the source, then settle the ledger for an open idle period.
    async fn dispose(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        let now = self.deps.clock.now();
        if let Some(effect) = self.machine.on_dispose(now) {
            self.dispatch(effect);
        }
        self.publish();

        let deadline = Instant::now() + self.close_timeout;
        while self.machine.awaiting_open() {
            match tokio::time::timeout_at(deadline, self.outcomes.recv()).await {
                Ok(Some(outcome)) => {
                    if let Some(effect) =
                        self.machine.on_open_resolved(outcome.period, outcome.opened)
                    {
                        self.dispatch(effect);
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(user_id = %self.user_id, "timed out waiting for auto-idle break to open");
                    break;
                }
            }
        }

        // Resume closes still running plus the ones issued above.
        self.closes.close();
        if tokio::time::timeout_at(deadline, self.closes.wait()).await.is_err() {
            error!(
                user_id = %self.user_id,
                pending = self.closes.len(),
                "timed out closing auto-idle breaks during shutdown; records left open"
            );
        }

        info!(user_id = %self.user_id, "idle monitor stopped");
    }
}

/// Issue one close request. Returns whether the ledger accepted it.
async fn close_break(
    ledger: &dyn BreakLedger,
    user_id: &str,
    id: &BreakId,
    closure: BreakClosure,
) -> bool {
    match ledger.close_break(id, closure).await {
        Ok(()) => {
            info!(
                user_id = %user_id,
                break_id = %id,
                duration_minutes = closure.duration_minutes,
                "auto-idle break closed"
            );
            true
        }
        Err(err) => {
            error!(
                user_id = %user_id,
                break_id = %id,
                error = %err,
                error_kind = err.label(),
                "failed to close auto-idle break; record left open"
            );
            false
        }
    }
}
