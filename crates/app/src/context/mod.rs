//! Application context - dependency injection container

use std::sync::Arc;

use opsdesk_core::{BreakLedger, Clock, IdleDependencies, IdleSupervisor, MonotonicClock};
use opsdesk_domain::{Config, Result, SessionIdentity};
use opsdesk_infra::{ChannelActivitySource, RestBreakLedger, TracingBreakNotifier};
use tokio::sync::Mutex;

/// Holds the supervisor, the activity bridge and the current session.
pub struct AppContext {
    pub config: Config,
    pub activity: ChannelActivitySource,
    pub supervisor: Mutex<IdleSupervisor>,
    pub session: Mutex<SessionIdentity>,
}

impl AppContext {
    /// Build the production wiring: REST ledger, channel activity source,
    /// log notifier and monotonic clock.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let ledger = Arc::new(RestBreakLedger::new(&config.backend)?);
        Ok(Self::with_ledger(config, ledger, Arc::new(MonotonicClock::new())))
    }

    /// Same wiring with a caller-chosen ledger and clock.
    pub fn with_ledger(
        config: Config,
        ledger: Arc<dyn BreakLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let activity = ChannelActivitySource::new();
        let deps = IdleDependencies {
            ledger,
            source: Arc::new(activity.clone()),
            notifier: Arc::new(TracingBreakNotifier),
            clock,
        };
        let supervisor = IdleSupervisor::new(config.idle.clone(), deps);

        Self {
            config,
            activity,
            supervisor: Mutex::new(supervisor),
            session: Mutex::new(SessionIdentity::signed_out()),
        }
    }

    /// Replace the session and let the supervisor react to it.
    pub async fn set_session(&self, session: SessionIdentity) -> Result<()> {
        let mut current = self.session.lock().await;
        *current = session;
        self.supervisor.lock().await.apply_session(&current).await
    }

    /// Dispose the running monitor, settling any open break.
    pub async fn shutdown(&self) {
        self.supervisor.lock().await.shutdown().await;
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("activity", &self.activity)
            .finish_non_exhaustive()
    }
}
