//! Session-scoped idle monitor lifecycle
//!
//! The supervisor keeps at most one monitor alive and follows the session:
//! sign-in of a trackable user starts one, sign-out or a switch to an exempt
//! role disposes it, a different user replaces it. The idle status is only
//! reachable while a monitor is running.

use opsdesk_domain::{IdleConfig, OpsDeskError, Result, SessionIdentity};
use tracing::{debug, info, warn};

use super::monitor::{IdleDependencies, IdleMonitorHandle, IdleStatusView};

/// Owns the idle monitor for the current session.
pub struct IdleSupervisor {
    config: IdleConfig,
    deps: IdleDependencies,
    active: Option<IdleMonitorHandle>,
}

impl IdleSupervisor {
    pub fn new(config: IdleConfig, deps: IdleDependencies) -> Self {
        Self { config, deps, active: None }
    }

    pub fn config(&self) -> &IdleConfig {
        &self.config
    }

    /// Whether a monitor is currently running.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// User id of the monitored session, if any.
    pub fn monitored_user(&self) -> Option<&str> {
        self.active.as_ref().map(IdleMonitorHandle::user_id)
    }

    /// Reconcile the running monitor with the current session.
    pub async fn apply_session(&mut self, session: &SessionIdentity) -> Result<()> {
        let target = if self.config.enabled {
            session.trackable_user(|role| self.config.is_exempt(role)).map(str::to_owned)
        } else {
            None
        };

        if let (Some(handle), Some(user_id)) = (&self.active, &target) {
            if handle.user_id() == user_id {
                debug!(user_id = %user_id, "session unchanged; idle monitor kept");
                return Ok(());
            }
        }

        self.deactivate().await;

        match target {
            Some(user_id) => {
                let handle = IdleMonitorHandle::spawn(user_id, &self.config, self.deps.clone())?;
                self.active = Some(handle);
            }
            None => {
                debug!(
                    signed_in = session.user_id.is_some(),
                    role = ?session.role(),
                    "session not eligible for idle tracking"
                );
            }
        }

        Ok(())
    }

    /// Read-only idle status of the running monitor.
    ///
    /// Fails with [`OpsDeskError::MonitorInactive`] when no monitor is
    /// running for the session.
    pub fn status(&self) -> Result<IdleStatusView> {
        self.active.as_ref().map(IdleMonitorHandle::status).ok_or(OpsDeskError::MonitorInactive)
    }

    /// Dispose the running monitor, if any.
    pub async fn shutdown(&mut self) {
        self.deactivate().await;
    }

    async fn deactivate(&mut self) {
        let Some(handle) = self.active.take() else {
            return;
        };

        let user_id = handle.user_id().to_string();
        match handle.shutdown().await {
            Ok(()) => info!(user_id = %user_id, "idle monitor disposed"),
            Err(err) => warn!(user_id = %user_id, error = %err, "idle monitor did not stop cleanly"),
        }
    }
}
