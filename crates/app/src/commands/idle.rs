//! Idle tracking commands.

use opsdesk_domain::{ActivityKind, OpsDeskError, Result};
use tracing::trace;

use super::Reply;
use crate::context::AppContext;

/// Forward one input event from the host to the monitor.
pub(super) fn record_activity(ctx: &AppContext, kind: ActivityKind) -> Reply {
    let delivered = ctx.activity.emit(kind);
    trace!(?kind, delivered, "activity forwarded");
    Reply::Activity { kind, delivered }
}

/// Current idle state, or [`Reply::Inactive`] when nothing is monitored.
pub(super) async fn status(ctx: &AppContext) -> Result<Reply> {
    match ctx.supervisor.lock().await.status() {
        Ok(view) => Ok(Reply::Status { snapshot: view.current() }),
        Err(OpsDeskError::MonitorInactive) => Ok(Reply::Inactive),
        Err(err) => Err(err),
    }
}
