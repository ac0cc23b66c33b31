//! Session commands: sign-in, sign-out and role changes.

use opsdesk_domain::{OpsDeskError, Result, SessionIdentity, UserProfile, UserRole};
use tracing::info;

use super::Reply;
use crate::context::AppContext;

pub(super) async fn login(
    ctx: &AppContext,
    user_id: String,
    role: UserRole,
    full_name: Option<String>,
) -> Result<Reply> {
    let session = SessionIdentity {
        user_id: Some(user_id.clone()),
        profile: Some(UserProfile { id: user_id, full_name, role }),
    };
    ctx.set_session(session).await?;
    info!("session signed in");
    session_reply(ctx).await
}

/// Profile refresh after the backend reported a new role.
pub(super) async fn change_role(ctx: &AppContext, role: UserRole) -> Result<Reply> {
    let mut session = ctx.session.lock().await.clone();
    let profile = session.profile.as_mut().ok_or_else(|| {
        OpsDeskError::InvalidInput("role change requires a signed-in session".into())
    })?;
    profile.role = role;

    ctx.set_session(session).await?;
    session_reply(ctx).await
}

pub(super) async fn logout(ctx: &AppContext) -> Result<Reply> {
    ctx.set_session(SessionIdentity::signed_out()).await?;
    info!("session signed out");
    session_reply(ctx).await
}

async fn session_reply(ctx: &AppContext) -> Result<Reply> {
    let session = ctx.session.lock().await.clone();
    let monitored = ctx.supervisor.lock().await.is_active();
    Ok(Reply::Session { role: session.role().cloned(), user_id: session.user_id, monitored })
}
