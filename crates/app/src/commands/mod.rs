//! Control commands served by the host binary
//!
//! One command per line:
//!
//! ```text
//! login <user_id> <role> [full name...]
//! role <role>
//! logout
//! activity <kind>
//! status
//! quit
//! ```
//!
//! Every command yields exactly one [`Reply`], written back as a JSON line.

mod idle;
mod session;

use std::str::FromStr;

use opsdesk_domain::{ActivityKind, IdleSnapshot, OpsDeskError, Result, UserRole};
use serde::Serialize;
use tracing::debug;

use crate::context::AppContext;

/// Parsed control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { user_id: String, role: UserRole, full_name: Option<String> },
    Role(UserRole),
    Logout,
    Activity(ActivityKind),
    Status,
    Quit,
}

impl FromStr for Command {
    type Err = OpsDeskError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| invalid("empty command"))?.to_ascii_lowercase();

        let command = match verb.as_str() {
            "login" => {
                let (Some(user_id), Some(role)) = (words.next(), words.next()) else {
                    return Err(invalid("usage: login <user_id> <role> [full name]"));
                };
                let full_name = words.collect::<Vec<_>>().join(" ");
                return Ok(Self::Login {
                    user_id: user_id.to_string(),
                    role: UserRole::from(role),
                    full_name: (!full_name.is_empty()).then_some(full_name),
                });
            }
            "role" => Self::Role(UserRole::from(
                words.next().ok_or_else(|| invalid("usage: role <role>"))?,
            )),
            "logout" => Self::Logout,
            "activity" => {
                let kind = words.next().ok_or_else(|| invalid("usage: activity <kind>"))?;
                Self::Activity(ActivityKind::from_str(kind).map_err(OpsDeskError::InvalidInput)?)
            }
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            other => return Err(invalid(&format!("unknown command: {}", other))),
        };

        if words.next().is_some() {
            return Err(invalid(&format!("unexpected arguments for {}", verb)));
        }
        Ok(command)
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Session { user_id: Option<String>, role: Option<UserRole>, monitored: bool },
    Activity { kind: ActivityKind, delivered: usize },
    Status { snapshot: IdleSnapshot },
    Inactive,
    Error { kind: &'static str, message: String },
    Bye,
}

impl Reply {
    pub fn error(err: &OpsDeskError) -> Self {
        Self::Error { kind: err.label(), message: err.to_string() }
    }
}

/// Run one command against the context.
pub async fn execute(ctx: &AppContext, command: Command) -> Result<Reply> {
    debug!(?command, "executing control command");
    match command {
        Command::Login { user_id, role, full_name } => {
            session::login(ctx, user_id, role, full_name).await
        }
        Command::Role(role) => session::change_role(ctx, role).await,
        Command::Logout => session::logout(ctx).await,
        Command::Activity(kind) => Ok(idle::record_activity(ctx, kind)),
        Command::Status => idle::status(ctx).await,
        Command::Quit => {
            ctx.shutdown().await;
            Ok(Reply::Bye)
        }
    }
}

fn invalid(message: &str) -> OpsDeskError {
    OpsDeskError::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_with_full_name() {
        let command: Command = "login emp-7 Employee Ada  Lovelace".parse().unwrap();
        assert_eq!(
            command,
            Command::Login {
                user_id: "emp-7".into(),
                role: UserRole::Employee,
                full_name: Some("Ada Lovelace".into()),
            }
        );
    }

    #[test]
    fn parses_simple_verbs() {
        assert_eq!("LOGOUT".parse::<Command>().unwrap(), Command::Logout);
        assert_eq!(" status ".parse::<Command>().unwrap(), Command::Status);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("role admin".parse::<Command>().unwrap(), Command::Role(UserRole::Admin));
        assert_eq!(
            "activity key_down".parse::<Command>().unwrap(),
            Command::Activity(ActivityKind::KeyDown)
        );
    }

    #[test]
    fn unknown_roles_are_kept_verbatim() {
        let command: Command = "role Auditor".parse().unwrap();
        assert_eq!(command, Command::Role(UserRole::Other("Auditor".into())));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "login emp-7", "activity wiggle", "status now", "dance"] {
            let err = line.parse::<Command>().unwrap_err();
            assert!(matches!(err, OpsDeskError::InvalidInput(_)), "{line:?} gave {err:?}");
        }
    }

    #[test]
    fn replies_serialize_with_tag() {
        let reply = Reply::Activity { kind: ActivityKind::Scroll, delivered: 1 };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"reply": "activity", "kind": "scroll", "delivered": 1})
        );

        let json = serde_json::to_value(Reply::error(&OpsDeskError::MonitorInactive)).unwrap();
        assert_eq!(json["reply"], "error");
    }
}
