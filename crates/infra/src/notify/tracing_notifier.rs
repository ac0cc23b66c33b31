use opsdesk_core::BreakNotifier;
use tracing::info;

/// Notifier that surfaces resume notices through the log.
///
/// Hosts with a real notification surface provide their own
/// [`BreakNotifier`]; this one keeps headless deployments informative.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBreakNotifier;

impl TracingBreakNotifier {
    /// Text shown to the user for a recorded idle period.
    pub fn message(minutes: i64) -> String {
        match minutes {
            1 => "Welcome back! 1 minute was recorded as an automatic break.".to_string(),
            m => format!("Welcome back! {} minutes were recorded as an automatic break.", m),
        }
    }
}

impl BreakNotifier for TracingBreakNotifier {
    fn break_recorded(&self, user_id: &str, minutes: i64) {
        info!(user_id, minutes, notice = %Self::message(minutes), "idle break recorded");
    }
}
