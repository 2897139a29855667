use serde::{Deserialize, Serialize};

/// A device counts as online while its last successful exchange is younger than this
pub const ONLINE_WINDOW_MS: i64 = 30_000;

const MAX_RECENT_ERRORS: usize = 10;
const MAX_ERROR_MESSAGE_LEN: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    pub at_ms: i64,
    pub code: String,
    pub message: String,
}

/// Connection bookkeeping for one controller
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkStatus {
    pub last_success_at_ms: Option<i64>,
    pub last_error_at_ms: Option<i64>,
    pub last_error_code: Option<String>,
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Oldest first, at most 10
    pub recent_errors: Vec<ErrorRecord>,
}

impl LinkStatus {
    /// Online when the last success happened less than 30 s before `now_ms`
    pub fn is_online(&self, now_ms: i64) -> bool {
        self.last_success_at_ms
            .is_some_and(|at| now_ms - at < ONLINE_WINDOW_MS)
    }
}

pub enum LinkEvent {
    Success,
    Failure { code: String, message: String },
}

pub fn apply_link_event(status: &mut LinkStatus, event: LinkEvent, now_ms: i64) {
    match event {
        LinkEvent::Success => {
            status.last_success_at_ms = Some(now_ms);
            status.consecutive_failures = 0;
        }
        LinkEvent::Failure { code, message } => {
            status.last_error_at_ms = Some(now_ms);
            status.last_error_code = Some(code.clone());
            status.consecutive_failures = status.consecutive_failures.saturating_add(1);
            status.recent_errors.push(ErrorRecord {
                at_ms: now_ms,
                code,
                message: truncate_error_message(&message),
            });
            if status.recent_errors.len() > MAX_RECENT_ERRORS {
                status.recent_errors.remove(0);
            }
        }
    }
}

pub fn truncate_error_message(message: &str) -> String {
    if message.len() <= MAX_ERROR_MESSAGE_LEN {
        message.to_string()
    } else {
        message.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
    }
}
