use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SESSION_LOG_PREFIX: &str = "session-log";
pub const DAILY_COUNTER_PREFIX: &str = "shine.daily";
pub const SETTINGS_PREFIX: &str = "shine.settings";
pub const TYPING_STATS_KEY: &str = "typing-stats";
pub const DAILY_TARGET_KEY: &str = "typing-daily-target";
pub const RECENT_SESSIONS_KEY: &str = "typing-sessions";

/// One appended record inside a day bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLogEntry<T> {
    pub id: String,
    pub completed_at: DateTime<Utc>,
    /// 1-based position within the day.
    pub index: u32,
    pub data: T,
}
