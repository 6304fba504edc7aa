use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::corpus::LengthMode;

/// The immutable outcome of a completed round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    #[serde(alias = "date")]
    pub completed_at: DateTime<Utc>,
    #[serde(alias = "duration")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub mode: LengthMode,
    #[serde(alias = "text")]
    pub text_preview: String,
    #[serde(default, rename = "grossWPM")]
    pub gross_wpm: u32,
    #[serde(default, rename = "netWPM")]
    pub net_wpm: u32,
    /// Same value as `net_wpm`; the number users see as "WPM".
    pub wpm: u32,
    #[serde(alias = "accuracy")]
    pub accuracy_percent: u32,
    #[serde(default)]
    pub keystrokes: u32,
    #[serde(default)]
    pub mistakes: u32,
    #[serde(default)]
    pub backspaces: u32,
    #[serde(default)]
    pub uncorrected_errors: u32,
}
