use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub const TYPING_NAMESPACE: &str = "typing";

pub const SESSION_DURATIONS: [u32; 4] = [5, 15, 30, 60];

/// User preferences for typing practice, kept in the settings store under
/// the `typing` namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypingSettings {
    /// Daily goal in completed rounds.
    pub sessions_per_day: u32,
    /// Minutes that count as one practice session.
    pub session_duration_min: u32,
    #[serde(rename = "targetWPM")]
    pub target_wpm: u32,
    pub interests: Vec<String>,
}

impl Default for TypingSettings {
    fn default() -> Self {
        Self {
            sessions_per_day: 3,
            session_duration_min: 15,
            target_wpm: 50,
            interests: Vec::new(),
        }
    }
}

impl TypingSettings {
    /// Snap values loaded from disk back into their allowed ranges.
    pub fn normalize(&mut self) {
        self.sessions_per_day = self.sessions_per_day.clamp(1, 50);
        self.target_wpm = self.target_wpm.clamp(10, 250);
        if !SESSION_DURATIONS.contains(&self.session_duration_min) {
            self.session_duration_min = SESSION_DURATIONS
                .into_iter()
                .min_by_key(|d| d.abs_diff(self.session_duration_min))
                .unwrap_or(15);
        }
        let mut seen = HashSet::new();
        self.interests
            .retain(|i| !i.trim().is_empty() && seen.insert(i.clone()));
    }
}
