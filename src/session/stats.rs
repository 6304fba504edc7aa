use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{day_id, parse_day_id};
use crate::session::metrics::rolling_average;
use crate::session::record::SessionRecord;
use crate::store::kv::{KvStore, load_json, save_json};
use crate::store::schema::TYPING_STATS_KEY;

/// Lifetime aggregates folded forward one completed round at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypingStats {
    pub total_sessions: u32,
    #[serde(rename = "averageWPM")]
    pub average_wpm: u32,
    #[serde(rename = "bestWPM")]
    pub best_wpm: u32,
    pub average_accuracy: u32,
    pub total_words_typed: u64,
    /// Minutes, accumulated per session after rounding.
    pub time_spent: u64,
    pub streak_days: u32,
    pub best_streak: u32,
    pub last_practice_date: Option<String>,
}

impl TypingStats {
    pub fn load(kv: &dyn KvStore) -> Self {
        load_json(kv, TYPING_STATS_KEY).unwrap_or_default()
    }

    pub fn save(&self, kv: &dyn KvStore) {
        if let Err(e) = save_json(kv, TYPING_STATS_KEY, self) {
            tracing::warn!(error = %e, "typing stats not saved");
        }
    }

    pub fn record(&mut self, record: &SessionRecord, words: usize, today: NaiveDate) {
        let count = self.total_sessions;
        self.average_wpm = rolling_average(self.average_wpm, count, record.wpm);
        self.average_accuracy = rolling_average(self.average_accuracy, count, record.accuracy_percent);
        self.best_wpm = self.best_wpm.max(record.wpm);
        self.total_words_typed += words as u64;
        self.time_spent += (record.duration_seconds as f64 / 60.0).round() as u64;
        self.total_sessions = count + 1;
        self.advance_streak(today);
    }

    /// Count consecutive local days with at least one completed round.
    fn advance_streak(&mut self, today: NaiveDate) {
        let last = self.last_practice_date.as_deref().and_then(parse_day_id);
        if last == Some(today) {
            return;
        }
        self.streak_days = match (last, today.pred_opt()) {
            (Some(last), Some(yesterday)) if last == yesterday => self.streak_days + 1,
            _ => 1,
        };
        self.best_streak = self.best_streak.max(self.streak_days);
        self.last_practice_date = Some(day_id(today));
    }
}
