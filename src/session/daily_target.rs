use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::day_id;
use crate::store::kv::{KvStore, load_json, save_json};
use crate::store::schema::DAILY_TARGET_KEY;

/// Progress toward a user-set number of rounds per day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTarget {
    pub date: String,
    pub target: u32,
    pub completed: u32,
}

impl DailyTarget {
    pub fn new(today: NaiveDate, target: u32) -> Self {
        Self {
            date: day_id(today),
            target,
            completed: 0,
        }
    }

    /// Load today's progress. A stored target from an earlier day carries its
    /// goal forward with `completed` back at zero; with nothing stored,
    /// `default_target` is used.
    pub fn load(kv: &dyn KvStore, today: NaiveDate, default_target: u32) -> Self {
        match load_json::<DailyTarget>(kv, DAILY_TARGET_KEY) {
            Some(stored) if stored.date == day_id(today) => stored,
            Some(stored) => {
                let fresh = Self::new(today, stored.target);
                fresh.save(kv);
                fresh
            }
            None => Self::new(today, default_target),
        }
    }

    pub fn save(&self, kv: &dyn KvStore) {
        if let Err(e) = save_json(kv, DAILY_TARGET_KEY, self) {
            tracing::warn!(error = %e, "daily target not saved");
        }
    }

    fn roll_to(&mut self, today: NaiveDate) {
        let id = day_id(today);
        if self.date != id {
            self.date = id;
            self.completed = 0;
        }
    }

    pub fn record_completion(&mut self, today: NaiveDate) {
        self.roll_to(today);
        self.completed += 1;
    }

    /// Returns false (and changes nothing) for a zero target.
    pub fn set_target(&mut self, target: u32, today: NaiveDate) -> bool {
        if target == 0 {
            return false;
        }
        self.roll_to(today);
        self.target = target;
        true
    }

    pub fn is_met(&self) -> bool {
        self.target > 0 && self.completed >= self.target
    }

    pub fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.completed)
    }
}
