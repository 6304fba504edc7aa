use crate::session::record::SessionRecord;
use crate::store::kv::{KvStore, load_json, save_json};
use crate::store::schema::RECENT_SESSIONS_KEY;

pub const RECENT_LIMIT: usize = 50;

/// Newest-first list of completed rounds across days, capped at `RECENT_LIMIT`.
pub fn load_recent(kv: &dyn KvStore) -> Vec<SessionRecord> {
    load_json(kv, RECENT_SESSIONS_KEY).unwrap_or_default()
}

pub fn push_recent(kv: &dyn KvStore, record: &SessionRecord) {
    let mut recent = load_recent(kv);
    recent.insert(0, record.clone());
    recent.truncate(RECENT_LIMIT);
    if let Err(e) = save_json(kv, RECENT_SESSIONS_KEY, &recent) {
        tracing::warn!(error = %e, "recent sessions not saved");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::session::corpus::LengthMode;
    use crate::store::kv::{KvStore, MemoryKvStore};

    fn rec(id: usize) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            completed_at: Utc::now(),
            duration_seconds: 30,
            mode: LengthMode::Short,
            text_preview: String::new(),
            gross_wpm: 40,
            net_wpm: 40,
            wpm: 40,
            accuracy_percent: 100,
            keystrokes: 0,
            mistakes: 0,
            backspaces: 0,
            uncorrected_errors: 0,
        }
    }

    #[test]
    fn test_newest_first_and_capped() {
        let kv = MemoryKvStore::new();
        for i in 0..RECENT_LIMIT + 5 {
            push_recent(&kv, &rec(i));
        }
        let recent = load_recent(&kv);
        assert_eq!(recent.len(), RECENT_LIMIT);
        assert_eq!(recent[0].id, (RECENT_LIMIT + 4).to_string());
        assert_eq!(recent[RECENT_LIMIT - 1].id, "5");
    }

    #[test]
    fn test_malformed_list_starts_over() {
        let kv = MemoryKvStore::new();
        kv.set(RECENT_SESSIONS_KEY, "{oops").unwrap();
        push_recent(&kv, &rec(1));
        assert_eq!(load_recent(&kv).len(), 1);
    }
}
