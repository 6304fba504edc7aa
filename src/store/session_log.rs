use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use rand::Rng;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bus::{EventBus, StoreEvent};
use crate::clock::{Clock, day_id};
use crate::store::kv::{KvStore, load_json, save_json};
use crate::store::schema::{SESSION_LOG_PREFIX, SessionLogEntry};

/// Append-only log of records, bucketed by local calendar day. Only today's
/// bucket is kept; every append prunes the others in this namespace.
///
/// All failures are swallowed: a bucket that cannot be read is empty, and a
/// record that cannot be written is simply not persisted.
pub struct SessionLog<T> {
    namespace: String,
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    _data: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned + Clone> SessionLog<T> {
    pub fn new(
        namespace: &str,
        kv: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        bus: EventBus,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            kv,
            clock,
            bus,
            _data: PhantomData,
        }
    }

    fn key_prefix(&self) -> String {
        format!("{SESSION_LOG_PREFIX}:{}:", self.namespace)
    }

    /// The only place that turns "now" into a bucket key.
    pub fn current_bucket_key(&self) -> String {
        format!("{}{}", self.key_prefix(), day_id(self.clock.today()))
    }

    fn read_bucket(&self, key: &str) -> Vec<SessionLogEntry<T>> {
        load_json(self.kv.as_ref(), key).unwrap_or_default()
    }

    pub fn read_today(&self) -> Vec<SessionLogEntry<T>> {
        self.read_bucket(&self.current_bucket_key())
    }

    pub fn append(&self, data: T) -> SessionLogEntry<T> {
        let key = self.current_bucket_key();
        let mut entries = self.read_bucket(&key);
        let now = self.clock.now();

        let entry = SessionLogEntry {
            id: new_entry_id(now),
            completed_at: now.with_timezone(&Utc),
            index: entries.len() as u32 + 1,
            data,
        };
        entries.push(entry.clone());

        match save_json(self.kv.as_ref(), &key, &entries) {
            Ok(()) => {
                self.prune_except(&key);
                tracing::debug!(namespace = %self.namespace, index = entry.index, "appended session");
                self.bus.publish(StoreEvent::SessionLogUpdated {
                    namespace: self.namespace.clone(),
                });
            }
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, error = %e, "session not persisted");
            }
        }
        entry
    }

    /// Remove every bucket in this namespace other than today's.
    pub fn clear_old(&self) {
        let keep = self.current_bucket_key();
        self.prune_except(&keep);
    }

    fn prune_except(&self, keep: &str) {
        let prefix = self.key_prefix();
        let keys = match self.kv.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, error = %e, "could not list buckets");
                return;
            }
        };
        for key in keys
            .iter()
            .filter(|k| k.starts_with(&prefix) && k.as_str() != keep)
        {
            match self.kv.remove(key) {
                Ok(()) => tracing::debug!(key = %key, "pruned old bucket"),
                Err(e) => tracing::warn!(key = %key, error = %e, "could not prune bucket"),
            }
        }
    }
}

/// Millisecond timestamp plus a short base36 suffix so two appends in the
/// same millisecond still get distinct ids.
/// Millisecond timestamp followed by five random base36 characters.
pub(crate) fn new_entry_id(now: DateTime<Local>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..5)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{}{suffix}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::clock::ManualClock;
    use crate::store::kv::MemoryKvStore;

    fn setup() -> (Arc<MemoryKvStore>, Arc<ManualClock>, EventBus) {
        let kv = Arc::new(MemoryKvStore::new());
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
        ));
        (kv, clock, EventBus::new())
    }

    fn log(kv: &Arc<MemoryKvStore>, clock: &Arc<ManualClock>, bus: &EventBus, ns: &str) -> SessionLog<u32> {
        SessionLog::new(ns, kv.clone(), clock.clone(), bus.clone())
    }

    #[test]
    fn test_bucket_key_uses_local_date() {
        let (kv, clock, bus) = setup();
        let log = log(&kv, &clock, &bus, "typing");
        assert_eq!(log.current_bucket_key(), "session-log:typing:2026-10-16");
    }

    #[test]
    fn test_indices_increase_from_one() {
        let (kv, clock, bus) = setup();
        let log = log(&kv, &clock, &bus, "typing");
        assert!(log.read_today().is_empty());

        let indices: Vec<u32> = (0..4).map(|n| log.append(n).index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);

        let today = log.read_today();
        assert_eq!(today.len(), 4);
        assert_eq!(today.iter().map(|e| e.data).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_append_on_next_day_prunes_previous_day() {
        let (kv, clock, bus) = setup();
        let log = log(&kv, &clock, &bus, "typing");
        log.append(1);
        log.append(2);

        clock.advance(TimeDelta::days(1));
        assert!(log.read_today().is_empty());

        let entry = log.append(3);
        assert_eq!(entry.index, 1);
        let today = log.read_today();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].data, 3);
        assert_eq!(kv.keys().unwrap(), vec!["session-log:typing:2026-10-17".to_string()]);
    }

    #[test]
    fn test_clear_old_leaves_other_namespaces() {
        let (kv, clock, bus) = setup();
        let typing = log(&kv, &clock, &bus, "typing");
        let other = log(&kv, &clock, &bus, "typing-drills");
        typing.append(1);
        other.append(1);
        kv.set("typing-stats", "{}").unwrap();

        clock.advance(TimeDelta::days(2));
        typing.clear_old();

        let keys = kv.keys().unwrap();
        assert!(!keys.contains(&"session-log:typing:2026-10-16".to_string()));
        assert!(keys.contains(&"session-log:typing-drills:2026-10-16".to_string()));
        assert!(keys.contains(&"typing-stats".to_string()));
    }

    #[test]
    fn test_malformed_bucket_reads_as_empty_and_is_replaced() {
        let (kv, clock, bus) = setup();
        let log = log(&kv, &clock, &bus, "typing");
        kv.set(&log.current_bucket_key(), "{\"not\":\"a list\"}").unwrap();
        assert!(log.read_today().is_empty());

        let entry = log.append(9);
        assert_eq!(entry.index, 1);
        assert_eq!(log.read_today().len(), 1);
    }

    #[test]
    fn test_append_publishes_update() {
        let (kv, clock, bus) = setup();
        let rx = bus.subscribe();
        let log = log(&kv, &clock, &bus, "typing");
        log.append(1);
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::SessionLogUpdated {
                namespace: "typing".to_string()
            }
        );
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let (kv, clock, bus) = setup();
        let rx = bus.subscribe();
        let log = log(&kv, &clock, &bus, "typing");
        log.append(1);
        let _ = rx.try_recv();

        kv.set_fail_writes(true);
        let entry = log.append(2);
        assert_eq!(entry.index, 2);
        assert_eq!(log.read_today().len(), 1);
        assert!(rx.try_recv().is_err(), "no event for a failed write");
    }

    #[test]
    fn test_ids_unique_within_same_instant() {
        let (kv, clock, bus) = setup();
        let log = log(&kv, &clock, &bus, "typing");
        let ids: HashSet<String> = (0..50).map(|n| log.append(n).id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_persisted_layout_is_flat_list() {
        let (kv, clock, bus) = setup();
        let log = log(&kv, &clock, &bus, "typing");
        log.append(42);
        let raw = kv.get(&log.current_bucket_key()).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert!(first.get("id").is_some());
        assert!(first.get("completedAt").is_some());
        assert_eq!(first["index"], 1);
        assert_eq!(first["data"], 42);
    }
}
