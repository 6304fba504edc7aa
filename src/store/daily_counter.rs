use std::sync::Arc;

use crate::bus::{EventBus, StoreEvent};
use crate::clock::{Clock, day_id, parse_day_id};
use crate::store::error::StoreError;
use crate::store::kv::KvStore;
use crate::store::schema::DAILY_COUNTER_PREFIX;

/// Namespaced integer that loses one unit per elapsed local day. Decay is
/// applied lazily by `tick`.
pub struct DailyDecayingCounter {
    namespace: String,
    value_key: String,
    date_key: String,
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
}

impl DailyDecayingCounter {
    pub fn new(
        namespace: &str,
        kv: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        bus: EventBus,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            value_key: format!("{DAILY_COUNTER_PREFIX}:{namespace}:value"),
            date_key: format!("{DAILY_COUNTER_PREFIX}:{namespace}:date"),
            kv,
            clock,
            bus,
        }
    }

    pub fn get(&self) -> u32 {
        match self.kv.get(&self.value_key) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn set(&self, n: i64) {
        let value = n.clamp(0, u32::MAX as i64) as u32;
        match self.write(value) {
            Ok(()) => self.notify(),
            Err(e) => tracing::warn!(namespace = %self.namespace, error = %e, "counter not saved"),
        }
    }

    /// Apply decay for every day since the last stamp and return the value.
    pub fn tick(&self) -> u32 {
        match self.try_tick() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(namespace = %self.namespace, error = %e, "counter tick failed");
                self.get()
            }
        }
    }

    fn try_tick(&self) -> Result<u32, StoreError> {
        let today = self.clock.today();
        let current = self.get();

        let last = self.kv.get(&self.date_key)?.as_deref().and_then(parse_day_id);
        let Some(last) = last else {
            self.kv.set(&self.date_key, &day_id(today))?;
            return Ok(current);
        };
        if last == today {
            return Ok(current);
        }

        let elapsed_days = (today - last).num_days().max(0);
        let next = (current as i64 - elapsed_days).max(0) as u32;
        self.write(next)?;
        tracing::debug!(namespace = %self.namespace, elapsed_days, value = next, "counter decayed");
        self.notify();
        Ok(next)
    }

    fn write(&self, value: u32) -> Result<(), StoreError> {
        self.kv.set(&self.value_key, &value.to_string())?;
        self.kv.set(&self.date_key, &day_id(self.clock.today()))
    }

    fn notify(&self) {
        self.bus.publish(StoreEvent::DailyCounterUpdated {
            namespace: self.namespace.clone(),
        });
    }
}
