use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::mpsc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bus::{EventBus, StoreEvent};
use crate::store::kv::{KvStore, load_json, save_json};
use crate::store::schema::SETTINGS_PREFIX;

/// Namespaced settings document. Reads merge the stored JSON over
/// `T::default()` (via the type's serde defaults); writes publish
/// `SettingsUpdated` so other views can re-read.
pub struct SettingsService<T> {
    namespace: String,
    kv: Arc<dyn KvStore>,
    bus: EventBus,
    _settings: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned + Default> SettingsService<T> {
    pub fn new(namespace: &str, kv: Arc<dyn KvStore>, bus: EventBus) -> Self {
        Self {
            namespace: namespace.to_string(),
            kv,
            bus,
            _settings: PhantomData,
        }
    }

    fn key(&self) -> String {
        format!("{SETTINGS_PREFIX}.{}", self.namespace)
    }

    pub fn read(&self) -> T {
        load_json(self.kv.as_ref(), &self.key()).unwrap_or_default()
    }

    pub fn write(&self, value: &T) {
        match save_json(self.kv.as_ref(), &self.key(), value) {
            Ok(()) => self.bus.publish(StoreEvent::SettingsUpdated {
                namespace: self.namespace.clone(),
            }),
            Err(e) => tracing::warn!(namespace = %self.namespace, error = %e, "settings not saved"),
        }
    }

    /// Read, apply `patch`, write back. Returns the patched value even when
    /// the write fails.
    pub fn update(&self, patch: impl FnOnce(&mut T)) -> T {
        let mut value = self.read();
        patch(&mut value);
        self.write(&value);
        value
    }

    pub fn reset(&self) {
        self.write(&T::default());
    }

    /// Receives every store event; callers filter on `SettingsUpdated` with
    /// this service's namespace.
    pub fn subscribe(&self) -> mpsc::Receiver<StoreEvent> {
        self.bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::store::kv::MemoryKvStore;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Prefs {
        volume: u32,
        name: String,
    }

    fn service() -> (Arc<MemoryKvStore>, SettingsService<Prefs>) {
        let kv = Arc::new(MemoryKvStore::new());
        let svc = SettingsService::new("demo", kv.clone(), EventBus::new());
        (kv, svc)
    }

    #[test]
    fn test_read_missing_returns_defaults() {
        let (_kv, svc) = service();
        assert_eq!(svc.read(), Prefs::default());
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let (kv, svc) = service();
        kv.set("shine.settings.demo", r#"{"volume": 7}"#).unwrap();
        let prefs = svc.read();
        assert_eq!(prefs.volume, 7);
        assert_eq!(prefs.name, "");
    }

    #[test]
    fn test_update_patches_and_notifies() {
        let (_kv, svc) = service();
        let rx = svc.subscribe();
        let out = svc.update(|p| p.name = "ada".to_string());
        assert_eq!(out.name, "ada");
        assert_eq!(svc.read().name, "ada");
        assert_eq!(rx.try_recv().unwrap().namespace(), "demo");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (_kv, svc) = service();
        svc.update(|p| p.volume = 3);
        svc.reset();
        assert_eq!(svc.read(), Prefs::default());
    }

    #[test]
    fn test_corrupt_document_reads_defaults() {
        let (kv, svc) = service();
        kv.set("shine.settings.demo", "[1,2").unwrap();
        assert_eq!(svc.read(), Prefs::default());
    }
}
