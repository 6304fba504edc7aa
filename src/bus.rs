use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// Change notifications published by the stores. Listeners treat these as a
/// hint to re-read, never as the data itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    SessionLogUpdated { namespace: String },
    DailyCounterUpdated { namespace: String },
    SettingsUpdated { namespace: String },
}

impl StoreEvent {
    pub fn namespace(&self) -> &str {
        match self {
            StoreEvent::SessionLogUpdated { namespace }
            | StoreEvent::DailyCounterUpdated { namespace }
            | StoreEvent::SettingsUpdated { namespace } => namespace,
        }
    }
}

/// Process-wide pub/sub channel. Cloning shares the subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<StoreEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Deliver to every live subscriber; receivers that were dropped are
    /// pruned here.
    pub fn publish(&self, event: StoreEvent) {
        let Ok(mut subs) = self.subscribers.lock() else {
            return;
        };
        subs.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::debug!(?event, listeners = subs.len(), "published store event");
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
