pub mod daily_counter;
pub mod error;
pub mod json_store;
pub mod kv;
pub mod schema;
pub mod session_log;
pub mod settings;

pub use error::StoreError;
pub use kv::{KvStore, MemoryKvStore};
