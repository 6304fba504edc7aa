pub mod corpus;
pub mod daily_target;
pub mod history;
pub mod metrics;
pub mod practice;
pub mod record;
pub mod settings;
pub mod stats;
pub mod target;
pub mod typing;

pub use target::SessionError;
