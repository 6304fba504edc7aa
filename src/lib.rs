// Library target holding the typing engine and its persistence layer.
// The terminal front end in main.rs is a thin consumer of these modules.

pub mod bus;
pub mod clock;
pub mod config;
pub mod session;
pub mod store;
