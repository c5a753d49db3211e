//! Alert persistence and session view state.
//!
//! - [`log`]: the durable append-only log ([`AlertLog`], [`CsvAlertLog`], [`MemoryAlertLog`])
//! - [`store`]: [`AlertStore`], which serializes appends and applies suppression
//! - [`session`]: [`Session`], the per-session "viewed" flag

pub mod log;
pub mod session;
pub mod store;

pub use log::{AlertLog, CsvAlertLog, MemoryAlertLog, PersistenceError};
pub use session::Session;
pub use store::AlertStore;
