//! Long-lived state shared by tool handlers.

pub mod store;
pub mod watch;

pub use store::{ItemStore, StoredItem};
pub use watch::{WatchEvent, WatchEventKind, WatchInfo, WatchService};
