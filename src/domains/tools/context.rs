//! Shared handle given to every registration function.

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::Config;

use super::services::{ItemStore, WatchService};

/// Everything a tool may capture when it is built.
#[derive(Clone)]
pub struct ToolContext {
    pub config: Arc<Config>,
    pub watches: Arc<WatchService>,
    pub store: Arc<ItemStore>,
}

impl ToolContext {
    pub fn new(config: Arc<Config>) -> Self {
        let tools = &config.tools;
        let watches = Arc::new(WatchService::new(
            Duration::from_millis(tools.watch_poll_ms),
            tools.watch_max_events,
        ));
        let store = Arc::new(ItemStore::new(tools.store_path.clone()));
        Self {
            config,
            watches,
            store,
        }
    }

    /// Default config, no path restriction, store in a throwaway location.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        let mut config = Config::default();
        config.tools.store_path = std::env::temp_dir().join(format!(
            "toolhub-test-{}-{}.sqlite3",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ));
        Self::new(Arc::new(config))
    }

    /// Same as [`for_tests`](Self::for_tests) with a custom config.
    #[cfg(test)]
    pub fn with_config(config: Config) -> Self {
        Self::new(Arc::new(config))
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("server", &self.config.server.name)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
