//! Polling filesystem watchers.
//!
//! [`WatchService`] owns every active watcher, keyed by canonical path. It is
//! created once per server, handed to the `watch_*` tools at registration and
//! torn down with [`WatchService::shutdown`]. A path can have at most one
//! active watcher; a second `start` for the same path is rejected.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domains::tools::ToolError;

/// What happened to a path between two polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WatchEventKind {
    Created,
    Modified,
    Removed,
}

/// A single observed change.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: String,
    pub at: DateTime<Utc>,
}

/// Public view of one active watcher.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WatchInfo {
    pub path: String,
    pub recursive: bool,
    pub started_at: DateTime<Utc>,
    pub pending_events: usize,
}

type EventBuffer = Arc<Mutex<VecDeque<WatchEvent>>>;
type Snapshot = HashMap<PathBuf, SystemTime>;

struct Watcher {
    recursive: bool,
    started_at: DateTime<Utc>,
    events: EventBuffer,
    task: JoinHandle<()>,
}

/// Registry of active watchers.
pub struct WatchService {
    interval: Duration,
    max_events: usize,
    watchers: Mutex<HashMap<PathBuf, Watcher>>,
}

impl WatchService {
    pub fn new(interval: Duration, max_events: usize) -> Self {
        Self {
            interval,
            max_events,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    fn watchers(&self) -> MutexGuard<'_, HashMap<PathBuf, Watcher>> {
        // A poisoned map is still structurally sound; keep serving.
        self.watchers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start watching `path`. Must be called from within a tokio runtime.
    pub fn start(&self, path: &Path, recursive: bool) -> Result<(), ToolError> {
        let mut watchers = self.watchers();
        if watchers.contains_key(path) {
            return Err(ToolError::failed(format!(
                "Already watching '{}'. Stop the existing watch first.",
                path.display()
            )));
        }

        let events: EventBuffer = Arc::new(Mutex::new(VecDeque::new()));
        let task = tokio::spawn(poll_loop(
            path.to_path_buf(),
            recursive,
            self.interval,
            self.max_events,
            events.clone(),
        ));

        info!("Started watching {} (recursive: {})", path.display(), recursive);
        watchers.insert(
            path.to_path_buf(),
            Watcher {
                recursive,
                started_at: Utc::now(),
                events,
                task,
            },
        );
        Ok(())
    }

    /// Stop watching `path`, returning the events that were never drained.
    pub fn stop(&self, path: &Path) -> Result<Vec<WatchEvent>, ToolError> {
        let watcher = self
            .watchers()
            .remove(path)
            .ok_or_else(|| not_watched(path))?;
        watcher.task.abort();
        info!("Stopped watching {}", path.display());
        Ok(take_all(&watcher.events))
    }

    /// Take every buffered event for `path`.
    pub fn drain(&self, path: &Path) -> Result<Vec<WatchEvent>, ToolError> {
        let watchers = self.watchers();
        let watcher = watchers.get(path).ok_or_else(|| not_watched(path))?;
        Ok(take_all(&watcher.events))
    }

    /// Active watchers, sorted by path.
    pub fn active(&self) -> Vec<WatchInfo> {
        let watchers = self.watchers();
        let mut infos: Vec<_> = watchers
            .iter()
            .map(|(path, w)| WatchInfo {
                path: path.display().to_string(),
                recursive: w.recursive,
                started_at: w.started_at,
                pending_events: w.events.lock().map(|e| e.len()).unwrap_or(0),
            })
            .collect();
        infos.sort_by(|a, b| a.path.cmp(&b.path));
        infos
    }

    /// Abort every watcher. Safe to call more than once.
    pub fn shutdown(&self) {
        let mut watchers = self.watchers();
        for (path, watcher) in watchers.drain() {
            debug!("Aborting watcher for {}", path.display());
            watcher.task.abort();
        }
    }
}

impl Drop for WatchService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn not_watched(path: &Path) -> ToolError {
    ToolError::failed(format!("No active watch for '{}'", path.display()))
}

fn take_all(events: &EventBuffer) -> Vec<WatchEvent> {
    events
        .lock()
        .map(|mut e| e.drain(..).collect())
        .unwrap_or_default()
}

async fn poll_loop(
    root: PathBuf,
    recursive: bool,
    interval: Duration,
    max_events: usize,
    events: EventBuffer,
) {
    let mut previous = match scan(root.clone(), recursive).await {
        Some(s) => s,
        None => return,
    };
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let Some(current) = scan(root.clone(), recursive).await else {
            return;
        };
        let changes = diff(&previous, &current);
        if !changes.is_empty() {
            debug!("{} change(s) under {}", changes.len(), root.display());
            if let Ok(mut buffer) = events.lock() {
                for change in changes {
                    if buffer.len() >= max_events {
                        buffer.pop_front();
                    }
                    buffer.push_back(change);
                }
            }
        }
        previous = current;
    }
}

async fn scan(root: PathBuf, recursive: bool) -> Option<Snapshot> {
    let root_label = root.display().to_string();
    match tokio::task::spawn_blocking(move || snapshot(&root, recursive)).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("Watcher scan for {} failed: {}", root_label, e);
            None
        }
    }
}

fn snapshot(root: &Path, recursive: bool) -> Snapshot {
    let walker = if recursive {
        WalkDir::new(root)
    } else {
        WalkDir::new(root).max_depth(1)
    };
    walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.into_path(), modified))
        })
        .collect()
}

fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<WatchEvent> {
    let now = Utc::now();
    let event = |kind, path: &Path| WatchEvent {
        kind,
        path: path.display().to_string(),
        at: now,
    };

    let mut changes: Vec<WatchEvent> = current
        .iter()
        .filter_map(|(path, modified)| match previous.get(path) {
            None => Some(event(WatchEventKind::Created, path)),
            Some(before) if before != modified => Some(event(WatchEventKind::Modified, path)),
            Some(_) => None,
        })
        .collect();
    changes.extend(
        previous
            .keys()
            .filter(|path| !current.contains_key(*path))
            .map(|path| event(WatchEventKind::Removed, path)),
    );
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service() -> WatchService {
        WatchService::new(Duration::from_millis(20), 100)
    }

    #[tokio::test]
    async fn test_duplicate_start_rejected() {
        let dir = TempDir::new().unwrap();
        let watches = service();

        watches.start(dir.path(), true).unwrap();
        let err = watches.start(dir.path(), true).unwrap_err();
        assert!(err.to_string().contains("Already watching"));
        assert_eq!(watches.active().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_unknown_path() {
        let watches = service();
        let err = watches.stop(Path::new("/not/watched")).unwrap_err();
        assert!(err.to_string().contains("No active watch"));
    }

    #[tokio::test]
    async fn test_detects_created_file() {
        let dir = TempDir::new().unwrap();
        let watches = service();
        watches.start(dir.path(), true).unwrap();

        // Let the initial snapshot land before touching the directory.
        tokio::time::sleep(Duration::from_millis(100)).await;
        fs::write(dir.path().join("new.txt"), "hello").unwrap();

        let mut seen = Vec::new();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            seen.extend(watches.drain(dir.path()).unwrap());
            if !seen.is_empty() {
                break;
            }
        }
        assert!(
            seen.iter()
                .any(|e| e.kind == WatchEventKind::Created && e.path.ends_with("new.txt"))
        );

        watches.stop(dir.path()).unwrap();
        assert!(watches.active().is_empty());
    }

    #[test]
    fn test_shutdown_clears_watchers() {
        let dir = TempDir::new().unwrap();
        let watches = service();
        tokio_test::block_on(async {
            watches.start(dir.path(), false).unwrap();
        });
        watches.shutdown();
        assert!(watches.active().is_empty());
        watches.shutdown();
    }

    #[test]
    fn test_diff_reports_all_kinds() {
        let t0 = SystemTime::UNIX_EPOCH;
        let t1 = t0 + Duration::from_secs(1);
        let previous: Snapshot = [(PathBuf::from("/a"), t0), (PathBuf::from("/b"), t0)]
            .into_iter()
            .collect();
        let current: Snapshot = [(PathBuf::from("/a"), t1), (PathBuf::from("/c"), t0)]
            .into_iter()
            .collect();

        let kinds: Vec<_> = diff(&previous, &current)
            .into_iter()
            .map(|e| (e.path, e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("/a".to_string(), WatchEventKind::Modified),
                ("/b".to_string(), WatchEventKind::Removed),
                ("/c".to_string(), WatchEventKind::Created),
            ]
        );
    }
}
