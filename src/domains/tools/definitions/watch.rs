//! Filesystem watcher tools backed by the shared [`WatchService`].

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::schema_for_type;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{ok_text, resolve, structured};
use crate::domains::tools::services::{WatchEvent, WatchInfo, WatchService};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// Events collected for one watched path.
#[derive(Debug, Serialize, JsonSchema)]
pub struct WatchEvents {
    pub path: String,
    pub events: Vec<WatchEvent>,
}

/// Snapshot of every active watcher.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ActiveWatches {
    pub watches: Vec<WatchInfo>,
}

fn path_only() -> ToolSchema {
    ToolSchema::new().field(FieldSpec::string("path").describe("Watched path"))
}

/// Map a user path to the watcher key.
///
/// A watched directory may already be gone when the caller stops it, so an
/// exact match against an active key is accepted when resolution fails.
fn watch_key(raw: &str, config: &Config, watches: &WatchService) -> Result<PathBuf, ToolError> {
    match resolve(raw, config) {
        Ok(path) => Ok(path),
        Err(e) => watches
            .active()
            .into_iter()
            .find(|info| info.path == raw)
            .map(|info| PathBuf::from(info.path))
            .ok_or(e),
    }
}

fn summarize(events: &[WatchEvent], path: &str) -> String {
    let mut text = format!("{} event(s) for '{}'", events.len(), path);
    for event in events {
        text.push_str(&format!(
            "\n{} {:?} {}",
            event.at.format("%H:%M:%S%.3f"),
            event.kind,
            event.path
        ));
    }
    text
}

pub struct WatchStartTool {
    config: Arc<Config>,
    watches: Arc<WatchService>,
}

impl WatchStartTool {
    pub const NAME: &'static str = "watch_start";

    pub const DESCRIPTION: &'static str = "Start watching a file or directory for changes. Changes are buffered until read with watch_events. Only one watch per path.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            path_only().field(
                FieldSpec::boolean("recursive")
                    .default(true)
                    .describe("Also watch subdirectories"),
            ),
            Self {
                config: ctx.config.clone(),
                watches: ctx.watches.clone(),
            },
        )
    }
}

#[async_trait]
impl ToolHandler for WatchStartTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let path = resolve(args.str("path")?, &self.config)?;
        let recursive = args.flag("recursive");
        self.watches.start(&path, recursive)?;
        ok_text(format!(
            "Watching '{}'{}",
            path.display(),
            if recursive { " recursively" } else { "" }
        ))
    }
}

pub struct WatchStopTool {
    config: Arc<Config>,
    watches: Arc<WatchService>,
}

impl WatchStopTool {
    pub const NAME: &'static str = "watch_stop";

    pub const DESCRIPTION: &'static str = "Stop watching a path and return any events that were not read yet.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            path_only(),
            Self {
                config: ctx.config.clone(),
                watches: ctx.watches.clone(),
            },
        )
        .with_output_schema(schema_for_type::<WatchEvents>())
    }
}

#[async_trait]
impl ToolHandler for WatchStopTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let key = watch_key(args.str("path")?, &self.config, &self.watches)?;
        let events = self.watches.stop(&key)?;
        let path = key.display().to_string();
        structured(
            format!("Stopped watching '{}'. {}", path, summarize(&events, &path)),
            &WatchEvents { path, events },
        )
    }
}

pub struct WatchEventsTool {
    config: Arc<Config>,
    watches: Arc<WatchService>,
}

impl WatchEventsTool {
    pub const NAME: &'static str = "watch_events";

    pub const DESCRIPTION: &'static str = "Return and clear the buffered change events for a watched path.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            path_only(),
            Self {
                config: ctx.config.clone(),
                watches: ctx.watches.clone(),
            },
        )
        .with_output_schema(schema_for_type::<WatchEvents>())
    }
}

#[async_trait]
impl ToolHandler for WatchEventsTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let key = watch_key(args.str("path")?, &self.config, &self.watches)?;
        let events = self.watches.drain(&key)?;
        let path = key.display().to_string();
        structured(summarize(&events, &path), &WatchEvents { path, events })
    }
}

pub struct WatchListTool {
    watches: Arc<WatchService>,
}

impl WatchListTool {
    pub const NAME: &'static str = "watch_list";

    pub const DESCRIPTION: &'static str = "List active watches with their pending event counts.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            ToolSchema::new(),
            Self {
                watches: ctx.watches.clone(),
            },
        )
        .with_output_schema(schema_for_type::<ActiveWatches>())
    }
}

#[async_trait]
impl ToolHandler for WatchListTool {
    async fn call(&self, _args: ToolArgs) -> ToolResult {
        let watches = self.watches.active();
        let mut text = format!("{} active watch(es)", watches.len());
        for w in &watches {
            text.push_str(&format!(
                "\n{} (recursive: {}, pending: {}, since {})",
                w.path,
                w.recursive,
                w.pending_events,
                w.started_at.to_rfc3339()
            ));
        }
        structured(text, &ActiveWatches { watches })
    }
}
