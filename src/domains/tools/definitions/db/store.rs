//! Item store tools: put, get, list and delete string values by key.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::domains::tools::definitions::common::{ok_text, structured};
use crate::domains::tools::services::ItemStore;
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

fn key_field() -> FieldSpec {
    FieldSpec::string("key").describe("Item key")
}

fn require_key(args: &ToolArgs) -> Result<&str, ToolError> {
    let key = args.str("key")?;
    if key.is_empty() {
        return Err(ToolError::failed("Key must not be empty"));
    }
    Ok(key)
}

pub struct StorePutTool {
    store: Arc<ItemStore>,
}

impl StorePutTool {
    pub const NAME: &'static str = "store_put";

    pub const DESCRIPTION: &'static str = "Save a string value under a key in the server's item store, replacing any previous value.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            ToolSchema::new()
                .field(key_field())
                .field(FieldSpec::string("value")),
            Self {
                store: ctx.store.clone(),
            },
        )
    }
}

#[async_trait]
impl ToolHandler for StorePutTool {
    #[instrument(skip_all, fields(key = args.opt_str("key").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let key = require_key(&args)?;
        let replaced = self.store.put(key, args.str("value")?).await?;
        info!("Stored '{}' (replaced: {})", key, replaced);
        ok_text(if replaced {
            format!("Updated '{}'", key)
        } else {
            format!("Stored '{}'", key)
        })
    }
}

pub struct StoreGetTool {
    store: Arc<ItemStore>,
}

impl StoreGetTool {
    pub const NAME: &'static str = "store_get";

    pub const DESCRIPTION: &'static str = "Read the value stored under a key.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            ToolSchema::new().field(key_field()),
            Self {
                store: ctx.store.clone(),
            },
        )
    }
}

#[async_trait]
impl ToolHandler for StoreGetTool {
    #[instrument(skip_all, fields(key = args.opt_str("key").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let key = require_key(&args)?;
        match self.store.get(key).await? {
            Some(item) => structured(item.value.clone(), &item),
            None => Err(ToolError::failed(format!("No item stored under '{}'", key))),
        }
    }
}

pub struct StoreListTool {
    store: Arc<ItemStore>,
}

impl StoreListTool {
    pub const NAME: &'static str = "store_list";

    pub const DESCRIPTION: &'static str = "List stored items ordered by key, optionally restricted to a key prefix.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            ToolSchema::new()
                .field(FieldSpec::string("prefix").optional())
                .field(FieldSpec::integer("limit").range(1.0, 1000.0).default(100)),
            Self {
                store: ctx.store.clone(),
            },
        )
    }
}

#[async_trait]
impl ToolHandler for StoreListTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let limit = args.int("limit")? as usize;
        let items = self.store.list(args.opt_str("prefix"), limit).await?;
        if items.is_empty() {
            return ok_text("No items stored");
        }
        let lines: Vec<String> = items
            .iter()
            .map(|item| format!("{} = {}", item.key, item.value))
            .collect();
        structured(
            format!("{}\n\n{} item(s)", lines.join("\n"), items.len()),
            &serde_json::json!({ "items": items }),
        )
    }
}

pub struct StoreDeleteTool {
    store: Arc<ItemStore>,
}

impl StoreDeleteTool {
    pub const NAME: &'static str = "store_delete";

    pub const DESCRIPTION: &'static str = "Delete the item stored under a key.";

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            ToolSchema::new().field(key_field()),
            Self {
                store: ctx.store.clone(),
            },
        )
    }
}

#[async_trait]
impl ToolHandler for StoreDeleteTool {
    #[instrument(skip_all, fields(key = args.opt_str("key").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let key = require_key(&args)?;
        if self.store.delete(key).await? {
            info!("Deleted '{}'", key);
            ok_text(format!("Deleted '{}'", key))
        } else {
            Err(ToolError::failed(format!("No item stored under '{}'", key)))
        }
    }
}
