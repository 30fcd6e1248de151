//! Tool handlers and definitions.
//!
//! A [`ToolDefinition`] bundles a unique name, a declarative [`ToolSchema`]
//! and a [`ToolHandler`]. Handlers only ever see arguments that already passed
//! validation, so they may assume required fields are present and well-typed.

use std::sync::Arc;

use futures::future::BoxFuture;
use rmcp::model::{CallToolResult, JsonObject, Tool};

use super::args::ToolArgs;
use super::error::ToolError;
use super::schema::ToolSchema;
use super::validator;

/// What a handler hands back to the dispatcher.
///
/// `Ok` may itself carry an error Outcome (`is_error: Some(true)`) when the
/// handler wants full control over the message; `Err` is normalized by the
/// dispatcher.
pub type ToolResult = Result<CallToolResult, ToolError>;

/// Trait implemented by every tool.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with validated arguments.
    async fn call(&self, args: ToolArgs) -> ToolResult;
}

/// Adapter that lets a plain closure act as a handler.
pub struct FnHandler<F>(pub F);

#[async_trait::async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(ToolArgs) -> BoxFuture<'static, ToolResult> + Send + Sync,
{
    async fn call(&self, args: ToolArgs) -> ToolResult {
        (self.0)(args).await
    }
}

/// One registered tool. Immutable once registered.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub schema: ToolSchema,
    pub output_schema: Option<Arc<JsonObject>>,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            output_schema: None,
            handler: Arc::new(handler),
        }
    }

    /// Advertise the shape of `structuredContent`.
    pub fn with_output_schema(mut self, schema: impl Into<Arc<JsonObject>>) -> Self {
        self.output_schema = Some(schema.into());
        self
    }

    /// Startup validation of the descriptor itself.
    pub fn check(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("tool name is empty".to_string());
        }
        if let Some(c) = self
            .name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(format!("tool name '{}' contains '{}'", self.name, c));
        }
        self.schema.check()?;
        for field in self.schema.fields() {
            if let Some(default) = &field.default {
                validator::coerce(field, default)
                    .map_err(|e| format!("invalid default: {}", e))?;
            }
        }
        Ok(())
    }

    /// Create a Tool model for this definition (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: self.schema.to_json_schema(),
            annotations: None,
            output_schema: self.output_schema.clone(),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::schema::FieldSpec;
    use futures::FutureExt;
    use rmcp::model::Content;

    fn noop() -> FnHandler<impl Fn(ToolArgs) -> BoxFuture<'static, ToolResult> + Send + Sync> {
        FnHandler(|_args: ToolArgs| {
            async { Ok::<_, ToolError>(CallToolResult::success(vec![Content::text("ok")])) }.boxed()
        })
    }

    #[test]
    fn test_check_accepts_valid_definition() {
        let def = ToolDefinition::new(
            "fs_read",
            "Read",
            ToolSchema::new().field(FieldSpec::integer("n").range(1.0, 5.0).default(2)),
            noop(),
        );
        assert!(def.check().is_ok());
    }

    #[test]
    fn test_check_rejects_bad_names() {
        let def = ToolDefinition::new("", "Empty", ToolSchema::new(), noop());
        assert!(def.check().is_err());

        let def = ToolDefinition::new("has space", "Space", ToolSchema::new(), noop());
        assert!(def.check().unwrap_err().contains("' '"));
    }

    #[test]
    fn test_check_rejects_default_outside_range() {
        let def = ToolDefinition::new(
            "bad_default",
            "Bad",
            ToolSchema::new().field(FieldSpec::integer("n").range(1.0, 5.0).default(9)),
            noop(),
        );
        assert!(def.check().unwrap_err().contains("invalid default"));
    }

    #[test]
    fn test_to_tool_carries_schema() {
        let def = ToolDefinition::new(
            "echo",
            "Echo text",
            ToolSchema::new().field(FieldSpec::string("text")),
            noop(),
        );
        let tool = def.to_tool();
        assert_eq!(tool.name, "echo");
        assert_eq!(tool.input_schema["required"], serde_json::json!(["text"]));
    }

    #[tokio::test]
    async fn test_fn_handler_invokes_closure() {
        let handler = noop();
        let result = handler.call(ToolArgs::default()).await.unwrap();
        assert_eq!(result.is_error, Some(false));
    }
}
