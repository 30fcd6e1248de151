//! Read file tool definition.

use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, ok_text, resolve};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct FsReadFileTool {
    config: Arc<Config>,
}

impl FsReadFileTool {
    pub const NAME: &'static str = "fs_read_file";

    pub const DESCRIPTION: &'static str = "Read a file as UTF-8 text or base64. Output is capped at max_bytes (server default when omitted).";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path").describe("File to read"))
            .field(
                FieldSpec::one_of("encoding", &["utf8", "base64"])
                    .default("utf8")
                    .describe("utf8 decodes lossily; base64 returns raw bytes encoded"),
            )
            .field(
                FieldSpec::integer("max_bytes")
                    .at_least(1.0)
                    .optional()
                    .describe("Maximum number of bytes to read"),
            )
    }

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(),
            Self {
                config: ctx.config.clone(),
            },
        )
    }
}

#[async_trait]
impl ToolHandler for FsReadFileTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let encoding = args.opt_str("encoding").unwrap_or("utf8");
        let max_bytes = args
            .opt_int("max_bytes")
            .map(|n| n as usize)
            .unwrap_or(self.config.tools.max_read_bytes);

        let path = resolve(raw_path, &self.config)?;
        if !path.is_file() {
            return Err(ToolError::failed(format!("Not a regular file: {}", raw_path)));
        }

        let total = path.metadata()?.len();
        let mut buffer = Vec::new();
        File::open(&path)?
            .take(max_bytes as u64)
            .read_to_end(&mut buffer)?;
        let truncated = total > buffer.len() as u64;

        info!("Read {} of {} bytes from {}", buffer.len(), total, raw_path);

        let mut body = match encoding {
            "base64" => BASE64.encode(&buffer),
            _ => String::from_utf8_lossy(&buffer).into_owned(),
        };
        if truncated {
            body.push_str(&format!(
                "\n\n[truncated: showing {} of {}]",
                format_size(buffer.len() as u64),
                format_size(total)
            ));
        }
        ok_text(body)
    }
}
