//! TCP port probe tool definition.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

use crate::domains::tools::definitions::common::ok_text;
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolHandler, ToolResult, ToolSchema,
};

pub struct NetPortCheckTool;

impl NetPortCheckTool {
    pub const NAME: &'static str = "net_port_check";

    pub const DESCRIPTION: &'static str = "Check whether a TCP port accepts connections. Reports open, closed or filtered (timed out).";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("host"))
            .field(FieldSpec::integer("port").range(1.0, 65535.0))
            .field(FieldSpec::integer("timeout_ms").range(1.0, 60000.0).default(3000))
    }

    pub fn definition(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Self::schema(), Self)
    }
}

#[async_trait]
impl ToolHandler for NetPortCheckTool {
    #[instrument(skip_all, fields(host = args.opt_str("host").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let host = args.str("host")?;
        let port = args.int("port")? as u16;
        let timeout = Duration::from_millis(args.int("timeout_ms")? as u64);

        let started = Instant::now();
        let state = match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => format!("open ({} ms)", started.elapsed().as_millis()),
            Ok(Err(e)) => {
                debug!("Connect to {}:{} failed: {}", host, port, e);
                format!("closed ({})", e)
            }
            Err(_) => format!("filtered (no answer within {} ms)", timeout.as_millis()),
        };
        ok_text(format!("{}:{} is {}", host, port, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;

    #[tokio::test]
    async fn test_open_then_closed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let def = NetPortCheckTool::definition(&ToolContext::for_tests());

        let outcome = run(&def, json!({ "host": "127.0.0.1", "port": port })).await;
        assert!(envelope::text_of(&outcome).contains("is open"));

        drop(listener);
        let outcome = run(&def, json!({ "host": "127.0.0.1", "port": port })).await;
        assert!(envelope::text_of(&outcome).contains("is closed"));
        assert!(!envelope::is_error(&outcome));
    }

    #[tokio::test]
    async fn test_port_range() {
        let def = NetPortCheckTool::definition(&ToolContext::for_tests());
        let outcome = run(&def, json!({ "host": "127.0.0.1", "port": 70000 })).await;
        assert!(envelope::text_of(&outcome).contains("`port`"));
    }
}
