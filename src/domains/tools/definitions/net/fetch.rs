//! HTTP fetch tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info, instrument, warn};

use super::{http_client, parse_url};
use crate::core::config::Config;
use crate::domains::tools::definitions::common::{ok_text, truncate_chars};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct HttpFetchTool {
    config: Arc<Config>,
}

impl HttpFetchTool {
    pub const NAME: &'static str = "http_fetch";

    pub const DESCRIPTION: &'static str = "Send an HTTP request and return the status, content type and (truncated) body. Non-2xx responses are reported as errors.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("url"))
            .field(FieldSpec::one_of("method", &["GET", "POST", "PUT", "DELETE", "HEAD"]).default("GET"))
            .field(FieldSpec::string("body").optional())
            .field(
                FieldSpec::strings("headers")
                    .optional()
                    .describe("Extra headers as 'Name: value' strings"),
            )
            .field(FieldSpec::integer("max_chars").at_least(1.0).default(20000))
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

fn parse_header(raw: &str) -> Result<(&str, &str), ToolError> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| ToolError::failed(format!("Invalid header '{}': expected 'Name: value'", raw)))
}

#[async_trait]
impl ToolHandler for HttpFetchTool {
    #[instrument(skip_all, fields(url = args.opt_str("url").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let url = parse_url(args.str("url")?)?;
        let method: Method = args
            .opt_str("method")
            .unwrap_or("GET")
            .parse()
            .map_err(|_| ToolError::fault("method passed validation but is not an HTTP method"))?;
        let max_chars = args.int("max_chars")? as usize;

        let client = http_client(self.config.tools.http_timeout_secs)?;
        let mut request = client.request(method.clone(), url.clone());
        for raw in args.strings("headers") {
            let (name, value) = parse_header(raw)?;
            request = request.header(name, value);
        }
        if let Some(body) = args.opt_str("body") {
            request = request.body(body.to_string());
        }

        info!("{} {}", method, url);
        let response = request.send().await.map_err(|e| {
            warn!("HTTP request failed: {}", e);
            if e.is_timeout() {
                ToolError::failed(format!("HTTP request timed out: {}", url))
            } else {
                ToolError::failed(format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        debug!(status = status.as_u16(), "Received HTTP response");

        let body = if method == Method::HEAD {
            String::new()
        } else {
            response
                .text()
                .await
                .map_err(|e| ToolError::failed(format!("Failed to read response body: {}", e)))?
        };
        let (body, truncated) = truncate_chars(&body, max_chars);

        let mut text = format!(
            "HTTP {} {}\nContent-Type: {}\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            content_type
        );
        if !body.is_empty() {
            text.push('\n');
            text.push_str(&body);
        }
        if truncated {
            text.push_str(&format!("\n\n[truncated to {} chars]", max_chars));
        }

        if status.is_success() {
            ok_text(text)
        } else {
            Err(ToolError::failed(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::definitions::net::test_server::serve_once;
    use crate::domains::tools::envelope;
    use serde_json::json;

    fn def() -> ToolDefinition {
        HttpFetchTool::definition(&ToolContext::for_tests())
    }

    #[tokio::test]
    async fn test_fetch_and_truncate() {
        let url = serve_once("200 OK", "text/plain", "hello from the test server").await;
        let outcome = run(&def(), json!({ "url": url, "max_chars": 5 })).await;
        let text = envelope::text_of(&outcome);

        assert!(!envelope::is_error(&outcome));
        assert!(text.starts_with("HTTP 200 OK"));
        assert!(text.contains("Content-Type: text/plain"));
        assert!(text.contains("\nhello\n"));
        assert!(text.contains("[truncated to 5 chars]"));
    }

    #[tokio::test]
    async fn test_error_status() {
        let url = serve_once("404 Not Found", "text/plain", "missing").await;
        let outcome = run(&def(), json!({ "url": url })).await;
        assert!(envelope::is_error(&outcome));
        assert!(envelope::text_of(&outcome).starts_with("HTTP 404"));
    }

    #[tokio::test]
    async fn test_unreachable_and_bad_input() {
        // Bind then drop to get a loopback port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let outcome = run(&def(), json!({ "url": format!("http://127.0.0.1:{}", port) })).await;
        assert!(envelope::text_of(&outcome).contains("HTTP request failed"));

        let outcome = run(&def(), json!({ "url": "file:///etc/passwd" })).await;
        assert!(envelope::text_of(&outcome).contains("Unsupported URL scheme"));

        let outcome = run(&def(), json!({ "url": "http://127.0.0.1:1", "headers": ["nocolon"] })).await;
        assert!(envelope::text_of(&outcome).contains("Invalid header"));
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header("Accept: text/html").unwrap(), ("Accept", "text/html"));
        assert!(parse_header(": x").is_err());
    }
}
