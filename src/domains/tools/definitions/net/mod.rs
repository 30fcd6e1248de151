//! Network tools: HTTP, scraping, port probes and DNS.

pub mod dns;
pub mod fetch;
pub mod port;
pub mod scrape;

pub use dns::DnsLookupTool;
pub use fetch::HttpFetchTool;
pub use port::NetPortCheckTool;
pub use scrape::WebScrapeTool;

use std::time::Duration;

use reqwest::Url;

use crate::domains::tools::ToolError;

const USER_AGENT: &str = concat!("toolhub-mcp-server/", env!("CARGO_PKG_VERSION"));

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ToolError::fault(format!("Failed to create HTTP client: {}", e)))
}

/// Only absolute http(s) URLs are fetched.
pub(crate) fn parse_url(raw: &str) -> Result<Url, ToolError> {
    let url = Url::parse(raw).map_err(|e| ToolError::failed(format!("Invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolError::failed(format!(
            "Unsupported URL scheme '{}': only http and https are allowed",
            other
        ))),
    }
}
