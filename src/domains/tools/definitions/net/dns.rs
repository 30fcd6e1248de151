//! DNS lookup tool definition.

use std::collections::BTreeSet;
use std::net::IpAddr;

use async_trait::async_trait;
use tracing::instrument;

use crate::domains::tools::definitions::common::ok_text;
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct DnsLookupTool;

impl DnsLookupTool {
    pub const NAME: &'static str = "dns_lookup";

    pub const DESCRIPTION: &'static str = "Resolve a host name to its IPv4 and IPv6 addresses using the system resolver.";

    pub fn definition(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            ToolSchema::new().field(FieldSpec::string("host")),
            Self,
        )
    }
}

#[async_trait]
impl ToolHandler for DnsLookupTool {
    #[instrument(skip_all, fields(host = args.opt_str("host").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let host = args.str("host")?.trim();
        if host.is_empty() {
            return Err(ToolError::failed("Host must not be empty"));
        }

        let addrs: BTreeSet<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ToolError::failed(format!("Failed to resolve '{}': {}", host, e)))?
            .map(|addr| addr.ip())
            .collect();

        let (v4, v6): (Vec<&IpAddr>, Vec<&IpAddr>) = addrs.iter().partition(|ip| ip.is_ipv4());
        let mut text = format!("{} resolves to {} address(es)", host, addrs.len());
        for ip in v4.iter().chain(v6.iter()) {
            text.push_str(&format!("\n{}", ip));
        }
        ok_text(text)
    }
}
