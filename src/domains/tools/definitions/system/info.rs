//! Host information tool definition.
//!
//! Read-only: repeated calls only differ in the live figures (memory, load,
//! uptime).

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use sysinfo::System;
use tracing::instrument;

use crate::domains::tools::definitions::common::{format_size, structured};
use crate::domains::tools::{
    ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult, ToolSchema,
};

/// Snapshot of the host.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SystemSummary {
    pub hostname: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub arch: String,
    pub cpu_count: usize,
    pub total_memory_bytes: u64,
    pub used_memory_bytes: u64,
    pub total_swap_bytes: u64,
    pub uptime_secs: u64,
    /// 1, 5 and 15 minute load averages
    pub load_average: [f64; 3],
}

impl SystemSummary {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_list(sysinfo::CpuRefreshKind::nothing());
        let load = System::load_average();

        Self {
            hostname: System::host_name(),
            os_name: System::name(),
            os_version: System::os_version(),
            kernel_version: System::kernel_version(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_count: system.cpus().len(),
            total_memory_bytes: system.total_memory(),
            used_memory_bytes: system.used_memory(),
            total_swap_bytes: system.total_swap(),
            uptime_secs: System::uptime(),
            load_average: [load.one, load.five, load.fifteen],
        }
    }
}

pub struct SysInfoTool;

impl SysInfoTool {
    pub const NAME: &'static str = "sys_info";

    pub const DESCRIPTION: &'static str = "Report host details: OS, kernel, CPU count, memory, uptime and load average.";

    pub fn definition(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, ToolSchema::new(), Self)
            .with_output_schema(rmcp::handler::server::tool::schema_for_type::<SystemSummary>())
    }
}

#[async_trait]
impl ToolHandler for SysInfoTool {
    #[instrument(skip_all)]
    async fn call(&self, _args: ToolArgs) -> ToolResult {
        let summary = tokio::task::spawn_blocking(SystemSummary::collect)
            .await
            .map_err(|e| ToolError::fault(e.to_string()))?;

        let unknown = || "unknown".to_string();
        let text = format!(
            "Host: {}\nOS: {} {}\nKernel: {}\nArch: {}\nCPUs: {}\nMemory: {} used of {}\nUptime: {}h {}m\nLoad: {:.2} {:.2} {:.2}",
            summary.hostname.clone().unwrap_or_else(unknown),
            summary.os_name.clone().unwrap_or_else(unknown),
            summary.os_version.clone().unwrap_or_default(),
            summary.kernel_version.clone().unwrap_or_else(unknown),
            summary.arch,
            summary.cpu_count,
            format_size(summary.used_memory_bytes),
            format_size(summary.total_memory_bytes),
            summary.uptime_secs / 3600,
            (summary.uptime_secs % 3600) / 60,
            summary.load_average[0],
            summary.load_average[1],
            summary.load_average[2],
        );
        structured(text, &summary)
    }
}
