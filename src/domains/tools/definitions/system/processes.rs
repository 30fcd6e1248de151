//! Process listing tool definition.

use async_trait::async_trait;
use sysinfo::{ProcessesToUpdate, System};
use tracing::instrument;

use crate::domains::tools::definitions::common::{format_size, ok_text};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

#[derive(Debug, Clone)]
struct ProcessRow {
    pid: u32,
    name: String,
    cpu: f32,
    memory: u64,
}

pub struct ProcListTool;

impl ProcListTool {
    pub const NAME: &'static str = "proc_list";

    pub const DESCRIPTION: &'static str = "List running processes with CPU and memory usage, optionally filtered by name.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("filter").optional().describe("Case-insensitive substring of the process name"))
            .field(FieldSpec::one_of("sort_by", &["cpu", "memory", "pid", "name"]).default("cpu"))
            .field(FieldSpec::integer("limit").range(1.0, 500.0).default(50))
    }

    pub fn definition(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(Self::NAME, Self::DESCRIPTION, Self::schema(), Self)
    }
}

/// Two refreshes, `MINIMUM_CPU_UPDATE_INTERVAL` apart, so CPU usage is meaningful.
async fn snapshot() -> Result<Vec<ProcessRow>, ToolError> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    system.refresh_processes(ProcessesToUpdate::All, true);

    Ok(system
        .processes()
        .iter()
        .map(|(pid, process)| ProcessRow {
            pid: pid.as_u32(),
            name: process.name().to_string_lossy().into_owned(),
            cpu: process.cpu_usage(),
            memory: process.memory(),
        })
        .collect())
}

fn sort_rows(rows: &mut [ProcessRow], sort_by: &str) {
    match sort_by {
        "memory" => rows.sort_by(|a, b| b.memory.cmp(&a.memory)),
        "pid" => rows.sort_by_key(|r| r.pid),
        "name" => rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        _ => rows.sort_by(|a, b| b.cpu.total_cmp(&a.cpu)),
    }
}

#[async_trait]
impl ToolHandler for ProcListTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let filter = args.opt_str("filter").map(str::to_lowercase);
        let sort_by = args.opt_str("sort_by").unwrap_or("cpu");
        let limit = args.int("limit")? as usize;

        let mut rows = snapshot().await?;
        if let Some(filter) = &filter {
            rows.retain(|r| r.name.to_lowercase().contains(filter));
        }
        let matched = rows.len();
        sort_rows(&mut rows, sort_by);
        rows.truncate(limit);

        let mut body = format!("{:>8}  {:>6}  {:>10}  NAME\n", "PID", "CPU%", "MEMORY");
        for row in &rows {
            body.push_str(&format!(
                "{:>8}  {:>6.1}  {:>10}  {}\n",
                row.pid,
                row.cpu,
                format_size(row.memory),
                row.name
            ));
        }
        body.push_str(&format!("\nShowing {} of {} processes", rows.len(), matched));
        ok_text(body)
    }
}
