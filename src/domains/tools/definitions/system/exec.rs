//! Process execution tool definition.
//!
//! Runs a program directly (or through `sh -c` with shell=true), feeds
//! optional stdin and captures both output streams. The child is killed when
//! the timeout elapses.

use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{ok_text, resolve, truncate_bytes};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct ProcExecTool {
    config: Arc<Config>,
}

impl ProcExecTool {
    pub const NAME: &'static str = "proc_exec";

    pub const DESCRIPTION: &'static str = "Run a command and return its exit code, stdout and stderr. A non-zero exit status is reported as an error.";

    pub fn schema(default_timeout: u64) -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("command").describe("Program to run, or a shell script with shell=true"))
            .field(FieldSpec::strings("args").optional().describe("Arguments passed to the program"))
            .field(FieldSpec::string("stdin").optional())
            .field(FieldSpec::string("cwd").optional().describe("Working directory"))
            .field(FieldSpec::boolean("shell").default(false))
            .field(
                FieldSpec::integer("timeout_secs")
                    .range(1.0, 600.0)
                    .default(default_timeout.clamp(1, 600)),
            )
    }

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(ctx.config.tools.exec_timeout_secs),
            Self {
                config: ctx.config.clone(),
            },
        )
    }

    fn command(args: &ToolArgs) -> Result<Command, ToolError> {
        let program = args.str("command")?;
        let extra = args.strings("args");
        let cmd = if args.flag("shell") {
            let mut cmd = Command::new("sh");
            // Extra args become $0, $1, ... of the script
            cmd.arg("-c").arg(program).arg("sh").args(extra);
            cmd
        } else {
            let mut cmd = Command::new(program);
            cmd.args(extra);
            cmd
        };
        Ok(cmd)
    }
}

#[async_trait]
impl ToolHandler for ProcExecTool {
    #[instrument(skip_all, fields(command = args.opt_str("command").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let program = args.str("command")?;
        let timeout = Duration::from_secs(args.int("timeout_secs")? as u64);
        let limit = self.config.tools.max_output_bytes;

        let mut cmd = Self::command(&args)?;
        if let Some(cwd) = args.opt_str("cwd") {
            let dir = resolve(cwd, &self.config)?;
            if !dir.is_dir() {
                return Err(ToolError::failed(format!("cwd is not a directory: {}", cwd)));
            }
            cmd.current_dir(dir);
        }
        let stdin = args.opt_str("stdin").map(str::to_owned);
        cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ToolError::failed(format!("Failed to start '{}': {}", program, e)))?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            tokio::spawn(async move {
                if let Err(e) = pipe.write_all(input.as_bytes()).await {
                    warn!("Failed to write stdin: {}", e);
                }
            });
        }

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = async {
            tokio::try_join!(
                read_capped(stdout, limit),
                read_capped(stderr, limit),
                child.wait()
            )
        };

        // Dropping the child on timeout kills it.
        let (stdout, stderr, status) = match tokio::time::timeout(timeout, finished).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("'{}' timed out after {:?}", program, timeout);
                return Err(ToolError::Timeout(timeout));
            }
        };

        let elapsed = started.elapsed();
        let (stdout, stdout_cut) = truncate_bytes(&stdout, limit);
        let (stderr, stderr_cut) = truncate_bytes(&stderr, limit);
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());

        let mut body = format!("Exit code: {} ({} ms)\n", code, elapsed.as_millis());
        if !stdout.is_empty() {
            body.push_str(&format!("\n[stdout]\n{}", stdout));
            if stdout_cut {
                body.push_str("\n[stdout truncated]");
            }
        }
        if !stderr.is_empty() {
            body.push_str(&format!("\n[stderr]\n{}", stderr));
            if stderr_cut {
                body.push_str("\n[stderr truncated]");
            }
        }

        if status.success() {
            info!("'{}' exited successfully in {:?}", program, elapsed);
            ok_text(body)
        } else {
            warn!("'{}' exited with {}", program, code);
            Err(ToolError::failed(body))
        }
    }
}

/// Keep at most `limit + 1` bytes of a pipe and discard the rest, so the
/// child never blocks on a full pipe and truncation stays detectable.
async fn read_capped<R>(pipe: Option<R>, limit: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(Vec::new());
    };
    let mut kept = Vec::new();
    (&mut pipe)
        .take(limit as u64 + 1)
        .read_to_end(&mut kept)
        .await?;
    tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await?;
    Ok(kept)
}
