//! SQLite query tool definition.
//!
//! Opens the database per call. In read-only mode the connection itself is
//! opened read-only, so writes fail even if the SQL slips past the
//! statement check.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{resolve, resolve_new, structured};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// Rows returned by a query, or the change count of a write.
#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// More rows were available than `max_rows`
    pub truncated: bool,
    /// Rows changed by a write statement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<usize>,
}

pub struct SqliteQueryTool {
    config: Arc<Config>,
}

impl SqliteQueryTool {
    pub const NAME: &'static str = "sqlite_query";

    pub const DESCRIPTION: &'static str = "Run one SQL statement against a SQLite database file. Parameters bind to ?1, ?2, ... as text. Read-only by default.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("database").describe("Path to the SQLite file"))
            .field(FieldSpec::string("sql"))
            .field(FieldSpec::strings("params").optional())
            .field(
                FieldSpec::boolean("read_only")
                    .default(true)
                    .describe("Set false to allow writes (creates the file if needed)"),
            )
            .field(FieldSpec::integer("max_rows").range(1.0, 10000.0).default(500))
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
        .with_output_schema(rmcp::handler::server::tool::schema_for_type::<QueryResult>())
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(format!("<blob {} bytes>", b.len())),
    }
}

fn db_error(e: rusqlite::Error) -> ToolError {
    ToolError::failed(format!("SQLite error: {}", e))
}

fn execute(
    path: PathBuf,
    sql: String,
    params: Vec<String>,
    read_only: bool,
    max_rows: usize,
) -> Result<QueryResult, ToolError> {
    let flags = if read_only {
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
    };
    let conn = Connection::open_with_flags(&path, flags).map_err(db_error)?;
    let mut stmt = conn.prepare(&sql).map_err(db_error)?;

    if read_only && !stmt.readonly() {
        return Err(ToolError::failed(
            "Statement modifies the database; pass read_only=false to allow writes",
        ));
    }

    if stmt.column_count() == 0 {
        let changes = stmt.execute(params_from_iter(params.iter())).map_err(db_error)?;
        return Ok(QueryResult {
            changes: Some(changes),
            ..Default::default()
        });
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut rows_iter = stmt.query(params_from_iter(params.iter())).map_err(db_error)?;
    let mut result = QueryResult {
        columns,
        ..Default::default()
    };
    while let Some(row) = rows_iter.next().map_err(db_error)? {
        if result.rows.len() == max_rows {
            result.truncated = true;
            break;
        }
        let values = (0..width)
            .map(|i| row.get_ref(i).map(to_json))
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_error)?;
        result.rows.push(values);
    }
    Ok(result)
}

fn render(result: &QueryResult) -> String {
    if let Some(changes) = result.changes {
        return format!("Statement executed: {} row(s) changed", changes);
    }
    let mut text = result.columns.join("\t");
    for row in &result.rows {
        text.push('\n');
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                Value::Null => "NULL".to_string(),
                other => other.to_string(),
            })
            .collect();
        text.push_str(&cells.join("\t"));
    }
    text.push_str(&format!("\n\n{} row(s)", result.rows.len()));
    if result.truncated {
        text.push_str(" [truncated]");
    }
    text
}

#[async_trait]
impl ToolHandler for SqliteQueryTool {
    #[instrument(skip_all, fields(database = args.opt_str("database").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let database = args.str("database")?;
        let read_only = args.flag("read_only");
        let path = if read_only {
            resolve(database, &self.config)?
        } else {
            resolve_new(database, &self.config)?
        };
        let sql = args.str("sql")?.to_string();
        let params = args.strings("params").to_vec();
        let max_rows = args.int("max_rows")? as usize;

        let result = tokio::task::spawn_blocking(move || execute(path, sql, params, read_only, max_rows))
            .await
            .map_err(|e| ToolError::fault(e.to_string()))??;

        info!("Query returned {} row(s)", result.rows.len());
        structured(render(&result), &result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("test.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, score REAL);
             INSERT INTO people (name, score) VALUES ('ada', 9.5), ('bob', NULL), ('cy', 7.0);",
        )
        .unwrap();
        path
    }

    fn def() -> ToolDefinition {
        SqliteQueryTool::definition(&ToolContext::for_tests())
    }

    #[tokio::test]
    async fn test_select_with_params() {
        let dir = TempDir::new().unwrap();
        let db = fixture(&dir);

        let outcome = run(
            &def(),
            json!({ "database": db, "sql": "SELECT name, score FROM people WHERE name = ?1", "params": ["ada"] }),
        )
        .await;
        let data = outcome.structured_content.clone().unwrap();
        assert_eq!(data["columns"], json!(["name", "score"]));
        assert_eq!(data["rows"], json!([["ada", 9.5]]));
        assert!(envelope::text_of(&outcome).contains("1 row(s)"));
    }

    #[tokio::test]
    async fn test_max_rows_truncates() {
        let dir = TempDir::new().unwrap();
        let db = fixture(&dir);

        let outcome = run(
            &def(),
            json!({ "database": db, "sql": "SELECT * FROM people ORDER BY id", "max_rows": 2 }),
        )
        .await;
        let data = outcome.structured_content.unwrap();
        assert_eq!(data["rows"].as_array().unwrap().len(), 2);
        assert_eq!(data["truncated"], true);
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let db = fixture(&dir);

        let outcome = run(&def(), json!({ "database": db, "sql": "DELETE FROM people" })).await;
        assert!(envelope::text_of(&outcome).contains("read_only=false"));

        let outcome = run(
            &def(),
            json!({ "database": db, "sql": "DELETE FROM people WHERE score IS NULL", "read_only": false }),
        )
        .await;
        assert!(envelope::text_of(&outcome).contains("1 row(s) changed"));
    }

    #[tokio::test]
    async fn test_bad_sql() {
        let dir = TempDir::new().unwrap();
        let db = fixture(&dir);
        let outcome = run(&def(), json!({ "database": db, "sql": "SELEKT 1" })).await;
        assert!(envelope::text_of(&outcome).contains("SQLite error"));
    }
}
