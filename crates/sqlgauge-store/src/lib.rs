//! SQLite integration: the query executor the harness evaluates against,
//! plus optional persistence of run reports.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sqlgauge_core::Executor;
use sqlgauge_types::{ExecutionOutcome, Row, RunReport};

/// Runs generated SQL against the fixture database. The connection is opened
/// read-only: generated queries must not be able to mutate the ground truth.
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExecutor {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn render_schema(conn: &Connection) -> Result<String> {
        let mut tables = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names: Vec<String> = tables
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut lines = Vec::with_capacity(names.len());
        for name in names {
            let mut cols = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
            let columns: Vec<String> = cols
                .query_map([&name], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
            lines.push(format!("{}: [{}]", name, columns.join(", ")));
        }
        Ok(lines.join("\n"))
    }

    fn run_query(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<Row>> {
        let mut stmt = conn.prepare(sql)?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (i, name) in column_names.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            out.push(record);
        }
        Ok(out)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(String::from_utf8_lossy(b).into_owned()),
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn schema_text(&self) -> Result<String> {
        let conn = self.conn.lock().unwrap();
        Self::render_schema(&conn)
    }

    async fn execute(&self, sql: &str) -> ExecutionOutcome {
        let conn = self.conn.lock().unwrap();
        match Self::run_query(&conn, sql) {
            Ok(rows) => ExecutionOutcome::Rows(rows),
            Err(e) => ExecutionOutcome::Error(e.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<Value>,
}

impl Store {
    /// Open a store at the given path (e.g., "runs.db"), creating it if
    /// needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY,
                created_at TEXT NOT NULL,
                metadata TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY,
                run_id INTEGER NOT NULL,
                model TEXT NOT NULL,
                prompt TEXT NOT NULL,
                category TEXT,
                question TEXT NOT NULL,
                generated_sql TEXT NOT NULL,
                syntax_ok BOOLEAN NOT NULL,
                sql_match REAL NOT NULL,
                answer_match REAL NOT NULL,
                error TEXT,
                FOREIGN KEY(run_id) REFERENCES runs(id)
            )",
            [],
        )?;

        Ok(())
    }

    pub fn create_run(&self, metadata: Option<Value>) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO runs (created_at, metadata) VALUES (?1, ?2)",
            params![now.to_rfc3339(), metadata.map(|v| v.to_string())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn save_report(&self, run_id: i64, report: &RunReport) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "INSERT INTO results
                (run_id, model, prompt, category, question, generated_sql,
                 syntax_ok, sql_match, answer_match, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for r in &report.records {
            stmt.execute(params![
                run_id,
                r.model,
                r.prompt,
                r.category,
                r.question,
                r.generated_sql,
                r.result.syntax_ok,
                r.result.sql_match_percent,
                r.result.answer_match_percent,
                r.error,
            ])?;
        }
        Ok(())
    }

    pub fn count_results(&self, run_id: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM results WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn list_runs(&self) -> Result<Vec<RunEntity>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, created_at, metadata FROM runs ORDER BY id DESC")?;
        let runs = stmt
            .query_map([], |row| {
                let created: String = row.get(1)?;
                let metadata: Option<String> = row.get(2)?;
                Ok((row.get::<_, i64>(0)?, created, metadata))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        runs.into_iter()
            .map(|(id, created, metadata)| {
                let created_at = DateTime::parse_from_rfc3339(&created)?.with_timezone(&Utc);
                let metadata = metadata.map(|m| serde_json::from_str(&m)).transpose()?;
                Ok(RunEntity {
                    id,
                    created_at,
                    metadata,
                })
            })
            .collect()
    }
}
