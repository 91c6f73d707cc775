//! SQLite query engine over the catalog database (SqliteQueryEngine).
//!
//! A database file that does not exist yet is created with the `gse` table and two seed
//! records. Generated SQL runs on a read-only connection.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;
use crate::query::QueryEngine;

const BOOTSTRAP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS gse (id INTEGER PRIMARY KEY, accession TEXT, title TEXT);
INSERT OR IGNORE INTO gse (accession, title) VALUES ('GSE10000', 'Mouse liver expression');
INSERT OR IGNORE INTO gse (accession, title) VALUES ('GSE20000', 'Human brain single-cell');
"#;

/// One row of the `gse` catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GseRecord {
    pub id: i64,
    pub accession: String,
    pub title: String,
}

impl GseRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            accession: row.get(1)?,
            title: row.get(2)?,
        })
    }
}

/// Query engine backed by a SQLite file.
///
/// Uses spawn_blocking for async; every call opens its own connection.
///
/// **Interaction**: Selected by `build_executor` from `DATABASE_URL`.
pub struct SqliteQueryEngine {
    db_path: PathBuf,
}

impl SqliteQueryEngine {
    /// Opens the database at `path`, bootstrapping it when the file is new.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CapabilityError> {
        let db_path = path.as_ref().to_path_buf();
        let fresh = !db_path.exists();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CapabilityError::QueryExecution(e.to_string()))?;
        }
        let conn = Connection::open(&db_path)
            .map_err(|e| CapabilityError::QueryExecution(e.to_string()))?;
        if fresh {
            conn.execute_batch(BOOTSTRAP_SQL)
                .map_err(|e| CapabilityError::QueryExecution(e.to_string()))?;
            tracing::info!(path = %db_path.display(), "created catalog database");
        }
        Ok(Self { db_path })
    }

    /// Accepts a plain path or a `sqlite:///path` URL.
    pub fn from_url(url: &str) -> Result<Self, CapabilityError> {
        Self::new(database_path(url))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Every catalog record, by id.
    pub async fn records(&self) -> Result<Vec<GseRecord>, CapabilityError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let err = |e: rusqlite::Error| CapabilityError::QueryExecution(e.to_string());
            let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(err)?;
            let mut stmt = conn
                .prepare("SELECT id, accession, title FROM gse ORDER BY id")
                .map_err(err)?;
            let rows = stmt.query_map([], GseRecord::from_row).map_err(err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(err)
        })
        .await
        .map_err(|e| CapabilityError::QueryExecution(e.to_string()))?
    }

    /// The record with `accession`, if any.
    pub async fn record(&self, accession: &str) -> Result<Option<GseRecord>, CapabilityError> {
        let db_path = self.db_path.clone();
        let accession = accession.to_string();
        tokio::task::spawn_blocking(move || {
            let err = |e: rusqlite::Error| CapabilityError::QueryExecution(e.to_string());
            let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(err)?;
            conn.query_row(
                "SELECT id, accession, title FROM gse WHERE accession = ?1",
                params![accession],
                GseRecord::from_row,
            )
            .optional()
            .map_err(err)
        })
        .await
        .map_err(|e| CapabilityError::QueryExecution(e.to_string()))?
    }
}

/// Path part of a `sqlite:///...` URL; anything else is taken as a path already.
pub fn database_path(url: &str) -> PathBuf {
    match url.strip_prefix("sqlite:///") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(url),
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => format!("'{}'", String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

#[async_trait]
impl QueryEngine for SqliteQueryEngine {
    async fn schema(&self) -> Result<String, CapabilityError> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let err = |e: rusqlite::Error| CapabilityError::QueryGeneration(e.to_string());
            let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(err)?;
            let mut stmt = conn
                .prepare(
                    "SELECT sql FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )
                .map_err(err)?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(err)?;
            let ddl = rows.collect::<Result<Vec<_>, _>>().map_err(err)?;
            Ok::<_, CapabilityError>(ddl.join("\n\n"))
        })
        .await
        .map_err(|e| CapabilityError::QueryGeneration(e.to_string()))?
    }

    /// Rows are rendered as a list of tuples, e.g. `[(1, 'GSE10000', 'Mouse liver expression')]`.
    async fn execute(&self, sql: &str) -> Result<String, CapabilityError> {
        let sql = sql.to_string();
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let err = |e: rusqlite::Error| CapabilityError::QueryExecution(e.to_string());
            let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(err)?;
            let mut stmt = conn.prepare(&sql).map_err(err)?;
            let columns = stmt.column_count();
            let mut rows = stmt.query([]).map_err(err)?;
            let mut rendered = Vec::new();
            while let Some(row) = rows.next().map_err(err)? {
                let mut values = Vec::with_capacity(columns);
                for i in 0..columns {
                    values.push(render_value(row.get_ref(i).map_err(err)?));
                }
                rendered.push(format!("({})", values.join(", ")));
            }
            Ok::<_, CapabilityError>(format!("[{}]", rendered.join(", ")))
        })
        .await
        .map_err(|e| CapabilityError::QueryExecution(e.to_string()))?
    }
}
