//! Relational-store access.
//!
//! [`QueryStore`] is the fetch/execute seam the repository is written against;
//! [`SqliteStore`] is the SQLite-backed client. Every driver failure surfaces
//! as [`ThreatError::Storage`] and is never retried.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde::Serialize;
use threat_core::credentials::ConnectionSettings;
use threat_core::error::{Result, ThreatError};
use tracing::{debug, info};

// ── SqlValue / Row ────────────────────────────────────────────────────────────

/// A positional parameter or a cell of a fetched row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|i| u64::try_from(i).ok())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer parameter from an unsigned count; fails when it exceeds `i64::MAX`.
    pub fn from_u64(value: u64) -> Result<Self> {
        i64::try_from(value)
            .map(SqlValue::Integer)
            .map_err(|_| ThreatError::storage("bind", format!("{} exceeds integer range", value)))
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Integer(i)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                SqlValue::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
        })
    }
}

/// One fetched row, keyed by column name.
pub type Row = BTreeMap<String, SqlValue>;

// ── QueryStore ────────────────────────────────────────────────────────────────

/// Query execution against a relational store.
pub trait QueryStore {
    /// Run a query and return every row it produces.
    fn fetch(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    /// Run a statement that produces no rows.
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<()>;
}

impl<S: QueryStore + ?Sized> QueryStore for &S {
    fn fetch(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        (**self).fetch(query, params)
    }

    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<()> {
        (**self).execute(query, params)
    }
}

// ── SqliteStore ───────────────────────────────────────────────────────────────

/// SQLite-backed [`QueryStore`].
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open `<data_dir>/<db_name>.sqlite3`, creating the directory if needed.
    pub fn connect(settings: &ConnectionSettings, data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(|source| ThreatError::FileWrite {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let path = data_dir.join(format!("{}.sqlite3", settings.db_name));
        debug!(
            "Connecting as {}@{} to {}",
            settings.username,
            settings.host,
            path.display()
        );
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ThreatError::storage("connect", e))?;
        info!("Opened database {}", path.display());
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| ThreatError::storage("connect", e))?;
        Ok(Self { conn, path: None })
    }

    /// Database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl QueryStore for SqliteStore {
    fn fetch(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let err = |e: rusqlite::Error| ThreatError::storage("fetch", e);

        let mut stmt = self.conn.prepare(query).map_err(err)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(params.iter())).map_err(err)?;

        let mut fetched = Vec::new();
        while let Some(row) = rows.next().map_err(err)? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                let value = row.get_ref(idx).map_err(err)?;
                record.insert(name.clone(), SqlValue::from(value));
            }
            fetched.push(record);
        }
        Ok(fetched)
    }

    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<()> {
        self.conn
            .execute(query, params_from_iter(params.iter()))
            .map_err(|e| ThreatError::storage("execute", e))?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
