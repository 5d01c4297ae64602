//! SQL execution capability for the directive.
//!
//! [`SqlEngine`] opens a connection for an opaque connection string and
//! [`SqlConnection`] runs one query, returning column names and stringified
//! rows. Any database client with synchronous query execution can implement
//! the pair; the shipped [`SqliteEngine`] targets SQLite through `rusqlite`.
use core::fmt;
use std::error;

use rusqlite::{types::ValueRef, Connection};

/// The result of executing one query: ordered column names and the rows
/// produced for them, every scalar already converted to text.
///
/// Rows move out by value through [`QueryResult::into_rows`], so a result can
/// only be consumed once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Creates a new [`QueryResult`]
    ///
    /// # Parameters
    /// - `columns`: the ordered column names of the result set
    /// - `rows`: one entry per result row, each holding one cell per column
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Getter for the ordered column names
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns in the result set.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of rows in the result set.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Consumes the result and moves the body rows out.
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// Error returned by an engine when opening a connection or running a query
/// fails; carries the client's own message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Creates a new [`EngineError`] from any message
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Getter for the underlying message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl error::Error for EngineError {}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Capability to open a connection for an opaque connection string.
pub trait SqlEngine {
    /// Opens a connection for `connection_string`.
    ///
    /// # Errors
    /// Returns an [`EngineError`] if the string is invalid or the target is
    /// unreachable.
    fn connect(&self, connection_string: &str) -> Result<Box<dyn SqlConnection>, EngineError>;
}

/// Capability to execute one query on an open connection.
///
/// The connection is released when the value is dropped, so scoping the box
/// to one directive invocation gives guaranteed release on every exit path.
pub trait SqlConnection {
    /// Executes `query` as a single statement and collects the result set.
    ///
    /// # Errors
    /// Returns an [`EngineError`] on syntax errors, constraint violations, or
    /// connectivity loss mid-query.
    fn run_query(&mut self, query: &str) -> Result<QueryResult, EngineError>;
}

/// [`SqlEngine`] backed by SQLite via `rusqlite`.
///
/// The connection string is passed to the client unchanged, so plain paths,
/// `file:` URIs, and `:memory:` all work.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SqliteEngine;

impl SqlEngine for SqliteEngine {
    fn connect(&self, connection_string: &str) -> Result<Box<dyn SqlConnection>, EngineError> {
        let conn = Connection::open(connection_string)?;
        Ok(Box::new(SqliteConnection { conn }))
    }
}

struct SqliteConnection {
    conn: Connection,
}

impl SqlConnection for SqliteConnection {
    fn run_query(&mut self, query: &str) -> Result<QueryResult, EngineError> {
        let mut stmt = self.conn.prepare(query)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        let column_count = columns.len();
        let mut rows = Vec::new();
        let mut raw_rows = stmt.query([])?;
        while let Some(row) = raw_rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for index in 0..column_count {
                cells.push(cell_text(row.get_ref(index)?));
            }
            rows.push(cells);
        }
        Ok(QueryResult::new(columns, rows))
    }
}

/// Converts one scalar to its textual form. Every type is stringified
/// uniformly: null becomes the empty string, numbers their natural
/// rendering, binary data lossy UTF-8.
fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
