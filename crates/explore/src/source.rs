//! Connection to the external relational store.
//!
//! The store is SQLite; the connection string is a path or `file:` URI.
//! Identifier names are validated against the store's own catalog before
//! they are quoted into SQL — nothing user-supplied is interpolated
//! unchecked.

use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tabchat_engine::{Column, Table, Value};

use crate::error::ExploreError;

/// Busy timeout for every connection: a locked store fails fast instead
/// of stalling the conversation.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One live connection to the external store. Dropping the value releases
/// the connection.
#[derive(Debug)]
pub struct ExternalSource {
    conn: Connection,
    uri: String,
}

impl ExternalSource {
    /// Open the store read-only-ish (no implicit create: a mistyped path
    /// is a connection failure, not a fresh empty database).
    pub fn connect(uri: &str) -> Result<Self, ExploreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(uri, flags)
            .map_err(|e| ExploreError::ConnectionFailed(e.to_string()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| ExploreError::ConnectionFailed(e.to_string()))?;
        Ok(Self { conn, uri: uri.to_string() })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// User table names from the catalog, in catalog order.
    pub fn table_names(&self) -> Result<Vec<String>, ExploreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
            )
            .map_err(query_err)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_err)?;
        Ok(names)
    }

    /// Load a table's full contents as a snapshot. The name must be one of
    /// `table_names()`.
    pub fn load_table(&self, name: &str) -> Result<Table, ExploreError> {
        self.require_table(name)?;
        self.query_table(&format!("SELECT * FROM \"{name}\""), &[])
    }

    /// Substring search: rows of `table` where `column` cast to text
    /// contains `term`, first `limit` rows only.
    pub fn search(
        &self,
        table: &str,
        column: &str,
        term: &str,
        limit: usize,
    ) -> Result<Table, ExploreError> {
        self.require_table(table)?;
        let columns = self.column_names(table)?;
        if !columns.iter().any(|c| c == column) {
            return Err(ExploreError::QueryFailed(format!(
                "no column '{column}' in table '{table}'"
            )));
        }
        let sql = format!(
            "SELECT * FROM \"{table}\" WHERE CAST(\"{column}\" AS TEXT) LIKE ?1 ESCAPE '\\' LIMIT {limit}"
        );
        let pattern = format!("%{}%", escape_like(term));
        self.query_table(&sql, &[&pattern])
    }

    /// Column names of one table, in declaration order.
    pub fn column_names(&self, table: &str) -> Result<Vec<String>, ExploreError> {
        self.require_table(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM \"{table}\" LIMIT 0"))
            .map_err(query_err)?;
        Ok(stmt.column_names().iter().map(|s| (*s).to_string()).collect())
    }

    fn require_table(&self, name: &str) -> Result<(), ExploreError> {
        if self.table_names()?.iter().any(|t| t == name) {
            Ok(())
        } else {
            Err(ExploreError::QueryFailed(format!("no such table '{name}'")))
        }
    }

    fn query_table(&self, sql: &str, params: &[&str]) -> Result<Table, ExploreError> {
        let mut stmt = self.conn.prepare(sql).map_err(query_err)?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| (*s).to_string()).collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params))
            .map_err(query_err)?;
        while let Some(row) = rows.next().map_err(query_err)? {
            for (i, col) in columns.iter_mut().enumerate() {
                col.push(map_value(row.get_ref(i).map_err(query_err)?));
            }
        }

        let columns = names
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Table::new(columns).map_err(|e| ExploreError::QueryFailed(e.to_string()))
    }
}

fn query_err(e: rusqlite::Error) -> ExploreError {
    ExploreError::QueryFailed(e.to_string())
}

/// SQLite scalar -> snapshot value. Blobs have no scalar counterpart and
/// load as null.
fn map_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::Number(i as f64),
        ValueRef::Real(f) => Value::Number(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

/// Escape LIKE metacharacters in the user's term so `%`/`_` match
/// literally. The pattern's own wildcards are added around the result.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_connect_missing_file_fails() {
        let err = ExternalSource::connect("/nonexistent/dir/store.db").unwrap_err();
        assert!(matches!(err, ExploreError::ConnectionFailed(_)));
    }
}
