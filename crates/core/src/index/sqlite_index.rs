//! SQLite-backed metadata index.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use crate::config::IndexConfig;

use super::{IndexConnection, IndexError, IndexFilter, IndexRecord, MetadataIndex};

/// Metadata index stored in a single SQLite table.
pub struct SqliteMetadataIndex {
    conn: IndexConnection,
    table: String,
}

impl SqliteMetadataIndex {
    /// Index backed by the file and table in `config`. Nothing is opened until first use.
    pub fn new(config: &IndexConfig) -> Self {
        Self::at_path(
            &config.path,
            &config.collection,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    pub fn at_path(path: &Path, table: &str, busy_timeout: Duration) -> Self {
        Self {
            conn: IndexConnection::file(path, busy_timeout, Self::schema(table)),
            table: table.to_string(),
        }
    }

    /// In-memory index (useful for testing).
    pub fn in_memory() -> Self {
        Self {
            conn: IndexConnection::in_memory(Self::schema("documents")),
            table: "documents".to_string(),
        }
    }

    /// Callers guarantee `table` is a plain identifier (checked by config validation).
    fn schema(table: &str) -> String {
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                repository_id TEXT NOT NULL,
                file_name TEXT NOT NULL,
                mime_type TEXT NOT NULL,
                indexed_at TEXT NOT NULL,
                document_name TEXT NOT NULL,
                document_type TEXT NOT NULL,
                legal_name TEXT NOT NULL,
                tax_id TEXT NOT NULL,
                validity_state TEXT NOT NULL,
                upload_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_tax_id ON {table}(tax_id);
            CREATE INDEX IF NOT EXISTS idx_{table}_repository_id ON {table}(repository_id);
            "#
        )
    }

    pub fn connection(&self) -> &IndexConnection {
        &self.conn
    }

    fn build_where_clause(filter: &IndexFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        for (key, value) in filter.conditions() {
            conditions.push(format!("{} = ?", key.as_str()));
            params.push(Box::new(value.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// Number of stored records (diagnostics and tests).
    pub fn count(&self) -> Result<i64, IndexError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        self.conn.with(|conn| {
            conn.query_row(&sql, [], |row| row.get(0))
                .map_err(|e| IndexError::Database(e.to_string()))
        })
    }

    /// Every record for `repository_id`, oldest first.
    pub fn records_for(&self, repository_id: &str) -> Result<Vec<IndexRecord>, IndexError> {
        let sql = format!(
            "SELECT repository_id, file_name, mime_type, indexed_at, document_name, document_type,
                    legal_name, tax_id, validity_state, upload_date
             FROM {} WHERE repository_id = ?1 ORDER BY seq",
            self.table
        );
        self.conn.with(|conn| {
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| IndexError::Database(e.to_string()))?;
            let rows = stmt
                .query_map(params![repository_id], Self::row_to_record)
                .map_err(|e| IndexError::Database(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| IndexError::Database(e.to_string()))
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<IndexRecord> {
        let indexed_at_str: String = row.get(3)?;
        let indexed_at = DateTime::parse_from_rfc3339(&indexed_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(IndexRecord {
            repository_id: row.get(0)?,
            file_name: row.get(1)?,
            mime_type: row.get(2)?,
            indexed_at,
            metadata: super::IndexedMetadata {
                document_name: row.get(4)?,
                document_type: row.get(5)?,
                legal_name: row.get(6)?,
                tax_id: row.get(7)?,
                validity_state: row.get(8)?,
                upload_date: row.get(9)?,
            },
        })
    }
}

impl MetadataIndex for SqliteMetadataIndex {
    fn insert(&self, record: &IndexRecord) -> Result<(), IndexError> {
        if record.repository_id.trim().is_empty() {
            return Err(IndexError::MissingRepositoryId);
        }

        let sql = format!(
            "INSERT INTO {} (repository_id, file_name, mime_type, indexed_at, document_name,
                document_type, legal_name, tax_id, validity_state, upload_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            self.table
        );
        let m = &record.metadata;

        self.conn.with(|conn| {
            conn.execute(
                &sql,
                params![
                    record.repository_id,
                    record.file_name,
                    record.mime_type,
                    // Fixed width so text ordering follows time ordering
                    record.indexed_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                    m.document_name,
                    m.document_type,
                    m.legal_name,
                    m.tax_id,
                    m.validity_state,
                    m.upload_date,
                ],
            )
            .map_err(|e| IndexError::Database(e.to_string()))
        })?;

        debug!(repository_id = %record.repository_id, tax_id = %m.tax_id, "Indexed document");
        Ok(())
    }

    fn find_one(&self, filter: &IndexFilter) -> Result<String, IndexError> {
        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT repository_id FROM {} {} ORDER BY indexed_at DESC, seq DESC LIMIT 1",
            self.table, where_clause
        );
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let found: Option<String> = self.conn.with(|conn| {
            conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))
                .optional()
                .map_err(|e| IndexError::Database(e.to_string()))
        })?;

        found.ok_or(IndexError::NotFound)
    }

    fn close(&self) -> Result<(), IndexError> {
        self.conn.close()
    }
}
