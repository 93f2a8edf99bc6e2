//! Repository Module
//!
//! Provides CRUD operations over the embedded SurrealDB tables.

pub mod medicine;
pub mod order;
pub mod prescription;
pub mod user;

// Re-exports
pub use medicine::MedicineRepository;
pub use order::OrderRepository;
pub use prescription::PrescriptionRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::NotFound(msg),
            RepoError::Duplicate(msg) => crate::utils::AppError::Conflict(msg),
            RepoError::Validation(msg) => crate::utils::AppError::Validation(msg),
            RepoError::Database(msg) => crate::utils::AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// API 层接受 "table:id" 或纯 key；parse_id 统一解析为 RecordId。
// 记录寻址绑定 RecordId 本体，字段比较绑定其字符串形式。

/// Parse an API-supplied id into a RecordId for the given table
pub fn parse_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if id.contains(':') {
        let rid: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {id}")))?;
        if rid.table() != table {
            return Err(RepoError::Validation(format!(
                "ID {id} does not reference table {table}"
            )));
        }
        Ok(rid)
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Row shape for `SELECT count() … GROUP ALL`
#[derive(Debug, serde::Deserialize)]
pub(crate) struct CountRow {
    pub count: i64,
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Count all rows of a table
    pub async fn count_table(&self, table: &str) -> RepoResult<i64> {
        let mut result = self
            .db
            .query(format!("SELECT count() FROM {table} GROUP ALL"))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_both_forms() {
        let full = parse_id("medicine", "medicine:abc123").unwrap();
        assert_eq!(full.table(), "medicine");

        let bare = parse_id("medicine", "abc123").unwrap();
        assert_eq!(bare.table(), "medicine");
        assert_eq!(full, bare);
    }

    #[test]
    fn test_parse_id_rejects_wrong_table() {
        assert!(parse_id("medicine", "user:abc123").is_err());
    }
}
