//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDb 引擎) 连接与 schema 定义

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

/// Database service, owns the embedded SurrealDB handle
///
/// 进程启动时构造一次，通过 [`crate::core::ServerState`] 注入，
/// 不在请求路径上重建连接。
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at the given directory
    pub async fn new(db_dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_dir.as_ref())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns("pharmacy")
            .use_db("pharmacy")
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established (embedded SurrealDB, RocksDb)");

        Ok(Self { db })
    }
}

/// Schema definitions applied at startup (idempotent)
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    // email 全局唯一，身份即邮箱
    db.query("DEFINE INDEX IF NOT EXISTS user_email_idx ON TABLE user FIELDS email UNIQUE")
        .await
        .map_err(|e| AppError::database(format!("Failed to define user email index: {e}")))?;

    // 常用查询路径的辅助索引
    db.query("DEFINE INDEX IF NOT EXISTS medicine_supplier_idx ON TABLE medicine FIELDS supplier")
        .await
        .map_err(|e| AppError::database(format!("Failed to define medicine index: {e}")))?;

    db.query("DEFINE INDEX IF NOT EXISTS order_customer_idx ON TABLE order FIELDS customer")
        .await
        .map_err(|e| AppError::database(format!("Failed to define order index: {e}")))?;

    Ok(())
}
