//! 库存台账
//!
//! # 并发模型
//!
//! 所有预留/回补批次串行通过一把异步写锁（单写者），批内逐行执行
//! 条件更新 `UPDATE … SET stock -= $qty WHERE stock >= $qty`：
//!
//! - 两个并发批次对同一药品的预留不会超卖——锁保证批次原子可见；
//! - 批内某行失败时，已扣减的前序行在返回前全部回补，
//!   失败的药品 id 会在错误中报告；
//! - 任何路径都不会把 stock 置为负数。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;
use tokio::sync::Mutex;

use shared::util::now_millis;

use crate::db::models::Medicine;

/// A single reservation line: medicine + quantity to decrement
#[derive(Debug, Clone)]
pub struct ReserveLine {
    pub medicine: RecordId,
    pub quantity: i64,
}

/// Ledger errors; the failing medicine is always identified
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Medicine not found: {medicine}")]
    NotFound { medicine: RecordId },

    #[error("Insufficient stock for {medicine}")]
    Insufficient { medicine: RecordId },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for LedgerError {
    fn from(err: surrealdb::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

/// Sole owner of stock mutations
pub struct InventoryLedger {
    db: Surreal<Db>,
    /// 单写者锁：预留/回补批次串行执行
    write_lock: Mutex<()>,
}

impl InventoryLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            write_lock: Mutex::new(()),
        }
    }

    /// Atomically verify and decrement stock for the whole batch
    ///
    /// 行按调用方给定顺序检查；第一行失败即中止整批，
    /// 之前已扣减的行回补后返回错误。成功时所有行均已扣减。
    pub async fn check_and_reserve(&self, lines: &[ReserveLine]) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;

        let mut applied: Vec<&ReserveLine> = Vec::new();
        for line in lines {
            match self.try_decrement(line).await {
                Ok(true) => applied.push(line),
                Ok(false) => {
                    let exists = self.medicine_exists(&line.medicine).await;
                    self.restock(&applied).await;
                    return Err(match exists {
                        Ok(true) => LedgerError::Insufficient {
                            medicine: line.medicine.clone(),
                        },
                        Ok(false) => LedgerError::NotFound {
                            medicine: line.medicine.clone(),
                        },
                        Err(e) => e,
                    });
                }
                Err(e) => {
                    self.restock(&applied).await;
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Undo a reservation (restock)
    ///
    /// 仅用于同一逻辑事务中后续步骤失败时的补偿。
    pub async fn release(&self, lines: &[ReserveLine]) -> Result<(), LedgerError> {
        let _guard = self.write_lock.lock().await;
        let refs: Vec<&ReserveLine> = lines.iter().collect();
        self.restock(&refs).await;
        Ok(())
    }

    /// Conditional decrement; returns false when stock is short or the record is missing
    async fn try_decrement(&self, line: &ReserveLine) -> Result<bool, LedgerError> {
        let mut result = self
            .db
            .query("UPDATE $thing SET stock -= $qty, updated_at = $now WHERE stock >= $qty RETURN AFTER")
            .bind(("thing", line.medicine.clone()))
            .bind(("qty", line.quantity))
            .bind(("now", now_millis()))
            .await?;
        let updated: Vec<Medicine> = result.take(0)?;
        Ok(!updated.is_empty())
    }

    async fn medicine_exists(&self, medicine: &RecordId) -> Result<bool, LedgerError> {
        let found: Option<Medicine> = self.db.select(medicine.clone()).await?;
        Ok(found.is_some())
    }

    /// Best-effort restock of already-applied lines; failures are logged, never silent
    async fn restock(&self, applied: &[&ReserveLine]) {
        for line in applied {
            let restore = self
                .db
                .query("UPDATE $thing SET stock += $qty, updated_at = $now")
                .bind(("thing", line.medicine.clone()))
                .bind(("qty", line.quantity))
                .bind(("now", now_millis()))
                .await;
            if let Err(e) = restore {
                tracing::error!(
                    medicine = %line.medicine,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to restock after aborted reservation"
                );
            }
        }
    }
}
