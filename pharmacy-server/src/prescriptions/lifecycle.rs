//! 处方生命周期
//!
//! 两条转换路径：
//! - 开方医生手动标记 (`transition`)；
//! - 订单事务协调器消费 (`consume_for_order`) —— 条件更新保证同一张
//!   active 处方在并发下最多被消费一次。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

use shared::PrescriptionStatus;

use crate::db::models::Prescription;
use crate::db::repository::{PrescriptionRepository, RepoError};
use crate::utils::AppError;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Prescription not found: {0}")]
    NotFound(String),

    #[error("Actor is not the owning doctor")]
    Forbidden,

    #[error("Prescription is already terminal: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for LifecycleError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => LifecycleError::NotFound(msg),
            RepoError::Validation(msg) => LifecycleError::NotFound(msg),
            other => LifecycleError::Database(other.to_string()),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(msg) => AppError::NotFound(msg),
            LifecycleError::Forbidden => {
                AppError::forbidden("Prescription belongs to a different doctor")
            }
            LifecycleError::InvalidState(msg) => AppError::Conflict(msg),
            LifecycleError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Owns prescription status transitions
#[derive(Clone)]
pub struct PrescriptionLifecycle {
    repo: PrescriptionRepository,
}

impl PrescriptionLifecycle {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: PrescriptionRepository::new(db),
        }
    }

    pub fn repo(&self) -> &PrescriptionRepository {
        &self.repo
    }

    /// Doctor-initiated transition to a terminal status
    ///
    /// 只有开方医生本人可以操作；目标状态必须是终态；已处于终态的
    /// 处方拒绝再次变更（状态保持不变）。
    pub async fn transition(
        &self,
        id: &str,
        acting_doctor: &str,
        target: PrescriptionStatus,
    ) -> Result<Prescription, LifecycleError> {
        if !target.is_terminal() {
            return Err(LifecycleError::InvalidState(
                "Target status must be completed or expired".to_string(),
            ));
        }

        let prescription = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| LifecycleError::NotFound(format!("Prescription {id}")))?;

        if prescription.doctor.to_string() != acting_doctor {
            return Err(LifecycleError::Forbidden);
        }

        if prescription.status.is_terminal() {
            return Err(LifecycleError::InvalidState(format!(
                "Prescription {id} is already terminal"
            )));
        }

        let rid = prescription
            .id
            .clone()
            .ok_or_else(|| LifecycleError::Database("Prescription record has no id".to_string()))?;

        // 条件更新兜底：并发下重复转换只有一个生效
        self.repo
            .set_status_if_active(&rid, target)
            .await?
            .ok_or_else(|| {
                LifecycleError::InvalidState(format!("Prescription {id} is already terminal"))
            })
    }

    /// Coordinator-initiated consumption (active → completed)
    ///
    /// 不复查操作者身份（订单的客户归属校验已在上游完成），但仍
    /// 拒绝终态处方——两个并发订单引用同一张 active 处方时，最多
    /// 一个消费成功。
    pub async fn consume_for_order(&self, id: &RecordId) -> Result<(), LifecycleError> {
        match self
            .repo
            .set_status_if_active(id, PrescriptionStatus::Completed)
            .await?
        {
            Some(_) => Ok(()),
            None => {
                // 区分不存在与已终态
                let existing = self.repo.find_by_id(&id.to_string()).await?;
                match existing {
                    Some(_) => Err(LifecycleError::InvalidState(format!(
                        "Prescription {id} is already terminal"
                    ))),
                    None => Err(LifecycleError::NotFound(format!("Prescription {id}"))),
                }
            }
        }
    }
}
