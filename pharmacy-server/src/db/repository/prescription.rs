//! Prescription Repository

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use shared::PrescriptionStatus;
use shared::util::now_millis;

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Prescription, PrescriptionCreate};

const PRESCRIPTION_TABLE: &str = "prescription";

#[derive(Clone)]
pub struct PrescriptionRepository {
    base: BaseRepository,
}

impl PrescriptionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new prescription in `active` status
    pub async fn create(&self, data: PrescriptionCreate) -> RepoResult<Prescription> {
        let prescription = Prescription {
            id: None,
            patient: data.patient,
            doctor: data.doctor,
            medicines: data.medicines,
            notes: data.notes,
            status: PrescriptionStatus::Active,
            valid_until: data.valid_until,
            created_at: now_millis(),
        };

        let created: Option<Prescription> = self
            .base
            .db()
            .create(PRESCRIPTION_TABLE)
            .content(prescription)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create prescription".to_string()))
    }

    /// Find prescription by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Prescription>> {
        let rid = parse_id(PRESCRIPTION_TABLE, id)?;
        let prescription: Option<Prescription> = self.base.db().select(rid).await?;
        Ok(prescription)
    }

    /// Prescriptions issued by a doctor, newest first
    pub async fn find_by_doctor(&self, doctor: &RecordId) -> RepoResult<Vec<Prescription>> {
        let prescriptions: Vec<Prescription> = self
            .base
            .db()
            .query("SELECT * FROM prescription WHERE doctor = $doctor ORDER BY created_at DESC")
            .bind(("doctor", doctor.to_string()))
            .await?
            .take(0)?;
        Ok(prescriptions)
    }

    /// Prescriptions issued to a patient, newest first
    pub async fn find_by_patient(&self, patient: &RecordId) -> RepoResult<Vec<Prescription>> {
        let prescriptions: Vec<Prescription> = self
            .base
            .db()
            .query("SELECT * FROM prescription WHERE patient = $patient ORDER BY created_at DESC")
            .bind(("patient", patient.to_string()))
            .await?
            .take(0)?;
        Ok(prescriptions)
    }

    /// Conditionally transition `active → target`
    ///
    /// 条件更新：只有仍处于 active 的处方才会被改写，返回 None 表示
    /// 处方不存在或已处于终态——两个并发消费者最多一个成功。
    pub async fn set_status_if_active(
        &self,
        id: &RecordId,
        target: PrescriptionStatus,
    ) -> RepoResult<Option<Prescription>> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET status = $status WHERE status = 'active' RETURN AFTER")
            .bind(("thing", id.clone()))
            .bind(("status", target))
            .await?;
        let updated: Vec<Prescription> = result.take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Total prescription count (reporting)
    pub async fn count(&self) -> RepoResult<i64> {
        self.base.count_table(PRESCRIPTION_TABLE).await
    }
}
