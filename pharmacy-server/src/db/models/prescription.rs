//! Prescription Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::PrescriptionStatus;

use super::serde_helpers;

/// Prescription ID type
pub type PrescriptionId = RecordId;

/// A prescribed medicine line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionLine {
    #[serde(with = "serde_helpers::record_id")]
    pub medicine: RecordId,
    pub dosage: String,
    pub duration: String,
}

/// Prescription model
///
/// 状态机：active → completed / active → expired，终态不可逆。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<PrescriptionId>,
    /// Record link to the patient (user with role=customer)
    #[serde(with = "serde_helpers::record_id")]
    pub patient: RecordId,
    /// Record link to the issuing doctor
    #[serde(with = "serde_helpers::record_id")]
    pub doctor: RecordId,
    pub medicines: Vec<PrescriptionLine>,
    #[serde(default)]
    pub notes: String,
    pub status: PrescriptionStatus,
    /// Validity deadline (Unix milliseconds)
    pub valid_until: i64,
    pub created_at: i64,
}

/// Create prescription payload (internal; ids already resolved)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub patient: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub doctor: RecordId,
    pub medicines: Vec<PrescriptionLine>,
    pub notes: String,
    pub valid_until: i64,
}
