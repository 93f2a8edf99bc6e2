//! 认证相关请求 DTO

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Role;

/// Login request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup request payload
///
/// 角色在注册时一次性确定，之后不可变更。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: Role,
}

/// Prescription line as submitted by a doctor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionLineInput {
    /// Medicine id ("medicine:xxx")
    pub medicine: String,
    pub dosage: String,
    pub duration: String,
}

/// Create-prescription payload (doctor only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionCreateInput {
    /// Patient id ("user:xxx"), must reference a customer
    pub patient: String,
    pub medicines: Vec<PrescriptionLineInput>,
    #[serde(default)]
    pub notes: String,
    /// Validity deadline (Unix milliseconds)
    pub valid_until: i64,
}

/// Status update payload for PATCH /api/prescriptions/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionStatusUpdate {
    pub status: crate::types::PrescriptionStatus,
}
