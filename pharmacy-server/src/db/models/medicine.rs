//! Medicine Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Medicine ID type
pub type MedicineId = RecordId;

/// Medicine model
///
/// `stock` 只允许经 InventoryLedger 或供应商更新变更，任何路径都
/// 不得使其为负。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<MedicineId>,
    pub name: String,
    pub description: String,
    /// Unit price (> 0)
    pub price: f64,
    /// On-hand stock (≥ 0)
    pub stock: i64,
    pub manufacturer: String,
    pub category: String,
    #[serde(default)]
    pub requires_prescription: bool,
    /// Record link to the owning supplier (user with role=supplier)
    #[serde(with = "serde_helpers::record_id")]
    pub supplier: RecordId,
    /// Expiry date (Unix milliseconds)
    pub expiry_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create medicine payload (supplier)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub manufacturer: String,
    pub category: String,
    #[serde(default)]
    pub requires_prescription: bool,
    pub expiry_date: i64,
}

/// Update medicine payload (supplier; restock / expiry only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}
