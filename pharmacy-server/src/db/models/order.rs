//! Order Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use shared::{DeliveryMethod, OrderStatus};

use super::serde_helpers;

/// Order ID type
pub type OrderId = RecordId;

/// A committed order line
///
/// `price` 是下单时从药品记录快照的单价，之后药价变动不影响已
/// 成交订单；`name` 是展示用名称快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(with = "serde_helpers::record_id")]
    pub medicine: RecordId,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Order model, created exactly once by the transaction coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<OrderId>,
    /// Record link to the ordering customer
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    pub items: Vec<OrderItem>,
    /// Server-computed Σ(price × quantity), 2 decimal places
    pub total_amount: f64,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub phone: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub prescription: Option<RecordId>,
    pub created_at: i64,
}

/// Create order payload (internal; built by the coordinator only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub customer: RecordId,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub phone: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub prescription: Option<RecordId>,
    pub created_at: i64,
}
