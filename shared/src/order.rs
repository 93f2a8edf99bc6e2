//! 下单请求的线上格式
//!
//! 客户端只提交药品 id 和数量；单价由服务端从当前药品记录
//! 快照，客户端声明的金额一律不被采信。

use serde::{Deserialize, Serialize};

use crate::types::DeliveryMethod;

/// A single order line as submitted by the customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    /// Medicine id ("medicine:xxx")
    pub medicine: String,
    pub quantity: i64,
}

/// Place-order payload (customer only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderInput {
    pub items: Vec<OrderItemInput>,
    pub delivery_method: DeliveryMethod,
    /// Required iff delivery_method == Delivery
    #[serde(default)]
    pub address: Option<String>,
    pub phone: String,
    /// Optional prescription id ("prescription:xxx") consumed by this order
    #[serde(default)]
    pub prescription: Option<String>,
}
