//! 平台核心枚举
//!
//! 所有角色和状态都是封闭枚举，在边界处解析一次，
//! 之后不再以自由字符串比较。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// 用户角色，创建后不可变更
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supplier,
    Customer,
    Doctor,
}

impl Role {
    /// 角色的标准字符串表示 (JWT claims 等)
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supplier => "supplier",
            Role::Customer => "customer",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "supplier" => Ok(Role::Supplier),
            "customer" => Ok(Role::Customer),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// 订单状态
///
/// `collect` 订单在下单时即为 Completed，`delivery` 订单保持 Pending
/// 直到外部履约流程推进状态 (Processing/Cancelled 由管理端操作)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

/// 处方状态，active 为唯一非终态
///
/// 合法转换仅有 active→completed 和 active→expired。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Active,
    Completed,
    Expired,
}

impl PrescriptionStatus {
    /// 终态不可再变更
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PrescriptionStatus::Active)
    }
}

/// 配送方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Delivery,
    Collect,
}
