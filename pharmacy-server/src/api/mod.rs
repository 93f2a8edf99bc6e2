//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (signup/login/me)
//! - [`medicines`] - 药品管理接口 (目录 + 供应商自管)
//! - [`prescriptions`] - 处方接口 (医生开方/患者查询/状态流转)
//! - [`orders`] - 订单接口 (下单/查询，事务协调器入口)
//! - [`patients`] - 患者列表 (医生开方用)
//! - [`stats`] - 管理端汇总

pub mod auth;
pub mod health;
pub mod medicines;
pub mod orders;
pub mod patients;
pub mod prescriptions;
pub mod stats;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
