//! 认证相关响应 DTO

use serde::{Deserialize, Serialize};

use crate::types::Role;

/// User info returned by login / me endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: i64,
}

/// Login response: token + user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}
