//! Patient List Handler
//!
//! 医生开方时选择患者用的精简客户列表。

use axum::{Json, extract::State};

use shared::Role;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::PatientSummary;
use crate::db::repository::UserRepository;
use crate::utils::AppResult;

/// GET /api/patients - 客户列表 (doctor)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<PatientSummary>>> {
    user.require_role(Role::Doctor)?;

    let repo = UserRepository::new(state.db.clone());
    let patients = repo.find_customers().await?;
    Ok(Json(patients))
}
