//! Admin Stats Handler

use axum::{Json, extract::State};

use shared::Role;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::reports::{AdminStats, StatsService};
use crate::utils::AppResult;

/// GET /api/stats - 仪表盘汇总 (admin)
pub async fn admin_stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AdminStats>> {
    user.require_role(Role::Admin)?;

    let service = StatsService::new(state.db.clone());
    let stats = service.admin_stats().await?;
    Ok(Json(stats))
}
