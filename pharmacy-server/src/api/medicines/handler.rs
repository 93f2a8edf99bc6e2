//! Medicine API Handlers
//!
//! 目录查询对所有已登录角色开放；创建/修改/删除仅限归属供应商。

use axum::{
    Json,
    extract::{Path, State},
};

use shared::Role;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Medicine, MedicineCreate, MedicineUpdate};
use crate::db::repository::{MedicineRepository, parse_id};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// GET /api/medicines - 目录：有库存且未过期
pub async fn list(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Medicine>>> {
    let repo = MedicineRepository::new(state.db.clone());
    let medicines = repo.find_catalog().await?;
    Ok(Json(medicines))
}

/// GET /api/medicines/mine - 供应商自己的药品
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Medicine>>> {
    user.require_role(Role::Supplier)?;

    let supplier = parse_id("user", &user.id)?;
    let repo = MedicineRepository::new(state.db.clone());
    let medicines = repo.find_by_supplier(&supplier).await?;
    Ok(Json(medicines))
}

/// POST /api/medicines - 创建药品 (supplier)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MedicineCreate>,
) -> AppResult<Json<Medicine>> {
    user.require_role(Role::Supplier)?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_required_text(&payload.manufacturer, "manufacturer", MAX_NAME_LEN)?;
    validate_required_text(&payload.category, "category", MAX_NAME_LEN)?;

    let supplier = parse_id("user", &user.id)?;
    let repo = MedicineRepository::new(state.db.clone());
    let medicine = repo.create(supplier, payload).await?;

    tracing::info!(
        medicine_id = %medicine.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        supplier = %user.id,
        "Medicine created"
    );

    Ok(Json(medicine))
}

/// 归属校验：只有归属供应商可以修改/删除
///
/// 对新鲜记录检查，不信任令牌之外的任何缓存状态。
async fn load_owned(
    repo: &MedicineRepository,
    id: &str,
    user: &CurrentUser,
) -> Result<Medicine, AppError> {
    let medicine = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Medicine {id}")))?;

    if medicine.supplier.to_string() != user.id {
        return Err(AppError::forbidden(
            "Medicine belongs to a different supplier",
        ));
    }

    Ok(medicine)
}

/// PATCH /api/medicines/:id - 更新库存/有效期 (supplier, 归属校验)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<MedicineUpdate>,
) -> AppResult<Json<Medicine>> {
    user.require_role(Role::Supplier)?;

    let repo = MedicineRepository::new(state.db.clone());
    load_owned(&repo, &id, &user).await?;

    let medicine = repo.update(&id, payload).await?;
    Ok(Json(medicine))
}

/// DELETE /api/medicines/:id - 删除药品 (supplier, 归属校验)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    user.require_role(Role::Supplier)?;

    let repo = MedicineRepository::new(state.db.clone());
    load_owned(&repo, &id, &user).await?;

    repo.delete(&id).await?;

    tracing::info!(medicine_id = %id, supplier = %user.id, "Medicine deleted");

    Ok(Json(true))
}
