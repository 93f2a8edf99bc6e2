//! Order API Handlers
//!
//! 下单经由 [`crate::orders::OrderCoordinator`]，是全系统唯一创建
//! 订单记录的路径。

use axum::{Json, extract::State};

use shared::Role;
use shared::order::PlaceOrderInput;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Order;
use crate::db::repository::{OrderRepository, parse_id};
use crate::utils::AppResult;

/// POST /api/orders - 下单 (customer)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PlaceOrderInput>,
) -> AppResult<Json<Order>> {
    user.require_role(Role::Customer)?;

    let customer = parse_id("user", &user.id)?;
    let order = state.coordinator.place_order(customer, payload).await?;

    Ok(Json(order))
}

/// GET /api/orders - 客户自己的订单，新→旧
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    user.require_role(Role::Customer)?;

    let customer = parse_id("user", &user.id)?;
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_by_customer(&customer).await?;
    Ok(Json(orders))
}
