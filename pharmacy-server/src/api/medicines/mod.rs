//! 药品 API 模块

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/medicines", get(handler::list).post(handler::create))
        .route("/api/medicines/mine", get(handler::list_mine))
        .route(
            "/api/medicines/{id}",
            patch(handler::update).delete(handler::delete),
        )
}
