//! 处方 API 模块

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/prescriptions",
            get(handler::list_for_patient).post(handler::create),
        )
        .route("/api/prescriptions/mine", get(handler::list_for_doctor))
        .route("/api/prescriptions/{id}", patch(handler::update_status))
}
