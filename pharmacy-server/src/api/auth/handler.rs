//! Authentication Handlers
//!
//! Handles signup, login and current-user info

use std::time::Duration;

use axum::{Json, extract::State};
use validator::Validate;

use shared::request::{LoginRequest, SignupRequest};
use shared::response::{LoginResponse, UserInfo};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserCreate;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/signup - 注册 (公共路由)
///
/// 角色在注册时一次性确定，之后没有任何修改角色的操作。
pub async fn signup(
    State(state): State<ServerState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<Json<UserInfo>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(UserCreate {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
        })
        .await?;

    tracing::info!(
        user_id = %user.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        email = %user.email,
        role = %user.role,
        "User registered"
    );

    Ok(Json(user.to_user_info()))
}

/// POST /api/auth/login - 登录 (公共路由)
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo.find_by_email(&req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let jwt_service = state.get_jwt_service();
    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();

    let token = jwt_service
        .generate_token(&user_id, &user.name, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = %user_id,
        email = %user.email,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: user.to_user_info(),
    }))
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    // Query fresh user data for created_at (token only carries identity + role)
    let repo = UserRepository::new(state.db.clone());
    let record = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;

    Ok(Json(record.to_user_info()))
}
