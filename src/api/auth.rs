use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::api::{AppState, extract::ValidJson};
use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::services::LoginResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .backend_users
        .login(&body.username, &body.password)
        .await?;
    Ok(Json(response))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidJson(body): ValidJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .backend_users
        .change_password(user.id, &body.old_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
