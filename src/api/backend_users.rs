use axum::{Json, extract::State, http::StatusCode};

use crate::api::{
    AppState, StatusBody,
    extract::{ValidJson, ValidPath, ValidQuery},
};
use crate::auth::AuthenticatedUser;
use crate::error::AppResult;
use crate::pagination::{Page, PageQuery};
use crate::services::{BackendUserInput, BackendUserView, CreatedUser, MenuNode, PasswordReset};

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> AppResult<Json<Page<BackendUserView>>> {
    Ok(Json(state.backend_users.list(query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<BackendUserInput>,
) -> AppResult<(StatusCode, Json<CreatedUser>)> {
    let created = state.backend_users.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<BackendUserView>> {
    Ok(Json(state.backend_users.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<BackendUserInput>,
) -> AppResult<Json<BackendUserView>> {
    Ok(Json(state.backend_users.update(id, body).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<StatusBody>,
) -> AppResult<Json<BackendUserView>> {
    Ok(Json(state.backend_users.set_status(id, body.status).await?))
}

pub async fn reset_password(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<PasswordReset>> {
    Ok(Json(state.backend_users.reset_password(id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<StatusCode> {
    state.backend_users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Menu forest visible to the caller.
pub async fn current_menus(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<MenuNode>>> {
    Ok(Json(state.permissions.resolve_user_menus(user.id).await?))
}
