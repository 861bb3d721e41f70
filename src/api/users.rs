//! Admin-side management of mini-program users.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::{
    AppState,
    extract::{ValidJson, ValidPath, ValidQuery},
};
use crate::entities::mp_user;
use crate::error::AppResult;
use crate::pagination::{Page, PageQuery};
use crate::services::MpUserInput;

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> AppResult<Json<Page<mp_user::Model>>> {
    Ok(Json(state.mp_users.list(query).await?))
}

pub async fn get(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<mp_user::Model>> {
    Ok(Json(state.mp_users.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<MpUserInput>,
) -> AppResult<Json<mp_user::Model>> {
    Ok(Json(state.mp_users.update(id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<StatusCode> {
    state.mp_users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
