use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::{
    AppState, StatusBody,
    extract::{ValidJson, ValidPath, ValidQuery},
};
use crate::entities::role;
use crate::error::AppResult;
use crate::pagination::{Page, PageQuery};
use crate::services::RoleInput;

#[derive(Debug, Deserialize, Serialize)]
pub struct RoleMenus {
    pub menu_ids: Vec<i32>,
}

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> AppResult<Json<Page<role::Model>>> {
    Ok(Json(state.roles.list(query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RoleInput>,
) -> AppResult<(StatusCode, Json<role::Model>)> {
    let role = state.roles.create(body).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn get(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<role::Model>> {
    Ok(Json(state.roles.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<RoleInput>,
) -> AppResult<Json<role::Model>> {
    Ok(Json(state.roles.update(id, body).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<StatusBody>,
) -> AppResult<Json<role::Model>> {
    Ok(Json(state.roles.set_status(id, body.status).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<StatusCode> {
    state.roles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn menu_ids(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<RoleMenus>> {
    let menu_ids = state.roles.menu_ids(id).await?;
    Ok(Json(RoleMenus { menu_ids }))
}

pub async fn replace_menus(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<RoleMenus>,
) -> AppResult<Json<RoleMenus>> {
    let menu_ids = state.roles.replace_menus(id, body.menu_ids).await?;
    Ok(Json(RoleMenus { menu_ids }))
}
