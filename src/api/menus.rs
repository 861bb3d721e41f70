use axum::{Json, extract::State, http::StatusCode};

use crate::api::{
    AppState, StatusBody,
    extract::{ValidJson, ValidPath},
};
use crate::entities::menu;
use crate::error::AppResult;
use crate::services::{MenuInput, MenuNode};

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<menu::Model>>> {
    Ok(Json(state.menus.list().await?))
}

pub async fn tree(State(state): State<AppState>) -> AppResult<Json<Vec<MenuNode>>> {
    Ok(Json(state.menus.tree().await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<MenuInput>,
) -> AppResult<(StatusCode, Json<menu::Model>)> {
    let menu = state.menus.create(body).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

pub async fn get(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<menu::Model>> {
    Ok(Json(state.menus.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<MenuInput>,
) -> AppResult<Json<menu::Model>> {
    Ok(Json(state.menus.update(id, body).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<StatusBody>,
) -> AppResult<Json<menu::Model>> {
    Ok(Json(state.menus.set_status(id, body.status).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<StatusCode> {
    state.menus.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
