use axum::{Json, extract::State, http::StatusCode};

use crate::api::{
    AppState,
    extract::{ValidJson, ValidPath},
};
use crate::entities::column;
use crate::error::AppResult;
use crate::services::ColumnInput;

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<column::Model>>> {
    Ok(Json(state.columns.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ColumnInput>,
) -> AppResult<(StatusCode, Json<column::Model>)> {
    let column = state.columns.create(body).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub async fn get(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<column::Model>> {
    Ok(Json(state.columns.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<ColumnInput>,
) -> AppResult<Json<column::Model>> {
    Ok(Json(state.columns.update(id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<StatusCode> {
    state.columns.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
