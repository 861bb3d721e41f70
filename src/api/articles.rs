use axum::{Json, extract::State, http::StatusCode};

use crate::api::{
    AppState, StatusBody,
    extract::{ValidJson, ValidPath, ValidQuery},
};
use crate::entities::article;
use crate::error::AppResult;
use crate::pagination::Page;
use crate::services::{ArticleInput, ArticleListQuery, ArticleView};

pub async fn list(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ArticleListQuery>,
) -> AppResult<Json<Page<ArticleView>>> {
    Ok(Json(state.articles.list(query).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ArticleInput>,
) -> AppResult<(StatusCode, Json<article::Model>)> {
    let article = state.articles.create(body).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn get(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<ArticleView>> {
    Ok(Json(state.articles.get(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<ArticleInput>,
) -> AppResult<Json<article::Model>> {
    Ok(Json(state.articles.update(id, body).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
    ValidJson(body): ValidJson<StatusBody>,
) -> AppResult<Json<article::Model>> {
    Ok(Json(state.articles.set_status(id, body.status).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<StatusCode> {
    state.articles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
