//! Public mini-program endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::api::{
    AppState,
    extract::{ValidJson, ValidPath, ValidQuery},
};
use crate::entities::mp_user;
use crate::error::AppResult;
use crate::pagination::{Page, PageQuery};
use crate::services::{ArticleSummary, ArticleView, ColumnSummary, MpUserInput};

#[derive(Debug, Deserialize)]
pub struct WechatLoginRequest {
    pub code: String,
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<MpUserInput>,
) -> AppResult<(StatusCode, Json<mp_user::Model>)> {
    let user = state.mp_users.register(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn wechat_login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<WechatLoginRequest>,
) -> AppResult<Json<mp_user::Model>> {
    Ok(Json(state.mp_users.wechat_login(&body.code).await?))
}

pub async fn list_columns(State(state): State<AppState>) -> AppResult<Json<Vec<ColumnSummary>>> {
    Ok(Json(state.columns.list_summaries().await?))
}

pub async fn list_articles(
    State(state): State<AppState>,
    ValidPath(column_id): ValidPath<i32>,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> AppResult<Json<Page<ArticleSummary>>> {
    Ok(Json(state.articles.list_published(column_id, query).await?))
}

pub async fn get_article(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<i32>,
) -> AppResult<Json<ArticleView>> {
    Ok(Json(state.articles.read_published(id).await?))
}
