use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::services::{StoredFile, UploadKind};

pub async fn image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<StoredFile>> {
    store(&state, UploadKind::Image, multipart).await
}

pub async fn video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<StoredFile>> {
    store(&state, UploadKind::Video, multipart).await
}

/// Store the multipart field named `file`.
async fn store(
    state: &AppState,
    kind: UploadKind,
    mut multipart: Multipart,
) -> AppResult<Json<StoredFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_input(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_input(e.body_text()))?;

        let stored = state.uploads.store(kind, &filename, &data).await?;
        return Ok(Json(stored));
    }

    Err(AppError::bad_input("missing multipart field 'file'"))
}
