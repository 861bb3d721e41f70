use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
}

impl UploadKind {
    pub fn dir(&self) -> &'static str {
        match self {
            UploadKind::Image => "images",
            UploadKind::Video => "videos",
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Image => 5 * 1024 * 1024,
            UploadKind::Video => 50 * 1024 * 1024,
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &["jpg", "jpeg", "png", "gif", "webp"],
            UploadKind::Video => &["mp4", "avi", "mov", "wmv", "flv", "webm"],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub url: String,
    pub filename: String,
    pub size: usize,
}

/// Writes uploaded media under `<root>/{images,videos}` with generated names.
#[derive(Debug, Clone)]
pub struct UploadService {
    root: PathBuf,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn store(
        &self,
        kind: UploadKind,
        original_name: &str,
        data: &[u8],
    ) -> AppResult<StoredFile> {
        let ext = extension_of(original_name)
            .filter(|ext| kind.allowed_extensions().contains(&ext.as_str()))
            .ok_or_else(|| {
                AppError::bad_input(format!(
                    "unsupported file type, expected one of: {}",
                    kind.allowed_extensions().join(", ")
                ))
            })?;

        if data.len() > kind.max_bytes() {
            return Err(AppError::bad_input(format!(
                "file exceeds {} MB",
                kind.max_bytes() / (1024 * 1024)
            )));
        }

        let dir = self.root.join(kind.dir());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create upload dir: {e}")))?;

        let filename = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(dir.join(&filename), data)
            .await
            .map_err(|e| AppError::Internal(format!("failed to save file: {e}")))?;

        info!(kind = kind.dir(), filename = %filename, size = data.len(), "file uploaded");
        Ok(StoredFile {
            url: format!("/uploads/{}/{filename}", kind.dir()),
            filename,
            size: data.len(),
        })
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
