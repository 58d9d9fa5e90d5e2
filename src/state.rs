use std::path::Path;

use directories::ProjectDirs;

use crate::error::AppError;
use crate::services::reconcile_service::{self, ReconcileReport};
use crate::services::settings_service::SettingsStore;
use crate::services::tag_service::TagStore;
use crate::services::thumbnail_service::ThumbnailService;

/// The components a presentation layer works against, constructed once
/// per process. Tests build fresh instances with [`AppState::with_paths`]
/// instead of touching the real data directory.
pub struct AppState {
    pub tags: TagStore,
    pub settings: SettingsStore,
    pub thumbnails: ThumbnailService,
}

impl AppState {
    /// Production state: platform data directory, ffmpeg renderer.
    pub async fn init() -> Result<Self, AppError> {
        let dirs = ProjectDirs::from("", "", "tagdex")
            .ok_or_else(|| AppError::General("could not resolve data directory".to_string()))?;
        let data_dir = dirs.data_dir().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(Self::with_paths(&data_dir, ThumbnailService::with_ffmpeg()).await)
    }

    pub async fn with_paths(data_dir: &Path, thumbnails: ThumbnailService) -> Self {
        Self {
            tags: TagStore::load(data_dir.join("fileTags.json")).await,
            settings: SettingsStore::load(data_dir.join("settings.json")).await,
            thumbnails,
        }
    }

    /// Runs reconciliation against the last directory the user loaded.
    pub async fn reconcile_tags(&self) -> Result<ReconcileReport, AppError> {
        let hint = self.settings.last_directory().await;
        reconcile_service::reconcile_all(&self.tags, hint.as_deref().map(Path::new)).await
    }
}
