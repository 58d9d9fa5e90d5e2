use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub last_directory: Option<String>,
    pub show_subdirectories: bool,
}

/// Persistence for the two browser settings: the directory last loaded
/// (also the reconciliation hint) and whether listings recurse.
pub struct SettingsStore {
    path: PathBuf,
    settings: Mutex<Settings>,
}

impl SettingsStore {
    /// Missing or unparsable settings files load as defaults.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => Settings::default(),
        };
        Self {
            path,
            settings: Mutex::new(settings),
        }
    }

    pub async fn last_directory(&self) -> Option<String> {
        self.settings.lock().await.last_directory.clone()
    }

    pub async fn set_last_directory(&self, directory: &str) -> Result<(), AppError> {
        let mut settings = self.settings.lock().await;
        settings.last_directory = Some(directory.to_string());
        self.write(&settings).await
    }

    pub async fn show_subdirectories(&self) -> bool {
        self.settings.lock().await.show_subdirectories
    }

    pub async fn set_show_subdirectories(&self, show: bool) -> Result<(), AppError> {
        let mut settings = self.settings.lock().await;
        settings.show_subdirectories = show;
        self.write(&settings).await
    }

    async fn write(&self, settings: &Settings) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
