use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tokio::sync::Mutex;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::AppError;
use crate::models::document::TagDocument;

/// Owner of the persisted tag document. Every mutation holds the lock
/// across the full read-modify-write-flush cycle, so two concurrent
/// writers can never discard each other's changes through a
/// last-writer-wins overwrite.
pub struct TagStore {
    path: PathBuf,
    document: Mutex<TagDocument>,
}

impl TagStore {
    /// Opens the store backed by `path`. A missing or unparsable file
    /// loads as an empty store; this is a local cache-like artifact, not
    /// a system of record.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = read_document(&path).await;
        Self {
            path,
            document: Mutex::new(document),
        }
    }

    /// Location of the backing document on disk.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Tags recorded for `path`, empty when the path is unknown.
    pub async fn get_tags(&self, path: &str) -> IndexSet<String> {
        let document = self.document.lock().await;
        document.files.get(path).cloned().unwrap_or_default()
    }

    /// Replaces the tag set for `path` wholesale and persists before
    /// returning.
    pub async fn set_tags(&self, path: &str, tags: IndexSet<String>) -> Result<(), AppError> {
        let mut document = self.document.lock().await;
        document.files.insert(path.to_string(), tags);
        self.write_document(&document).await
    }

    /// Union of every tag across every recorded file.
    pub async fn all_tags(&self) -> IndexSet<String> {
        self.document.lock().await.all_tags()
    }

    /// Paths carrying `tag`, in persisted insertion order.
    pub async fn files_with_tag(&self, tag: &str) -> Vec<String> {
        self.document.lock().await.files_with_tag(tag)
    }

    /// Display color for `tag`. Assigned lazily on first encounter and
    /// persisted immediately, so a second process sees the same color.
    pub async fn color(&self, tag: &str) -> Result<String, AppError> {
        let mut document = self.document.lock().await;
        if let Some(color) = document.tag_colors.get(tag) {
            return Ok(color.clone());
        }
        let color = pastel_color(tag);
        document
            .tag_colors
            .insert(tag.to_string(), color.clone());
        self.write_document(&document).await?;
        Ok(color)
    }

    /// Bulk-replaces the palette.
    pub async fn set_colors(&self, colors: IndexMap<String, String>) -> Result<(), AppError> {
        let mut document = self.document.lock().await;
        document.tag_colors = colors;
        self.write_document(&document).await
    }

    /// Discards the in-memory document and re-reads it from disk.
    pub async fn reload(&self) {
        let fresh = read_document(&self.path).await;
        *self.document.lock().await = fresh;
    }

    /// Writes the current document to disk.
    pub async fn flush(&self) -> Result<(), AppError> {
        let document = self.document.lock().await;
        self.write_document(&document).await
    }

    /// Recorded file paths in persisted order, for the reconciler.
    pub(crate) async fn recorded_paths(&self) -> Vec<String> {
        self.document.lock().await.files.keys().cloned().collect()
    }

    /// Moves tag records from old to new keys in one locked pass with a
    /// single flush. A move whose old key has disappeared in the meantime
    /// is skipped. Returns the number of records moved.
    pub(crate) async fn apply_rekeys(
        &self,
        moves: &[(String, String)],
    ) -> Result<usize, AppError> {
        let mut document = self.document.lock().await;
        let mut moved = 0usize;
        for (old, new) in moves {
            if let Some(tags) = document.files.shift_remove(old) {
                document.files.insert(new.clone(), tags);
                moved += 1;
            }
        }
        if moved > 0 {
            self.write_document(&document).await?;
        }
        Ok(moved)
    }

    // The document is always rewritten whole: write to a sibling temp
    // file, then rename over the old one, so a crash mid-write leaves
    // the previous document intact.
    async fn write_document(&self, document: &TagDocument) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

async fn read_document(path: &Path) -> TagDocument {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(_) => return TagDocument::default(),
    };
    match serde_json::from_slice(&bytes) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                %err,
                "tag document unreadable, starting with an empty store"
            );
            TagDocument::default()
        }
    }
}

fn pastel_color(tag: &str) -> String {
    // Hue derived from the tag name keeps assignments reproducible; the
    // contract only requires stability after first assignment.
    let hue = xxh3_64(tag.as_bytes()) % 360;
    format!("hsl({hue}, 70%, 80%)")
}
