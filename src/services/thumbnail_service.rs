use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::error::AppError;
use crate::models::preview::{MediaKind, Thumbnail};

/// Target width of generated previews; height follows the aspect ratio.
pub const THUMBNAIL_WIDTH: u32 = 150;

/// Paths per batch chunk. Every video in a chunk spawns a real encoder
/// process, so this bounds the number of simultaneous encoder invocations.
pub const CHUNK_SIZE: usize = 5;

/// Renders one representative frame of a video to an image file. Kept as
/// a seam so tests can substitute the encoder.
#[async_trait]
pub trait FrameRenderer: Send + Sync {
    async fn render_frame(
        &self,
        source: &Path,
        target: &Path,
        width: u32,
    ) -> Result<(), AppError>;
}

/// Production renderer shelling out to ffmpeg.
pub struct FfmpegRenderer;

#[async_trait]
impl FrameRenderer for FfmpegRenderer {
    async fn render_frame(
        &self,
        source: &Path,
        target: &Path,
        width: u32,
    ) -> Result<(), AppError> {
        // -2 keeps the scaled height even, which jpeg encoding requires.
        let scale = format!("scale={width}:-2");
        let output = tokio::process::Command::new("ffmpeg")
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg("-frames:v")
            .arg("1")
            .arg("-vf")
            .arg(scale)
            .arg(target)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Renderer(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Best-effort preview lookup for heterogeneous media. Images pass
/// through untouched, videos get a frame rendered into `temp_dir`, and
/// everything else reports no preview. Only generated results are cached;
/// the cache lives for the process lifetime and is never persisted.
#[derive(Clone)]
pub struct ThumbnailService {
    renderer: Arc<dyn FrameRenderer>,
    temp_dir: PathBuf,
    cache: Arc<Mutex<HashMap<String, String>>>,
}

impl ThumbnailService {
    pub fn new(renderer: Arc<dyn FrameRenderer>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            temp_dir: temp_dir.into(),
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Service with the ffmpeg renderer and the OS temp directory.
    pub fn with_ffmpeg() -> Self {
        Self::new(Arc::new(FfmpegRenderer), std::env::temp_dir())
    }

    /// Resolves a preview for one path, generating and caching a video
    /// frame on first request. A renderer failure degrades to "no
    /// preview" for this path and is retried on the next request.
    pub async fn lookup_or_generate(&self, path: &str) -> Thumbnail {
        if let Some(preview) = self.cache.lock().await.get(path).cloned() {
            return Thumbnail {
                path: path.to_string(),
                preview: Some(preview),
            };
        }

        let source = Path::new(path);
        match MediaKind::of(source) {
            MediaKind::Image => Thumbnail {
                path: path.to_string(),
                preview: Some(path.to_string()),
            },
            MediaKind::Video => self.render_video(path, source).await,
            MediaKind::Other => Thumbnail {
                path: path.to_string(),
                preview: None,
            },
        }
    }

    /// Resolves previews for `paths` in fixed-size chunks. All members of
    /// one chunk run concurrently; the next chunk is never dispatched
    /// before every member of the previous one has resolved. Results come
    /// back in input order.
    pub async fn generate_batch(&self, paths: &[String]) -> Vec<Thumbnail> {
        let mut results = Vec::with_capacity(paths.len());

        for chunk in paths.chunks(CHUNK_SIZE) {
            let mut join_set = JoinSet::new();
            for (idx, path) in chunk.iter().enumerate() {
                let service = self.clone();
                let path = path.clone();
                join_set.spawn(async move { (idx, service.lookup_or_generate(&path).await) });
            }

            let mut slots: Vec<Option<Thumbnail>> = (0..chunk.len()).map(|_| None).collect();
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((idx, thumbnail)) => slots[idx] = Some(thumbnail),
                    Err(join_err) => {
                        tracing::warn!(%join_err, "thumbnail task failed");
                    }
                }
            }

            for (idx, slot) in slots.into_iter().enumerate() {
                results.push(slot.unwrap_or_else(|| Thumbnail {
                    path: chunk[idx].clone(),
                    preview: None,
                }));
            }
        }

        results
    }

    async fn render_video(&self, path: &str, source: &Path) -> Thumbnail {
        let target = self.target_for(source);
        match self
            .renderer
            .render_frame(source, &target, THUMBNAIL_WIDTH)
            .await
        {
            Ok(()) => {
                let preview = target.to_string_lossy().to_string();
                self.cache
                    .lock()
                    .await
                    .insert(path.to_string(), preview.clone());
                Thumbnail {
                    path: path.to_string(),
                    preview: Some(preview),
                }
            }
            Err(err) => {
                tracing::warn!(source = %path, %err, "thumbnail render failed");
                Thumbnail {
                    path: path.to_string(),
                    preview: None,
                }
            }
        }
    }

    // Deterministic per-process target, so repeated runs over the same
    // directory reuse file names instead of piling up temp files.
    fn target_for(&self, source: &Path) -> PathBuf {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.temp_dir.join(format!("{name}.thumb.jpg"))
    }
}
