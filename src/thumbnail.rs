/// Thumbnail generation and caching
///
/// Thumbnails are written to the cache directory as `<photo id>.jpg`, so a
/// rename never invalidates them.
use image::imageops::FilterType;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::state::data::PhotoId;

/// Size of generated thumbnails (square bounding box)
pub const THUMBNAIL_SIZE: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Expected thumbnail path for a photo (doesn't generate it)
    pub fn path_for(&self, id: PhotoId) -> PathBuf {
        self.dir.join(format!("{id}.jpg"))
    }

    pub fn exists(&self, id: PhotoId) -> bool {
        self.path_for(id).exists()
    }

    /// Decode `source`, shrink it and save it to the cache.
    /// Returns `None` if the file can't be decoded or written.
    pub fn generate(&self, source: &Path, id: PhotoId) -> Option<PathBuf> {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), "cannot create thumbnail cache: {err}");
            return None;
        }

        let img = match image::open(source) {
            Ok(img) => img,
            Err(err) => {
                tracing::warn!(path = %source.display(), "cannot decode image for thumbnail: {err}");
                return None;
            }
        };

        let thumbnail = img
            .resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
            .to_rgb8();
        let thumbnail_path = self.path_for(id);

        match thumbnail.save(&thumbnail_path) {
            Ok(()) => {
                tracing::debug!(path = %thumbnail_path.display(), "generated thumbnail");
                Some(thumbnail_path)
            }
            Err(err) => {
                tracing::warn!(path = %thumbnail_path.display(), "cannot save thumbnail: {err}");
                None
            }
        }
    }
}

/// Generate thumbnails off the UI thread.
///
/// Returns the ones that succeeded.
pub async fn generate_batch(
    cache: ThumbnailCache,
    jobs: Vec<(PhotoId, PathBuf)>,
) -> Vec<(PhotoId, PathBuf)> {
    // Spawn blocking because decoding and resizing is CPU-intensive
    let result = task::spawn_blocking(move || {
        jobs.into_iter()
            .filter_map(|(id, source)| cache.generate(&source, id).map(|path| (id, path)))
            .collect::<Vec<_>>()
    })
    .await;

    match result {
        Ok(done) => done,
        Err(err) => {
            tracing::error!("thumbnail task failed: {err}");
            Vec::new()
        }
    }
}
