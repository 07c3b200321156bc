/// Directory scanning
///
/// Walks a folder recursively and picks out image files by extension.
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Image file extensions (common raster formats and camera RAW formats)
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic",
    "nef", "dng", "cr2", "cr3", "arw", "raf", "orf", "rw2", "pef", "srw",
];

pub fn is_image_file(path: &Path) -> bool {
    match path.extension() {
        Some(extension) => {
            let ext = extension.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Every image file below `root`, sorted by path
pub fn scan_directory(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_image_file(entry.path()))
        .filter(|entry| {
            // Tags are encoded in the name, so it has to be valid text
            let readable = entry.file_name().to_str().is_some();
            if !readable {
                tracing::warn!(path = %entry.path().display(), "skipping file with a non UTF-8 name");
            }
            readable
        })
        .map(|entry| entry.into_path())
        .collect();

    found.sort();
    tracing::info!(root = %root.display(), count = found.len(), "scanned folder");
    found
}
