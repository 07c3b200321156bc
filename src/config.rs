/// Where the application keeps its state on disk
///
/// Defaults live in the user's data directory:
/// - Linux: ~/.local/share/photo-renamer/
/// - macOS: ~/Library/Application Support/photo-renamer/
/// - Windows: %APPDATA%\photo-renamer\
///
/// `PHOTO_RENAMER_HOME` overrides the root.
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "PHOTO_RENAMER_HOME";
const APP_DIR: &str = "photo-renamer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    /// SQLite catalog of tags and photos
    pub catalog: PathBuf,
    /// Append-only rename log
    pub rename_log: PathBuf,
    /// Thumbnail cache directory
    pub thumbnails: PathBuf,
}

impl AppPaths {
    /// Resolve from the environment, falling back to the data directory
    pub fn from_env() -> Self {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::under(root);
        }

        let root = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self::under(root)
    }

    /// Lay out every path below `root`
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            catalog: root.join("catalog.db"),
            rename_log: root.join("rename.log"),
            thumbnails: root.join("thumbnails"),
            root,
        }
    }

    /// Create the directories
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.thumbnails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_root() {
        let paths = AppPaths::under("/tmp/pr");
        assert_eq!(paths.catalog, PathBuf::from("/tmp/pr/catalog.db"));
        assert_eq!(paths.rename_log, PathBuf::from("/tmp/pr/rename.log"));
        assert_eq!(paths.thumbnails, PathBuf::from("/tmp/pr/thumbnails"));
    }

    #[test]
    fn test_ensure_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::under(dir.path().join("state"));
        paths.ensure().unwrap();
        assert!(paths.thumbnails.is_dir());
    }
}
