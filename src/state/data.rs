/// Shared data structures for the application state
///
/// These structs represent the data model that flows between the
/// stores, the catalog database and the UI layer. Cross-references are
/// plain keys: a tag lists member `PhotoId`s, a photo lists tag names.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::naming;

/// Stable photo identifier, survives renames
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(pub u64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a single tracked photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Assigned by the photo store on registration
    pub id: PhotoId,
    /// Filename only (e.g., "@Cat pic.jpg")
    pub current_name: String,
    /// Full path to the file; last component is always `current_name`
    pub path: PathBuf,
    /// Tag names in filename prefix order
    pub tags: Vec<String>,
    /// Previous filenames, oldest first
    pub name_history: Vec<String>,
    /// Unix timestamp of the directory scan that discovered the file
    pub imported_at: i64,
    /// Cached thumbnail, if one has been generated
    pub thumbnail: Option<PathBuf>,
}

impl Photo {
    /// Build an untagged photo for a file found on disk.
    ///
    /// The id is a placeholder until the photo store registers it.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self {
            id: PhotoId(0),
            current_name,
            path,
            tags: Vec::new(),
            name_history: Vec::new(),
            imported_at: chrono::Utc::now().timestamp(),
            thumbnail: None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Filename without any of this photo's tag tokens
    pub fn base_name(&self) -> String {
        naming::base_name(&self.current_name, &self.tags)
    }

    /// Filename this photo would have with the given tag sequence
    pub fn name_with_tags<S: AsRef<str>>(&self, tags: &[S]) -> String {
        format!("{}{}", naming::encode_tags(tags), self.base_name())
    }

    /// Sibling path carrying a different filename
    pub fn sibling(&self, name: &str) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A user-defined label and the photos carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Member photos, no duplicates
    pub members: Vec<PhotoId>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn contains(&self, id: PhotoId) -> bool {
        self.members.contains(&id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One row of the thumbnail grid
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailEntry {
    pub id: PhotoId,
    pub path: PathBuf,
    pub name: String,
    pub thumbnail: Option<PathBuf>,
}

impl From<&Photo> for ThumbnailEntry {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            path: photo.path.clone(),
            name: photo.current_name.clone(),
            thumbnail: photo.thumbnail.clone(),
        }
    }
}

/// Result of a folder import operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported_count: usize,
    pub skipped_count: usize,
}

/// True when `path` names a file whose last component equals `name`
pub fn path_matches_name(path: &Path, name: &str) -> bool {
    path.file_name().map(|f| f == name).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_takes_filename() {
        let photo = Photo::from_path("/photos/2019/pic.jpg");
        assert_eq!(photo.current_name, "pic.jpg");
        assert!(photo.tags.is_empty());
        assert!(path_matches_name(&photo.path, &photo.current_name));
    }

    #[test]
    fn test_name_with_tags_keeps_base() {
        let mut photo = Photo::from_path("/photos/@Cat pic.jpg");
        photo.tags = vec!["Cat".to_string()];

        assert_eq!(photo.base_name(), "pic.jpg");
        assert_eq!(photo.name_with_tags(&["Cat", "Dog"]), "@Cat @Dog pic.jpg");
        assert_eq!(
            photo.sibling("@Cat @Dog pic.jpg"),
            PathBuf::from("/photos/@Cat @Dog pic.jpg")
        );
    }

    #[test]
    fn test_serialization() {
        let mut photo = Photo::from_path("/photos/pic.jpg");
        photo.id = PhotoId(7);
        photo.name_history.push("old.jpg".to_string());

        let restored = Photo::from_json(&photo.to_json().unwrap()).unwrap();
        assert_eq!(photo, restored);

        let mut tag = Tag::new("Cat");
        tag.members.push(PhotoId(7));
        let restored = Tag::from_json(&tag.to_json().unwrap()).unwrap();
        assert_eq!(tag, restored);
        assert!(restored.contains(PhotoId(7)));
    }
}
