use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{RenamerError, Result};
use crate::naming;
use super::data::{path_matches_name, Photo, PhotoId};
use super::rename_log::RenameSink;

/// Owns every tracked photo and performs the renames on disk.
///
/// Photos are addressed by their current path. Internally each photo has a
/// stable id, and the path index is re-keyed whenever a file is renamed.
pub struct PhotoStore {
    photos: BTreeMap<PhotoId, Photo>,
    by_path: HashMap<PathBuf, PhotoId>,
    next_id: u64,
    log: Box<dyn RenameSink>,
}

impl PhotoStore {
    pub fn new(log: Box<dyn RenameSink>) -> Self {
        Self::from_records(BTreeMap::new(), 1, log)
    }

    /// Rebuild from records loaded from the catalog
    pub fn from_records(
        photos: BTreeMap<PhotoId, Photo>,
        next_id: u64,
        log: Box<dyn RenameSink>,
    ) -> Self {
        let by_path = photos
            .values()
            .map(|photo| (photo.path.clone(), photo.id))
            .collect();
        let after_last = photos.keys().next_back().map(|id| id.0 + 1).unwrap_or(1);

        Self {
            photos,
            by_path,
            next_id: next_id.max(after_last),
            log,
        }
    }

    pub fn records(&self) -> &BTreeMap<PhotoId, Photo> {
        &self.photos
    }

    /// Id the next registered photo will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.by_path.contains_key(path)
    }

    /// Photos ordered by id
    pub fn photos(&self) -> impl Iterator<Item = &Photo> {
        self.photos.values()
    }

    pub fn photo_by_id(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.get(&id)
    }

    pub fn rename_log(&self) -> &dyn RenameSink {
        self.log.as_ref()
    }

    /// Start tracking a photo. Returns `None` if its path is already tracked.
    pub fn register_photo(&mut self, mut photo: Photo) -> Option<PhotoId> {
        if self.by_path.contains_key(&photo.path) {
            return None;
        }

        let id = PhotoId(self.next_id);
        self.next_id += 1;
        photo.id = id;

        self.by_path.insert(photo.path.clone(), id);
        self.photos.insert(id, photo);
        Some(id)
    }

    pub fn find_photo(&self, path: &Path) -> Result<&Photo> {
        let id = self.id_for(path)?;
        self.photos
            .get(&id)
            .ok_or_else(|| RenamerError::InvalidPath(path.to_path_buf()))
    }

    /// Stop tracking a photo. The file on disk is left alone.
    pub fn remove_photo(&mut self, path: &Path) -> Result<Photo> {
        let id = self.id_for(path)?;
        self.by_path.remove(path);
        self.photos
            .remove(&id)
            .ok_or_else(|| RenamerError::InvalidPath(path.to_path_buf()))
    }

    /// Rename the tracked file to `new_name` in the same directory.
    ///
    /// On success the old name is appended to the photo's history and the new
    /// path is returned. On failure nothing in memory changes.
    pub fn rename_on_disk(&mut self, path: &Path, new_name: &str) -> Result<PathBuf> {
        let id = self.id_for(path)?;
        self.rename_file(id, new_name)
    }

    /// Add `tag` to the end of the photo's tag sequence and rename to match
    pub fn add_tag_effect(&mut self, path: &Path, tag: &str) -> Result<PathBuf> {
        let photo = self.find_photo(path)?;
        if photo.has_tag(tag) {
            return Ok(photo.path.clone());
        }

        let id = photo.id;
        let mut tags = photo.tags.clone();
        tags.push(tag.to_string());
        let new_name = photo.name_with_tags(&tags);

        let new_path = self.rename_file(id, &new_name)?;
        self.photo_mut(id)?.tags = tags;
        Ok(new_path)
    }

    /// Drop `tag` from the photo and strip its token from the filename
    pub fn remove_tag_effect(&mut self, path: &Path, tag: &str) -> Result<PathBuf> {
        let photo = self.find_photo(path)?;
        let id = photo.id;
        let new_name = naming::strip_tag(&photo.current_name, tag);

        let new_path = self.rename_file(id, &new_name)?;
        self.photo_mut(id)?.tags.retain(|t| t != tag);
        Ok(new_path)
    }

    /// Rename the photo back to a previous name.
    ///
    /// When `old_name` is in the history, its most recent occurrence and every
    /// later entry are dropped, then the name being left is appended as for
    /// any rename. A name that never occurred is treated as a plain rename.
    /// Tags are not touched here.
    pub fn revert_to_name(&mut self, path: &Path, old_name: &str) -> Result<PathBuf> {
        let photo = self.find_photo(path)?;
        if photo.current_name == old_name {
            return Ok(photo.path.clone());
        }

        let id = photo.id;
        let rewind_to = photo.name_history.iter().rposition(|name| name == old_name);
        let new_path = self.rename_file(id, old_name)?;

        if let Some(index) = rewind_to {
            let history = &mut self.photo_mut(id)?.name_history;
            // The last entry is the name just left
            let left = history.len() - 1;
            history.drain(index..left);
        }
        Ok(new_path)
    }

    /// Check that the photo at `path` could be renamed to `new_name` right
    /// now, without renaming it. Failures are logged like a failed rename.
    pub fn check_rename_to(&mut self, path: &Path, new_name: &str) -> Result<()> {
        let photo = self.find_photo(path)?;
        if photo.current_name == new_name {
            return Ok(());
        }

        let source = photo.path.clone();
        let target = photo.sibling(new_name);
        if let Err(err) = check_rename(&source, &target, new_name) {
            self.report_failure(&source, &err);
            return Err(err);
        }
        Ok(())
    }

    /// Append a tag to the photo's sequence without renaming
    pub fn assign_tag(&mut self, path: &Path, tag: &str) -> Result<()> {
        let id = self.id_for(path)?;
        let photo = self.photo_mut(id)?;
        if !photo.has_tag(tag) {
            photo.tags.push(tag.to_string());
        }
        Ok(())
    }

    /// Empty the photo's tag sequence without renaming
    pub fn clear_tags(&mut self, path: &Path) -> Result<Vec<String>> {
        let id = self.id_for(path)?;
        Ok(std::mem::take(&mut self.photo_mut(id)?.tags))
    }

    pub fn set_thumbnail(&mut self, id: PhotoId, thumbnail: PathBuf) -> Result<()> {
        self.photos
            .get_mut(&id)
            .map(|photo| photo.thumbnail = Some(thumbnail))
            .ok_or_else(|| RenamerError::InvalidPath(PathBuf::from(format!("#{id}"))))
    }

    /// Tracked paths whose file is gone from disk
    pub fn missing_files(&self) -> Vec<PathBuf> {
        self.photos
            .values()
            .filter(|photo| !photo.path.exists())
            .map(|photo| photo.path.clone())
            .collect()
    }

    /// Photo with the most tags; ties go to the lowest id
    pub fn most_tagged_photo(&self) -> Option<&Photo> {
        self.photos.values().fold(None, |best: Option<&Photo>, photo| match best {
            Some(b) if b.tags.len() >= photo.tags.len() => Some(b),
            _ => Some(photo),
        })
    }

    fn id_for(&self, path: &Path) -> Result<PhotoId> {
        self.by_path.get(path).copied().ok_or_else(|| {
            tracing::error!(path = %path.display(), "path doesn't match any tracked photo");
            RenamerError::InvalidPath(path.to_path_buf())
        })
    }

    fn photo_mut(&mut self, id: PhotoId) -> Result<&mut Photo> {
        self.photos
            .get_mut(&id)
            .ok_or_else(|| RenamerError::InvalidPath(PathBuf::from(format!("#{id}"))))
    }

    fn rename_file(&mut self, id: PhotoId, new_name: &str) -> Result<PathBuf> {
        let photo = self
            .photos
            .get(&id)
            .ok_or_else(|| RenamerError::InvalidPath(PathBuf::from(format!("#{id}"))))?;
        let source = photo.path.clone();
        let target = photo.sibling(new_name);
        let old_name = photo.current_name.clone();

        if new_name == old_name {
            return Ok(source);
        }

        if let Err(err) = check_rename(&source, &target, new_name) {
            self.report_failure(&source, &err);
            return Err(err);
        }

        if let Err(err) = fs::rename(&source, &target) {
            let err = RenamerError::Io(err);
            self.report_failure(&source, &err);
            return Err(err);
        }

        let photo = self.photo_mut(id)?;
        photo.name_history.push(old_name.clone());
        photo.current_name = new_name.to_string();
        photo.path = target.clone();
        debug_assert!(path_matches_name(&photo.path, &photo.current_name));

        self.by_path.remove(&source);
        self.by_path.insert(target.clone(), id);

        tracing::info!(from = %old_name, to = %new_name, "renamed photo");
        if let Err(err) = self.log.record_rename(&old_name, new_name) {
            tracing::warn!("could not write rename log: {err}");
        }
        Ok(target)
    }

    fn report_failure(&mut self, source: &Path, err: &RenamerError) {
        tracing::error!(path = %source.display(), "rename failed: {err}");
        if let Err(log_err) = self.log.record_failure(source, &err.to_string()) {
            tracing::warn!("could not write rename log: {log_err}");
        }
    }
}

fn check_rename(source: &Path, target: &Path, new_name: &str) -> Result<()> {
    if new_name.trim().is_empty() || new_name.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{new_name:?} is not a valid filename"),
        )
        .into());
    }
    if !source.exists() {
        return Err(RenamerError::InvalidPath(source.to_path_buf()));
    }
    if target.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        )
        .into());
    }
    Ok(())
}

impl std::fmt::Debug for PhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoStore")
            .field("photos", &self.photos.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::state::rename_log::MemoryRenameLog;
    use tempfile::TempDir;

    fn setup(files: &[&str]) -> (TempDir, PhotoStore) {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PhotoStore::new(Box::new(MemoryRenameLog::new()));
        for name in files {
            let path = dir.path().join(name);
            fs::write(&path, b"jpeg").unwrap();
            store.register_photo(Photo::from_path(path)).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn test_register_is_first_write_wins() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let path = dir.path().join("pic.jpg");

        let mut again = Photo::from_path(&path);
        again.tags.push("Cat".to_string());
        assert!(store.register_photo(again).is_none());
        assert_eq!(store.len(), 1);
        assert!(store.find_photo(&path).unwrap().tags.is_empty());
    }

    #[test]
    fn test_rename_on_disk_rekeys_and_records_history() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let old = dir.path().join("pic.jpg");

        let new_path = store.rename_on_disk(&old, "renamed.jpg").unwrap();
        assert_eq!(new_path, dir.path().join("renamed.jpg"));
        assert!(new_path.exists());
        assert!(!old.exists());

        let photo = store.find_photo(&new_path).unwrap();
        assert_eq!(photo.current_name, "renamed.jpg");
        assert_eq!(photo.name_history, vec!["pic.jpg"]);
        assert_eq!(store.find_photo(&old).unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(
            store.rename_log().entries().unwrap(),
            vec!["Rename Photo from:pic.jpg to:renamed.jpg"]
        );
    }

    #[test]
    fn test_rename_refuses_to_overwrite() {
        let (dir, mut store) = setup(&["a.jpg", "b.jpg"]);
        let a = dir.path().join("a.jpg");

        let err = store.rename_on_disk(&a, "b.jpg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);

        let photo = store.find_photo(&a).unwrap();
        assert_eq!(photo.current_name, "a.jpg");
        assert!(photo.name_history.is_empty());
        assert_eq!(fs::read(dir.path().join("b.jpg")).unwrap(), b"jpeg");
    }

    #[test]
    fn test_file_moved_outside_is_invalid_path() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let path = dir.path().join("pic.jpg");
        fs::rename(&path, dir.path().join("elsewhere.jpg")).unwrap();

        let err = store.add_tag_effect(&path, "Cat").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
        assert!(store.find_photo(&path).unwrap().tags.is_empty());
        assert_eq!(store.missing_files(), vec![path]);
    }

    #[test]
    fn test_add_and_remove_tag_effect() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let path = dir.path().join("pic.jpg");

        let path = store.add_tag_effect(&path, "Cat").unwrap();
        let path = store.add_tag_effect(&path, "Dog").unwrap();
        assert_eq!(path, dir.path().join("@Cat @Dog pic.jpg"));
        assert!(path.exists());

        // Adding a tag the photo already has changes nothing
        assert_eq!(store.add_tag_effect(&path, "Cat").unwrap(), path);

        let path = store.remove_tag_effect(&path, "Cat").unwrap();
        let photo = store.find_photo(&path).unwrap();
        assert_eq!(photo.current_name, "@Dog pic.jpg");
        assert_eq!(photo.tags, vec!["Dog"]);
        assert_eq!(photo.name_history, vec!["pic.jpg", "@Cat pic.jpg", "@Cat @Dog pic.jpg"]);
    }

    #[test]
    fn test_revert_rewinds_history() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let path = dir.path().join("pic.jpg");
        let path = store.add_tag_effect(&path, "Cat").unwrap();
        let path = store.add_tag_effect(&path, "Dog").unwrap();

        let path = store.revert_to_name(&path, "@Cat pic.jpg").unwrap();
        let photo = store.find_photo(&path).unwrap();
        assert_eq!(photo.current_name, "@Cat pic.jpg");
        assert_eq!(photo.name_history, vec!["pic.jpg", "@Cat @Dog pic.jpg"]);
        assert!(dir.path().join("@Cat pic.jpg").exists());

        // Reverting to the current name is a no-op
        assert_eq!(store.revert_to_name(&path, "@Cat pic.jpg").unwrap(), path);
        assert_eq!(
            store.find_photo(&path).unwrap().name_history,
            vec!["pic.jpg", "@Cat @Dog pic.jpg"]
        );

        // The name just left can be reverted to in turn
        let path = store.revert_to_name(&path, "@Cat @Dog pic.jpg").unwrap();
        let photo = store.find_photo(&path).unwrap();
        assert_eq!(photo.current_name, "@Cat @Dog pic.jpg");
        assert_eq!(photo.name_history, vec!["pic.jpg", "@Cat pic.jpg"]);
        assert_eq!(store.rename_log().entries().unwrap().len(), 4);
    }

    #[test]
    fn test_check_rename_to_leaves_photo_alone() {
        let (dir, mut store) = setup(&["a.jpg", "b.jpg"]);
        let a = dir.path().join("a.jpg");

        store.check_rename_to(&a, "c.jpg").unwrap();
        store.check_rename_to(&a, "a.jpg").unwrap();
        let err = store.check_rename_to(&a, "b.jpg").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);

        assert!(a.exists());
        assert!(store.find_photo(&a).unwrap().name_history.is_empty());
        assert_eq!(store.rename_log().entries().unwrap().len(), 1);
    }

    #[test]
    fn test_revert_uses_most_recent_occurrence() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let mut path = dir.path().join("pic.jpg");
        for name in ["a.jpg", "pic.jpg", "b.jpg"] {
            path = store.rename_on_disk(&path, name).unwrap();
        }
        // history: pic.jpg, a.jpg, pic.jpg
        let path = store.revert_to_name(&path, "pic.jpg").unwrap();
        assert_eq!(
            store.find_photo(&path).unwrap().name_history,
            vec!["pic.jpg", "a.jpg", "b.jpg"]
        );
    }

    #[test]
    fn test_unknown_path_changes_nothing() {
        let (dir, mut store) = setup(&["pic.jpg"]);
        let ghost = dir.path().join("ghost.jpg");
        let before = store.records().clone();

        assert_eq!(store.find_photo(&ghost).unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(store.rename_on_disk(&ghost, "x.jpg").unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(store.add_tag_effect(&ghost, "Cat").unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(store.remove_tag_effect(&ghost, "Cat").unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(store.revert_to_name(&ghost, "pic.jpg").unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(store.assign_tag(&ghost, "Cat").unwrap_err().kind(), ErrorKind::InvalidPath);
        assert_eq!(store.remove_photo(&ghost).unwrap_err().kind(), ErrorKind::InvalidPath);

        assert_eq!(store.records(), &before);
    }

    #[test]
    fn test_most_tagged_photo() {
        let (dir, mut store) = setup(&["a.jpg", "b.jpg"]);
        assert_eq!(store.most_tagged_photo().unwrap().current_name, "a.jpg");

        let b = dir.path().join("b.jpg");
        store.assign_tag(&b, "Cat").unwrap();
        assert_eq!(store.most_tagged_photo().unwrap().current_name, "b.jpg");
    }

    #[test]
    fn test_from_records_keeps_ids_unique() {
        let (_dir, store) = setup(&["a.jpg", "b.jpg"]);
        let records = store.records().clone();

        let mut reloaded = PhotoStore::from_records(records, 0, Box::new(MemoryRenameLog::new()));
        assert_eq!(reloaded.next_id(), 3);
        let id = reloaded.register_photo(Photo::from_path("/elsewhere/c.jpg")).unwrap();
        assert_eq!(id, PhotoId(3));
    }
}
