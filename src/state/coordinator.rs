use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::AppPaths;
use crate::error::Result;
use crate::naming;
use crate::scan;
use super::data::{path_matches_name, ImportResult, Photo, PhotoId, Tag, ThumbnailEntry};
use super::library::Catalog;
use super::photos::PhotoStore;
use super::rename_log::RenameLog;
use super::tags::TagStore;

/// Sequences every multi-store action so that a photo's tag list, its
/// filename and each tag's member list stay in agreement.
///
/// This is the only place that touches both stores. Nothing here is
/// transactional: the step order of each operation decides what state a
/// failure leaves behind, and those windows are part of the contract.
/// Callers must not run two operations at once.
#[derive(Debug)]
pub struct Coordinator {
    tags: TagStore,
    photos: PhotoStore,
    catalog: Catalog,
}

impl Coordinator {
    pub fn new(tags: TagStore, photos: PhotoStore, catalog: Catalog) -> Self {
        Self { tags, photos, catalog }
    }

    /// Load the catalog and rename log described by `paths`
    pub fn open(paths: &AppPaths) -> Result<Self> {
        paths.ensure()?;
        let catalog = Catalog::open(&paths.catalog)?;

        let tags = TagStore::from_records(catalog.load_tags()?);
        let (records, next_id) = catalog.load_photos()?;
        let log = RenameLog::new(&paths.rename_log);
        let photos = PhotoStore::from_records(records, next_id, Box::new(log));

        tracing::info!(tags = tags.len(), photos = photos.len(), "catalog loaded");
        Ok(Self::new(tags, photos, catalog))
    }

    /// Scan `root` and start tracking every new image.
    ///
    /// Tags already encoded at the front of a filename are created if
    /// needed and attached, without renaming the file.
    pub fn import_directory(&mut self, root: &Path) -> Result<ImportResult> {
        let mut result = ImportResult::default();

        for path in scan::scan_directory(root) {
            let Some(id) = self.photos.register_photo(Photo::from_path(&path)) else {
                result.skipped_count += 1;
                continue;
            };
            result.imported_count += 1;

            let name = self.photos.find_photo(&path)?.current_name.clone();
            for tag in naming::leading_tags(&name) {
                if !self.tags.contains(&tag) {
                    self.tags.create_tag(&tag)?;
                }
                self.tags.attach_photo(&tag, id)?;
                self.photos.assign_tag(&path, &tag)?;
            }
        }

        tracing::info!(
            imported = result.imported_count,
            skipped = result.skipped_count,
            "import complete"
        );
        Ok(result)
    }

    /// Create a tag and put it on a photo.
    ///
    /// If the rename fails the new tag stays behind with no members.
    pub fn add_new_tag(&mut self, photo: &Path, tag: &str) -> Result<Photo> {
        self.tags.create_tag(tag)?;
        self.tag_photo(photo, tag)
    }

    /// Put an existing tag on a photo
    pub fn add_existing_tag(&mut self, photo: &Path, tag: &str) -> Result<Photo> {
        self.tags.find_tag(tag)?;
        self.tag_photo(photo, tag)
    }

    /// `add_existing_tag` if the tag exists, otherwise `add_new_tag`
    pub fn add_tag(&mut self, photo: &Path, tag: &str) -> Result<Photo> {
        if self.tags.contains(tag) {
            self.add_existing_tag(photo, tag)
        } else {
            self.add_new_tag(photo, tag)
        }
    }

    pub fn remove_tag(&mut self, photo: &Path, tag: &str) -> Result<Photo> {
        self.tags.find_tag(tag)?;
        let new_path = self.photos.remove_tag_effect(photo, tag)?;
        let id = self.photos.find_photo(&new_path)?.id;
        self.tags.detach_photo(tag, id)?;
        self.snapshot(&new_path)
    }

    /// Strip a tag from every member photo, then delete it.
    ///
    /// A failed rename stops the loop: photos already handled are untagged,
    /// the rest keep the tag and the tag survives. Retrying finishes the job.
    pub fn delete_tag(&mut self, tag: &str) -> Result<()> {
        let members = self.tags.find_tag(tag)?.members.clone();

        for id in members {
            let Some(path) = self.photos.photo_by_id(id).map(|p| p.path.clone()) else {
                tracing::warn!(tag, photo = %id, "dropping member that is no longer tracked");
                self.tags.detach_photo(tag, id)?;
                continue;
            };
            self.photos.remove_tag_effect(&path, tag)?;
            self.tags.detach_photo(tag, id)?;
        }

        self.tags.delete_tag(tag)?;
        Ok(())
    }

    /// Rename a photo back to one of its previous names and rebuild its
    /// tags from that name.
    ///
    /// The rename is checked before any tag changes, so a target that is
    /// taken or a file that vanished leaves the photo and its tags as they
    /// were.
    pub fn revert_to_name(&mut self, photo: &Path, old_name: &str) -> Result<Photo> {
        let current = self.photos.find_photo(photo)?;
        if current.current_name == old_name {
            return Ok(current.clone());
        }
        let id = current.id;
        let previous_tags = current.tags.clone();
        self.photos.check_rename_to(photo, old_name)?;

        for tag in &previous_tags {
            self.tags.detach_photo(tag, id)?;
        }
        self.photos.clear_tags(photo)?;

        for tag in naming::leading_tags(old_name) {
            if !self.tags.contains(&tag) {
                self.tags.create_tag(&tag)?;
            }
            self.tags.attach_photo(&tag, id)?;
            self.photos.assign_tag(photo, &tag)?;
        }

        let new_path = self.photos.revert_to_name(photo, old_name)?;
        self.snapshot(&new_path)
    }

    /// Detach and stop tracking photos whose files disappeared from disk.
    /// Returns their last known paths.
    pub fn forget_missing_photos(&mut self) -> Result<Vec<PathBuf>> {
        let missing = self.photos.missing_files();

        for path in &missing {
            let photo = self.photos.find_photo(path)?;
            let id = photo.id;
            for tag in photo.tags.clone() {
                self.tags.detach_photo(&tag, id)?;
            }
            self.photos.remove_photo(path)?;
            tracing::info!(path = %path.display(), "forgot missing photo");
        }

        Ok(missing)
    }

    pub fn create_tag(&mut self, tag: &str) -> Result<Tag> {
        self.tags.create_tag(tag).cloned()
    }

    pub fn find_tag(&self, tag: &str) -> Result<&Tag> {
        self.tags.find_tag(tag)
    }

    pub fn photo(&self, path: &Path) -> Result<&Photo> {
        self.photos.find_photo(path)
    }

    pub fn photo_by_id(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.photo_by_id(id)
    }

    pub fn photos(&self) -> impl Iterator<Item = &Photo> {
        self.photos.photos()
    }

    pub fn thumbnail_list(&self) -> Vec<ThumbnailEntry> {
        self.photos.photos().map(ThumbnailEntry::from).collect()
    }

    pub fn all_tags(&self) -> Vec<Tag> {
        self.tags.list_tags()
    }

    pub fn previous_names(&self, photo: &Path) -> Result<Vec<String>> {
        Ok(self.photos.find_photo(photo)?.name_history.clone())
    }

    pub fn naming_log(&self) -> Result<Vec<String>> {
        self.photos.rename_log().entries()
    }

    pub fn most_tagged_tag(&self) -> Option<&Tag> {
        self.tags.most_tagged_tag()
    }

    pub fn most_tagged_photo(&self) -> Option<&Photo> {
        self.photos.most_tagged_photo()
    }

    /// Photos that have no thumbnail yet, with their current paths
    pub fn pending_thumbnails(&self) -> Vec<(PhotoId, PathBuf)> {
        self.photos
            .photos()
            .filter(|photo| photo.thumbnail.is_none())
            .map(|photo| (photo.id, photo.path.clone()))
            .collect()
    }

    pub fn record_thumbnails(&mut self, done: Vec<(PhotoId, PathBuf)>) {
        for (id, path) in done {
            // The photo may have been forgotten while the thumbnail was built
            if let Err(err) = self.photos.set_thumbnail(id, path) {
                tracing::debug!("thumbnail dropped: {err}");
            }
        }
    }

    /// Every place where a photo's tags, its filename and the tags' member
    /// lists disagree. Empty when the state is consistent.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for tag in self.tags.list_tags() {
            let unique: BTreeSet<_> = tag.members.iter().collect();
            if unique.len() != tag.members.len() {
                problems.push(format!("tag {:?} lists a photo twice", tag.name));
            }
            for id in &tag.members {
                match self.photos.photo_by_id(*id) {
                    Some(photo) if photo.has_tag(&tag.name) => {}
                    Some(photo) => problems.push(format!(
                        "tag {:?} lists {:?}, which lacks the tag",
                        tag.name, photo.current_name
                    )),
                    None => problems.push(format!("tag {:?} lists untracked photo {id}", tag.name)),
                }
            }
        }

        for photo in self.photos.photos() {
            if !path_matches_name(&photo.path, &photo.current_name) {
                problems.push(format!(
                    "{:?} is tracked at {}",
                    photo.current_name,
                    photo.path.display()
                ));
            }
            if !photo.current_name.starts_with(&naming::encode_tags(&photo.tags)) {
                problems.push(format!(
                    "{:?} does not start with its tags {:?}",
                    photo.current_name, photo.tags
                ));
            }
            for tag in &photo.tags {
                match self.tags.find_tag(tag) {
                    Ok(t) if t.contains(photo.id) => {}
                    Ok(_) => problems.push(format!(
                        "{:?} carries {tag:?}, which does not list it",
                        photo.current_name
                    )),
                    Err(_) => problems.push(format!("{:?} carries unknown tag {tag:?}", photo.current_name)),
                }
            }
        }

        problems
    }

    /// Write both stores to the catalog
    pub fn flush(&mut self) -> Result<()> {
        self.catalog.save_tags(self.tags.records())?;
        self.catalog
            .save_photos(self.photos.records(), self.photos.next_id())?;
        tracing::info!("catalog saved");
        Ok(())
    }

    /// Flush and release the catalog
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn tag_photo(&mut self, photo: &Path, tag: &str) -> Result<Photo> {
        let new_path = self.photos.add_tag_effect(photo, tag)?;
        let id = self.photos.find_photo(&new_path)?.id;
        self.tags.attach_photo(tag, id)?;
        self.snapshot(&new_path)
    }

    fn snapshot(&self, path: &Path) -> Result<Photo> {
        Ok(self.photos.find_photo(path)?.clone())
    }
}
