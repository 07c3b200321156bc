use std::collections::BTreeMap;

use crate::error::{RenamerError, Result};
use crate::naming;
use super::data::{PhotoId, Tag};

/// Owns every tag and its member list.
///
/// The store never reaches into photo state: keeping a photo's tag list in
/// step with membership is the coordinator's job.
#[derive(Debug, Default)]
pub struct TagStore {
    tags: BTreeMap<String, Tag>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from records loaded from the catalog
    pub fn from_records(tags: BTreeMap<String, Tag>) -> Self {
        Self { tags }
    }

    pub fn records(&self) -> &BTreeMap<String, Tag> {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Create an empty tag
    pub fn create_tag(&mut self, name: &str) -> Result<&Tag> {
        naming::validate_tag_name(name)?;
        if self.tags.contains_key(name) {
            tracing::info!(tag = name, "rejected duplicate tag");
            return Err(RenamerError::DuplicateTag(format!("tag {name:?} already exists")));
        }

        tracing::info!(tag = name, "created tag");
        Ok(self.tags.entry(name.to_string()).or_insert_with(|| Tag::new(name)))
    }

    pub fn find_tag(&self, name: &str) -> Result<&Tag> {
        naming::validate_tag_name(name)?;
        self.tags
            .get(name)
            .ok_or_else(|| RenamerError::TagNotFound(name.to_string()))
    }

    /// Remove a tag. Members must already have been detached from it.
    pub fn delete_tag(&mut self, name: &str) -> Result<Tag> {
        self.find_tag(name)?;
        let tag = self
            .tags
            .remove(name)
            .ok_or_else(|| RenamerError::TagNotFound(name.to_string()))?;

        if !tag.members.is_empty() {
            tracing::warn!(tag = name, members = tag.members.len(), "deleted tag that still had members");
        } else {
            tracing::info!(tag = name, "deleted tag");
        }
        Ok(tag)
    }

    pub fn attach_photo(&mut self, name: &str, photo: PhotoId) -> Result<()> {
        let tag = self.find_tag_mut(name)?;
        if tag.contains(photo) {
            return Err(RenamerError::DuplicateTag(format!(
                "photo {photo} is already tagged {name:?}"
            )));
        }
        tag.members.push(photo);
        Ok(())
    }

    /// Remove a photo from a tag; absent membership is not an error
    pub fn detach_photo(&mut self, name: &str, photo: PhotoId) -> Result<()> {
        let tag = self.find_tag_mut(name)?;
        tag.members.retain(|member| *member != photo);
        Ok(())
    }

    /// Snapshot of every tag, ordered by name
    pub fn list_tags(&self) -> Vec<Tag> {
        self.tags.values().cloned().collect()
    }

    /// Tag with the most members; ties go to the first in name order
    pub fn most_tagged_tag(&self) -> Option<&Tag> {
        self.tags.values().fold(None, |best: Option<&Tag>, tag| match best {
            Some(b) if b.members.len() >= tag.members.len() => Some(b),
            _ => Some(tag),
        })
    }

    fn find_tag_mut(&mut self, name: &str) -> Result<&mut Tag> {
        naming::validate_tag_name(name)?;
        self.tags
            .get_mut(name)
            .ok_or_else(|| RenamerError::TagNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_rejects_duplicates() {
        let mut store = TagStore::new();
        store.create_tag("Cat").unwrap();

        let err = store.create_tag("Cat").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateTag);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_rejects_blank_names() {
        let mut store = TagStore::new();
        assert_eq!(store.create_tag("  ").unwrap_err().kind(), ErrorKind::InvalidName);
        assert!(store.is_empty());
    }

    #[test]
    fn test_find_and_delete_missing_tag() {
        let mut store = TagStore::new();
        assert_eq!(store.find_tag("Cat").unwrap_err().kind(), ErrorKind::TagNotFound);
        assert_eq!(store.delete_tag("Cat").unwrap_err().kind(), ErrorKind::TagNotFound);
        assert_eq!(store.delete_tag("").unwrap_err().kind(), ErrorKind::InvalidName);
    }

    #[test]
    fn test_attach_rejects_existing_member() {
        let mut store = TagStore::new();
        store.create_tag("Cat").unwrap();
        store.attach_photo("Cat", PhotoId(1)).unwrap();

        let err = store.attach_photo("Cat", PhotoId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateTag);
        assert_eq!(store.find_tag("Cat").unwrap().members, vec![PhotoId(1)]);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut store = TagStore::new();
        store.create_tag("Cat").unwrap();
        store.attach_photo("Cat", PhotoId(1)).unwrap();
        store.attach_photo("Cat", PhotoId(2)).unwrap();

        store.detach_photo("Cat", PhotoId(1)).unwrap();
        let once = store.list_tags();
        store.detach_photo("Cat", PhotoId(1)).unwrap();
        assert_eq!(store.list_tags(), once);
        assert_eq!(store.find_tag("Cat").unwrap().members, vec![PhotoId(2)]);
    }

    #[test]
    fn test_most_tagged_tag() {
        let mut store = TagStore::new();
        assert!(store.most_tagged_tag().is_none());

        store.create_tag("Cat").unwrap();
        store.create_tag("Dog").unwrap();
        store.attach_photo("Dog", PhotoId(1)).unwrap();
        store.attach_photo("Dog", PhotoId(2)).unwrap();
        store.attach_photo("Cat", PhotoId(1)).unwrap();

        assert_eq!(store.most_tagged_tag().unwrap().name, "Dog");
    }
}
