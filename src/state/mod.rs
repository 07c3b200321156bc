/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Tag ownership and membership (tags.rs)
/// - Photo ownership, on-disk renames and rename history (photos.rs)
/// - The rename log sink (rename_log.rs)
/// - The SQLite catalog (library.rs)
/// - Cross-store sequencing of user actions (coordinator.rs)

pub mod coordinator;
pub mod data;
pub mod library;
pub mod photos;
pub mod rename_log;
pub mod tags;

pub use coordinator::Coordinator;
pub use data::{ImportResult, Photo, PhotoId, Tag, ThumbnailEntry};
