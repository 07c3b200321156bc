//! Tag photos by renaming them.
//!
//! Tags live in the filename as `@tag ` prefixes. The [`Coordinator`] keeps
//! each photo's tag list, its file on disk and every tag's member list in
//! agreement, and remembers previous names so a photo can be reverted.

pub mod config;
pub mod error;
pub mod naming;
pub mod scan;
pub mod state;
pub mod thumbnail;

pub use config::AppPaths;
pub use error::{ErrorKind, RenamerError, Result};
pub use state::{Coordinator, ImportResult, Photo, PhotoId, Tag, ThumbnailEntry};
