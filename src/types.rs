//! The gallery's in-memory data model.
//!
//! Albums are never persisted. Every run rebuilds them from whatever the
//! storage backend lists under `pics/original/`, so the live listing is the
//! only source of truth.
//!
//! The serialized field names (`Name`, `CoverImage`, `Pictures`) are the names
//! page templates see, so they are part of the site-template contract.

use serde::Serialize;

/// Leading character that marks an entry as hidden (`.DS_Store`, `.thumbs`).
pub const HIDDEN_MARKER: char = '.';

/// Whether a listing entry should be skipped because its name is hidden.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// One album: a storage container under `pics/original/` holding at least one picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Album {
    /// Container name, also the album's URL segment.
    pub name: String,
    /// Picture shown for the album on the homepage. Always `pictures[0]`.
    pub cover_image: String,
    /// Picture filenames, sorted lexicographically.
    pub pictures: Vec<String>,
}

impl Album {
    /// Build an album from a raw picture listing.
    ///
    /// Sorts the pictures so the cover image is deterministic regardless of the
    /// order the backend enumerated them in. Returns `None` for an empty
    /// listing; empty albums are never materialized.
    pub fn from_listing(name: impl Into<String>, mut pictures: Vec<String>) -> Option<Self> {
        pictures.sort();
        pictures.dedup();
        let cover_image = pictures.first()?.clone();
        Some(Self {
            name: name.into(),
            cover_image,
            pictures,
        })
    }
}
