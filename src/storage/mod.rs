//! Storage backends.
//!
//! The [`Backend`] trait is the only way the generator touches storage. Two
//! implementations exist, selected once at startup:
//!
//! | Backend | Medium | Commit |
//! |---|---|---|
//! | [`LocalBackend`] | directory tree | temp file renamed into place |
//! | [`RemoteBackend`] | object store (S3-compatible, or [`MemoryStore`]) | single PUT of the buffered body |
//!
//! ## Listing parity
//!
//! Directory listings and object listings arrive in whatever order the medium
//! produces. Both backends feed their raw names through [`picture_names`] and
//! [`assemble_albums`], which drop hidden entries, sort lexicographically and
//! skip empty albums. That shared layer is what makes the cover image and the
//! homepage order identical across backends.
//!
//! ## Writing
//!
//! [`Backend::create_file`] returns a [`FileWriter`]. Nothing is visible at
//! the destination until [`FileWriter::commit`] succeeds. Dropping a writer
//! without committing (an early `?` return, a panic) discards it, so readers
//! never observe a partial file on either backend.

mod local;
mod memory;
mod remote;
mod s3;

pub use local::LocalBackend;
pub use memory::MemoryStore;
pub use remote::{ObjectListing, ObjectStore, RemoteBackend, StoreError};
pub use s3::{S3Settings, S3Store};

use crate::cancel::{CancelToken, Cancelled};
use crate::types::{Album, is_hidden};
use std::io::{Read, Write};
use thiserror::Error;

/// Boxed error from the underlying medium (`io::Error`, S3 errors, ...).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot list {path}: {source}")]
    Listing {
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("Cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("Invalid storage path: {0:?}")]
    InvalidPath(String),
    #[error("Storage operation cancelled")]
    Cancelled,
}

impl From<Cancelled> for StorageError {
    fn from(_: Cancelled) -> Self {
        StorageError::Cancelled
    }
}

impl StorageError {
    pub(crate) fn listing(path: &str, source: impl Into<BoxError>) -> Self {
        StorageError::Listing {
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn read(path: &str, source: impl Into<BoxError>) -> Self {
        StorageError::Read {
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn write(path: &str, source: impl Into<BoxError>) -> Self {
        StorageError::Write {
            path: path.to_string(),
            source: source.into(),
        }
    }
}

/// A writable resource whose contents become visible only on commit.
pub trait FileWriter: Write + Send {
    /// Make the written bytes visible at the destination path.
    ///
    /// On error nothing is left at the destination.
    fn commit(self: Box<Self>) -> Result<(), StorageError>;
}

/// Storage capability the generator runs against.
///
/// Every call goes to the medium; there is no caching layer. Implementations
/// check the cancel token before touching storage.
pub trait Backend: Send + Sync {
    /// All non-empty albums under `pics/original/`, sorted by name.
    fn get_albums(&self, cancel: &CancelToken) -> Result<Vec<Album>, StorageError>;

    /// Leaf, non-hidden entries directly inside an album, sorted.
    fn get_pictures(&self, album: &str, cancel: &CancelToken)
    -> Result<Vec<String>, StorageError>;

    /// Open a new writable resource at `path`, replacing whatever is there on commit.
    ///
    /// Missing intermediate directories are created by the backend.
    fn create_file(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Result<Box<dyn FileWriter + '_>, StorageError>;

    /// Open `path` for reading.
    fn open_file(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Result<Box<dyn Read + Send + '_>, StorageError>;
}

/// Create, fill and commit a file in one step.
pub fn write_all(
    backend: &(impl Backend + ?Sized),
    path: &str,
    contents: &[u8],
    cancel: &CancelToken,
) -> Result<(), StorageError> {
    let mut writer = backend.create_file(path, cancel)?;
    writer
        .write_all(contents)
        .map_err(|e| StorageError::write(path, e))?;
    cancel.check()?;
    writer.commit()
}

/// Open and fully read a file.
pub fn read_all(
    backend: &(impl Backend + ?Sized),
    path: &str,
    cancel: &CancelToken,
) -> Result<Vec<u8>, StorageError> {
    let mut reader = backend.open_file(path, cancel)?;
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| StorageError::read(path, e))?;
    Ok(buf)
}

/// Normalize a raw picture listing: drop hidden names, sort, dedup.
pub fn picture_names(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = raw
        .into_iter()
        .filter(|name| !name.is_empty() && !is_hidden(name))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Turn raw album container names into sorted, non-empty [`Album`]s.
///
/// `pictures_of` is the backend's `get_pictures`; it is called once per
/// visible container, in name order, and its errors abort the listing.
pub fn assemble_albums(
    raw_names: impl IntoIterator<Item = String>,
    mut pictures_of: impl FnMut(&str) -> Result<Vec<String>, StorageError>,
) -> Result<Vec<Album>, StorageError> {
    let names = picture_names(raw_names);
    let mut albums = Vec::with_capacity(names.len());
    for name in names {
        let pictures = pictures_of(&name)?;
        // skip empty albums
        if let Some(album) = Album::from_listing(name, pictures) {
            albums.push(album);
        }
    }
    Ok(albums)
}

/// Best-effort `Content-Type` for a key, used by object stores that serve the site directly.
pub fn content_type(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}
