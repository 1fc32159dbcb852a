//! Remote object-store backend.
//!
//! Object stores have no directories: a "container" is a key prefix ending in
//! `/`, listed with `/` as delimiter. Creating a file therefore never creates
//! any hierarchy; the object is simply written at its full key.
//!
//! Writes are buffered in memory and uploaded as a single PUT on
//! [`FileWriter::commit`]. A failed or skipped commit leaves no object behind,
//! so partial uploads are never visible to readers.

use super::{
    Backend, BoxError, FileWriter, StorageError, assemble_albums, content_type, picture_names,
};
use crate::cancel::CancelToken;
use crate::layout;
use crate::types::Album;
use std::io::{Cursor, Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("request cancelled")]
    Cancelled,
    #[error(transparent)]
    Request(BoxError),
}

/// One level of a delimiter listing. Keys are full object keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    /// Common prefixes ("sub-containers"), each ending in `/`.
    pub prefixes: Vec<String>,
    /// Object keys directly under the listed prefix.
    pub objects: Vec<String>,
}

/// Minimal object-store surface the remote backend needs.
pub trait ObjectStore: Send + Sync {
    /// List one level under `prefix` using `/` as delimiter.
    fn list(&self, prefix: &str, cancel: &CancelToken) -> Result<ObjectListing, StoreError>;

    /// Download an object.
    fn get(&self, key: &str, cancel: &CancelToken) -> Result<Vec<u8>, StoreError>;

    /// Upload an object in one request, replacing any existing one.
    fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        cancel: &CancelToken,
    ) -> Result<(), StoreError>;
}

pub struct RemoteBackend<S> {
    store: S,
}

impl<S: ObjectStore> RemoteBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn list(&self, container: &str, cancel: &CancelToken) -> Result<ObjectListing, StorageError> {
        let prefix = format!("{}/", container.trim_end_matches('/'));
        self.store.list(&prefix, cancel).map_err(|e| match e {
            StoreError::Cancelled => StorageError::Cancelled,
            other => StorageError::listing(container, other),
        })
    }
}

/// First segment of a common prefix below `parent` (which ends in `/`).
///
/// `None` for an empty segment, as produced by keys like `parent//x.jpg`.
fn child_name<'k>(prefix: &'k str, parent: &str) -> Option<&'k str> {
    let rest = prefix.strip_prefix(parent)?;
    let name = rest.split('/').next().unwrap_or(rest);
    (!name.is_empty()).then_some(name)
}

impl<S: ObjectStore> Backend for RemoteBackend<S> {
    fn get_albums(&self, cancel: &CancelToken) -> Result<Vec<Album>, StorageError> {
        cancel.check()?;
        let listing = self.list(layout::ORIGINALS_ROOT, cancel)?;
        let root = format!("{}/", layout::ORIGINALS_ROOT);
        // ignore objects stored directly under the root
        let names: Vec<String> = listing
            .prefixes
            .iter()
            .filter_map(|prefix| child_name(prefix, &root))
            .map(str::to_string)
            .collect();
        assemble_albums(names, |album| self.get_pictures(album, cancel))
    }

    fn get_pictures(
        &self,
        album: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, StorageError> {
        cancel.check()?;
        let container = layout::album_dir(album);
        let prefix = format!("{container}/");
        let listing = self.list(&container, cancel)?;
        // Sub-containers arrive as prefixes and are dropped; a zero-length
        // "directory marker" object equal to the prefix has an empty name.
        let names = listing.objects.iter().filter_map(|key| {
            key.strip_prefix(&prefix)
                .filter(|name| !name.contains('/'))
                .map(str::to_string)
        });
        Ok(picture_names(names))
    }

    fn create_file(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Result<Box<dyn FileWriter + '_>, StorageError> {
        cancel.check()?;
        let key = layout::join(&[path]);
        if key.is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(Box::new(RemoteWriter {
            store: &self.store,
            key,
            buffer: Vec::new(),
            cancel: cancel.clone(),
        }))
    }

    fn open_file(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Result<Box<dyn Read + Send + '_>, StorageError> {
        cancel.check()?;
        let key = layout::join(&[path]);
        let body = self.store.get(&key, cancel).map_err(|e| match e {
            StoreError::Cancelled => StorageError::Cancelled,
            other => StorageError::read(path, other),
        })?;
        Ok(Box::new(Cursor::new(body)))
    }
}

/// Pending upload. Dropping it without `commit` discards the buffer.
struct RemoteWriter<'a, S> {
    store: &'a S,
    key: String,
    buffer: Vec<u8>,
    cancel: CancelToken,
}

impl<S> Write for RemoteWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<S: ObjectStore> FileWriter for RemoteWriter<'_, S> {
    fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.store
            .put(
                &self.key,
                &self.buffer,
                content_type(&self.key),
                &self.cancel,
            )
            .map_err(|e| match e {
                StoreError::Cancelled => StorageError::Cancelled,
                other => StorageError::write(&self.key, other),
            })
    }
}
