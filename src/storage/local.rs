//! Local filesystem backend.
//!
//! Keys map onto paths under a root directory. Writes go to a temp file in
//! the destination directory and are renamed over the target on commit, so a
//! half-written page or image is never visible.

use super::{Backend, FileWriter, StorageError, assemble_albums, picture_names};
use crate::cancel::CancelToken;
use crate::layout;
use crate::types::Album;
use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a storage key to a path under the root.
    ///
    /// Rejects empty keys and `.`/`..` segments so nothing escapes the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        let mut segments = 0;
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StorageError::InvalidPath(key.to_string()));
            }
            path.push(segment);
            segments += 1;
        }
        if segments == 0 {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        Ok(path)
    }

    /// Names of the entries in a directory, split into (directories, files).
    fn read_entries(&self, key: &str) -> Result<(Vec<String>, Vec<String>), StorageError> {
        let dir = self.resolve(key)?;
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StorageError::listing(key, e))? {
            let entry = entry.map_err(|e| StorageError::listing(key, e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Follow symlinks: a linked album directory is still an album.
            if entry.path().is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        Ok((dirs, files))
    }
}

impl Backend for LocalBackend {
    fn get_albums(&self, cancel: &CancelToken) -> Result<Vec<Album>, StorageError> {
        cancel.check()?;
        let (dirs, _) = self.read_entries(layout::ORIGINALS_ROOT)?;
        assemble_albums(dirs, |album| self.get_pictures(album, cancel))
    }

    fn get_pictures(
        &self,
        album: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, StorageError> {
        cancel.check()?;
        let (_, files) = self.read_entries(&layout::album_dir(album))?;
        Ok(picture_names(files))
    }

    fn create_file(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Result<Box<dyn FileWriter + '_>, StorageError> {
        cancel.check()?;
        let target = self.resolve(path)?;
        let parent = target
            .parent()
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
        fs::create_dir_all(parent).map_err(|e| StorageError::write(path, e))?;
        let temp = NamedTempFile::new_in(parent).map_err(|e| StorageError::write(path, e))?;
        Ok(Box::new(LocalWriter {
            key: path.to_string(),
            target,
            temp,
        }))
    }

    fn open_file(
        &self,
        path: &str,
        cancel: &CancelToken,
    ) -> Result<Box<dyn Read + Send + '_>, StorageError> {
        cancel.check()?;
        let target = self.resolve(path)?;
        let file = fs::File::open(&target).map_err(|e| StorageError::read(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Pending write. The temp file is deleted if this is dropped uncommitted.
struct LocalWriter {
    key: String,
    target: PathBuf,
    temp: NamedTempFile,
}

impl Write for LocalWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.temp.flush()
    }
}

impl FileWriter for LocalWriter {
    fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let LocalWriter { key, target, temp } = *self;
        publish_permissions(temp.as_file()).map_err(|e| StorageError::write(&key, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StorageError::write(&key, e))?;
        temp.persist(&target)
            .map_err(|e| StorageError::write(&key, e.error))?;
        Ok(())
    }
}

/// Mode of every published file. Temp files start out owner-only.
#[cfg(unix)]
const PUBLISHED_MODE: u32 = 0o644;

/// Make a file world-readable before it is renamed into place.
#[cfg(unix)]
fn publish_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(PUBLISHED_MODE))
}

#[cfg(not(unix))]
fn publish_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{read_all, write_all};
    use std::path::Path;
    use tempfile::TempDir;

    fn seed(root: &Path, files: &[&str]) {
        for file in files {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "fake image").unwrap();
        }
    }

    #[test]
    fn albums_sorted_with_cover_first() {
        let tmp = TempDir::new().unwrap();
        seed(
            tmp.path(),
            &[
                "pics/original/zebra/2.jpg",
                "pics/original/zebra/1.jpg",
                "pics/original/alpine/b.jpg",
                "pics/original/alpine/a.jpg",
            ],
        );

        let backend = LocalBackend::new(tmp.path());
        let albums = backend.get_albums(&CancelToken::new()).unwrap();

        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].name, "alpine");
        assert_eq!(albums[0].cover_image, "a.jpg");
        assert_eq!(albums[0].pictures, vec!["a.jpg", "b.jpg"]);
        assert_eq!(albums[1].name, "zebra");
        assert_eq!(albums[1].cover_image, "1.jpg");
    }

    #[test]
    fn hidden_only_album_is_skipped() {
        let tmp = TempDir::new().unwrap();
        seed(
            tmp.path(),
            &["pics/original/empty/.DS_Store", "pics/original/real/a.jpg"],
        );

        let backend = LocalBackend::new(tmp.path());
        let albums = backend.get_albums(&CancelToken::new()).unwrap();

        let names: Vec<&str> = albums.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["real"]);
    }

    #[test]
    fn pictures_exclude_subdirectories() {
        let tmp = TempDir::new().unwrap();
        seed(
            tmp.path(),
            &[
                "pics/original/trip/a.jpg",
                "pics/original/trip/nested/deep.jpg",
                "pics/original/trip/.hidden.jpg",
            ],
        );

        let backend = LocalBackend::new(tmp.path());
        let pictures = backend.get_pictures("trip", &CancelToken::new()).unwrap();
        assert_eq!(pictures, vec!["a.jpg"]);
    }

    #[test]
    fn files_at_originals_root_are_not_albums() {
        let tmp = TempDir::new().unwrap();
        seed(
            tmp.path(),
            &["pics/original/stray.jpg", "pics/original/trip/a.jpg"],
        );

        let backend = LocalBackend::new(tmp.path());
        let albums = backend.get_albums(&CancelToken::new()).unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "trip");
    }

    #[test]
    fn missing_root_is_listing_error() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path().join("nope"));
        let result = backend.get_albums(&CancelToken::new());
        assert!(matches!(result, Err(StorageError::Listing { .. })));
    }

    #[test]
    fn missing_album_is_listing_error() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());
        let result = backend.get_pictures("ghost", &CancelToken::new());
        assert!(matches!(result, Err(StorageError::Listing { .. })));
    }

    #[test]
    fn create_file_makes_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());
        let cancel = CancelToken::new();

        write_all(&backend, "pics/resized/360x225/trip/a.jpg", b"bytes", &cancel).unwrap();

        let written = fs::read(tmp.path().join("pics/resized/360x225/trip/a.jpg")).unwrap();
        assert_eq!(written, b"bytes");
    }

    #[test]
    fn create_file_overwrites() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());
        let cancel = CancelToken::new();

        write_all(&backend, "index.html", b"old contents", &cancel).unwrap();
        write_all(&backend, "index.html", b"new", &cancel).unwrap();

        assert_eq!(read_all(&backend, "index.html", &cancel).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn committed_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());

        write_all(&backend, "index.html", b"<html>", &CancelToken::new()).unwrap();

        let mode = fs::metadata(tmp.path().join("index.html"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn uncommitted_writer_leaves_nothing() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());
        let cancel = CancelToken::new();

        {
            let mut writer = backend.create_file("album/index.html", &cancel).unwrap();
            writer.write_all(b"partial").unwrap();
        }

        assert!(!tmp.path().join("album/index.html").exists());
        let leftovers: Vec<_> = fs::read_dir(tmp.path().join("album")).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn open_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());
        let result = backend.open_file("pics/original/x/missing.jpg", &CancelToken::new());
        assert!(matches!(result, Err(StorageError::Read { .. })));
    }

    #[test]
    fn parent_segments_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let backend = LocalBackend::new(tmp.path());
        let result = backend.create_file("../escape.html", &CancelToken::new());
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[test]
    fn cancelled_token_stops_listing() {
        let tmp = TempDir::new().unwrap();
        seed(tmp.path(), &["pics/original/trip/a.jpg"]);
        let backend = LocalBackend::new(tmp.path());
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = backend.get_albums(&cancel);
        assert!(matches!(result, Err(StorageError::Cancelled)));
    }
}
