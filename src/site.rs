//! The site bundle: page templates plus the static assets copied next to them.
//!
//! A bundle is immutable once built. The compiled-in one ([`SiteBundle::builtin`])
//! is built on first use and shared for the life of the process. A
//! `--site-template` directory is read exactly once at startup with
//! [`SiteBundle::from_dir`] and never touched again.
//!
//! Directory layout (the same one the compiled-in bundle is built from):
//!
//! ```text
//! homepage/index.html      homepage template
//! homepage/assets/**       copied to assets/homepage/**
//! album/index.html         album page template
//! album/assets/**          copied to assets/album/**
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Cannot read site template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot walk site template assets: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Site template is missing {0}")]
    Missing(PathBuf),
}

/// One asset file. `path` is relative to its bundle's assets directory, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledFile {
    pub path: String,
    pub contents: Vec<u8>,
}

impl BundledFile {
    fn new(path: &str, contents: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            contents: contents.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteBundle {
    homepage_template: String,
    album_template: String,
    homepage_assets: Vec<BundledFile>,
    album_assets: Vec<BundledFile>,
}

pub const HOMEPAGE_TEMPLATE: &str = "homepage/index.html";
pub const ALBUM_TEMPLATE: &str = "album/index.html";

static BUILTIN: LazyLock<SiteBundle> = LazyLock::new(|| SiteBundle {
    homepage_template: include_str!("../site-template/homepage/index.html").to_string(),
    album_template: include_str!("../site-template/album/index.html").to_string(),
    homepage_assets: vec![BundledFile::new(
        "css/homepage.css",
        include_bytes!("../site-template/homepage/assets/css/homepage.css"),
    )],
    album_assets: vec![
        BundledFile::new(
            "css/album.css",
            include_bytes!("../site-template/album/assets/css/album.css"),
        ),
        BundledFile::new(
            "js/lightbox.js",
            include_bytes!("../site-template/album/assets/js/lightbox.js"),
        ),
    ],
});

impl SiteBundle {
    /// The bundle compiled into the binary.
    pub fn builtin() -> &'static SiteBundle {
        &BUILTIN
    }

    /// Assemble a bundle from in-memory parts.
    pub fn from_parts(
        homepage_template: impl Into<String>,
        album_template: impl Into<String>,
        homepage_assets: Vec<BundledFile>,
        album_assets: Vec<BundledFile>,
    ) -> Self {
        Self {
            homepage_template: homepage_template.into(),
            album_template: album_template.into(),
            homepage_assets,
            album_assets,
        }
    }

    /// Load a bundle from a directory with the layout described in the module docs.
    ///
    /// Both templates are required. A missing `assets` directory is an empty bundle.
    pub fn from_dir(dir: &Path) -> Result<Self, SiteError> {
        Ok(Self {
            homepage_template: read_template(dir, HOMEPAGE_TEMPLATE)?,
            album_template: read_template(dir, ALBUM_TEMPLATE)?,
            homepage_assets: read_assets(&dir.join("homepage/assets"))?,
            album_assets: read_assets(&dir.join("album/assets"))?,
        })
    }

    pub fn homepage_template(&self) -> &str {
        &self.homepage_template
    }

    pub fn album_template(&self) -> &str {
        &self.album_template
    }

    pub fn homepage_assets(&self) -> &[BundledFile] {
        &self.homepage_assets
    }

    pub fn album_assets(&self) -> &[BundledFile] {
        &self.album_assets
    }
}

fn read_template(dir: &Path, name: &str) -> Result<String, SiteError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(SiteError::Missing(path));
    }
    std::fs::read_to_string(&path).map_err(|source| SiteError::Io { path, source })
}

/// Every file under `root`, in directory pre-order with siblings sorted by name.
fn read_assets(root: &Path) -> Result<Vec<BundledFile>, SiteError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let contents = std::fs::read(entry.path()).map_err(|source| SiteError::Io {
            path: entry.path().to_path_buf(),
            source,
        })?;
        files.push(BundledFile { path, contents });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_file;
    use tempfile::TempDir;

    #[test]
    fn builtin_bundle_has_templates_and_assets() {
        let bundle = SiteBundle::builtin();
        assert!(bundle.homepage_template().contains("{{ Title }}"));
        assert!(bundle.album_template().contains("AlbumName"));

        let album_paths: Vec<&str> = bundle.album_assets().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(album_paths, vec!["css/album.css", "js/lightbox.js"]);
        assert!(!bundle.homepage_assets().is_empty());
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(SiteBundle::builtin(), SiteBundle::builtin()));
    }

    #[test]
    fn from_dir_reads_templates_and_assets_in_preorder() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "homepage/index.html", b"home {{ Title }}");
        write_file(tmp.path(), "album/index.html", b"album {{ AlbumName }}");
        write_file(tmp.path(), "album/assets/z.css", b"z");
        write_file(tmp.path(), "album/assets/img/b.png", b"b");
        write_file(tmp.path(), "album/assets/img/a.png", b"a");

        let bundle = SiteBundle::from_dir(tmp.path()).unwrap();

        assert_eq!(bundle.homepage_template(), "home {{ Title }}");
        assert!(bundle.homepage_assets().is_empty());
        let paths: Vec<&str> = bundle.album_assets().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["img/a.png", "img/b.png", "z.css"]);
        assert_eq!(bundle.album_assets()[0].contents, b"a");
    }

    #[test]
    fn from_dir_requires_both_templates() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "homepage/index.html", b"home");

        let result = SiteBundle::from_dir(tmp.path());
        assert!(matches!(result, Err(SiteError::Missing(p)) if p.ends_with("album/index.html")));
    }
}
