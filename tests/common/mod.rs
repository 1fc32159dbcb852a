//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use picsite::layout;
use picsite::storage::MemoryStore;
use std::path::Path;
use tempfile::TempDir;

/// Encode a gradient JPEG of the given size.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(pixels)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, 90))
        .unwrap();
    bytes
}

/// `(album, picture, width, height)` entries used by most tests.
pub const VACATION: &[(&str, &str, u32, u32)] = &[
    ("vacation", "b.jpg", 1600, 1200),
    ("vacation", "a.jpg", 800, 1000),
];

/// A temp site directory with the given originals as real JPEGs.
pub fn local_site(pictures: &[(&str, &str, u32, u32)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (album, picture, w, h) in pictures {
        write(tmp.path(), &layout::original(album, picture), &jpeg(*w, *h));
    }
    tmp
}

/// An in-memory bucket with the same originals.
pub fn memory_site(pictures: &[(&str, &str, u32, u32)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (album, picture, w, h) in pictures {
        store.insert(&layout::original(album, picture), jpeg(*w, *h));
    }
    store
}

pub fn write(root: &Path, key: &str, contents: &[u8]) {
    let path = root.join(key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Every file under `root`, as sorted `/`-separated keys.
pub fn local_keys(root: &Path) -> Vec<String> {
    let mut keys: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    keys.sort();
    keys
}

pub fn dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}
