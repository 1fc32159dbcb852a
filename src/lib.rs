//! # picsite
//!
//! A static photo-gallery generator. Your storage is the data source: every
//! directory (or key prefix) under `pics/original/` is an album, every file in
//! it a picture. One run writes resized pictures, album pages and a homepage
//! back to the same storage, ready to be served as-is.
//!
//! # Architecture: One Pipeline, Two Storage Media
//!
//! ```text
//! Backend (local dir | S3 bucket)
//!   pics/original/<album>/<picture>  ──►  Generator  ──►  pics/resized/…, *.html, assets/…
//! ```
//!
//! The [`generate::Generator`] never touches a filesystem or a network
//! directly. It runs against a [`storage::Backend`], chosen once at startup,
//! and produces the same layout on either medium.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Album` data model and the hidden-name rule |
//! | [`layout`] | Storage keys for originals, resized variants, pages and assets |
//! | [`storage`] | `Backend` contract; local, remote (S3) and in-memory implementations |
//! | [`cancel`] | `CancelToken` observed at every I/O step |
//! | [`imaging`] | Pure-Rust thumbnail and large-variant rendering |
//! | [`site`] | Page templates and static assets, compiled in or loaded from a directory |
//! | [`generate`] | The generation pipeline, its progress events and summary |
//! | [`config`] | Gallery `config` TOML and storage target resolution |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Sorted Listings Everywhere
//!
//! A directory read and an S3 listing return names in different orders. Both
//! backends pass their raw listings through one shared layer that drops hidden
//! names, sorts, and skips empty albums, so the cover image (the first
//! picture by name) and the homepage order are the same on every medium.
//!
//! ## Commit-on-Close Writes
//!
//! A write only becomes visible when its [`storage::FileWriter`] is committed:
//! a rename of a temp file locally, a single PUT remotely. A failed or
//! abandoned write never leaves a partial file behind.
//!
//! ## Idempotent Regeneration
//!
//! Every output is overwritten unconditionally and rendering is
//! deterministic, so running twice over the same originals yields
//! byte-identical output. Re-running is also the recovery path after a
//! failure; nothing is rolled back.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) for
//! decoding, resizing and encoding. No system libraries are needed.

pub mod cancel;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod site;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
