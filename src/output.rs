//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Albums lead with their
//! positional index and name; storage keys are secondary context, shown on
//! indented lines or after `→`.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Assets → assets/homepage (1 files)
//! Assets → assets/album (2 files)
//! Albums: 1
//! vacation (2 photos)
//!     a.jpg
//!         360x225: 360x225
//!         1200x750: 1000x750
//!     b.jpg
//!         360x225: 360x225
//!         1200x750: 1125x750
//! Page → vacation/index.html
//! Page → index.html
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 vacation (2 photos)
//!     Cover: a.jpg
//!     001 a.jpg
//!     002 b.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::generate::GenerateEvent;
use crate::types::Album;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + name + photo count.
///
/// ```text
/// 001 vacation (5 photos)
/// ```
fn entity_header(index: usize, name: &str, count: usize) -> String {
    format!("{} {} ({} photos)", format_index(index), name, count)
}

// ============================================================================
// Generate progress
// ============================================================================

/// Format a single generate progress event as display lines.
pub fn format_generate_event(event: &GenerateEvent) -> Vec<String> {
    match event {
        GenerateEvent::AssetsCopied { destination, files } => {
            vec![format!("Assets \u{2192} {} ({} files)", destination, files)]
        }
        GenerateEvent::AlbumsListed { count } => vec![format!("Albums: {}", count)],
        GenerateEvent::AlbumStarted {
            name,
            picture_count,
        } => vec![format!("{} ({} photos)", name, picture_count)],
        GenerateEvent::PictureResized {
            picture, variants, ..
        } => {
            let mut lines = vec![format!("{}{}", indent(1), picture)];
            for variant in variants {
                lines.push(format!(
                    "{}{}: {}x{}",
                    indent(2),
                    variant.label,
                    variant.width,
                    variant.height
                ));
            }
            lines
        }
        GenerateEvent::PageWritten { path } => vec![format!("Page \u{2192} {}", path)],
    }
}

/// Print one generate event to stdout.
pub fn print_generate_event(event: &GenerateEvent) {
    for line in format_generate_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Check inventory
// ============================================================================

/// Format the album inventory the `check` command reports.
pub fn format_album_listing(albums: &[Album]) -> Vec<String> {
    if albums.is_empty() {
        return vec!["No albums found".to_string()];
    }
    let mut lines = Vec::new();
    for (i, album) in albums.iter().enumerate() {
        lines.push(entity_header(i + 1, &album.name, album.pictures.len()));
        lines.push(format!("{}Cover: {}", indent(1), album.cover_image));
        for (j, picture) in album.pictures.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(j + 1), picture));
        }
    }
    lines
}

/// Print the album inventory to stdout.
pub fn print_album_listing(albums: &[Album]) {
    for line in format_album_listing(albums) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::VariantInfo;

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn format_assets_copied() {
        let event = GenerateEvent::AssetsCopied {
            destination: "assets/album".into(),
            files: 2,
        };
        assert_eq!(
            format_generate_event(&event),
            vec!["Assets \u{2192} assets/album (2 files)"]
        );
    }

    #[test]
    fn format_album_started() {
        let event = GenerateEvent::AlbumStarted {
            name: "vacation".into(),
            picture_count: 5,
        };
        assert_eq!(format_generate_event(&event), vec!["vacation (5 photos)"]);
    }

    #[test]
    fn format_picture_resized_lists_actual_sizes() {
        let event = GenerateEvent::PictureResized {
            album: "vacation".into(),
            picture: "a.jpg".into(),
            variants: vec![
                VariantInfo {
                    label: "360x225".into(),
                    width: 360,
                    height: 225,
                },
                VariantInfo {
                    label: "1200x750".into(),
                    width: 1000,
                    height: 750,
                },
            ],
        };
        let lines = format_generate_event(&event);
        assert_eq!(lines[0], "    a.jpg");
        assert_eq!(lines[1], "        360x225: 360x225");
        assert_eq!(lines[2], "        1200x750: 1000x750");
    }

    #[test]
    fn format_page_written() {
        let event = GenerateEvent::PageWritten {
            path: "index.html".into(),
        };
        assert_eq!(format_generate_event(&event), vec!["Page \u{2192} index.html"]);
    }

    #[test]
    fn album_listing_shows_cover_and_pictures() {
        let albums = vec![
            Album::from_listing("alps", vec!["b.jpg".into(), "a.jpg".into()]).unwrap(),
            Album::from_listing("zoo", vec!["z.png".into()]).unwrap(),
        ];
        let lines = format_album_listing(&albums);
        assert_eq!(
            lines,
            vec![
                "001 alps (2 photos)",
                "    Cover: a.jpg",
                "    001 a.jpg",
                "    002 b.jpg",
                "002 zoo (1 photos)",
                "    Cover: z.png",
                "    001 z.png",
            ]
        );
    }

    #[test]
    fn empty_listing() {
        assert_eq!(format_album_listing(&[]), vec!["No albums found"]);
    }
}
