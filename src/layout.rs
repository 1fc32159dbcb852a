//! Storage keys for everything the generator reads and writes.
//!
//! Keys are `/`-separated and relative to the backend root (a directory for
//! the local backend, a bucket for the remote one). Both backends produce the
//! same layout:
//!
//! ```text
//! pics/original/<album>/<picture>          input, never written
//! pics/resized/360x225/<album>/<picture>   thumbnail
//! pics/resized/1200x750/<album>/<picture>  large variant (only the height is fixed)
//! assets/homepage/...                      copied verbatim from the site bundle
//! assets/album/...                         copied verbatim from the site bundle
//! index.html                               homepage
//! <album>/index.html                       album page
//! ```

/// Root container of the original pictures.
pub const ORIGINALS_ROOT: &str = "pics/original";

/// Root container of resized variants.
pub const RESIZED_ROOT: &str = "pics/resized";

/// Destination of the homepage asset bundle.
pub const HOMEPAGE_ASSETS: &str = "assets/homepage";

/// Destination of the album-page asset bundle.
pub const ALBUM_ASSETS: &str = "assets/album";

/// Homepage key.
pub const HOMEPAGE: &str = "index.html";

/// Join key segments with `/`, ignoring empty segments and stray slashes.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Container key of one album's originals.
pub fn album_dir(album: &str) -> String {
    join(&[ORIGINALS_ROOT, album])
}

/// Key of an original picture.
pub fn original(album: &str, picture: &str) -> String {
    join(&[ORIGINALS_ROOT, album, picture])
}

/// Key of a resized variant. `label` is the size class, e.g. `"360x225"`.
pub fn resized(label: &str, album: &str, picture: &str) -> String {
    join(&[RESIZED_ROOT, label, album, picture])
}

/// Key of an album page.
pub fn album_page(album: &str) -> String {
    join(&[album, "index.html"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_key() {
        assert_eq!(original("vacation", "a.jpg"), "pics/original/vacation/a.jpg");
    }

    #[test]
    fn resized_key() {
        assert_eq!(
            resized("360x225", "vacation", "a.jpg"),
            "pics/resized/360x225/vacation/a.jpg"
        );
    }

    #[test]
    fn album_page_key() {
        assert_eq!(album_page("vacation"), "vacation/index.html");
    }

    #[test]
    fn join_drops_empty_and_slashes() {
        assert_eq!(join(&["assets/album/", "", "/css/album.css"]), "assets/album/css/album.css");
    }
}
