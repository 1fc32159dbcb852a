//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The generator builds
//! one [`VariantSpec`] per size class from the config and hands the list to an
//! [`ImageBackend`](super::backend::ImageBackend), which does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`VariantKind`]: How the target box is applied: cover-fit crop, or height-only scale.
//! - [`VariantSpec`]: Kind + target box. The box also names the output directory.

use super::calculations::scale_to_height;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    /// Scale to cover the whole box, then center-crop to exactly width x height.
    Thumbnail,
    /// Scale so the height matches; width follows the source aspect ratio.
    Large,
}

/// One derived size class of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub kind: VariantKind,
    pub width: u32,
    pub height: u32,
}

impl VariantSpec {
    pub fn thumbnail(width: u32, height: u32) -> Self {
        Self {
            kind: VariantKind::Thumbnail,
            width,
            height,
        }
    }

    pub fn large(width: u32, height: u32) -> Self {
        Self {
            kind: VariantKind::Large,
            width,
            height,
        }
    }

    /// Directory label under `pics/resized/`, e.g. `360x225`.
    ///
    /// For [`VariantKind::Large`] the width in the label is nominal.
    pub fn label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Pixel size of the output for a source of the given dimensions.
    pub fn output_dimensions(&self, source: (u32, u32)) -> (u32, u32) {
        match self.kind {
            VariantKind::Thumbnail => (self.width, self.height),
            VariantKind::Large => scale_to_height(source, self.height),
        }
    }
}
