//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP, BMP) | `image::ImageReader` with content sniffing |
//! | Thumbnail | Lanczos3 `resize_exact` to the fill size, then center `crop_imm` |
//! | Large | Lanczos3 `resize_exact` to the height-constrained size |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode others | `DynamicImage::write_to` in the source format |

use super::backend::{ImageBackend, ImagingError, RenderedVariant};
use super::calculations::fill_dimensions;
use super::params::{Quality, VariantKind, VariantSpec};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Extensions with a decoder and encoder compiled in, and the format each maps to.
const PHOTO_FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("bmp", ImageFormat::Bmp),
    ("webp", ImageFormat::WebP),
];

/// Output format for a picture, inferred from its filename extension (case-insensitive).
pub fn format_from_filename(name: &str) -> Result<ImageFormat, ImagingError> {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .ok_or_else(|| ImagingError::UnsupportedFormat(name.to_string()))?;
    PHOTO_FORMATS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
        .map(|(_, format)| *format)
        .ok_or_else(|| ImagingError::UnsupportedFormat(name.to_string()))
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(source: &[u8]) -> Result<DynamicImage, ImagingError> {
    ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(image::ImageError::IoError(e)))?
        .decode()
        .map_err(ImagingError::Decode)
}

/// Cover-fit: scale to fill the box, then crop the center.
fn thumbnail(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (fill_w, fill_h) = fill_dimensions((img.width(), img.height()), (width, height));
    let filled = img.resize_exact(fill_w, fill_h, FilterType::Lanczos3);
    let x = (fill_w - width) / 2;
    let y = (fill_h - height) / 2;
    filled.crop_imm(x, y, width, height)
}

fn encode(img: &DynamicImage, format: ImageFormat, quality: Quality) -> Result<Vec<u8>, ImagingError> {
    let mut bytes = Vec::new();
    let result = match format {
        // JPEG has no alpha channel and takes a quality knob.
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        other => img.write_to(&mut Cursor::new(&mut bytes), other),
    };
    result.map_err(|source| ImagingError::Encode { format, source })?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn render(
        &self,
        source: &[u8],
        format: ImageFormat,
        quality: Quality,
        variants: &[VariantSpec],
    ) -> Result<Vec<RenderedVariant>, ImagingError> {
        let img = decode(source)?;

        variants
            .iter()
            .map(|spec| {
                let resized = match spec.kind {
                    VariantKind::Thumbnail => thumbnail(&img, spec.width, spec.height),
                    VariantKind::Large => {
                        let (w, h) = spec.output_dimensions((img.width(), img.height()));
                        img.resize_exact(w, h, FilterType::Lanczos3)
                    }
                };
                Ok(RenderedVariant {
                    label: spec.label(),
                    width: resized.width(),
                    height: resized.height(),
                    bytes: encode(&resized, format, quality)?,
                })
            })
            .collect()
    }
}
