//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single operation the generator needs:
//! decode one original and render every requested [`VariantSpec`] from it,
//! encoded in the original's format.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the recording
//! mock in [`tests`] so pipeline logic can be checked without pixel work.

use super::params::{Quality, VariantSpec};
use image::ImageFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode {format:?} image: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },
    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(String),
}

/// One encoded output of [`ImageBackend::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedVariant {
    /// Directory label, see [`VariantSpec::label`].
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared by a rayon pool.
pub trait ImageBackend: Sync {
    /// Decode `source` once and produce every variant, in order, encoded as `format`.
    fn render(
        &self,
        source: &[u8],
        format: ImageFormat,
        quality: Quality,
        variants: &[VariantSpec],
    ) -> Result<Vec<RenderedVariant>, ImagingError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records renders without touching pixels.
    ///
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    /// Every source is treated as `source_dimensions`; the output bytes are a
    /// readable description so tests can assert on what was written where.
    pub struct MockImageBackend {
        pub source_dimensions: (u32, u32),
        pub fail_on: Option<Vec<u8>>,
        pub renders: Mutex<Vec<RecordedRender>>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRender {
        pub source: Vec<u8>,
        pub format: ImageFormat,
        pub quality: u32,
        pub labels: Vec<String>,
    }

    impl Default for MockImageBackend {
        fn default() -> Self {
            Self {
                source_dimensions: (1600, 1000),
                fail_on: None,
                renders: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockImageBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Fail with a decode error whenever the source bytes equal `source`.
        pub fn failing_on(source: &[u8]) -> Self {
            Self {
                fail_on: Some(source.to_vec()),
                ..Self::default()
            }
        }

        pub fn get_renders(&self) -> Vec<RecordedRender> {
            self.renders.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockImageBackend {
        fn render(
            &self,
            source: &[u8],
            format: ImageFormat,
            quality: Quality,
            variants: &[VariantSpec],
        ) -> Result<Vec<RenderedVariant>, ImagingError> {
            self.renders.lock().unwrap().push(RecordedRender {
                source: source.to_vec(),
                format,
                quality: quality.value(),
                labels: variants.iter().map(VariantSpec::label).collect(),
            });

            if self.fail_on.as_deref() == Some(source) {
                return Err(ImagingError::Decode(image::ImageError::IoError(
                    std::io::Error::other("corrupt"),
                )));
            }

            Ok(variants
                .iter()
                .map(|spec| {
                    let (width, height) = spec.output_dimensions(self.source_dimensions);
                    RenderedVariant {
                        label: spec.label(),
                        width,
                        height,
                        bytes: format!(
                            "{width}x{height} from {}",
                            String::from_utf8_lossy(source)
                        )
                        .into_bytes(),
                    }
                })
                .collect())
        }
    }

    #[test]
    fn mock_records_render() {
        let backend = MockImageBackend::new();
        let variants = [VariantSpec::thumbnail(360, 225), VariantSpec::large(1200, 750)];

        let rendered = backend
            .render(b"a.jpg", ImageFormat::Jpeg, Quality::new(85), &variants)
            .unwrap();

        assert_eq!(rendered.len(), 2);
        assert_eq!((rendered[0].width, rendered[0].height), (360, 225));
        assert_eq!((rendered[1].width, rendered[1].height), (1200, 750));
        assert_eq!(rendered[1].bytes, b"1200x750 from a.jpg");

        let renders = backend.get_renders();
        assert_eq!(renders.len(), 1);
        assert_eq!(renders[0].quality, 85);
        assert_eq!(renders[0].labels, vec!["360x225", "1200x750"]);
    }

    #[test]
    fn mock_fails_on_marked_source() {
        let backend = MockImageBackend::failing_on(b"bad");
        let result = backend.render(b"bad", ImageFormat::Png, Quality::default(), &[]);
        assert!(matches!(result, Err(ImagingError::Decode(_))));
    }
}
