//! Site generation.
//!
//! [`Generator::generate`] turns whatever originals the backend currently
//! lists into a complete static site on the same backend.
//!
//! ## Steps
//!
//! Strictly in this order; the first error aborts the run and nothing already
//! written is rolled back:
//!
//! 1. Copy the homepage and album asset bundles to `assets/homepage/` and `assets/album/`.
//! 2. List albums ([`Backend::get_albums`]).
//! 3. Parse both page templates. A syntax error stops the run here, before
//!    any picture is touched.
//! 4. For each album, in name order: resize every picture into the thumbnail
//!    and large variants, then render `<album>/index.html`.
//! 5. Render the homepage `index.html`.
//!
//! Every write replaces its target unconditionally, so re-running over
//! unchanged originals reproduces the site byte for byte. Re-running is also
//! the recovery path after a failure.
//!
//! ## Template contexts
//!
//! | Page | Variables |
//! |---|---|
//! | album | `AlbumName`, `Pictures`, `ThumbnailLabel`, `LargeLabel` |
//! | homepage | `Title`, `Albums` (each `Name`, `CoverImage`, `Pictures`), `ThumbnailLabel`, `LargeLabel` |
//!
//! Undefined variables are errors, so a template written against a different
//! context fails loudly instead of rendering blanks.
//!
//! ## Parallelism
//!
//! With `processing.max_processes > 1` the pictures of one album are resized
//! on a bounded rayon pool. Albums and pages are still handled one at a time,
//! and every output path depends only on its input, so completion order never
//! shows in the result.

use crate::cancel::{CancelToken, Cancelled};
use crate::config::{self, GalleryConfig};
use crate::imaging::{self, ImageBackend, ImagingError, VariantSpec};
use crate::layout;
use crate::site::{self, BundledFile, SiteBundle};
use crate::storage::{self, Backend, StorageError};
use crate::types::Album;
use minijinja::{Environment, UndefinedBehavior, context};
use rayon::prelude::*;
use std::fmt;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Cannot resize {path}: {source}")]
    Imaging {
        path: String,
        #[source]
        source: ImagingError,
    },
    #[error("Cannot parse template {name}: {source}")]
    TemplateParse {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("Cannot render template {name}: {source}")]
    TemplateRender {
        name: String,
        #[source]
        source: minijinja::Error,
    },
    #[error("Cannot start resize workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Generation cancelled")]
    Cancelled,
}

impl From<Cancelled> for GenerateError {
    fn from(_: Cancelled) -> Self {
        GenerateError::Cancelled
    }
}

impl GenerateError {
    /// Whether the run stopped because the cancel token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            GenerateError::Cancelled | GenerateError::Storage(StorageError::Cancelled)
        )
    }
}

/// Progress events, sent as the run advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateEvent {
    AssetsCopied {
        destination: String,
        files: usize,
    },
    AlbumsListed {
        count: usize,
    },
    AlbumStarted {
        name: String,
        picture_count: usize,
    },
    PictureResized {
        album: String,
        picture: String,
        variants: Vec<VariantInfo>,
    },
    PageWritten {
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub label: String,
    pub width: u32,
    pub height: u32,
}

/// Counts of everything a successful run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub assets: usize,
    pub albums: usize,
    pub pictures: usize,
    pub variants: usize,
    pub pages: usize,
}

impl fmt::Display for GenerateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} albums, {} pictures ({} resized files), {} pages, {} assets",
            self.albums, self.pictures, self.variants, self.pages, self.assets
        )
    }
}

/// One generation run's collaborators. Construct, configure, call [`generate`](Self::generate).
pub struct Generator<'a> {
    backend: &'a dyn Backend,
    images: &'a dyn ImageBackend,
    site: &'a SiteBundle,
    config: &'a GalleryConfig,
    cancel: CancelToken,
    events: Option<Sender<GenerateEvent>>,
}

impl<'a> Generator<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        images: &'a dyn ImageBackend,
        site: &'a SiteBundle,
        config: &'a GalleryConfig,
    ) -> Self {
        Self {
            backend,
            images,
            site,
            config,
            cancel: CancelToken::new(),
            events: None,
        }
    }

    /// Observe `cancel` at every suspension point.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Send progress events to `events`.
    pub fn with_events(mut self, events: Sender<GenerateEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: GenerateEvent) {
        if let Some(tx) = &self.events {
            // a dropped receiver only means nobody is listening
            let _ = tx.send(event);
        }
    }

    /// Run the whole pipeline once.
    pub fn generate(&self) -> Result<GenerateSummary, GenerateError> {
        let mut summary = GenerateSummary::default();

        summary.assets += self.copy_assets(self.site.homepage_assets(), layout::HOMEPAGE_ASSETS)?;
        summary.assets += self.copy_assets(self.site.album_assets(), layout::ALBUM_ASSETS)?;

        let albums = self.backend.get_albums(&self.cancel)?;
        self.emit(GenerateEvent::AlbumsListed {
            count: albums.len(),
        });

        let templates = self.load_templates()?;
        let pool = self.thread_pool()?;
        let specs = self.config.variant_specs();

        for album in &albums {
            self.cancel.check()?;
            self.emit(GenerateEvent::AlbumStarted {
                name: album.name.clone(),
                picture_count: album.pictures.len(),
            });

            summary.variants += self.resize_album(album, &specs, pool.as_ref())?;
            summary.pictures += album.pictures.len();

            let html = render(
                &templates,
                site::ALBUM_TEMPLATE,
                context! {
                    AlbumName => &album.name,
                    Pictures => &album.pictures,
                    ThumbnailLabel => specs[0].label(),
                    LargeLabel => specs[1].label(),
                },
            )?;
            self.write_page(&layout::album_page(&album.name), &html)?;
            summary.albums += 1;
            summary.pages += 1;
        }

        let html = render(
            &templates,
            site::HOMEPAGE_TEMPLATE,
            context! {
                Title => &self.config.title,
                Albums => &albums,
                ThumbnailLabel => specs[0].label(),
                LargeLabel => specs[1].label(),
            },
        )?;
        self.write_page(layout::HOMEPAGE, &html)?;
        summary.pages += 1;

        Ok(summary)
    }

    /// Mirror one asset bundle under `destination`, in bundle (pre-)order.
    fn copy_assets(&self, files: &[BundledFile], destination: &str) -> Result<usize, GenerateError> {
        for file in files {
            let key = layout::join(&[destination, &file.path]);
            storage::write_all(self.backend, &key, &file.contents, &self.cancel)?;
        }
        self.emit(GenerateEvent::AssetsCopied {
            destination: destination.to_string(),
            files: files.len(),
        });
        Ok(files.len())
    }

    fn load_templates(&self) -> Result<Environment<'a>, GenerateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for (name, source) in [
            (site::ALBUM_TEMPLATE, self.site.album_template()),
            (site::HOMEPAGE_TEMPLATE, self.site.homepage_template()),
        ] {
            env.add_template(name, source)
                .map_err(|source| GenerateError::TemplateParse {
                    name: name.to_string(),
                    source,
                })?;
        }
        Ok(env)
    }

    fn thread_pool(&self) -> Result<Option<rayon::ThreadPool>, GenerateError> {
        let threads = config::effective_threads(&self.config.processing);
        if threads <= 1 {
            return Ok(None);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(Some(pool))
    }

    /// Resize every picture of `album`. Returns the number of files written.
    fn resize_album(
        &self,
        album: &Album,
        specs: &[VariantSpec],
        pool: Option<&rayon::ThreadPool>,
    ) -> Result<usize, GenerateError> {
        let resize = |picture: &String| self.resize_picture(&album.name, picture, specs);
        let written: Vec<usize> = match pool {
            Some(pool) => pool.install(|| {
                album
                    .pictures
                    .par_iter()
                    .map(resize)
                    .collect::<Result<Vec<usize>, GenerateError>>()
            })?,
            None => album
                .pictures
                .iter()
                .map(resize)
                .collect::<Result<Vec<usize>, GenerateError>>()?,
        };
        Ok(written.iter().sum())
    }

    fn resize_picture(
        &self,
        album: &str,
        picture: &str,
        specs: &[VariantSpec],
    ) -> Result<usize, GenerateError> {
        self.cancel.check()?;
        let original = layout::original(album, picture);
        let imaging_error = |source| GenerateError::Imaging {
            path: original.clone(),
            source,
        };

        let format = imaging::format_from_filename(picture).map_err(imaging_error)?;
        let source = storage::read_all(self.backend, &original, &self.cancel)?;

        self.cancel.check()?;
        let rendered = self
            .images
            .render(&source, format, self.config.quality(), specs)
            .map_err(imaging_error)?;

        for variant in &rendered {
            let key = layout::resized(&variant.label, album, picture);
            storage::write_all(self.backend, &key, &variant.bytes, &self.cancel)?;
        }

        self.emit(GenerateEvent::PictureResized {
            album: album.to_string(),
            picture: picture.to_string(),
            variants: rendered
                .iter()
                .map(|v| VariantInfo {
                    label: v.label.clone(),
                    width: v.width,
                    height: v.height,
                })
                .collect(),
        });
        Ok(rendered.len())
    }

    fn write_page(&self, path: &str, html: &str) -> Result<(), GenerateError> {
        storage::write_all(self.backend, path, html.as_bytes(), &self.cancel)?;
        self.emit(GenerateEvent::PageWritten {
            path: path.to_string(),
        });
        Ok(())
    }
}

fn render(
    templates: &Environment<'_>,
    name: &str,
    ctx: minijinja::Value,
) -> Result<String, GenerateError> {
    let render_error = |source| GenerateError::TemplateRender {
        name: name.to_string(),
        source,
    };
    templates
        .get_template(name)
        .map_err(render_error)?
        .render(ctx)
        .map_err(render_error)
}
