//! Image processing in pure Rust.
//!
//! | Variant | Operation |
//! |---|---|
//! | **Thumbnail** | Lanczos3 cover-fit into the box, center crop |
//! | **Large** | Lanczos3 scale to the box height, aspect preserved |
//!
//! Both variants are re-encoded in the format named by the picture's file
//! extension (see [`format_from_filename`]).
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing the variants to produce
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{ImageBackend, ImagingError, RenderedVariant};
pub use calculations::{fill_dimensions, scale_to_height};
pub use params::{Quality, VariantKind, VariantSpec};
pub use rust_backend::{RustBackend, format_from_filename};
