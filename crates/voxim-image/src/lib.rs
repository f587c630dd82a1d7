//! # voxim-image
//!
//! Type-erased, copy-on-write images over the typed stores of
//! [`voxim_core`].
//!
//! This crate provides [`Image`], the one concrete image type the rest of
//! a pipeline passes around. An `Image` wraps exactly one strongly typed
//! store ([`VoxelStore`](voxim_core::VoxelStore) or
//! [`LabelStore`](voxim_core::LabelStore)) behind a uniform API, so code
//! that routes, annotates or samples images does not need a type
//! parameter per pixel kind.
//!
//! ## Design Philosophy
//!
//! Dispatch is bound once: constructing an `Image` runs the single
//! `match` over the pixel kind registry and picks the concrete store;
//! after that every call forwards through one erased handle with no
//! per-call tag checks. Typed data crosses the boundary through generic
//! accessors that verify the element kind and fail with
//! [`Error::TypeMismatch`] rather than converting silently:
//!
//! ```ignore
//! let v: f32 = image.pixel(&[4, 7])?;    // ok on a float32 image
//! let v: u8 = image.pixel(&[4, 7])?;     // Error::TypeMismatch
//! ```
//!
//! ## Sharing
//!
//! `Clone` is shallow and mutation detaches: clones share one store until
//! the first write on either side, which deep-copies first. Writes made
//! through one image are therefore never visible through another.
//!
//! ## Crate Structure
//!
//! ```text
//! voxim-core (registry, stores, geometry, metadata)
//!    ^
//!    |
//!    +-- voxim-image (this crate: erased handle + Image facade)
//! ```
//!
//! The shared [`Error`]/[`Result`] surface is `voxim-core`'s, re-exported
//! here so callers depend on one crate.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod holder;
mod image;

pub use image::Image;

// Re-exports for convenience
pub use voxim_core::{
    BufferMut, BufferRef, Error, Geometry, Interpolation, LabelScalar, LabelStore, MetaDict,
    MetaValue, PixelKind, PixelShape, RealScalar, Result, Run, Sample, Scalar, ScalarKind,
    VoxelStore,
};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use voxim_image::prelude::*;
/// ```
pub mod prelude {
    pub use crate::image::Image;
    pub use voxim_core::{
        Error, Interpolation, LabelStore, MetaValue, PixelKind, Result, ScalarKind, VoxelStore,
    };
}
