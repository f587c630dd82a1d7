//! Core types for voxim: the pixel kind registry, typed voxel stores,
//! spatial geometry and image metadata.
//!
//! This crate holds everything that is strongly typed. The type-erased
//! copy-on-write `Image` facade over these stores lives in `voxim-image`.
//!
//! # Modules
//!
//! - [`kind`] - Runtime pixel kind tags ([`ScalarKind`], [`PixelKind`])
//! - [`element`] - The sealed [`Scalar`] element trait and the carriers
//!   that move typed values across an erased boundary
//! - [`store`] - Dense [`VoxelStore`] and run-length [`LabelStore`]
//! - [`geometry`] - Origin, spacing, direction and physical transforms
//! - [`meta`] - Insertion-ordered metadata dictionary
//! - [`interp`] - Continuous-index sampling modes
//! - [`error`] - The shared [`Error`]/[`Result`] surface
//!
//! # Example
//!
//! ```rust
//! use voxim_core::{Interpolation, VoxelStore};
//!
//! let mut store = VoxelStore::<f32>::scalar(&[8, 8])?;
//! let at = store.pixel_index(&[3, 4])?;
//! store.set(at, 1.5);
//! assert_eq!(store.get(at), 1.5);
//!
//! let v = store.evaluate(&[3.0, 4.0], Interpolation::Linear)?;
//! assert_eq!(v, vec![1.5]);
//! # Ok::<(), voxim_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod element;
pub mod error;
pub mod geometry;
pub mod interp;
pub mod kind;
pub mod meta;
pub mod store;

pub use element::{BufferMut, BufferRef, LabelScalar, RealScalar, Sample, Scalar};
pub use error::{Error, Result};
pub use geometry::Geometry;
pub use interp::Interpolation;
pub use kind::{PixelKind, ScalarKind};
pub use meta::{MetaDict, MetaValue};
pub use store::{LabelStore, PixelShape, Run, VoxelStore};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::element::{BufferMut, BufferRef, LabelScalar, RealScalar, Sample, Scalar};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::Geometry;
    pub use crate::interp::Interpolation;
    pub use crate::kind::{PixelKind, ScalarKind};
    pub use crate::meta::{MetaDict, MetaValue};
    pub use crate::store::{LabelStore, PixelShape, Run, VoxelStore};
}
