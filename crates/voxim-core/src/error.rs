//! Error types shared by all voxim crates.
//!
//! This module provides the unified error surface for image construction,
//! typed pixel and buffer access, geometry updates and metadata queries.
//!
//! # Overview
//!
//! The [`Error`] enum has exactly six kinds, matching the failure modes a
//! type-erased image can hit:
//!
//! - [`TypeMismatch`](Error::TypeMismatch) - typed access against a different stored kind
//! - [`OutOfBounds`](Error::OutOfBounds) - index outside the buffered region
//! - [`InvalidArgument`](Error::InvalidArgument) - malformed lengths, counts, spacing, direction
//! - [`NotFound`](Error::NotFound) - absent metadata key
//! - [`Unsupported`](Error::Unsupported) - operation the image kind cannot honor
//! - [`InvalidState`](Error::InvalidState) - use of an empty (moved-from) image
//!
//! Failed operations are atomic: every check runs before any mutation or
//! copy-on-write detach, so an error leaves the image observably unchanged.
//!
//! # Usage
//!
//! ```rust
//! use voxim_core::{Error, Result};
//!
//! fn check_extent(index: u32, extent: u32) -> Result<()> {
//!     if index >= extent {
//!         return Err(Error::index_out_of_bounds(&[index], &[extent]));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

use crate::kind::PixelKind;

/// Result type alias using [`Error`] as the error type.
///
/// Convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or accessing images.
///
/// This enum uses [`thiserror`] for automatic [`std::error::Error`] and
/// [`std::fmt::Display`] implementations.
#[derive(Debug, Error)]
pub enum Error {
    /// Typed access whose element type or pixel shape does not match the
    /// stored kind.
    ///
    /// Returned by the generic pixel and buffer accessors when the image
    /// holds a different kind than the call names, e.g. reading `f32`
    /// pixels from a `uint8` image, or scalar access on a vector image.
    #[error("type mismatch: image holds {actual}, access requested {requested}")]
    TypeMismatch {
        /// Kind the caller asked for.
        requested: PixelKind,
        /// Kind the image actually stores.
        actual: PixelKind,
    },

    /// Index or continuous index outside the buffered region.
    ///
    /// Also returned when the index has fewer entries than the image
    /// dimension. Integer indices are carried as `f64`; every `u32` is
    /// exactly representable.
    #[error("index {index:?} out of bounds for image of size {size:?}")]
    OutOfBounds {
        /// Index that was accessed, one entry per axis.
        index: Vec<f64>,
        /// Image extents.
        size: Vec<u32>,
    },

    /// Malformed argument.
    ///
    /// Wrong argument length, zero extents, bad component count,
    /// non-positive spacing, singular direction, or a `copy_information`
    /// source of a different size.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was malformed.
        reason: String,
    },

    /// Metadata key absent from the dictionary.
    #[error("metadata key not found: {key:?}")]
    NotFound {
        /// Key that was looked up.
        key: String,
    },

    /// Operation or construction combination the image kind cannot honor.
    ///
    /// Unsupported dimension, allocation of the unknown kind, complex
    /// pixels over an integer element, interpolation or buffer access on
    /// a label image.
    #[error("unsupported operation: {reason}")]
    Unsupported {
        /// What was requested.
        reason: String,
    },

    /// Operation on an empty image.
    ///
    /// An image is empty after `Image::default()` or after its handle was
    /// moved out with `take`. Only destruction, reassignment and the
    /// emptiness probe are valid on it.
    #[error("image is empty: handle was moved out or never allocated")]
    InvalidState,
}

impl Error {
    /// Creates an [`Error::TypeMismatch`] error.
    #[inline]
    pub fn type_mismatch(requested: PixelKind, actual: PixelKind) -> Self {
        Self::TypeMismatch { requested, actual }
    }

    /// Creates an [`Error::OutOfBounds`] error from an integer index.
    #[inline]
    pub fn index_out_of_bounds(index: &[u32], size: &[u32]) -> Self {
        Self::OutOfBounds {
            index: index.iter().map(|&i| f64::from(i)).collect(),
            size: size.to_vec(),
        }
    }

    /// Creates an [`Error::OutOfBounds`] error from a continuous index.
    #[inline]
    pub fn continuous_out_of_bounds(index: &[f64], size: &[u32]) -> Self {
        Self::OutOfBounds {
            index: index.to_vec(),
            size: size.to_vec(),
        }
    }

    /// Creates an [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::NotFound`] error.
    #[inline]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates an [`Error::Unsupported`] error.
    #[inline]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a type mismatch error.
    #[inline]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns `true` if this is a bounds error.
    #[inline]
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }

    /// Returns `true` if this is an invalid argument error.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` if this is a missing metadata key error.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is an unsupported operation error.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Returns `true` if this is an empty image error.
    #[inline]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ScalarKind;

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::type_mismatch(
            PixelKind::Scalar(ScalarKind::Float32),
            PixelKind::Scalar(ScalarKind::UInt8),
        );
        let msg = err.to_string();
        assert!(msg.contains("float32"));
        assert!(msg.contains("uint8"));
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = Error::index_out_of_bounds(&[12, 5], &[10, 10]);
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
        assert!(err.is_out_of_bounds());
    }

    #[test]
    fn test_continuous_out_of_bounds_keeps_fraction() {
        let err = Error::continuous_out_of_bounds(&[-0.7, 2.0], &[4, 4]);
        assert!(err.to_string().contains("-0.7"));
        assert!(err.is_out_of_bounds());
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("PatientName");
        assert!(err.to_string().contains("PatientName"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_state() {
        let err = Error::InvalidState;
        assert!(err.to_string().contains("empty"));
        assert!(err.is_invalid_state());
        assert!(!err.is_unsupported());
    }
}
