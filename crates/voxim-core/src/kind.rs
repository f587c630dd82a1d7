//! The pixel kind registry.
//!
//! This module provides the canonical runtime description of what an image
//! stores: the element kind of a single sample and the pixel shape built
//! from it.
//!
//! # Types
//!
//! - [`ScalarKind`] - Element kind of one sample (ten integer/float kinds)
//! - [`PixelKind`] - Pixel shape over an element: scalar, vector, complex,
//!   label, plus an unknown sentinel
//!
//! Both enums are closed: adding a kind is a source change that the
//! compiler propagates to every `match` over them.
//!
//! # Usage
//!
//! ```rust
//! use voxim_core::kind::{PixelKind, ScalarKind};
//!
//! let kind = PixelKind::Vector(ScalarKind::Float32);
//! assert!(kind.is_vector());
//! assert_eq!(kind.bytes_per_component(), 4);
//! assert_eq!(kind.to_string(), "vector of float32");
//! ```

use std::fmt;

/// Element kind of a single image sample.
///
/// Covers the ten supported primitive kinds: signed and unsigned integers
/// of 8 to 64 bits and the two IEEE 754 float widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 8-bit signed integer.
    Int8,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit signed integer.
    Int16,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit signed integer.
    Int32,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit single-precision float.
    Float32,
    /// 64-bit double-precision float.
    Float64,
}

impl ScalarKind {
    /// Every element kind, in width order.
    pub const ALL: [Self; 10] = [
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Int64,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
    ];

    /// Size of one sample in bytes.
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Whether this is a floating-point kind.
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Whether this is an integer kind.
    #[inline]
    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Whether this kind can represent negative values.
    #[inline]
    pub const fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Float32 | Self::Float64
        )
    }

    /// Short lowercase name, e.g. `"uint16"`.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime pixel kind of an image: shape plus element.
///
/// # Variants
///
/// - `Scalar` - one sample per pixel
/// - `Vector` - a fixed-length tuple of samples per pixel
/// - `Complex` - real and imaginary samples, float elements only
/// - `Label` - run-length encoded label map, unsigned elements only
/// - `Unknown` - unset sentinel; allocation rejects it
///
/// The per-shape element restrictions are enforced when a store is
/// allocated; typed construction enforces them at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelKind {
    /// Unknown/unset sentinel.
    #[default]
    Unknown,
    /// One sample per pixel.
    Scalar(ScalarKind),
    /// Fixed-length tuple of samples per pixel.
    Vector(ScalarKind),
    /// Complex value stored as interleaved real and imaginary samples.
    Complex(ScalarKind),
    /// Run-length encoded label map.
    Label(ScalarKind),
}

impl PixelKind {
    /// Whether this is the unknown sentinel.
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Whether this is a scalar kind.
    #[inline]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Whether this is a vector kind.
    #[inline]
    pub const fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }

    /// Whether this is a complex kind.
    #[inline]
    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// Whether this is a label kind.
    #[inline]
    pub const fn is_label(&self) -> bool {
        matches!(self, Self::Label(_))
    }

    /// Element kind of one sample, `None` for `Unknown`.
    #[inline]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Unknown => None,
            Self::Scalar(k) | Self::Vector(k) | Self::Complex(k) | Self::Label(k) => Some(*k),
        }
    }

    /// Size of one sample in bytes, 0 for `Unknown`.
    #[inline]
    pub const fn bytes_per_component(&self) -> usize {
        match self.scalar_kind() {
            Some(k) => k.bytes(),
            None => 0,
        }
    }

    /// The same shape over a different element kind.
    ///
    /// `Unknown` stays `Unknown`. Used to phrase type mismatch errors in
    /// terms of what the caller asked for.
    #[inline]
    pub const fn with_element(&self, element: ScalarKind) -> Self {
        match self {
            Self::Unknown => Self::Unknown,
            Self::Scalar(_) => Self::Scalar(element),
            Self::Vector(_) => Self::Vector(element),
            Self::Complex(_) => Self::Complex(element),
            Self::Label(_) => Self::Label(element),
        }
    }

    /// Component count this kind gets when none is given explicitly.
    ///
    /// Scalar and label pixels hold one component, complex pixels hold
    /// two, vector pixels default to the image dimension. `Unknown`
    /// returns 0.
    #[inline]
    pub const fn default_components(&self, dimension: u32) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Scalar(_) | Self::Label(_) => 1,
            Self::Complex(_) => 2,
            Self::Vector(_) => dimension,
        }
    }
}

impl From<ScalarKind> for PixelKind {
    /// A bare element kind names a scalar image.
    #[inline]
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl fmt::Display for PixelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Scalar(k) => f.write_str(k.name()),
            Self::Vector(k) => write!(f, "vector of {}", k.name()),
            Self::Complex(k) => write!(f, "complex of {}", k.name()),
            Self::Label(k) => write!(f, "label of {}", k.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kind_bytes() {
        assert_eq!(ScalarKind::Int8.bytes(), 1);
        assert_eq!(ScalarKind::UInt16.bytes(), 2);
        assert_eq!(ScalarKind::Float32.bytes(), 4);
        assert_eq!(ScalarKind::UInt64.bytes(), 8);
    }

    #[test]
    fn test_scalar_kind_classification() {
        assert!(ScalarKind::Float64.is_float());
        assert!(ScalarKind::Float64.is_signed());
        assert!(!ScalarKind::Float64.is_integer());
        assert!(ScalarKind::UInt32.is_integer());
        assert!(!ScalarKind::UInt32.is_signed());
        assert!(ScalarKind::Int16.is_signed());
    }

    #[test]
    fn test_scalar_kind_names_are_unique() {
        for a in ScalarKind::ALL {
            for b in ScalarKind::ALL {
                if a != b {
                    assert_ne!(a.name(), b.name());
                }
            }
        }
    }

    #[test]
    fn test_pixel_kind_display() {
        assert_eq!(PixelKind::Unknown.to_string(), "unknown");
        assert_eq!(PixelKind::Scalar(ScalarKind::UInt8).to_string(), "uint8");
        assert_eq!(
            PixelKind::Vector(ScalarKind::Float64).to_string(),
            "vector of float64"
        );
        assert_eq!(
            PixelKind::Complex(ScalarKind::Float32).to_string(),
            "complex of float32"
        );
        assert_eq!(
            PixelKind::Label(ScalarKind::UInt16).to_string(),
            "label of uint16"
        );
    }

    #[test]
    fn test_default_components() {
        assert_eq!(PixelKind::Scalar(ScalarKind::UInt8).default_components(3), 1);
        assert_eq!(PixelKind::Label(ScalarKind::UInt8).default_components(3), 1);
        assert_eq!(
            PixelKind::Complex(ScalarKind::Float32).default_components(3),
            2
        );
        assert_eq!(
            PixelKind::Vector(ScalarKind::Float32).default_components(3),
            3
        );
        assert_eq!(PixelKind::Unknown.default_components(3), 0);
    }

    #[test]
    fn test_with_element() {
        let vector = PixelKind::Vector(ScalarKind::UInt8);
        assert_eq!(
            vector.with_element(ScalarKind::Float32),
            PixelKind::Vector(ScalarKind::Float32)
        );
        assert_eq!(
            PixelKind::Unknown.with_element(ScalarKind::Int8),
            PixelKind::Unknown
        );
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(PixelKind::default(), PixelKind::Unknown);
        assert_eq!(PixelKind::Unknown.bytes_per_component(), 0);
        assert_eq!(PixelKind::Unknown.scalar_kind(), None);
    }
}
