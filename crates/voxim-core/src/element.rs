//! Typed elements and the type-erased carriers that move them.
//!
//! A type-erased image cannot name the element type of its store, so
//! values and buffers cross that boundary wrapped in closed enums:
//!
//! - [`Sample`] - one sample value
//! - [`BufferRef`] / [`BufferMut`] - a whole typed sample buffer
//!
//! The [`Scalar`] trait ties a Rust primitive to its [`ScalarKind`] tag
//! and to the matching enum variants. It is sealed: exactly the ten
//! registry element types implement it, so a `match` over the carriers is
//! exhaustive and a new element kind cannot appear outside this crate.

use crate::kind::ScalarKind;

mod sealed {
    pub trait Sealed {}
}

/// Element type of image samples.
///
/// Implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`, `u64`,
/// `f32` and `f64`; the trait is sealed against further implementations.
pub trait Scalar:
    sealed::Sealed + Copy + Default + PartialEq + PartialOrd + Send + Sync + std::fmt::Debug + 'static
{
    /// Registry tag of this element type.
    const KIND: ScalarKind;

    /// Wraps a value in the type-erased carrier.
    fn to_sample(self) -> Sample;

    /// Recovers a value from the carrier; `None` when the kinds differ.
    fn from_sample(sample: Sample) -> Option<Self>;

    /// Borrows this element type's slice out of a buffer view.
    fn slice_of(buffer: BufferRef<'_>) -> Option<&[Self]>;

    /// Borrows this element type's mutable slice out of a buffer view.
    fn slice_of_mut(buffer: BufferMut<'_>) -> Option<&mut [Self]>;

    /// Wraps a slice in the type-erased buffer view.
    fn buffer_of(slice: &[Self]) -> BufferRef<'_>;

    /// Wraps a mutable slice in the type-erased buffer view.
    fn buffer_of_mut(slice: &mut [Self]) -> BufferMut<'_>;

    /// Widens to `f64` for interpolation arithmetic.
    fn as_f64(self) -> f64;
}

/// Float element types that complex pixels are built from.
pub trait RealScalar: Scalar {}

impl RealScalar for f32 {}
impl RealScalar for f64 {}

/// Unsigned element types that label maps are built from.
pub trait LabelScalar: Scalar + Eq + Ord {}

impl LabelScalar for u8 {}
impl LabelScalar for u16 {}
impl LabelScalar for u32 {}
impl LabelScalar for u64 {}

/// One sample value of any element kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// `i8` value.
    I8(i8),
    /// `u8` value.
    U8(u8),
    /// `i16` value.
    I16(i16),
    /// `u16` value.
    U16(u16),
    /// `i32` value.
    I32(i32),
    /// `u32` value.
    U32(u32),
    /// `i64` value.
    I64(i64),
    /// `u64` value.
    U64(u64),
    /// `f32` value.
    F32(f32),
    /// `f64` value.
    F64(f64),
}

impl Sample {
    /// Element kind of the carried value.
    #[inline]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::I8(_) => ScalarKind::Int8,
            Self::U8(_) => ScalarKind::UInt8,
            Self::I16(_) => ScalarKind::Int16,
            Self::U16(_) => ScalarKind::UInt16,
            Self::I32(_) => ScalarKind::Int32,
            Self::U32(_) => ScalarKind::UInt32,
            Self::I64(_) => ScalarKind::Int64,
            Self::U64(_) => ScalarKind::UInt64,
            Self::F32(_) => ScalarKind::Float32,
            Self::F64(_) => ScalarKind::Float64,
        }
    }

    /// Widens the carried value to `f64`.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::I8(v) => f64::from(v),
            Self::U8(v) => f64::from(v),
            Self::I16(v) => f64::from(v),
            Self::U16(v) => f64::from(v),
            Self::I32(v) => f64::from(v),
            Self::U32(v) => f64::from(v),
            Self::I64(v) => v as f64,
            Self::U64(v) => v as f64,
            Self::F32(v) => f64::from(v),
            Self::F64(v) => v,
        }
    }
}

/// Borrowed view of a typed sample buffer.
#[derive(Debug, Clone, Copy)]
pub enum BufferRef<'a> {
    /// `i8` samples.
    I8(&'a [i8]),
    /// `u8` samples.
    U8(&'a [u8]),
    /// `i16` samples.
    I16(&'a [i16]),
    /// `u16` samples.
    U16(&'a [u16]),
    /// `i32` samples.
    I32(&'a [i32]),
    /// `u32` samples.
    U32(&'a [u32]),
    /// `i64` samples.
    I64(&'a [i64]),
    /// `u64` samples.
    U64(&'a [u64]),
    /// `f32` samples.
    F32(&'a [f32]),
    /// `f64` samples.
    F64(&'a [f64]),
}

impl<'a> BufferRef<'a> {
    /// Element kind of the buffer.
    #[inline]
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Self::I8(_) => ScalarKind::Int8,
            Self::U8(_) => ScalarKind::UInt8,
            Self::I16(_) => ScalarKind::Int16,
            Self::U16(_) => ScalarKind::UInt16,
            Self::I32(_) => ScalarKind::Int32,
            Self::U32(_) => ScalarKind::UInt32,
            Self::I64(_) => ScalarKind::Int64,
            Self::U64(_) => ScalarKind::UInt64,
            Self::F32(_) => ScalarKind::Float32,
            Self::F64(_) => ScalarKind::Float64,
        }
    }

    /// Number of samples in the buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        match self {
            Self::I8(s) => s.len(),
            Self::U8(s) => s.len(),
            Self::I16(s) => s.len(),
            Self::U16(s) => s.len(),
            Self::I32(s) => s.len(),
            Self::U32(s) => s.len(),
            Self::I64(s) => s.len(),
            Self::U64(s) => s.len(),
            Self::F32(s) => s.len(),
            Self::F64(s) => s.len(),
        }
    }

    /// Whether the buffer holds no samples.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buffer as raw bytes in native sample order.
    #[inline]
    pub fn as_bytes(self) -> &'a [u8] {
        match self {
            Self::I8(s) => bytemuck::cast_slice(s),
            Self::U8(s) => s,
            Self::I16(s) => bytemuck::cast_slice(s),
            Self::U16(s) => bytemuck::cast_slice(s),
            Self::I32(s) => bytemuck::cast_slice(s),
            Self::U32(s) => bytemuck::cast_slice(s),
            Self::I64(s) => bytemuck::cast_slice(s),
            Self::U64(s) => bytemuck::cast_slice(s),
            Self::F32(s) => bytemuck::cast_slice(s),
            Self::F64(s) => bytemuck::cast_slice(s),
        }
    }
}

/// Mutable view of a typed sample buffer.
#[derive(Debug)]
pub enum BufferMut<'a> {
    /// `i8` samples.
    I8(&'a mut [i8]),
    /// `u8` samples.
    U8(&'a mut [u8]),
    /// `i16` samples.
    I16(&'a mut [i16]),
    /// `u16` samples.
    U16(&'a mut [u16]),
    /// `i32` samples.
    I32(&'a mut [i32]),
    /// `u32` samples.
    U32(&'a mut [u32]),
    /// `i64` samples.
    I64(&'a mut [i64]),
    /// `u64` samples.
    U64(&'a mut [u64]),
    /// `f32` samples.
    F32(&'a mut [f32]),
    /// `f64` samples.
    F64(&'a mut [f64]),
}

impl<'a> BufferMut<'a> {
    /// Element kind of the buffer.
    #[inline]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::I8(_) => ScalarKind::Int8,
            Self::U8(_) => ScalarKind::UInt8,
            Self::I16(_) => ScalarKind::Int16,
            Self::U16(_) => ScalarKind::UInt16,
            Self::I32(_) => ScalarKind::Int32,
            Self::U32(_) => ScalarKind::UInt32,
            Self::I64(_) => ScalarKind::Int64,
            Self::U64(_) => ScalarKind::UInt64,
            Self::F32(_) => ScalarKind::Float32,
            Self::F64(_) => ScalarKind::Float64,
        }
    }

    /// Number of samples in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::I8(s) => s.len(),
            Self::U8(s) => s.len(),
            Self::I16(s) => s.len(),
            Self::U16(s) => s.len(),
            Self::I32(s) => s.len(),
            Self::U32(s) => s.len(),
            Self::I64(s) => s.len(),
            Self::U64(s) => s.len(),
            Self::F32(s) => s.len(),
            Self::F64(s) => s.len(),
        }
    }

    /// Whether the buffer holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The buffer as raw mutable bytes in native sample order.
    #[inline]
    pub fn into_bytes(self) -> &'a mut [u8] {
        match self {
            Self::I8(s) => bytemuck::cast_slice_mut(s),
            Self::U8(s) => s,
            Self::I16(s) => bytemuck::cast_slice_mut(s),
            Self::U16(s) => bytemuck::cast_slice_mut(s),
            Self::I32(s) => bytemuck::cast_slice_mut(s),
            Self::U32(s) => bytemuck::cast_slice_mut(s),
            Self::I64(s) => bytemuck::cast_slice_mut(s),
            Self::U64(s) => bytemuck::cast_slice_mut(s),
            Self::F32(s) => bytemuck::cast_slice_mut(s),
            Self::F64(s) => bytemuck::cast_slice_mut(s),
        }
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident, $variant:ident;)+) => {$(
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            #[inline]
            fn to_sample(self) -> Sample {
                Sample::$variant(self)
            }

            #[inline]
            fn from_sample(sample: Sample) -> Option<Self> {
                match sample {
                    Sample::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn slice_of(buffer: BufferRef<'_>) -> Option<&[Self]> {
                match buffer {
                    BufferRef::$variant(s) => Some(s),
                    _ => None,
                }
            }

            #[inline]
            fn slice_of_mut(buffer: BufferMut<'_>) -> Option<&mut [Self]> {
                match buffer {
                    BufferMut::$variant(s) => Some(s),
                    _ => None,
                }
            }

            #[inline]
            fn buffer_of(slice: &[Self]) -> BufferRef<'_> {
                BufferRef::$variant(slice)
            }

            #[inline]
            fn buffer_of_mut(slice: &mut [Self]) -> BufferMut<'_> {
                BufferMut::$variant(slice)
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    )+};
}

impl_scalar! {
    i8 => Int8, I8;
    u8 => UInt8, U8;
    i16 => Int16, I16;
    u16 => UInt16, U16;
    i32 => Int32, I32;
    u32 => UInt32, U32;
    i64 => Int64, I64;
    u64 => UInt64, U64;
    f32 => Float32, F32;
    f64 => Float64, F64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_round_trip() {
        let s = 1234u16.to_sample();
        assert_eq!(s.kind(), ScalarKind::UInt16);
        assert_eq!(u16::from_sample(s), Some(1234));
        assert_eq!(i16::from_sample(s), None);
        assert_eq!(f64::from_sample(s), None);
    }

    #[test]
    fn test_sample_as_f64() {
        assert_eq!((-5i8).to_sample().as_f64(), -5.0);
        assert_eq!(255u8.to_sample().as_f64(), 255.0);
        assert_eq!(1.5f32.to_sample().as_f64(), 1.5);
        assert_eq!(u64::MAX.to_sample().kind(), ScalarKind::UInt64);
    }

    #[test]
    fn test_kind_constants_match_sample_kinds() {
        assert_eq!(0i8.to_sample().kind(), i8::KIND);
        assert_eq!(0u32.to_sample().kind(), u32::KIND);
        assert_eq!(0f64.to_sample().kind(), f64::KIND);
    }

    #[test]
    fn test_buffer_slice_extraction() {
        let data = [1.0f32, 2.0, 3.0];
        let buf = f32::buffer_of(&data);
        assert_eq!(buf.kind(), ScalarKind::Float32);
        assert_eq!(buf.len(), 3);
        assert_eq!(f32::slice_of(buf), Some(&data[..]));
        assert_eq!(u8::slice_of(buf), None);
    }

    #[test]
    fn test_buffer_mut_extraction() {
        let mut data = [0u16; 4];
        let buf = u16::buffer_of_mut(&mut data);
        let slice = u16::slice_of_mut(buf).unwrap();
        slice[2] = 7;
        assert_eq!(data, [0, 0, 7, 0]);
    }

    #[test]
    fn test_buffer_as_bytes() {
        let data = [0x0102u16, 0x0304];
        let bytes = u16::buffer_of(&data).as_bytes();
        assert_eq!(bytes.len(), 4);

        let floats = [1.0f64; 3];
        assert_eq!(f64::buffer_of(&floats).as_bytes().len(), 24);
    }
}
