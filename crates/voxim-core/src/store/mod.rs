//! Typed image stores.
//!
//! Two representations back every image:
//!
//! - [`VoxelStore`] - dense sample buffer for scalar, vector and complex
//!   pixels
//! - [`LabelStore`] - run-length encoded label maps
//!
//! Both model a zero-based index grid of 2 to 4 axes and carry their own
//! [`Geometry`](crate::geometry::Geometry) and
//! [`MetaDict`](crate::meta::MetaDict).

mod dense;
mod label;

pub use dense::{PixelShape, VoxelStore};
pub use label::{LabelStore, Run};

use crate::error::{Error, Result};

/// Flat pixel index for `index` under the x-fastest row-major layout.
///
/// `index` needs at least one entry per axis; extra trailing entries are
/// ignored. A short index or an out-of-range coordinate is an
/// [`Error::OutOfBounds`].
pub fn flat_index(size: &[u32], index: &[u32]) -> Result<usize> {
    if index.len() < size.len() {
        return Err(Error::index_out_of_bounds(index, size));
    }
    let mut flat = 0usize;
    for axis in (0..size.len()).rev() {
        let i = index[axis];
        if i >= size[axis] {
            return Err(Error::index_out_of_bounds(index, size));
        }
        flat = flat * size[axis] as usize + i as usize;
    }
    Ok(flat)
}

/// Validates extents for allocation: 2 to 4 axes, all nonzero.
pub(crate) fn check_size(size: &[u32]) -> Result<()> {
    if !(2..=4).contains(&size.len()) {
        return Err(Error::unsupported(format!(
            "{}-dimensional images are not supported",
            size.len()
        )));
    }
    if size.iter().any(|&s| s == 0) {
        return Err(Error::invalid_argument(format!(
            "image extents must be nonzero, got {size:?}"
        )));
    }
    Ok(())
}

/// Total pixel count, guarding the multiply against overflow.
pub(crate) fn pixel_count(size: &[u32]) -> Result<usize> {
    size.iter()
        .try_fold(1usize, |acc, &s| acc.checked_mul(s as usize))
        .ok_or_else(|| {
            Error::invalid_argument(format!("image size {size:?} overflows addressable memory"))
        })
}
