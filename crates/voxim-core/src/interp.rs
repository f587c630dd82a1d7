//! Continuous-index sampling modes.
//!
//! Pixel centers sit on integer indices; a continuous index may land
//! anywhere in `[-0.5, size - 0.5]` per axis, the half-pixel band around
//! the grid. [`Interpolation`] picks how values between centers are
//! reconstructed.

use std::fmt;

/// Interpolation used when sampling between pixel centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Value of the nearest pixel center.
    NearestNeighbor,
    /// Multilinear blend of the 2^d surrounding pixel centers.
    #[default]
    Linear,
}

impl Interpolation {
    /// Short lowercase name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NearestNeighbor => "nearest",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether `cindex` lies in the sampling range `[-0.5, size - 0.5]` on
/// every axis. NaN entries are out of range.
pub fn in_sampling_range(cindex: &[f64], size: &[u32]) -> bool {
    cindex
        .iter()
        .zip(size)
        .all(|(&x, &s)| x >= -0.5 && x <= f64::from(s) - 0.5)
}

/// Nearest pixel center for one axis, clamped to the grid.
pub(crate) fn nearest_cell(x: f64, size: u32) -> usize {
    (x.round() as i64).clamp(0, i64::from(size) - 1) as usize
}

/// Linear cell for one axis: the two bracketing pixel centers clamped to
/// the grid, and the fractional weight of the upper one.
pub(crate) fn linear_cell(x: f64, size: u32) -> (usize, usize, f64) {
    let max = i64::from(size) - 1;
    let i0 = x.floor() as i64;
    let frac = x - i0 as f64;
    let lo = i0.clamp(0, max) as usize;
    let hi = (i0 + 1).clamp(0, max) as usize;
    (lo, hi, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_linear() {
        assert_eq!(Interpolation::default(), Interpolation::Linear);
        assert_eq!(Interpolation::Linear.to_string(), "linear");
        assert_eq!(Interpolation::NearestNeighbor.name(), "nearest");
    }

    #[test]
    fn test_sampling_range() {
        assert!(in_sampling_range(&[0.0, 0.0], &[4, 4]));
        assert!(in_sampling_range(&[-0.5, 3.5], &[4, 4]));
        assert!(!in_sampling_range(&[-0.51, 0.0], &[4, 4]));
        assert!(!in_sampling_range(&[0.0, 3.51], &[4, 4]));
        assert!(!in_sampling_range(&[f64::NAN, 0.0], &[4, 4]));
    }

    #[test]
    fn test_nearest_cell_clamps_band_edges() {
        assert_eq!(nearest_cell(-0.5, 10), 0);
        assert_eq!(nearest_cell(-0.4, 10), 0);
        assert_eq!(nearest_cell(1.5, 10), 2);
        assert_eq!(nearest_cell(9.5, 10), 9);
    }

    #[test]
    fn test_linear_cell_interior_and_edges() {
        let (lo, hi, frac) = linear_cell(2.25, 10);
        assert_eq!((lo, hi), (2, 3));
        assert!((frac - 0.25).abs() < 1e-12);

        // below the first center both corners clamp to 0
        let (lo, hi, _) = linear_cell(-0.4, 10);
        assert_eq!((lo, hi), (0, 0));

        // above the last center both corners clamp to size - 1
        let (lo, hi, _) = linear_cell(9.5, 10);
        assert_eq!((lo, hi), (9, 9));
    }
}
