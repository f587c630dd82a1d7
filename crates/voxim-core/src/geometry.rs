//! Spatial placement: origin, spacing, direction and the index/point
//! transforms between them.
//!
//! Every image carries a [`Geometry`] mapping its zero-based index grid
//! into physical space:
//!
//! ```text
//! point = origin + direction * diag(spacing) * index
//! ```
//!
//! The direction matrix is validated to be invertible when it is set and
//! its inverse is cached, so the point-to-index transform is plain matrix
//! arithmetic with no failure path.

use crate::error::{Error, Result};

/// Matrix entries smaller than this pivot threshold count as singular.
const SINGULAR_EPSILON: f64 = 1e-10;

/// Spatial placement of an image in physical space.
///
/// `origin` and `spacing` have one entry per axis; `direction` is a
/// row-major axis-count squared matrix. Defaults are zero origin, unit
/// spacing and the identity direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    origin: Vec<f64>,
    spacing: Vec<f64>,
    direction: Vec<f64>,
    inverse: Vec<f64>,
}

impl Geometry {
    /// Identity placement for a `dimension`-dimensional image.
    pub fn identity(dimension: u32) -> Self {
        let d = dimension as usize;
        let mut direction = vec![0.0; d * d];
        for i in 0..d {
            direction[i * d + i] = 1.0;
        }
        Self {
            origin: vec![0.0; d],
            spacing: vec![1.0; d],
            inverse: direction.clone(),
            direction,
        }
    }

    /// Number of axes this placement describes.
    #[inline]
    pub fn dimension(&self) -> u32 {
        self.origin.len() as u32
    }

    /// Physical coordinate of index zero, one entry per axis.
    #[inline]
    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    /// Physical step between pixel centers, one entry per axis.
    #[inline]
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// Row-major direction cosine matrix.
    #[inline]
    pub fn direction(&self) -> &[f64] {
        &self.direction
    }

    /// Replaces the origin.
    ///
    /// Fails when `origin` does not have one entry per axis.
    pub fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        check_len("origin", origin.len(), self.origin.len())?;
        self.origin.copy_from_slice(origin);
        Ok(())
    }

    /// Replaces the spacing.
    ///
    /// Every entry must be finite and strictly positive.
    pub fn set_spacing(&mut self, spacing: &[f64]) -> Result<()> {
        check_len("spacing", spacing.len(), self.spacing.len())?;
        for &s in spacing {
            if !s.is_finite() || s <= 0.0 {
                return Err(Error::invalid_argument(format!(
                    "spacing entries must be finite and positive, got {s}"
                )));
            }
        }
        self.spacing.copy_from_slice(spacing);
        Ok(())
    }

    /// Replaces the direction matrix.
    ///
    /// `direction` must hold a row-major square matrix of the placement's
    /// dimension and must be invertible; the inverse is cached here so
    /// later transforms cannot fail.
    pub fn set_direction(&mut self, direction: &[f64]) -> Result<()> {
        let d = self.origin.len();
        check_len("direction", direction.len(), d * d)?;
        let inverse = invert(direction, d)
            .ok_or_else(|| Error::invalid_argument("direction matrix is singular"))?;
        self.direction.copy_from_slice(direction);
        self.inverse = inverse;
        Ok(())
    }

    /// Maps a continuous index to a physical point.
    ///
    /// `index` must have one entry per axis; extra entries are not read.
    pub fn index_to_physical(&self, index: &[f64]) -> Vec<f64> {
        let d = self.origin.len();
        debug_assert!(index.len() >= d);
        let mut point = self.origin.clone();
        for r in 0..d {
            for c in 0..d {
                point[r] += self.direction[r * d + c] * self.spacing[c] * index[c];
            }
        }
        point
    }

    /// Maps a physical point to a continuous index.
    ///
    /// `point` must have one entry per axis; extra entries are not read.
    pub fn physical_to_index(&self, point: &[f64]) -> Vec<f64> {
        let d = self.origin.len();
        debug_assert!(point.len() >= d);
        let mut index = vec![0.0; d];
        for r in 0..d {
            let mut acc = 0.0;
            for c in 0..d {
                acc += self.inverse[r * d + c] * (point[c] - self.origin[c]);
            }
            index[r] = acc / self.spacing[r];
        }
        index
    }
}

fn check_len(what: &str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::invalid_argument(format!(
            "{what} needs {expected} entries, got {got}"
        )));
    }
    Ok(())
}

/// Inverts a row-major `d`-by-`d` matrix by Gauss-Jordan elimination with
/// partial pivoting. Returns `None` when the matrix is singular.
fn invert(matrix: &[f64], d: usize) -> Option<Vec<f64>> {
    let mut a = matrix.to_vec();
    let mut inv = vec![0.0; d * d];
    for i in 0..d {
        inv[i * d + i] = 1.0;
    }

    for col in 0..d {
        let mut pivot = col;
        for row in col + 1..d {
            if a[row * d + col].abs() > a[pivot * d + col].abs() {
                pivot = row;
            }
        }
        if a[pivot * d + col].abs() < SINGULAR_EPSILON {
            return None;
        }
        if pivot != col {
            for k in 0..d {
                a.swap(col * d + k, pivot * d + k);
                inv.swap(col * d + k, pivot * d + k);
            }
        }

        let p = a[col * d + col];
        for k in 0..d {
            a[col * d + k] /= p;
            inv[col * d + k] /= p;
        }

        for row in 0..d {
            if row == col {
                continue;
            }
            let f = a[row * d + col];
            if f == 0.0 {
                continue;
            }
            for k in 0..d {
                a[row * d + k] -= f * a[col * d + k];
                inv[row * d + k] -= f * inv[col * d + k];
            }
        }
    }
    Some(inv)
}
