//! Dense voxel storage for scalar, vector and complex pixels.

use crate::element::{RealScalar, Scalar};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::interp::{self, Interpolation};
use crate::kind::PixelKind;
use crate::meta::MetaDict;

/// Pixel shape stored by a [`VoxelStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelShape {
    /// One sample per pixel.
    Scalar,
    /// A fixed-length tuple of samples per pixel.
    Vector,
    /// Interleaved real and imaginary samples.
    Complex,
}

/// Dense n-dimensional image store with a flat sample buffer.
///
/// Samples are laid out component-fastest in x-fastest row-major axis
/// order:
///
/// ```text
/// flat = c + components * (x + sx * (y + sy * z))
/// ```
///
/// The store owns its geometry and metadata; sharing and copy-on-write
/// happen a level above, in the image facade.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelStore<T: Scalar> {
    size: Vec<u32>,
    components: u32,
    shape: PixelShape,
    samples: Vec<T>,
    geometry: Geometry,
    meta: MetaDict,
}

impl<T: Scalar> VoxelStore<T> {
    /// Zero-filled store with one component per pixel.
    pub fn scalar(size: &[u32]) -> Result<Self> {
        Self::with_shape(size, PixelShape::Scalar, 1)
    }

    /// Zero-filled store with `components` samples per pixel.
    pub fn vector(size: &[u32], components: u32) -> Result<Self> {
        Self::with_shape(size, PixelShape::Vector, components)
    }

    fn with_shape(size: &[u32], shape: PixelShape, components: u32) -> Result<Self> {
        super::check_size(size)?;
        if components == 0 {
            return Err(Error::invalid_argument(
                "pixels need at least one component",
            ));
        }
        let total = super::pixel_count(size)?
            .checked_mul(components as usize)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "image size {size:?} with {components} components overflows addressable memory"
                ))
            })?;
        Ok(Self {
            size: size.to_vec(),
            components,
            shape,
            samples: vec![T::default(); total],
            geometry: Geometry::identity(size.len() as u32),
            meta: MetaDict::new(),
        })
    }

    /// Number of axes.
    #[inline]
    pub fn dimension(&self) -> u32 {
        self.size.len() as u32
    }

    /// Extents per axis.
    #[inline]
    pub fn size(&self) -> &[u32] {
        &self.size
    }

    /// Samples per pixel.
    #[inline]
    pub fn components(&self) -> u32 {
        self.components
    }

    /// Pixel shape of the store.
    #[inline]
    pub fn shape(&self) -> PixelShape {
        self.shape
    }

    /// Runtime kind tag: shape plus element.
    #[inline]
    pub fn kind(&self) -> PixelKind {
        match self.shape {
            PixelShape::Scalar => PixelKind::Scalar(T::KIND),
            PixelShape::Vector => PixelKind::Vector(T::KIND),
            PixelShape::Complex => PixelKind::Complex(T::KIND),
        }
    }

    /// Total number of pixels.
    #[inline]
    pub fn number_of_pixels(&self) -> u64 {
        self.size.iter().map(|&s| u64::from(s)).product()
    }

    /// The whole sample buffer.
    #[inline]
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// The whole sample buffer, mutable.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [T] {
        &mut self.samples
    }

    /// Spatial placement.
    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Spatial placement, mutable.
    #[inline]
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Metadata dictionary.
    #[inline]
    pub fn meta(&self) -> &MetaDict {
        &self.meta
    }

    /// Metadata dictionary, mutable.
    #[inline]
    pub fn meta_mut(&mut self) -> &mut MetaDict {
        &mut self.meta
    }

    /// Bounds-checked flat pixel index; see [`flat_index`](super::flat_index).
    #[inline]
    pub fn pixel_index(&self, index: &[u32]) -> Result<usize> {
        super::flat_index(&self.size, index)
    }

    /// Sample at a flat sample index.
    ///
    /// Panics when the index is past the buffer, like slice indexing.
    #[inline]
    pub fn get(&self, sample_index: usize) -> T {
        self.samples[sample_index]
    }

    /// Writes the sample at a flat sample index.
    ///
    /// Panics when the index is past the buffer, like slice indexing.
    #[inline]
    pub fn set(&mut self, sample_index: usize, value: T) {
        self.samples[sample_index] = value;
    }

    /// Samples the store at a continuous index, one `f64` per component.
    ///
    /// The continuous index must lie in `[-0.5, size - 0.5]` on every
    /// axis; corner reads clamp to the grid, so the outer half-pixel band
    /// extends the edge values. Extra trailing index entries are ignored.
    pub fn evaluate(&self, cindex: &[f64], interpolation: Interpolation) -> Result<Vec<f64>> {
        let d = self.size.len();
        if cindex.len() < d {
            return Err(Error::continuous_out_of_bounds(cindex, &self.size));
        }
        let cindex = &cindex[..d];
        if !interp::in_sampling_range(cindex, &self.size) {
            return Err(Error::continuous_out_of_bounds(cindex, &self.size));
        }

        let components = self.components as usize;
        match interpolation {
            Interpolation::NearestNeighbor => {
                let mut index = [0usize; 4];
                for axis in 0..d {
                    index[axis] = interp::nearest_cell(cindex[axis], self.size[axis]);
                }
                let base = self.flat_from_cells(&index[..d]) * components;
                Ok((0..components)
                    .map(|c| self.samples[base + c].as_f64())
                    .collect())
            }
            Interpolation::Linear => {
                let mut cells = [(0usize, 0usize, 0.0f64); 4];
                for axis in 0..d {
                    cells[axis] = interp::linear_cell(cindex[axis], self.size[axis]);
                }

                let mut out = vec![0.0; components];
                let mut index = [0usize; 4];
                for corner in 0..1usize << d {
                    let mut weight = 1.0;
                    for axis in 0..d {
                        let (lo, hi, frac) = cells[axis];
                        if corner >> axis & 1 == 1 {
                            weight *= frac;
                            index[axis] = hi;
                        } else {
                            weight *= 1.0 - frac;
                            index[axis] = lo;
                        }
                    }
                    if weight == 0.0 {
                        continue;
                    }
                    let base = self.flat_from_cells(&index[..d]) * components;
                    for (c, acc) in out.iter_mut().enumerate() {
                        *acc += weight * self.samples[base + c].as_f64();
                    }
                }
                Ok(out)
            }
        }
    }

    fn flat_from_cells(&self, index: &[usize]) -> usize {
        let mut flat = 0usize;
        for axis in (0..index.len()).rev() {
            flat = flat * self.size[axis] as usize + index[axis];
        }
        flat
    }
}

impl<T: RealScalar> VoxelStore<T> {
    /// Zero-filled complex store: two interleaved samples per pixel.
    pub fn complex(size: &[u32]) -> Result<Self> {
        Self::with_shape(size, PixelShape::Complex, 2)
    }
}
