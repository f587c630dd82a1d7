//! Run-length encoded label storage.
//!
//! Segmentation masks are mostly uniform, so labels are kept as sorted
//! runs over the flat pixel index space instead of a dense buffer. The
//! run list is always contiguous, gap-free and maximally coalesced:
//! neighboring runs never share a value, and the lengths sum to the pixel
//! count. A fresh store is one background run.

use crate::element::LabelScalar;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::kind::PixelKind;
use crate::meta::MetaDict;

/// One run of identical labels over the flat pixel index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run<T> {
    /// First flat pixel index covered by the run.
    pub start: u64,
    /// Number of pixels covered; never zero.
    pub len: u64,
    /// Label value.
    pub value: T,
}

/// Sparse n-dimensional label image.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStore<T: LabelScalar> {
    size: Vec<u32>,
    runs: Vec<Run<T>>,
    geometry: Geometry,
    meta: MetaDict,
}

impl<T: LabelScalar> LabelStore<T> {
    /// All-background label map of the given extents.
    pub fn new(size: &[u32]) -> Result<Self> {
        super::check_size(size)?;
        let pixels = super::pixel_count(size)? as u64;
        Ok(Self {
            size: size.to_vec(),
            runs: vec![Run {
                start: 0,
                len: pixels,
                value: T::default(),
            }],
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

    /// Runtime kind tag.
    #[inline]
    pub fn kind(&self) -> PixelKind {
        PixelKind::Label(T::KIND)
    }

    /// Total number of pixels.
    #[inline]
    pub fn number_of_pixels(&self) -> u64 {
        self.size.iter().map(|&s| u64::from(s)).product()
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

    /// The encoding, in flat-index order.
    #[inline]
    pub fn runs(&self) -> &[Run<T>] {
        &self.runs
    }

    /// Label at a flat pixel index.
    ///
    /// `flat` must be below the pixel count.
    pub fn get(&self, flat: u64) -> T {
        debug_assert!(flat < self.number_of_pixels());
        self.runs[self.run_at(flat)].value
    }

    /// Writes the label at a flat pixel index, splitting the covering run
    /// and coalescing with equal-valued neighbors.
    ///
    /// `flat` must be below the pixel count.
    pub fn set(&mut self, flat: u64, value: T) {
        debug_assert!(flat < self.number_of_pixels());
        let i = self.run_at(flat);
        let run = self.runs[i];
        if run.value == value {
            return;
        }

        let mut replacement = Vec::with_capacity(3);
        if flat > run.start {
            replacement.push(Run {
                start: run.start,
                len: flat - run.start,
                value: run.value,
            });
        }
        let at = i + replacement.len();
        replacement.push(Run {
            start: flat,
            len: 1,
            value,
        });
        let tail = run.start + run.len - flat - 1;
        if tail > 0 {
            replacement.push(Run {
                start: flat + 1,
                len: tail,
                value: run.value,
            });
        }
        self.runs.splice(i..=i, replacement);

        // a one-pixel write can only merge into the runs either side of it
        if at + 1 < self.runs.len() && self.runs[at + 1].value == value {
            self.runs[at].len += self.runs[at + 1].len;
            self.runs.remove(at + 1);
        }
        if at > 0 && self.runs[at - 1].value == value {
            self.runs[at - 1].len += self.runs[at].len;
            self.runs.remove(at);
        }
    }

    /// Index of the run covering `flat`.
    fn run_at(&self, flat: u64) -> usize {
        self.runs.partition_point(|r| r.start <= flat) - 1
    }
}
