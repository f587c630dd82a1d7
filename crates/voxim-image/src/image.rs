//! The type-erased, copy-on-write image.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex;
use tracing::{debug, trace};

use voxim_core::element::{LabelScalar, RealScalar, Scalar};
use voxim_core::error::{Error, Result};
use voxim_core::interp::Interpolation;
use voxim_core::kind::PixelKind;
use voxim_core::meta::MetaValue;
use voxim_core::store::{LabelStore, VoxelStore};

use crate::holder::ImageHandle;

/// A type-erased n-dimensional image with copy-on-write sharing.
///
/// `Image` wraps one strongly typed store ([`VoxelStore`] or
/// [`LabelStore`]) behind a uniform API: callers construct, query and
/// mutate images of any registered pixel kind without naming the element
/// type. Typed data crosses the boundary through the generic accessors
/// (`pixel::<T>`, `buffer::<T>`, ...), which fail with
/// [`Error::TypeMismatch`] instead of converting.
///
/// # Sharing
///
/// `Clone` is shallow: both images point at the same store and
/// [`is_unique`](Image::is_unique) reports `false` on each. The first
/// mutating call on either side deep-copies its store first, so writes
/// are never visible through another image.
///
/// # The empty state
///
/// [`Image::default`] and [`Image::take`] leave an image empty. Every
/// operation on an empty image fails with [`Error::InvalidState`];
/// only dropping it, assigning into it and [`is_empty`](Image::is_empty)
/// remain meaningful.
///
/// # Example
///
/// ```rust
/// use voxim_image::{Image, Interpolation, PixelKind, ScalarKind};
///
/// let mut image = Image::new(&[16, 16], PixelKind::Scalar(ScalarKind::UInt8))?;
/// image.set_pixel(&[4, 7], 200u8)?;
/// assert_eq!(image.pixel::<u8>(&[4, 7])?, 200);
///
/// let copy = image.clone();
/// assert!(!image.is_unique()?);
/// assert_eq!(copy.evaluate_at_continuous_index(&[4.0, 7.0], Interpolation::Linear)?, [200.0]);
/// # Ok::<(), voxim_image::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Image {
    state: Option<ImageHandle>,
}

impl Image {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Allocates a zero-filled image.
    ///
    /// The dimension is `size.len()` (2 to 4) and the component count is
    /// the kind's default: 1 for scalar and label kinds, 2 for complex,
    /// the dimension for vector kinds.
    pub fn new(size: &[u32], kind: PixelKind) -> Result<Self> {
        Self::with_components(size, kind, 0)
    }

    /// Allocates a zero-filled image with an explicit component count.
    ///
    /// A count of 0 means the kind's default. Non-vector kinds reject any
    /// count that contradicts their fixed one.
    pub fn with_components(size: &[u32], kind: PixelKind, components: u32) -> Result<Self> {
        let handle = ImageHandle::allocate(size, kind, components)?;
        debug!(size = ?size, kind = %kind, components = handle.components(), "allocated image");
        Ok(Self {
            state: Some(handle),
        })
    }

    /// Allocates a zero-filled 2D image.
    pub fn new_2d(width: u32, height: u32, kind: PixelKind) -> Result<Self> {
        Self::new(&[width, height], kind)
    }

    /// Allocates a zero-filled 3D image.
    pub fn new_3d(width: u32, height: u32, depth: u32, kind: PixelKind) -> Result<Self> {
        Self::new(&[width, height, depth], kind)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Whether this image is in the empty state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    /// Moves the image out, leaving this one empty.
    ///
    /// The returned image owns whatever this one held, shared references
    /// included; no pixel data is copied.
    pub fn take(&mut self) -> Self {
        if self.state.is_some() {
            trace!("image handle moved out; source is now empty");
        }
        Self {
            state: self.state.take(),
        }
    }

    fn handle(&self) -> Result<&ImageHandle> {
        self.state.as_ref().ok_or(Error::InvalidState)
    }

    /// Mutation entry point: forces uniqueness after the caller has run
    /// all read-only validation, so failed operations never detach.
    fn detach(&mut self) -> Result<&mut ImageHandle> {
        let handle = self.state.as_mut().ok_or(Error::InvalidState)?;
        if !handle.is_unique() {
            debug!(
                kind = %handle.kind(),
                pixels = handle.number_of_pixels(),
                "copy-on-write detach"
            );
            handle.make_unique();
        }
        Ok(handle)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Runtime pixel kind.
    pub fn pixel_kind(&self) -> Result<PixelKind> {
        Ok(self.handle()?.kind())
    }

    /// Number of axes.
    pub fn dimension(&self) -> Result<u32> {
        Ok(self.handle()?.dimension())
    }

    /// Extents per axis.
    pub fn size(&self) -> Result<&[u32]> {
        Ok(self.handle()?.size())
    }

    /// Extent of the first axis.
    pub fn width(&self) -> Result<u32> {
        Ok(self.handle()?.size()[0])
    }

    /// Extent of the second axis.
    pub fn height(&self) -> Result<u32> {
        Ok(self.handle()?.size()[1])
    }

    /// Extent of the third axis, 0 for 2D images.
    pub fn depth(&self) -> Result<u32> {
        Ok(self.handle()?.size().get(2).copied().unwrap_or(0))
    }

    /// Samples per pixel.
    pub fn components_per_pixel(&self) -> Result<u32> {
        Ok(self.handle()?.components())
    }

    /// Total number of pixels.
    pub fn number_of_pixels(&self) -> Result<u64> {
        Ok(self.handle()?.number_of_pixels())
    }

    /// Size of one sample in bytes.
    pub fn bytes_per_component(&self) -> Result<usize> {
        Ok(self.handle()?.kind().bytes_per_component())
    }

    /// Whether this image is the only reference to its store.
    pub fn is_unique(&self) -> Result<bool> {
        Ok(self.handle()?.is_unique())
    }

    /// Forces this image to own its store, deep-copying if shared.
    ///
    /// After this returns, in-place mutation is copy-free until the image
    /// is cloned again.
    pub fn make_unique(&mut self) -> Result<()> {
        self.detach()?;
        Ok(())
    }

    /// Typed view of the dense store behind this image.
    ///
    /// The element type must match exactly; the pixel shape may be any of
    /// scalar, vector or complex.
    pub fn store<T: Scalar>(&self) -> Result<&VoxelStore<T>> {
        let handle = self.handle()?;
        handle
            .downcast_dense::<T>()
            .ok_or_else(|| Error::type_mismatch(handle.kind().with_element(T::KIND), handle.kind()))
    }

    /// Typed view of the label store behind this image.
    pub fn label_store<T: LabelScalar>(&self) -> Result<&LabelStore<T>> {
        let handle = self.handle()?;
        handle
            .downcast_label::<T>()
            .ok_or_else(|| Error::type_mismatch(PixelKind::Label(T::KIND), handle.kind()))
    }

    // ------------------------------------------------------------------
    // Pixel access
    // ------------------------------------------------------------------

    /// Reads a pixel of a scalar or label image.
    ///
    /// `index` has one entry per axis; extra trailing entries are
    /// ignored, a short index is out of bounds.
    pub fn pixel<T: Scalar>(&self, index: &[u32]) -> Result<T> {
        let handle = self.handle()?;
        let kind = handle.kind();
        check_scalar_access::<T>(kind)?;
        let flat = handle.pixel_index(index)?;
        recover::<T>(handle.sample(flat), kind)
    }

    /// Writes a pixel of a scalar or label image.
    pub fn set_pixel<T: Scalar>(&mut self, index: &[u32], value: T) -> Result<()> {
        let handle = self.handle()?;
        check_scalar_access::<T>(handle.kind())?;
        let flat = handle.pixel_index(index)?;
        self.detach()?.set_sample(flat, value.to_sample())
    }

    /// Reads all components of a vector image pixel.
    pub fn vector_pixel<T: Scalar>(&self, index: &[u32]) -> Result<Vec<T>> {
        let handle = self.handle()?;
        let kind = handle.kind();
        check_vector_access::<T>(kind)?;
        let components = handle.components() as usize;
        let base = handle.pixel_index(index)? * components;
        (0..components)
            .map(|c| recover::<T>(handle.sample(base + c), kind))
            .collect()
    }

    /// Writes all components of a vector image pixel.
    ///
    /// `value` must have exactly one entry per component.
    pub fn set_vector_pixel<T: Scalar>(&mut self, index: &[u32], value: &[T]) -> Result<()> {
        let handle = self.handle()?;
        check_vector_access::<T>(handle.kind())?;
        let components = handle.components() as usize;
        if value.len() != components {
            return Err(Error::invalid_argument(format!(
                "vector pixel needs {components} components, got {}",
                value.len()
            )));
        }
        let base = handle.pixel_index(index)? * components;
        let handle = self.detach()?;
        for (c, &v) in value.iter().enumerate() {
            handle.set_sample(base + c, v.to_sample())?;
        }
        Ok(())
    }

    /// Reads a complex image pixel.
    pub fn complex_pixel<T: RealScalar>(&self, index: &[u32]) -> Result<Complex<T>> {
        let handle = self.handle()?;
        let kind = handle.kind();
        check_complex_access::<T>(kind)?;
        let base = handle.pixel_index(index)? * 2;
        let re = recover::<T>(handle.sample(base), kind)?;
        let im = recover::<T>(handle.sample(base + 1), kind)?;
        Ok(Complex::new(re, im))
    }

    /// Writes a complex image pixel.
    pub fn set_complex_pixel<T: RealScalar>(
        &mut self,
        index: &[u32],
        value: Complex<T>,
    ) -> Result<()> {
        let handle = self.handle()?;
        check_complex_access::<T>(handle.kind())?;
        let base = handle.pixel_index(index)? * 2;
        let handle = self.detach()?;
        handle.set_sample(base, value.re.to_sample())?;
        handle.set_sample(base + 1, value.im.to_sample())
    }

    // ------------------------------------------------------------------
    // Buffer access
    // ------------------------------------------------------------------

    /// The whole sample buffer of a dense image.
    ///
    /// Holds `number_of_pixels * components_per_pixel` samples in
    /// component-fastest, x-fastest order. Label images have no buffer.
    pub fn buffer<T: Scalar>(&self) -> Result<&[T]> {
        let handle = self.handle()?;
        let kind = handle.kind();
        let buffer = handle.buffer()?;
        T::slice_of(buffer)
            .ok_or_else(|| Error::type_mismatch(kind.with_element(T::KIND), kind))
    }

    /// The whole sample buffer of a dense image, writable.
    ///
    /// Detaches from shared storage first. While the returned borrow
    /// lives, no other call can touch this image, so the view can never
    /// dangle.
    pub fn buffer_mut<T: Scalar>(&mut self) -> Result<&mut [T]> {
        let handle = self.handle()?;
        let kind = handle.kind();
        let probe = handle.buffer()?;
        if probe.kind() != T::KIND {
            return Err(Error::type_mismatch(kind.with_element(T::KIND), kind));
        }
        let handle = self.detach()?;
        let buffer = handle.buffer_mut()?;
        T::slice_of_mut(buffer)
            .ok_or_else(|| Error::type_mismatch(kind.with_element(T::KIND), kind))
    }

    /// The sample buffer as raw bytes in native order.
    pub fn buffer_bytes(&self) -> Result<&[u8]> {
        Ok(self.handle()?.buffer()?.as_bytes())
    }

    /// The sample buffer as raw mutable bytes in native order.
    pub fn buffer_bytes_mut(&mut self) -> Result<&mut [u8]> {
        let handle = self.handle()?;
        handle.buffer()?;
        let handle = self.detach()?;
        Ok(handle.buffer_mut()?.into_bytes())
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Physical coordinate of index zero, one entry per axis.
    pub fn origin(&self) -> Result<Vec<f64>> {
        Ok(self.handle()?.geometry().origin().to_vec())
    }

    /// Replaces the origin; needs one entry per axis.
    pub fn set_origin(&mut self, origin: &[f64]) -> Result<()> {
        let mut updated = self.handle()?.geometry().clone();
        updated.set_origin(origin)?;
        *self.detach()?.geometry_mut() = updated;
        Ok(())
    }

    /// Physical step between pixel centers, one entry per axis.
    pub fn spacing(&self) -> Result<Vec<f64>> {
        Ok(self.handle()?.geometry().spacing().to_vec())
    }

    /// Replaces the spacing; entries must be finite and positive.
    pub fn set_spacing(&mut self, spacing: &[f64]) -> Result<()> {
        let mut updated = self.handle()?.geometry().clone();
        updated.set_spacing(spacing)?;
        *self.detach()?.geometry_mut() = updated;
        Ok(())
    }

    /// Row-major direction cosine matrix, dimension squared entries.
    pub fn direction(&self) -> Result<Vec<f64>> {
        Ok(self.handle()?.geometry().direction().to_vec())
    }

    /// Replaces the direction matrix; must be square and invertible.
    pub fn set_direction(&mut self, direction: &[f64]) -> Result<()> {
        let mut updated = self.handle()?.geometry().clone();
        updated.set_direction(direction)?;
        *self.detach()?.geometry_mut() = updated;
        Ok(())
    }

    /// Copies origin, spacing and direction from `source`, leaving pixel
    /// data and the metadata dictionary untouched.
    ///
    /// Both images must have the same dimension and per-axis sizes.
    pub fn copy_information(&mut self, source: &Image) -> Result<()> {
        let src = source.handle()?;
        let dst = self.handle()?;
        if src.size() != dst.size() {
            return Err(Error::invalid_argument(format!(
                "cannot copy information from an image of size {:?} onto size {:?}",
                src.size(),
                dst.size()
            )));
        }
        let geometry = src.geometry().clone();
        *self.detach()?.geometry_mut() = geometry;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Metadata keys in insertion order.
    pub fn metadata_keys(&self) -> Result<Vec<String>> {
        Ok(self.handle()?.meta().keys().map(str::to_owned).collect())
    }

    /// Whether a metadata key is present.
    pub fn has_metadata(&self, key: &str) -> Result<bool> {
        Ok(self.handle()?.meta().contains(key))
    }

    /// Canonical text rendering of a metadata value.
    pub fn metadata(&self, key: &str) -> Result<String> {
        self.metadata_value(key).map(MetaValue::to_string)
    }

    /// A metadata value.
    pub fn metadata_value(&self, key: &str) -> Result<&MetaValue> {
        self.handle()?
            .meta()
            .get(key)
            .ok_or_else(|| Error::not_found(key))
    }

    /// Inserts or replaces a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Result<()> {
        self.detach()?.meta_mut().set(key, value);
        Ok(())
    }

    /// Removes a metadata entry, reporting whether it was present.
    ///
    /// Erasing an absent key is a no-op and does not detach shared
    /// storage.
    pub fn erase_metadata(&mut self, key: &str) -> Result<bool> {
        if !self.handle()?.meta().contains(key) {
            return Ok(false);
        }
        Ok(self.detach()?.meta_mut().remove(key))
    }

    // ------------------------------------------------------------------
    // Physical space
    // ------------------------------------------------------------------

    /// Physical point at a discrete index.
    pub fn index_to_physical_point(&self, index: &[i64]) -> Result<Vec<f64>> {
        let handle = self.handle()?;
        let d = handle.dimension() as usize;
        check_transform_len(index.len(), d)?;
        let cindex: Vec<f64> = index[..d].iter().map(|&i| i as f64).collect();
        Ok(handle.geometry().index_to_physical(&cindex))
    }

    /// Physical point at a continuous index.
    pub fn continuous_index_to_physical_point(&self, index: &[f64]) -> Result<Vec<f64>> {
        let handle = self.handle()?;
        let d = handle.dimension() as usize;
        check_transform_len(index.len(), d)?;
        Ok(handle.geometry().index_to_physical(&index[..d]))
    }

    /// Continuous index under a physical point.
    pub fn physical_point_to_continuous_index(&self, point: &[f64]) -> Result<Vec<f64>> {
        let handle = self.handle()?;
        let d = handle.dimension() as usize;
        check_transform_len(point.len(), d)?;
        Ok(handle.geometry().physical_to_index(&point[..d]))
    }

    /// Discrete index nearest to a physical point.
    ///
    /// Rounds each coordinate; the result may lie outside the buffered
    /// region.
    pub fn physical_point_to_index(&self, point: &[f64]) -> Result<Vec<i64>> {
        let cindex = self.physical_point_to_continuous_index(point)?;
        Ok(cindex.iter().map(|&x| x.round() as i64).collect())
    }

    /// Samples the image at a continuous index, one `f64` per component.
    ///
    /// Valid on every axis over `[-0.5, size - 0.5]`; complex images
    /// yield `[re, im]`. Label images do not interpolate.
    pub fn evaluate_at_continuous_index(
        &self,
        index: &[f64],
        interpolation: Interpolation,
    ) -> Result<Vec<f64>> {
        self.handle()?.evaluate(index, interpolation)
    }

    /// Samples the image at a physical point.
    pub fn evaluate_at_physical_point(
        &self,
        point: &[f64],
        interpolation: Interpolation,
    ) -> Result<Vec<f64>> {
        let cindex = self.physical_point_to_continuous_index(point)?;
        self.handle()?.evaluate(&cindex, interpolation)
    }
}

fn check_scalar_access<T: Scalar>(kind: PixelKind) -> Result<()> {
    match kind {
        PixelKind::Scalar(k) | PixelKind::Label(k) if k == T::KIND => Ok(()),
        _ => Err(Error::type_mismatch(PixelKind::Scalar(T::KIND), kind)),
    }
}

fn check_vector_access<T: Scalar>(kind: PixelKind) -> Result<()> {
    match kind {
        PixelKind::Vector(k) if k == T::KIND => Ok(()),
        _ => Err(Error::type_mismatch(PixelKind::Vector(T::KIND), kind)),
    }
}

fn check_complex_access<T: RealScalar>(kind: PixelKind) -> Result<()> {
    match kind {
        PixelKind::Complex(k) if k == T::KIND => Ok(()),
        _ => Err(Error::type_mismatch(PixelKind::Complex(T::KIND), kind)),
    }
}

fn check_transform_len(got: usize, dimension: usize) -> Result<()> {
    if got < dimension {
        return Err(Error::invalid_argument(format!(
            "expected {dimension} coordinates, got {got}"
        )));
    }
    Ok(())
}

fn recover<T: Scalar>(sample: voxim_core::Sample, actual: PixelKind) -> Result<T> {
    T::from_sample(sample)
        .ok_or_else(|| Error::type_mismatch(actual.with_element(T::KIND), actual))
}

// ----------------------------------------------------------------------
// Adoption
// ----------------------------------------------------------------------

impl<T: Scalar> From<VoxelStore<T>> for Image {
    /// Adopts a dense store without copying its buffer.
    fn from(store: VoxelStore<T>) -> Self {
        Self {
            state: Some(ImageHandle::from_dense(store)),
        }
    }
}

impl<T: Scalar> From<Arc<VoxelStore<T>>> for Image {
    /// Adopts a shared dense store.
    ///
    /// The image counts as one more reference; while the `Arc` is held
    /// elsewhere too, [`Image::is_unique`] reports `false` and the first
    /// mutating call detaches onto a private copy.
    fn from(store: Arc<VoxelStore<T>>) -> Self {
        Self {
            state: Some(ImageHandle::from_dense_arc(store)),
        }
    }
}

impl<T: LabelScalar> From<LabelStore<T>> for Image {
    /// Adopts a label store without copying its runs.
    fn from(store: LabelStore<T>) -> Self {
        Self {
            state: Some(ImageHandle::from_label(store)),
        }
    }
}

impl<T: LabelScalar> From<Arc<LabelStore<T>>> for Image {
    /// Adopts a shared label store; sharing rules match the dense case.
    fn from(store: Arc<LabelStore<T>>) -> Self {
        Self {
            state: Some(ImageHandle::from_label_arc(store)),
        }
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            None => f.write_str("Image(empty)"),
            Some(handle) => {
                write!(f, "Image(")?;
                for (i, s) in handle.size().iter().enumerate() {
                    if i > 0 {
                        write!(f, "x")?;
                    }
                    write!(f, "{s}")?;
                }
                let components = handle.components();
                let plural = if components == 1 { "" } else { "s" };
                write!(
                    f,
                    " {}, {} component{})",
                    handle.kind(),
                    components,
                    plural
                )
            }
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            None => f.debug_struct("Image").field("state", &"empty").finish(),
            Some(handle) => f
                .debug_struct("Image")
                .field("kind", &handle.kind())
                .field("size", &handle.size())
                .field("components", &handle.components())
                .field("unique", &handle.is_unique())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use voxim_core::kind::ScalarKind;

    fn uint8_2d(width: u32, height: u32) -> Image {
        Image::new_2d(width, height, PixelKind::Scalar(ScalarKind::UInt8)).unwrap()
    }

    #[test]
    fn test_new_defaults_per_kind() {
        let scalar = Image::new(&[4, 4], PixelKind::Scalar(ScalarKind::Int16)).unwrap();
        assert_eq!(scalar.components_per_pixel().unwrap(), 1);
        assert_eq!(scalar.bytes_per_component().unwrap(), 2);

        let vector = Image::new(&[4, 4, 4], PixelKind::Vector(ScalarKind::Float32)).unwrap();
        assert_eq!(vector.components_per_pixel().unwrap(), 3);

        let complex = Image::new(&[4, 4], PixelKind::Complex(ScalarKind::Float64)).unwrap();
        assert_eq!(complex.components_per_pixel().unwrap(), 2);

        let label = Image::new(&[4, 4], PixelKind::Label(ScalarKind::UInt32)).unwrap();
        assert_eq!(label.components_per_pixel().unwrap(), 1);
    }

    #[test]
    fn test_construction_rejects_bad_requests() {
        let err = Image::new(&[4, 4], PixelKind::Unknown).unwrap_err();
        assert!(err.is_unsupported());

        let err = Image::new(&[4], PixelKind::Scalar(ScalarKind::UInt8)).unwrap_err();
        assert!(err.is_unsupported());

        let err = Image::new(&[4, 0], PixelKind::Scalar(ScalarKind::UInt8)).unwrap_err();
        assert!(err.is_invalid_argument());

        let err =
            Image::with_components(&[4, 4], PixelKind::Complex(ScalarKind::Float32), 3).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_convenience_constructors() {
        let flat = uint8_2d(6, 4);
        assert_eq!(flat.size().unwrap(), &[6, 4]);
        assert_eq!(flat.width().unwrap(), 6);
        assert_eq!(flat.height().unwrap(), 4);
        assert_eq!(flat.depth().unwrap(), 0);

        let volume = Image::new_3d(6, 4, 2, PixelKind::Scalar(ScalarKind::UInt8)).unwrap();
        assert_eq!(volume.dimension().unwrap(), 3);
        assert_eq!(volume.depth().unwrap(), 2);
        assert_eq!(volume.number_of_pixels().unwrap(), 48);
    }

    #[test]
    fn test_empty_image_fails_with_invalid_state() {
        let empty = Image::default();
        assert!(empty.is_empty());
        assert!(empty.pixel_kind().unwrap_err().is_invalid_state());
        assert!(empty.size().unwrap_err().is_invalid_state());
        assert!(empty.pixel::<u8>(&[0, 0]).unwrap_err().is_invalid_state());
        assert!(empty.origin().unwrap_err().is_invalid_state());
        assert!(empty.metadata("k").unwrap_err().is_invalid_state());
        assert!(
            empty
                .evaluate_at_continuous_index(&[0.0, 0.0], Interpolation::Linear)
                .unwrap_err()
                .is_invalid_state()
        );
    }

    #[test]
    fn test_take_moves_the_handle_out() {
        let mut source = uint8_2d(4, 4);
        source.set_pixel(&[1, 1], 9u8).unwrap();

        let moved = source.take();
        assert!(source.is_empty());
        assert!(!moved.is_empty());
        assert_eq!(moved.pixel::<u8>(&[1, 1]).unwrap(), 9);
        assert!(source.pixel::<u8>(&[1, 1]).unwrap_err().is_invalid_state());

        // an empty image can be assigned into and used again
        source = uint8_2d(2, 2);
        assert!(!source.is_empty());
    }

    #[test]
    fn test_scalar_pixel_round_trip_and_mismatch() {
        let mut image = Image::new(&[8, 8], PixelKind::Scalar(ScalarKind::Float32)).unwrap();
        image.set_pixel(&[3, 5], 1.25f32).unwrap();
        assert_eq!(image.pixel::<f32>(&[3, 5]).unwrap(), 1.25);
        assert_eq!(image.pixel::<f32>(&[0, 0]).unwrap(), 0.0);

        let err = image.pixel::<u8>(&[3, 5]).unwrap_err();
        assert!(err.is_type_mismatch());
        let err = image.set_pixel(&[3, 5], 1u8).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_pixel_bounds() {
        let image = uint8_2d(10, 10);
        assert!(image.pixel::<u8>(&[9, 9]).is_ok());
        assert!(image.pixel::<u8>(&[10, 5]).unwrap_err().is_out_of_bounds());
        assert!(image.pixel::<u8>(&[5, 10]).unwrap_err().is_out_of_bounds());
        assert!(image.pixel::<u8>(&[5]).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_vector_pixel_round_trip() {
        let mut image =
            Image::with_components(&[4, 4], PixelKind::Vector(ScalarKind::Int32), 3).unwrap();
        image.set_vector_pixel(&[2, 1], &[-1i32, 0, 7]).unwrap();
        assert_eq!(image.vector_pixel::<i32>(&[2, 1]).unwrap(), vec![-1, 0, 7]);
        assert_eq!(image.vector_pixel::<i32>(&[0, 0]).unwrap(), vec![0, 0, 0]);

        let err = image.set_vector_pixel(&[2, 1], &[1i32, 2]).unwrap_err();
        assert!(err.is_invalid_argument());
        let err = image.vector_pixel::<f32>(&[2, 1]).unwrap_err();
        assert!(err.is_type_mismatch());
        // scalar access does not see vector pixels
        let err = image.pixel::<i32>(&[2, 1]).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_complex_pixel_round_trip() {
        let mut image = Image::new(&[4, 4], PixelKind::Complex(ScalarKind::Float32)).unwrap();
        image
            .set_complex_pixel(&[1, 2], Complex::new(1.5f32, -2.5))
            .unwrap();
        let z = image.complex_pixel::<f32>(&[1, 2]).unwrap();
        assert_eq!(z, Complex::new(1.5, -2.5));

        let err = image.complex_pixel::<f64>(&[1, 2]).unwrap_err();
        assert!(err.is_type_mismatch());

        // the buffer interleaves re and im
        assert_eq!(image.buffer::<f32>().unwrap().len(), 32);
        let v = image
            .evaluate_at_continuous_index(&[1.0, 2.0], Interpolation::NearestNeighbor)
            .unwrap();
        assert_eq!(v, [1.5, -2.5]);
    }

    #[test]
    fn test_label_pixels_through_the_facade() {
        let mut image = Image::new(&[4, 4], PixelKind::Label(ScalarKind::UInt16)).unwrap();
        image.set_pixel(&[2, 2], 700u16).unwrap();
        assert_eq!(image.pixel::<u16>(&[2, 2]).unwrap(), 700);
        assert_eq!(image.pixel::<u16>(&[0, 0]).unwrap(), 0);

        assert!(image.buffer::<u16>().unwrap_err().is_unsupported());
        assert!(image.buffer_bytes().unwrap_err().is_unsupported());
        assert!(
            image
                .evaluate_at_continuous_index(&[1.0, 1.0], Interpolation::Linear)
                .unwrap_err()
                .is_unsupported()
        );

        let runs = image.label_store::<u16>().unwrap().runs();
        assert_eq!(runs.len(), 3);
    }

    #[test]
    fn test_buffer_layout_matches_pixel_access() {
        let mut image =
            Image::with_components(&[3, 2], PixelKind::Vector(ScalarKind::UInt8), 2).unwrap();
        image.set_vector_pixel(&[1, 0], &[10u8, 11]).unwrap();
        image.set_vector_pixel(&[2, 1], &[20u8, 21]).unwrap();

        let buffer = image.buffer::<u8>().unwrap();
        assert_eq!(buffer.len(), 12);
        // component-fastest: pixel (1,0) starts at (0*3 + 1) * 2
        assert_eq!(&buffer[2..4], &[10, 11]);
        // pixel (2,1) starts at (1*3 + 2) * 2
        assert_eq!(&buffer[10..12], &[20, 21]);

        assert!(image.buffer::<u16>().unwrap_err().is_type_mismatch());
        assert_eq!(image.buffer_bytes().unwrap().len(), 12);
    }

    #[test]
    fn test_buffer_mut_writes_are_visible_to_accessors() {
        let mut image = uint8_2d(4, 2);
        image.buffer_mut::<u8>().unwrap()[5] = 42;
        assert_eq!(image.pixel::<u8>(&[1, 1]).unwrap(), 42);

        image.buffer_bytes_mut().unwrap()[0] = 7;
        assert_eq!(image.pixel::<u8>(&[0, 0]).unwrap(), 7);
    }

    #[test]
    fn test_clone_shares_and_write_detaches() {
        let mut a = uint8_2d(8, 8);
        a.set_pixel(&[0, 0], 1u8).unwrap();
        assert!(a.is_unique().unwrap());

        let mut b = a.clone();
        assert!(!a.is_unique().unwrap());
        assert!(!b.is_unique().unwrap());

        b.set_pixel(&[0, 0], 2u8).unwrap();
        assert_eq!(a.pixel::<u8>(&[0, 0]).unwrap(), 1);
        assert_eq!(b.pixel::<u8>(&[0, 0]).unwrap(), 2);
        assert!(a.is_unique().unwrap());
        assert!(b.is_unique().unwrap());
    }

    #[test]
    fn test_failed_mutation_does_not_detach() {
        let mut a = uint8_2d(4, 4);
        let b = a.clone();

        assert!(a.set_pixel(&[9, 9], 1u8).unwrap_err().is_out_of_bounds());
        assert!(a.set_pixel(&[1, 1], 1.0f64).unwrap_err().is_type_mismatch());
        assert!(a.set_origin(&[0.0]).unwrap_err().is_invalid_argument());
        assert!(!a.erase_metadata("absent").unwrap());

        // every failure above ran before copy-on-write could trigger
        assert!(!a.is_unique().unwrap());
        assert!(!b.is_unique().unwrap());
    }

    #[test]
    fn test_make_unique_is_eager_and_idempotent() {
        let mut a = uint8_2d(4, 4);
        let b = a.clone();
        a.make_unique().unwrap();
        assert!(a.is_unique().unwrap());
        assert!(b.is_unique().unwrap());
        a.make_unique().unwrap();
        assert!(a.is_unique().unwrap());
    }

    #[test]
    fn test_geometry_setters_validate_then_apply() {
        let mut image = Image::new_3d(4, 4, 4, PixelKind::Scalar(ScalarKind::Float64)).unwrap();
        image.set_origin(&[1.0, 2.0, 3.0]).unwrap();
        image.set_spacing(&[0.5, 0.5, 2.0]).unwrap();
        assert_eq!(image.origin().unwrap(), vec![1.0, 2.0, 3.0]);
        assert_eq!(image.spacing().unwrap(), vec![0.5, 0.5, 2.0]);
        assert_eq!(image.direction().unwrap().len(), 9);

        assert!(image.set_spacing(&[0.5, -1.0, 2.0]).unwrap_err().is_invalid_argument());
        assert_eq!(image.spacing().unwrap(), vec![0.5, 0.5, 2.0]);

        let singular = vec![0.0; 9];
        assert!(image.set_direction(&singular).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_copy_information_contract() {
        let mut target = uint8_2d(6, 6);
        let mut source = Image::new(&[6, 6], PixelKind::Scalar(ScalarKind::Float32)).unwrap();
        source.set_origin(&[5.0, -5.0]).unwrap();
        source.set_spacing(&[2.0, 2.0]).unwrap();
        source.set_metadata("modality", "CT").unwrap();

        target.copy_information(&source).unwrap();
        assert_eq!(target.origin().unwrap(), vec![5.0, -5.0]);
        assert_eq!(target.spacing().unwrap(), vec![2.0, 2.0]);
        // the dictionary stays with its image, only geometry travels
        assert!(!target.has_metadata("modality").unwrap());
        // pixel kind and data are untouched
        assert_eq!(target.pixel_kind().unwrap(), PixelKind::Scalar(ScalarKind::UInt8));

        let smaller = uint8_2d(4, 6);
        let err = target.copy_information(&smaller).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(target.origin().unwrap(), vec![5.0, -5.0]);
    }

    #[test]
    fn test_metadata_surface() {
        let mut image = uint8_2d(2, 2);
        assert!(!image.has_metadata("slice_thickness").unwrap());
        assert!(image.metadata("slice_thickness").unwrap_err().is_not_found());

        image.set_metadata("slice_thickness", 2.5).unwrap();
        image.set_metadata("orientation", "RAS").unwrap();
        assert!(image.has_metadata("slice_thickness").unwrap());
        assert_eq!(image.metadata("slice_thickness").unwrap(), "2.5");
        assert_eq!(
            image.metadata_value("orientation").unwrap().as_str(),
            Some("RAS")
        );
        assert_eq!(
            image.metadata_keys().unwrap(),
            vec!["slice_thickness", "orientation"]
        );

        assert!(image.erase_metadata("orientation").unwrap());
        assert!(!image.erase_metadata("orientation").unwrap());
        assert!(image.metadata("orientation").unwrap_err().is_not_found());
    }

    #[test]
    fn test_physical_transforms_round_trip() {
        let mut image = uint8_2d(10, 10);
        image.set_origin(&[100.0, -30.0]).unwrap();
        image.set_spacing(&[2.0, 0.5]).unwrap();

        let point = image.index_to_physical_point(&[4, 6]).unwrap();
        assert_eq!(point, vec![108.0, -27.0]);
        assert_eq!(image.physical_point_to_index(&point).unwrap(), vec![4, 6]);

        let cindex = image.physical_point_to_continuous_index(&point).unwrap();
        assert_relative_eq!(cindex[0], 4.0, max_relative = 1e-12);
        assert_relative_eq!(cindex[1], 6.0, max_relative = 1e-12);

        let back = image.continuous_index_to_physical_point(&cindex).unwrap();
        assert_relative_eq!(back[0], point[0], max_relative = 1e-12);

        assert!(image.index_to_physical_point(&[4]).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_evaluate_at_physical_point() {
        let mut image = Image::new(&[2, 2], PixelKind::Scalar(ScalarKind::Float32)).unwrap();
        image.set_pixel(&[0, 0], 0.0f32).unwrap();
        image.set_pixel(&[1, 0], 10.0f32).unwrap();
        image.set_origin(&[50.0, 0.0]).unwrap();

        let v = image
            .evaluate_at_physical_point(&[50.5, 0.0], Interpolation::Linear)
            .unwrap();
        assert_relative_eq!(v[0], 5.0, max_relative = 1e-12);

        let err = image
            .evaluate_at_physical_point(&[40.0, 0.0], Interpolation::Linear)
            .unwrap_err();
        assert!(err.is_out_of_bounds());
    }

    #[test]
    fn test_adoption_shares_the_store() {
        let mut store = VoxelStore::<f32>::scalar(&[4, 4]).unwrap();
        let at = store.pixel_index(&[1, 1]).unwrap();
        store.set(at, 3.5);

        let shared = Arc::new(store);
        let image = Image::from(Arc::clone(&shared));
        assert!(!image.is_unique().unwrap());
        assert_eq!(image.pixel::<f32>(&[1, 1]).unwrap(), 3.5);

        let owned = Image::from(LabelStore::<u8>::new(&[4, 4]).unwrap());
        assert!(owned.is_unique().unwrap());
        assert_eq!(owned.pixel_kind().unwrap(), PixelKind::Label(ScalarKind::UInt8));
    }

    #[test]
    fn test_typed_store_recovery() {
        let image = Image::new(&[4, 2], PixelKind::Scalar(ScalarKind::Float32)).unwrap();
        let store = image.store::<f32>().unwrap();
        assert_eq!(store.size(), &[4, 2]);
        assert!(image.store::<u8>().unwrap_err().is_type_mismatch());
        assert!(image.label_store::<u8>().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_display_and_debug() {
        let image = Image::new(&[4, 8], PixelKind::Scalar(ScalarKind::UInt8)).unwrap();
        assert_eq!(image.to_string(), "Image(4x8 uint8, 1 component)");

        let vector =
            Image::with_components(&[2, 2, 2], PixelKind::Vector(ScalarKind::Float32), 4).unwrap();
        assert_eq!(vector.to_string(), "Image(2x2x2 vector of float32, 4 components)");

        assert_eq!(Image::default().to_string(), "Image(empty)");
        let debug = format!("{:?}", image);
        assert!(debug.contains("kind"));
        assert!(debug.contains("unique"));
    }
}
