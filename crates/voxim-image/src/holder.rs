//! Type-erased store handles.
//!
//! Dispatch binds once, at construction: [`ImageHandle::allocate`] holds
//! the single `match` over the pixel kind registry and picks a concrete
//! handle; every call after that goes through the object-safe
//! [`ErasedStore`] trait, with no per-call re-inspection of the tag.
//!
//! Sharing is `Arc`-based. Cloning a handle bumps the refcount; mutable
//! access goes through `Arc::make_mut`, which deep-copies the store only
//! while it is shared.

use std::any::Any;
use std::sync::Arc;

use voxim_core::element::{LabelScalar, Sample, Scalar};
use voxim_core::error::{Error, Result};
use voxim_core::geometry::Geometry;
use voxim_core::interp::Interpolation;
use voxim_core::kind::{PixelKind, ScalarKind};
use voxim_core::meta::MetaDict;
use voxim_core::store::{LabelStore, VoxelStore};
use voxim_core::{BufferMut, BufferRef};

/// Object-safe view of a concrete store.
///
/// Typed values cross this boundary wrapped in [`Sample`] and the buffer
/// view enums; everything else is plain queries and forwarding.
pub(crate) trait ErasedStore: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> PixelKind;
    fn dimension(&self) -> u32;
    fn size(&self) -> &[u32];
    fn components(&self) -> u32;
    fn number_of_pixels(&self) -> u64;
    fn pixel_index(&self, index: &[u32]) -> Result<usize>;

    fn geometry(&self) -> &Geometry;
    fn geometry_mut(&mut self) -> &mut Geometry;
    fn meta(&self) -> &MetaDict;
    fn meta_mut(&mut self) -> &mut MetaDict;

    fn sample(&self, sample_index: usize) -> Sample;
    fn set_sample(&mut self, sample_index: usize, value: Sample) -> Result<()>;
    fn buffer(&self) -> Result<BufferRef<'_>>;
    fn buffer_mut(&mut self) -> Result<BufferMut<'_>>;
    fn evaluate(&self, cindex: &[f64], interpolation: Interpolation) -> Result<Vec<f64>>;

    fn is_unique(&self) -> bool;
    fn make_unique(&mut self);
    fn clone_box(&self) -> Box<dyn ErasedStore>;
    fn as_any(&self) -> &dyn Any;
}

/// Handle over a dense store of element `T`.
#[derive(Debug)]
struct TypedHandle<T: Scalar> {
    store: Arc<VoxelStore<T>>,
}

impl<T: Scalar> ErasedStore for TypedHandle<T> {
    fn kind(&self) -> PixelKind {
        self.store.kind()
    }

    fn dimension(&self) -> u32 {
        self.store.dimension()
    }

    fn size(&self) -> &[u32] {
        self.store.size()
    }

    fn components(&self) -> u32 {
        self.store.components()
    }

    fn number_of_pixels(&self) -> u64 {
        self.store.number_of_pixels()
    }

    fn pixel_index(&self, index: &[u32]) -> Result<usize> {
        self.store.pixel_index(index)
    }

    fn geometry(&self) -> &Geometry {
        self.store.geometry()
    }

    fn geometry_mut(&mut self) -> &mut Geometry {
        Arc::make_mut(&mut self.store).geometry_mut()
    }

    fn meta(&self) -> &MetaDict {
        self.store.meta()
    }

    fn meta_mut(&mut self) -> &mut MetaDict {
        Arc::make_mut(&mut self.store).meta_mut()
    }

    fn sample(&self, sample_index: usize) -> Sample {
        self.store.get(sample_index).to_sample()
    }

    fn set_sample(&mut self, sample_index: usize, value: Sample) -> Result<()> {
        let actual = self.kind();
        let Some(value) = T::from_sample(value) else {
            return Err(Error::type_mismatch(
                actual.with_element(value.kind()),
                actual,
            ));
        };
        Arc::make_mut(&mut self.store).set(sample_index, value);
        Ok(())
    }

    fn buffer(&self) -> Result<BufferRef<'_>> {
        Ok(T::buffer_of(self.store.samples()))
    }

    fn buffer_mut(&mut self) -> Result<BufferMut<'_>> {
        Ok(T::buffer_of_mut(Arc::make_mut(&mut self.store).samples_mut()))
    }

    fn evaluate(&self, cindex: &[f64], interpolation: Interpolation) -> Result<Vec<f64>> {
        self.store.evaluate(cindex, interpolation)
    }

    fn is_unique(&self) -> bool {
        Arc::strong_count(&self.store) == 1
    }

    fn make_unique(&mut self) {
        let _ = Arc::make_mut(&mut self.store);
    }

    fn clone_box(&self) -> Box<dyn ErasedStore> {
        Box::new(Self {
            store: Arc::clone(&self.store),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handle over a run-length label store of element `T`.
#[derive(Debug)]
struct LabelHandle<T: LabelScalar> {
    store: Arc<LabelStore<T>>,
}

impl<T: LabelScalar> ErasedStore for LabelHandle<T> {
    fn kind(&self) -> PixelKind {
        self.store.kind()
    }

    fn dimension(&self) -> u32 {
        self.store.dimension()
    }

    fn size(&self) -> &[u32] {
        self.store.size()
    }

    fn components(&self) -> u32 {
        1
    }

    fn number_of_pixels(&self) -> u64 {
        self.store.number_of_pixels()
    }

    fn pixel_index(&self, index: &[u32]) -> Result<usize> {
        self.store.pixel_index(index)
    }

    fn geometry(&self) -> &Geometry {
        self.store.geometry()
    }

    fn geometry_mut(&mut self) -> &mut Geometry {
        Arc::make_mut(&mut self.store).geometry_mut()
    }

    fn meta(&self) -> &MetaDict {
        self.store.meta()
    }

    fn meta_mut(&mut self) -> &mut MetaDict {
        Arc::make_mut(&mut self.store).meta_mut()
    }

    fn sample(&self, sample_index: usize) -> Sample {
        self.store.get(sample_index as u64).to_sample()
    }

    fn set_sample(&mut self, sample_index: usize, value: Sample) -> Result<()> {
        let actual = self.kind();
        let Some(value) = T::from_sample(value) else {
            return Err(Error::type_mismatch(
                actual.with_element(value.kind()),
                actual,
            ));
        };
        Arc::make_mut(&mut self.store).set(sample_index as u64, value);
        Ok(())
    }

    fn buffer(&self) -> Result<BufferRef<'_>> {
        Err(Error::unsupported(
            "label images store runs, not a sample buffer",
        ))
    }

    fn buffer_mut(&mut self) -> Result<BufferMut<'_>> {
        Err(Error::unsupported(
            "label images store runs, not a sample buffer",
        ))
    }

    fn evaluate(&self, _cindex: &[f64], _interpolation: Interpolation) -> Result<Vec<f64>> {
        Err(Error::unsupported("label images do not interpolate"))
    }

    fn is_unique(&self) -> bool {
        Arc::strong_count(&self.store) == 1
    }

    fn make_unique(&mut self) {
        let _ = Arc::make_mut(&mut self.store);
    }

    fn clone_box(&self) -> Box<dyn ErasedStore> {
        Box::new(Self {
            store: Arc::clone(&self.store),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Owning, type-erased handle over some concrete store.
#[derive(Debug)]
pub(crate) struct ImageHandle(Box<dyn ErasedStore>);

impl ImageHandle {
    /// Allocates a zero-filled store of the requested kind.
    ///
    /// `components` of 0 means the kind's default count. This is the one
    /// place the registry is matched; the returned handle dispatches
    /// virtually from here on.
    pub(crate) fn allocate(size: &[u32], kind: PixelKind, components: u32) -> Result<Self> {
        match kind {
            PixelKind::Unknown => Err(Error::unsupported(
                "cannot allocate an image of unknown kind",
            )),
            PixelKind::Scalar(element) => {
                if components > 1 {
                    return Err(Error::invalid_argument(format!(
                        "scalar images hold one component, got {components}"
                    )));
                }
                Self::allocate_scalar(size, element)
            }
            PixelKind::Vector(element) => {
                let components = if components == 0 {
                    kind.default_components(size.len() as u32)
                } else {
                    components
                };
                Self::allocate_vector(size, element, components)
            }
            PixelKind::Complex(element) => {
                if components != 0 && components != 2 {
                    return Err(Error::invalid_argument(format!(
                        "complex images hold two components, got {components}"
                    )));
                }
                match element {
                    ScalarKind::Float32 => Ok(Self::from_dense(VoxelStore::<f32>::complex(size)?)),
                    ScalarKind::Float64 => Ok(Self::from_dense(VoxelStore::<f64>::complex(size)?)),
                    _ => Err(Error::unsupported(format!(
                        "complex images need a float element, got {element}"
                    ))),
                }
            }
            PixelKind::Label(element) => {
                if components > 1 {
                    return Err(Error::invalid_argument(format!(
                        "label images hold one component, got {components}"
                    )));
                }
                match element {
                    ScalarKind::UInt8 => Ok(Self::from_label(LabelStore::<u8>::new(size)?)),
                    ScalarKind::UInt16 => Ok(Self::from_label(LabelStore::<u16>::new(size)?)),
                    ScalarKind::UInt32 => Ok(Self::from_label(LabelStore::<u32>::new(size)?)),
                    ScalarKind::UInt64 => Ok(Self::from_label(LabelStore::<u64>::new(size)?)),
                    _ => Err(Error::unsupported(format!(
                        "label images need an unsigned element, got {element}"
                    ))),
                }
            }
        }
    }

    fn allocate_scalar(size: &[u32], element: ScalarKind) -> Result<Self> {
        Ok(match element {
            ScalarKind::Int8 => Self::from_dense(VoxelStore::<i8>::scalar(size)?),
            ScalarKind::UInt8 => Self::from_dense(VoxelStore::<u8>::scalar(size)?),
            ScalarKind::Int16 => Self::from_dense(VoxelStore::<i16>::scalar(size)?),
            ScalarKind::UInt16 => Self::from_dense(VoxelStore::<u16>::scalar(size)?),
            ScalarKind::Int32 => Self::from_dense(VoxelStore::<i32>::scalar(size)?),
            ScalarKind::UInt32 => Self::from_dense(VoxelStore::<u32>::scalar(size)?),
            ScalarKind::Int64 => Self::from_dense(VoxelStore::<i64>::scalar(size)?),
            ScalarKind::UInt64 => Self::from_dense(VoxelStore::<u64>::scalar(size)?),
            ScalarKind::Float32 => Self::from_dense(VoxelStore::<f32>::scalar(size)?),
            ScalarKind::Float64 => Self::from_dense(VoxelStore::<f64>::scalar(size)?),
        })
    }

    fn allocate_vector(size: &[u32], element: ScalarKind, n: u32) -> Result<Self> {
        Ok(match element {
            ScalarKind::Int8 => Self::from_dense(VoxelStore::<i8>::vector(size, n)?),
            ScalarKind::UInt8 => Self::from_dense(VoxelStore::<u8>::vector(size, n)?),
            ScalarKind::Int16 => Self::from_dense(VoxelStore::<i16>::vector(size, n)?),
            ScalarKind::UInt16 => Self::from_dense(VoxelStore::<u16>::vector(size, n)?),
            ScalarKind::Int32 => Self::from_dense(VoxelStore::<i32>::vector(size, n)?),
            ScalarKind::UInt32 => Self::from_dense(VoxelStore::<u32>::vector(size, n)?),
            ScalarKind::Int64 => Self::from_dense(VoxelStore::<i64>::vector(size, n)?),
            ScalarKind::UInt64 => Self::from_dense(VoxelStore::<u64>::vector(size, n)?),
            ScalarKind::Float32 => Self::from_dense(VoxelStore::<f32>::vector(size, n)?),
            ScalarKind::Float64 => Self::from_dense(VoxelStore::<f64>::vector(size, n)?),
        })
    }

    /// Wraps an owned dense store.
    pub(crate) fn from_dense<T: Scalar>(store: VoxelStore<T>) -> Self {
        Self::from_dense_arc(Arc::new(store))
    }

    /// Wraps a shared dense store without copying it.
    pub(crate) fn from_dense_arc<T: Scalar>(store: Arc<VoxelStore<T>>) -> Self {
        Self(Box::new(TypedHandle { store }))
    }

    /// Wraps an owned label store.
    pub(crate) fn from_label<T: LabelScalar>(store: LabelStore<T>) -> Self {
        Self::from_label_arc(Arc::new(store))
    }

    /// Wraps a shared label store without copying it.
    pub(crate) fn from_label_arc<T: LabelScalar>(store: Arc<LabelStore<T>>) -> Self {
        Self(Box::new(LabelHandle { store }))
    }

    /// Typed view of the dense store, when the element type matches.
    pub(crate) fn downcast_dense<T: Scalar>(&self) -> Option<&VoxelStore<T>> {
        self.0
            .as_any()
            .downcast_ref::<TypedHandle<T>>()
            .map(|handle| handle.store.as_ref())
    }

    /// Typed view of the label store, when the element type matches.
    pub(crate) fn downcast_label<T: LabelScalar>(&self) -> Option<&LabelStore<T>> {
        self.0
            .as_any()
            .downcast_ref::<LabelHandle<T>>()
            .map(|handle| handle.store.as_ref())
    }
}

impl Clone for ImageHandle {
    /// Shallow clone: shares the store and bumps its refcount.
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl std::ops::Deref for ImageHandle {
    type Target = dyn ErasedStore;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl std::ops::DerefMut for ImageHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}
