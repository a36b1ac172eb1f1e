use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut, Index, IndexMut},
};

use crate::{
    element::{Handle, EH, VH},
    error::Error,
};

/// A value of type `T` defined on every element of the mesh whose handle type
/// is `H`.
///
/// The mesh owns its properties and grows them whenever elements are added,
/// so every element, including the ones created by splitting, always has a
/// value. Cloning the mesh clones its properties, which is what makes cheap
/// snapshots possible.
#[derive(Clone, Debug)]
pub struct Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    buf: Vec<T>,
    default: T,
    _phantom: PhantomData<H>,
}

impl<H, T> Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    pub(crate) fn new(default: T) -> Self {
        Property {
            buf: Vec::new(),
            default,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn with_capacity(n: usize, default: T) -> Self {
        Property {
            buf: Vec::with_capacity(n),
            default,
            _phantom: PhantomData,
        }
    }

    /// Append the default value for a newly created element.
    pub(crate) fn push_default(&mut self) {
        self.buf.push(self.default);
    }

    pub(crate) fn push(&mut self, val: T) {
        self.buf.push(val);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Get the property value of the mesh element `h`.
    pub fn get(&self, h: H) -> Result<T, Error> {
        self.buf
            .get(h.index() as usize)
            .copied()
            .ok_or(Error::OutOfBoundsAccess)
    }

    /// Set the property value of a mesh element.
    pub fn set(&mut self, h: H, val: T) -> Result<(), Error> {
        let slot = self
            .buf
            .get_mut(h.index() as usize)
            .ok_or(Error::OutOfBoundsAccess)?;
        *slot = val;
        Ok(())
    }

    /// Reset every value to the default.
    pub fn reset(&mut self) {
        let default = self.default;
        self.buf.fill(default);
    }
}

/// The element handle can be used to index into the property.
impl<H, T> Index<H> for Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    type Output = T;

    fn index(&self, h: H) -> &Self::Output {
        &self.buf[h.index() as usize]
    }
}

impl<H, T> IndexMut<H> for Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    fn index_mut(&mut self, h: H) -> &mut Self::Output {
        &mut self.buf[h.index() as usize]
    }
}

/// A property can be turned into a `&[T]` for convenience.
impl<H, T> Deref for Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<H, T> DerefMut for Property<H, T>
where
    H: Handle,
    T: Clone + Copy,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

/// Vertex property.
pub type VProperty<T> = Property<VH, T>;

/// Edge property.
pub type EProperty<T> = Property<EH, T>;
