//! Deleters
//!
//! A [`Deleter`] is the release half of an allocation: given a pointer it
//! returns the memory behind it to wherever it came from. [`RawDelete`]
//! releases memory obtained from a [`MemorySource`] and comes in a
//! single-object form (`RawDelete<T, S>`) and an array form
//! (`RawDelete<[T], S>`) which reads the element count from the slice pointer.
//!
//! Deleters only release storage. They never run destructors of the values
//! that may live there; whoever constructed those values drops them.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::source::{MemorySource, SystemMemory};

mod raw_box;

pub use raw_box::RawBox;

/// Releases the memory behind a pointer
pub trait Deleter<P: ?Sized> {
    /// Releases the memory `ptr` points to
    ///
    /// # Safety
    /// - `ptr` must have been obtained from the allocation primitive this
    ///   deleter pairs with, using the layout of `P` (for slices, of the
    ///   slice's length)
    /// - the memory must not have been released already
    unsafe fn delete(&self, ptr: NonNull<P>);
}

/// Deleter for memory obtained from a [`MemorySource`]
///
/// Zero-sized unless the source carries state.
pub struct RawDelete<P: ?Sized, S = SystemMemory> {
    source: S,
    _pointee: PhantomData<fn(NonNull<P>)>,
}

impl<P: ?Sized> RawDelete<P> {
    /// Deleter releasing to the system heap
    #[inline]
    pub const fn new() -> Self {
        Self::with_source(SystemMemory::new())
    }
}

impl<P: ?Sized, S> RawDelete<P, S> {
    /// Deleter releasing to `source`
    #[inline]
    pub const fn with_source(source: S) -> Self {
        Self {
            source,
            _pointee: PhantomData,
        }
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Converts to a deleter for another pointee, keeping the source
    #[inline]
    pub fn rebind<Q: ?Sized>(self) -> RawDelete<Q, S> {
        RawDelete::with_source(self.source)
    }
}

impl<P: ?Sized, S: Default> Default for RawDelete<P, S> {
    fn default() -> Self {
        Self::with_source(S::default())
    }
}

impl<P: ?Sized, S: Clone> Clone for RawDelete<P, S> {
    fn clone(&self) -> Self {
        Self::with_source(self.source.clone())
    }
}

impl<P: ?Sized, S: Copy> Copy for RawDelete<P, S> {}

impl<P: ?Sized, S: fmt::Debug> fmt::Debug for RawDelete<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDelete")
            .field("pointee", &core::any::type_name::<P>())
            .field("source", &self.source)
            .finish()
    }
}

impl<T, S: MemorySource> Deleter<T> for RawDelete<T, S> {
    #[inline]
    unsafe fn delete(&self, ptr: NonNull<T>) {
        // SAFETY: Caller guarantees `ptr` came from `self.source` with the
        // layout of a single `T` and is still live.
        unsafe { self.source.deallocate(ptr.cast(), Layout::new::<T>()) };
    }
}

impl<T, S: MemorySource> Deleter<[T]> for RawDelete<[T], S> {
    #[inline]
    unsafe fn delete(&self, ptr: NonNull<[T]>) {
        // The allocation succeeded with this very layout, so it is valid.
        let Ok(layout) = Layout::array::<T>(ptr.len()) else {
            return;
        };
        // SAFETY: Caller guarantees `ptr` came from `self.source` with the
        // layout of `ptr.len()` elements and is still live.
        unsafe { self.source.deallocate(ptr.cast(), layout) };
    }
}
