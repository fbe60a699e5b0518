//! Owning handle that releases through a deleter
//!
//! `RawBox` is the one place a block is released: its `Drop` runs the deleter
//! exactly once, and [`RawBox::into_raw`] is the only way out of that.

use core::alloc::Layout;
use core::fmt;
use core::mem::{ManuallyDrop, MaybeUninit};
use core::ptr::{self, NonNull};

use super::{Deleter, RawDelete};
use crate::error::{AllocError, AllocResult};
use crate::source::MemorySource;

/// Owning pointer with a pluggable release step
///
/// Unlike `Box`, dropping a `RawBox` only releases memory; the pointee is
/// never dropped.
pub struct RawBox<P: ?Sized, D: Deleter<P>> {
    ptr: NonNull<P>,
    deleter: D,
}

impl<P: ?Sized, D: Deleter<P>> RawBox<P, D> {
    /// Adopts `ptr`, to be released through `deleter`
    ///
    /// # Safety
    /// `ptr` must satisfy the requirements of [`Deleter::delete`] for
    /// `deleter`, and nothing else may release it.
    #[inline]
    pub unsafe fn from_raw(ptr: NonNull<P>, deleter: D) -> Self {
        Self { ptr, deleter }
    }

    #[inline]
    pub fn as_ptr(&self) -> NonNull<P> {
        self.ptr
    }

    #[inline]
    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Gives up ownership without releasing
    ///
    /// The caller becomes responsible for calling the returned deleter.
    pub fn into_raw(self) -> (NonNull<P>, D) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the deleter is moved out once.
        let deleter = unsafe { ptr::read(&this.deleter) };
        (this.ptr, deleter)
    }
}

impl<T, S: MemorySource> RawBox<MaybeUninit<T>, RawDelete<MaybeUninit<T>, S>> {
    /// Uninitialized storage for one `T` from `source`
    pub fn new_uninit_in(source: S) -> AllocResult<Self> {
        let block = source.allocate(Layout::new::<T>())?;
        // SAFETY: Obtained from `source` with the layout the deleter releases.
        Ok(unsafe { Self::from_raw(block.cast(), RawDelete::with_source(source)) })
    }
}

impl<T, S: MemorySource> RawBox<[MaybeUninit<T>], RawDelete<[MaybeUninit<T>], S>> {
    /// Uninitialized storage for `len` contiguous `T`s from `source`
    pub fn new_uninit_slice_in(len: usize, source: S) -> AllocResult<Self> {
        let layout = Layout::array::<T>(len)
            .map_err(|_| AllocError::array_too_long(len, size_of::<T>()))?;
        let block = source.allocate(layout)?;
        let ptr = NonNull::slice_from_raw_parts(block.cast::<MaybeUninit<T>>(), len);
        // SAFETY: Obtained from `source` with the array layout of `len`
        // elements, which is what the array deleter releases.
        Ok(unsafe { Self::from_raw(ptr, RawDelete::with_source(source)) })
    }
}

impl<P: ?Sized, D: Deleter<P>> Drop for RawBox<P, D> {
    fn drop(&mut self) {
        // SAFETY: `from_raw` established the deleter contract and `into_raw`
        // suppresses this drop, so this is the only release.
        unsafe { self.deleter.delete(self.ptr) };
    }
}

impl<P: ?Sized, D: Deleter<P> + fmt::Debug> fmt::Debug for RawBox<P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBox")
            .field("ptr", &self.ptr.cast::<u8>())
            .field("deleter", &self.deleter)
            .finish()
    }
}

// SAFETY: A `RawBox` owns its block outright; sending it sends the block and
// the deleter together.
unsafe impl<P: ?Sized + Send, D: Deleter<P> + Send> Send for RawBox<P, D> {}
