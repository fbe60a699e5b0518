//! Raw memory sources
//!
//! A [`MemorySource`] is the byte-level primitive every allocator and pool in
//! this crate draws from: "give me `layout` bytes" and "take these bytes back".
//! Threading it as a type parameter instead of calling the global allocator
//! directly lets a pool be carved from an embedded array, and lets tests swap
//! in a [`BudgetedMemory`] that runs out of memory on cue.
//!
//! # Safety
//!
//! `MemorySource` is an `unsafe trait`. Implementors promise that:
//! - a successful `allocate(layout)` returns memory aligned to `layout.align()`,
//!   valid for `layout.size()` bytes and not handed out again until released
//! - zero-sized layouts produce a dangling, well-aligned pointer and releasing
//!   one is a no-op
//! - `deallocate` never panics, so it is safe to call on cleanup paths
//! - handed-out memory stays valid when the source value is moved, until it
//!   is released or the source is dropped. Sources that hand out their own
//!   inline bytes implement the trait on a shared borrow instead

use core::alloc::Layout;
use core::ptr::{self, NonNull};

use crate::error::AllocResult;

mod array;
mod budget;
mod system;

pub use array::ArrayMemory;
pub use budget::BudgetedMemory;
pub use system::SystemMemory;

/// Byte-level allocation primitive
pub unsafe trait MemorySource {
    /// Obtains uninitialized memory for `layout`
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Returns memory obtained from [`allocate`](Self::allocate)
    ///
    /// # Safety
    /// - `ptr` must come from `allocate` on this source (or one for which
    ///   [`same_source`](Self::same_source) holds) and not be released yet
    /// - `layout` must be the layout passed to `allocate`
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Whether memory from `other` may be released through `self`
    ///
    /// Sources without identity (the system heap) always agree.
    fn same_source(&self, other: &Self) -> bool {
        let _ = other;
        true
    }
}

/// Well-aligned dangling pointer for zero-sized requests
#[inline]
pub(crate) fn dangling(layout: Layout) -> NonNull<[u8]> {
    // Alignment is never zero, so the address is non-null.
    let addr = ptr::without_provenance_mut::<u8>(layout.align());
    // SAFETY: `layout.align()` is a non-zero power of two.
    let ptr = unsafe { NonNull::new_unchecked(addr) };
    NonNull::slice_from_raw_parts(ptr, 0)
}

// SAFETY: Forwards every call to the borrowed source, preserving its contract.
unsafe impl<S: MemorySource + ?Sized> MemorySource for &S {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Same contract as `S::deallocate`, upheld by the caller.
        unsafe { (**self).deallocate(ptr, layout) }
    }

    /// Borrowed sources are interchangeable only when they borrow the same object
    fn same_source(&self, other: &Self) -> bool {
        ptr::eq(*self, *other)
    }
}
