//! Embedded array source
//!
//! Serves requests by bumping through a fixed, inline byte array. Nothing is
//! ever reclaimed individually; [`ArrayMemory::reset`] rewinds the whole
//! array once no borrower is left.

use core::alloc::Layout;
use core::cell::{Cell, UnsafeCell};
use core::fmt;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};

use super::{MemorySource, dangling};
use crate::error::{AllocError, AllocResult};

#[repr(C, align(16))]
struct AlignedBytes<const BYTES: usize>([MaybeUninit<u8>; BYTES]);

/// Fixed-capacity source backed by `BYTES` inline bytes
///
/// The array starts on a 16-byte boundary. Larger alignments are honored by
/// padding, which consumes part of the array. Single-threaded: the bump
/// offset lives in a [`Cell`].
///
/// Handed-out memory lives inside the value, so only `&ArrayMemory` is a
/// [`MemorySource`]. A pool cannot take the array by value:
///
/// ```compile_fail
/// use nebula_alloc::{ArrayMemory, HeapPool};
///
/// let pool = HeapPool::<u64, ArrayMemory<64>>::with_source(8, ArrayMemory::new());
/// ```
///
/// Nor can an allocator that may be moved into a container:
///
/// ```compile_fail
/// use nebula_alloc::{ArrayMemory, ReferenceAllocator};
///
/// let alloc = ReferenceAllocator::<u64, _>::with_source(ArrayMemory::<64>::new());
/// let ptr = alloc.allocate(2);
/// ```
///
/// # Examples
///
/// ```
/// use nebula_alloc::{ArrayMemory, HeapPool};
///
/// let memory = ArrayMemory::<64>::new();
/// let pool = HeapPool::<u32, _>::with_source(8, &memory).unwrap();
/// assert_eq!(memory.used(), 32);
/// # drop(pool);
/// ```
pub struct ArrayMemory<const BYTES: usize> {
    bytes: UnsafeCell<AlignedBytes<BYTES>>,
    offset: Cell<usize>,
}

impl<const BYTES: usize> ArrayMemory<BYTES> {
    /// Creates an empty array source
    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new(AlignedBytes([const { MaybeUninit::uninit() }; BYTES])),
            offset: Cell::new(0),
        }
    }

    /// Total bytes in the array
    #[inline]
    pub const fn capacity(&self) -> usize {
        BYTES
    }

    /// Bytes consumed so far, padding included
    #[inline]
    pub fn used(&self) -> usize {
        self.offset.get()
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        BYTES - self.offset.get()
    }

    /// Rewinds the array so its bytes can be handed out again
    ///
    /// Exclusive access guarantees no pool or allocator still borrows the
    /// source. Raw pointers obtained earlier must not be used afterwards.
    pub fn reset(&mut self) {
        self.offset.set(0);
    }

    fn base(&self) -> *mut u8 {
        self.bytes.get().cast::<u8>()
    }
}

impl<const BYTES: usize> Default for ArrayMemory<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> fmt::Debug for ArrayMemory<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayMemory")
            .field("capacity", &BYTES)
            .field("used", &self.used())
            .finish()
    }
}

impl<const BYTES: usize> ArrayMemory<BYTES> {
    fn bump(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        let base = self.base();
        let start = base.addr();
        let current = start + self.offset.get();

        let Some(aligned) = current
            .checked_add(layout.align() - 1)
            .map(|addr| addr & !(layout.align() - 1))
        else {
            return Err(AllocError::out_of_memory_with_layout(layout));
        };
        let Some(end) = aligned.checked_add(layout.size()) else {
            return Err(AllocError::out_of_memory_with_layout(layout));
        };
        if end - start > BYTES {
            return Err(AllocError::out_of_memory_with_layout(layout));
        }

        self.offset.set(end - start);

        // The range [aligned, end) lies inside the array, so the offset stays
        // in bounds and the pointer keeps the array's provenance.
        let ptr = base.wrapping_add(aligned - start);
        // SAFETY: Derived from the non-null array base plus an in-bounds offset.
        let ptr = unsafe { NonNull::new_unchecked(ptr) };
        Ok(NonNull::slice_from_raw_parts(ptr, layout.size()))
    }
}

// Only the borrowed form is a source. Handed-out memory lives inside the
// array, so the array must stay put while any of it is in use.
//
// SAFETY: Every successful request claims a fresh, aligned, in-bounds range
// of the array by advancing `offset` past it. Ranges are never reissued
// until `reset`, which requires exclusive access and so outlives every
// borrow. The borrow keeps the array in place for as long as the handle lives.
unsafe impl<const BYTES: usize> MemorySource for &ArrayMemory<BYTES> {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).bump(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        // Released together with the array.
    }

    /// Arrays only accept their own memory back
    fn same_source(&self, other: &Self) -> bool {
        ptr::eq(*self, *other)
    }
}
