//! Reference allocator
//!
//! The baseline [`ContainerAllocator`]: every `allocate(n)` goes straight to
//! the memory source and every `deallocate` goes straight back. There is no
//! per-instance state beyond the source handle, so copies and rebound
//! instances are interchangeable.

use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

use super::traits::{ContainerAllocator, Rebind};
use crate::error::{AllocError, AllocResult};
use crate::source::{MemorySource, SystemMemory};

/// Stateless allocator for `T` over a [`MemorySource`]
///
/// # Examples
///
/// ```
/// use nebula_alloc::prelude::*;
///
/// let alloc = ReferenceAllocator::<u32>::new();
/// let ptr = alloc.allocate(4)?;
/// unsafe {
///     for i in 0..4 {
///         ptr.add(i).write(i as u32 * 10);
///     }
///     assert_eq!(ptr.add(3).read(), 30);
///     alloc.deallocate(ptr, 4);
/// }
///
/// // Rebound allocators compare equal to the one they came from
/// assert!(alloc == alloc.for_type::<String>());
/// # Ok::<(), nebula_alloc::AllocError>(())
/// ```
pub struct ReferenceAllocator<T, S = SystemMemory> {
    source: S,
    _element: PhantomData<fn() -> T>,
}

impl<T> ReferenceAllocator<T> {
    /// Allocator over the system heap
    #[inline]
    pub const fn new() -> Self {
        Self::with_source(SystemMemory::new())
    }
}

impl<T, S> ReferenceAllocator<T, S> {
    /// Allocator over `source`
    #[inline]
    pub const fn with_source(source: S) -> Self {
        Self {
            source,
            _element: PhantomData,
        }
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Largest element count `allocate` can accept
    ///
    /// Bounded by the `isize::MAX` byte limit on a single allocation.
    #[inline]
    pub const fn max_size() -> usize {
        match size_of::<T>() {
            0 => usize::MAX,
            size => isize::MAX as usize / size,
        }
    }
}

impl<T, S: MemorySource> ReferenceAllocator<T, S> {
    /// Obtains uninitialized storage for `n` contiguous `T`s
    ///
    /// A zero-byte request (`n == 0` or zero-sized `T`) returns a dangling,
    /// well-aligned pointer without touching the source.
    pub fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        let layout = Self::array_layout(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        let block = self.source.allocate(layout)?;
        Ok(block.cast())
    }

    /// Returns storage obtained from [`allocate`](Self::allocate)
    ///
    /// # Safety
    /// - `ptr` must come from `allocate` on this allocator or one that
    ///   compares equal to it, and not be deallocated yet
    /// - `n` must equal the count passed to that `allocate` call
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // `allocate` accepted this count, so the layout is valid.
        let Ok(layout) = Layout::array::<T>(n) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }

        // SAFETY: Caller guarantees `ptr` came from an equal allocator's
        // source with this exact layout.
        unsafe { self.source.deallocate(ptr.cast(), layout) };
    }

    fn array_layout(n: usize) -> AllocResult<Layout> {
        Layout::array::<T>(n).map_err(|_| AllocError::array_too_long(n, size_of::<T>()))
    }
}

impl<T, S: MemorySource> ContainerAllocator for ReferenceAllocator<T, S> {
    type Value = T;

    #[inline]
    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        ReferenceAllocator::allocate(self, n)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        // SAFETY: Same contract, upheld by the caller.
        unsafe { ReferenceAllocator::deallocate(self, ptr, n) }
    }
}

impl<T, S: MemorySource + Clone> Rebind for ReferenceAllocator<T, S> {
    type Rebound<U> = ReferenceAllocator<U, S>;

    #[inline]
    fn for_type<U>(&self) -> ReferenceAllocator<U, S> {
        ReferenceAllocator::with_source(self.source.clone())
    }
}

// ============================================================================
// Value semantics
// ============================================================================

impl<T, S: Clone> Clone for ReferenceAllocator<T, S> {
    fn clone(&self) -> Self {
        Self::with_source(self.source.clone())
    }
}

impl<T, S: Copy> Copy for ReferenceAllocator<T, S> {}

impl<T, S: Default> Default for ReferenceAllocator<T, S> {
    fn default() -> Self {
        Self::with_source(S::default())
    }
}

/// Allocators are equal when memory from one may be released through the
/// other, whatever their element types.
impl<T, U, S: MemorySource> PartialEq<ReferenceAllocator<U, S>> for ReferenceAllocator<T, S> {
    #[inline]
    fn eq(&self, other: &ReferenceAllocator<U, S>) -> bool {
        self.source.same_source(&other.source)
    }
}

impl<T, S: MemorySource> Eq for ReferenceAllocator<T, S> {}

impl<T, S: fmt::Debug> fmt::Debug for ReferenceAllocator<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceAllocator")
            .field("element", &core::any::type_name::<T>())
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BudgetedMemory;

    #[test]
    fn allocations_hold_written_values() {
        let alloc = ReferenceAllocator::<u64>::new();
        let ptr = alloc.allocate(8).unwrap();

        unsafe {
            for i in 0..8 {
                ptr.add(i).write(i as u64 * 3);
            }
            for i in 0..8 {
                assert_eq!(ptr.add(i).read(), i as u64 * 3);
            }
            alloc.deallocate(ptr, 8);
        }
    }

    #[test]
    fn zero_count_is_dangling() {
        let memory = BudgetedMemory::exhausted(SystemMemory::new());
        let alloc = ReferenceAllocator::<u64, _>::with_source(&memory);

        let ptr = alloc.allocate(0).unwrap();
        assert_eq!(ptr, NonNull::dangling());
        unsafe { alloc.deallocate(ptr, 0) };
        assert_eq!(memory.refusals(), 0);
    }

    #[test]
    fn zero_sized_elements_never_reach_source() {
        let memory = BudgetedMemory::exhausted(SystemMemory::new());
        let alloc = ReferenceAllocator::<(), _>::with_source(&memory);

        let ptr = alloc.allocate(1_000).unwrap();
        unsafe { alloc.deallocate(ptr, 1_000) };
        assert_eq!(memory.refusals(), 0);
    }

    #[test]
    fn overflow_is_array_too_long() {
        let alloc = ReferenceAllocator::<u32>::new();
        let count = ReferenceAllocator::<u32>::max_size() + 1;

        assert_eq!(
            alloc.allocate(count).unwrap_err(),
            AllocError::ArrayTooLong {
                count,
                element_size: 4
            }
        );
        assert_eq!(
            alloc.allocate(usize::MAX).unwrap_err().code(),
            "ALLOC:ARRAY_TOO_LONG"
        );
    }

    #[test]
    fn source_failure_is_out_of_memory() {
        let memory = BudgetedMemory::new(SystemMemory::new(), 16);
        let alloc = ReferenceAllocator::<u64, _>::with_source(&memory);

        let error = alloc.allocate(3).unwrap_err();
        assert_eq!(error, AllocError::OutOfMemory { size: 24, align: 8 });
        assert!(error.is_recoverable());
    }

    #[test]
    fn equality_spans_element_types() {
        let a = ReferenceAllocator::<i32>::new();
        let b = ReferenceAllocator::<String>::new();
        let c = a.for_type::<[u8; 3]>();

        assert!(a == b);
        assert!(b == c);
        assert_eq!(a, a.for_type::<i32>());
    }

    #[test]
    fn borrowed_sources_compare_by_identity() {
        let first = BudgetedMemory::new(SystemMemory::new(), 64);
        let second = BudgetedMemory::new(SystemMemory::new(), 64);

        let a = ReferenceAllocator::<u8, _>::with_source(&first);
        let b = a.for_type::<u64>();
        let c = ReferenceAllocator::<u8, _>::with_source(&second);

        assert!(a == b);
        assert!(a != c);
    }

    #[test]
    fn rebound_instances_release_each_others_memory() {
        let memory = BudgetedMemory::new(SystemMemory::new(), 64);
        let bytes = ReferenceAllocator::<u8, _>::with_source(&memory);
        let words = bytes.for_type::<u32>();

        let ptr = words.allocate(4).unwrap();
        assert_eq!(memory.used(), 16);

        // Same source, so a copy made later releases it just as well
        let again = bytes.for_type::<u32>();
        unsafe { again.deallocate(ptr, 4) };
        assert_eq!(memory.used(), 0);
    }

    #[test]
    fn system_allocator_is_zero_sized_copy() {
        fn assert_copy<A: Copy>() {}
        assert_copy::<ReferenceAllocator<String>>();
        assert_eq!(size_of::<ReferenceAllocator<String>>(), 0);
    }
}
