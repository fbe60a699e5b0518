//! Traits containers program against
//!
//! Containers take an allocator type parameter bounded by
//! [`ContainerAllocator`], and add [`Rebind`] when their internal node type
//! differs from the element type they expose.

use core::ptr::NonNull;

use crate::error::AllocResult;

/// Element-typed allocation contract
///
/// `allocate(n)` hands out uninitialized storage for `n` contiguous
/// [`Value`](Self::Value)s; `deallocate(ptr, n)` gives it back. What
/// deallocate actually does is up to the implementation: the reference
/// allocator releases to its source, pools ignore it.
pub trait ContainerAllocator {
    /// Element type storage is handed out for
    type Value;

    /// Obtains uninitialized storage for `n` elements
    fn allocate(&self, n: usize) -> AllocResult<NonNull<Self::Value>>;

    /// Returns storage obtained from [`allocate`](Self::allocate)
    ///
    /// # Safety
    /// - `ptr` must come from `allocate` on this allocator or one equal to it,
    ///   and not be deallocated yet
    /// - `n` must be the count passed to that `allocate` call
    unsafe fn deallocate(&self, ptr: NonNull<Self::Value>, n: usize);
}

impl<A: ContainerAllocator + ?Sized> ContainerAllocator for &A {
    type Value = A::Value;

    #[inline]
    fn allocate(&self, n: usize) -> AllocResult<NonNull<Self::Value>> {
        (**self).allocate(n)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<Self::Value>, n: usize) {
        // SAFETY: Same contract, upheld by the caller.
        unsafe { (**self).deallocate(ptr, n) }
    }
}

/// Allocators that can produce an equivalent allocator for another type
pub trait Rebind: ContainerAllocator {
    /// This allocator, for elements of type `U`
    type Rebound<U>: Rebind<Value = U>;

    /// Equivalent allocator for `U`, sharing this allocator's memory source
    fn for_type<U>(&self) -> Self::Rebound<U>;
}

/// Memory accounting in bytes
pub trait MemoryUsage {
    /// Bytes currently handed out
    fn used_memory(&self) -> usize;

    /// Bytes still available (if known)
    fn available_memory(&self) -> Option<usize>;

    /// Total capacity in bytes (if known)
    fn total_memory(&self) -> Option<usize> {
        match (self.used_memory(), self.available_memory()) {
            (used, Some(available)) => Some(used + available),
            _ => None,
        }
    }

    /// Usage as a percentage (0.0 to 100.0)
    ///
    /// Returns `None` if the total is unknown. An empty total reads as 0%.
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }
}
