//! System heap source
//!
//! Delegates to the platform allocator via [`std::alloc::System`]. This is the
//! default source for [`ReferenceAllocator`](crate::ReferenceAllocator) and
//! [`HeapPool`](crate::HeapPool).

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::{MemorySource, dangling};
use crate::error::{AllocError, AllocResult};

/// Stateless handle to the system heap
///
/// Every instance is interchangeable: memory obtained through one may be
/// released through any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SystemMemory;

impl SystemMemory {
    /// Creates a new handle
    ///
    /// This is a zero-cost operation as the handle contains no state.
    #[inline]
    pub const fn new() -> Self {
        SystemMemory
    }
}

// SAFETY: `System` honors the requested layout; zero-sized requests never
// reach it, and null returns are mapped to `OutOfMemory`.
unsafe impl MemorySource for SystemMemory {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        // SAFETY: `layout` has non-zero size.
        let ptr = unsafe { System.alloc(layout) };

        match NonNull::new(ptr) {
            Some(ptr) => Ok(NonNull::slice_from_raw_parts(ptr, layout.size())),
            None => Err(AllocError::out_of_memory_with_layout(layout)),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        // SAFETY: Caller guarantees `ptr` came from `System.alloc(layout)`.
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }
}
