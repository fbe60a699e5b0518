//! Bump cursor shared by both pools
//!
//! Counts in elements, not bytes: the pool turns an offset into a pointer.
//! Single-threaded, the offset lives in a [`Cell`].

use core::cell::Cell;

use crate::error::{AllocError, AllocResult};

#[derive(Debug)]
pub(super) struct BumpCursor {
    capacity: usize,
    offset: Cell<usize>,
}

impl BumpCursor {
    pub(super) const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            offset: Cell::new(0),
        }
    }

    #[inline]
    pub(super) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(super) fn offset(&self) -> usize {
        self.offset.get()
    }

    #[inline]
    pub(super) fn remaining(&self) -> usize {
        self.capacity - self.offset.get()
    }

    /// Claims the next `count` slots and returns the offset of the first
    ///
    /// Nothing changes on failure.
    pub(super) fn claim(&self, count: usize) -> AllocResult<usize> {
        if count == 0 {
            return Err(AllocError::EmptyRequest);
        }

        let offset = self.offset.get();
        let available = self.capacity - offset;
        if count > available {
            return Err(AllocError::capacity_exhausted(count, available, self.capacity));
        }

        // offset + count <= capacity, no overflow
        self.offset.set(offset + count);
        Ok(offset)
    }
}
