//! Byte-budgeted source
//!
//! Wraps another source and refuses any request that would push live bytes
//! past a fixed budget. Tests use it to inject out-of-memory failures at a
//! precise point; releases give the bytes back.

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::{self, NonNull};

use super::MemorySource;
use crate::error::{AllocError, AllocResult};

/// Source that fails once `budget` live bytes are in use
#[derive(Debug)]
pub struct BudgetedMemory<S> {
    inner: S,
    budget: usize,
    in_use: Cell<usize>,
    refusals: Cell<usize>,
}

impl<S> BudgetedMemory<S> {
    /// Wraps `inner` with a budget of `budget` live bytes
    pub const fn new(inner: S, budget: usize) -> Self {
        Self {
            inner,
            budget,
            in_use: Cell::new(0),
            refusals: Cell::new(0),
        }
    }

    /// A budget of zero: every non-empty request fails
    pub const fn exhausted(inner: S) -> Self {
        Self::new(inner, 0)
    }

    /// Bytes this source may have outstanding at once
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Live bytes currently charged against the budget
    pub fn used(&self) -> usize {
        self.in_use.get()
    }

    /// Bytes still available under the budget
    pub fn remaining(&self) -> usize {
        self.budget - self.in_use.get()
    }

    /// Requests refused for lack of budget
    pub fn refusals(&self) -> usize {
        self.refusals.get()
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

// SAFETY: Allocation and release are forwarded to `inner` unchanged; the
// budget only decides whether a request is forwarded at all.
unsafe impl<S: MemorySource> MemorySource for BudgetedMemory<S> {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() > self.remaining() {
            self.refusals.set(self.refusals.get() + 1);
            return Err(AllocError::out_of_memory_with_layout(layout));
        }

        let block = self.inner.allocate(layout)?;
        self.in_use.set(self.in_use.get() + layout.size());
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Caller guarantees `ptr` came from `allocate(layout)`, which
        // obtained it from `inner`.
        unsafe { self.inner.deallocate(ptr, layout) };
        self.in_use.set(self.in_use.get().saturating_sub(layout.size()));
    }

    /// Budgets are tracked per wrapper, so only the same wrapper qualifies
    fn same_source(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}
