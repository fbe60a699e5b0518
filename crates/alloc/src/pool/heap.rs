//! Heap-backed bump pool

use core::alloc::Layout;
use core::fmt;
use core::mem::MaybeUninit;
use core::ptr::NonNull;
use core::slice;

#[cfg(feature = "logging")]
use tracing::debug;

use super::{PoolConfig, PoolCore, PoolState, PoolStats, StatisticsProvider};
use crate::allocator::{ContainerAllocator, MemoryUsage};
use crate::deleter::{RawBox, RawDelete};
use crate::error::{AllocError, AllocResult};
use crate::source::{MemorySource, SystemMemory};

type Block<T, S> = RawBox<[MaybeUninit<T>], RawDelete<[MaybeUninit<T>], S>>;

/// Bump pool over one block reserved from a [`MemorySource`]
///
/// The block holds `capacity` elements and is reserved once, at
/// construction. `allocate(k)` hands out the next `k` slots; `deallocate`
/// does nothing. The block is released when the pool is dropped, through a
/// deleter bound to the source it came from.
///
/// Slots are uninitialized storage. The pool never drops values written into
/// them.
///
/// # Examples
///
/// ```
/// use nebula_alloc::{AllocError, HeapPool};
///
/// let pool = HeapPool::<i32>::new(5)?;
/// let first = pool.allocate(2)?;
/// let second = pool.allocate(3)?;
/// assert_eq!(unsafe { second.offset_from(first) }, 2);
///
/// assert!(matches!(
///     pool.allocate(1),
///     Err(AllocError::CapacityExhausted { available: 0, .. })
/// ));
/// # Ok::<(), AllocError>(())
/// ```
pub struct HeapPool<T, S: MemorySource = SystemMemory> {
    block: Block<T, S>,
    core: PoolCore,
}

impl<T> HeapPool<T> {
    /// Pool of `capacity` elements on the system heap
    pub fn new(capacity: usize) -> AllocResult<Self> {
        Self::with_source_and_config(capacity, SystemMemory::new(), PoolConfig::default())
    }

    pub fn with_config(capacity: usize, config: PoolConfig) -> AllocResult<Self> {
        Self::with_source_and_config(capacity, SystemMemory::new(), config)
    }
}

impl<T, S: MemorySource> HeapPool<T, S> {
    /// Pool of `capacity` elements reserved from `source`
    pub fn with_source(capacity: usize, source: S) -> AllocResult<Self> {
        Self::with_source_and_config(capacity, source, PoolConfig::default())
    }

    /// Reserves the block
    ///
    /// Fails with [`AllocError::InvalidCapacity`] for a zero capacity or one
    /// whose byte size overflows, and with [`AllocError::OutOfMemory`] when
    /// the source cannot provide the block.
    pub fn with_source_and_config(
        capacity: usize,
        source: S,
        config: PoolConfig,
    ) -> AllocResult<Self> {
        if capacity == 0 {
            return Err(AllocError::invalid_capacity(
                capacity,
                "pool must hold at least one element",
            ));
        }
        if Layout::array::<T>(capacity).is_err() {
            return Err(AllocError::invalid_capacity(
                capacity,
                "byte size exceeds the allocation limit",
            ));
        }

        let block = Block::<T, S>::new_uninit_slice_in(capacity, source)?;

        #[cfg(feature = "logging")]
        debug!(
            pool = config.label(),
            capacity,
            element_size = size_of::<T>(),
            "reserved heap pool"
        );

        Ok(Self {
            block,
            core: PoolCore::new(capacity, config),
        })
    }

    /// Hands out the next `count` contiguous slots
    ///
    /// Fails with [`AllocError::EmptyRequest`] when `count == 0` and with
    /// [`AllocError::CapacityExhausted`] when fewer than `count` slots are
    /// left. Failures leave the pool unchanged.
    ///
    /// The pointer stays valid for as long as the pool is alive.
    pub fn allocate(&self, count: usize) -> AllocResult<NonNull<T>> {
        // SAFETY: The block holds exactly `capacity` elements.
        unsafe { self.core.carve(self.base(), count) }
    }

    /// Like [`allocate`](Self::allocate), as a slice borrowed from the pool
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_uninit(&self, count: usize) -> AllocResult<&mut [MaybeUninit<T>]> {
        let ptr = self.allocate(count)?;
        // SAFETY: The range was just claimed, so no other reference to it
        // exists or will ever be handed out; it lives as long as the block.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr().cast(), count) })
    }

    /// Does nothing: slots are reclaimed only when the pool is dropped
    #[inline]
    pub fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        let _ = (ptr, count);
        self.core.stats.record_deallocate();
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.cursor.capacity()
    }

    /// Slots handed out so far
    #[inline]
    pub fn allocated(&self) -> usize {
        self.core.cursor.offset()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.core.cursor.remaining()
    }

    /// No slot handed out yet
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated() == 0
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn state(&self) -> PoolState {
        self.core.state()
    }

    /// Whether `ptr` points into this pool's block
    ///
    /// Always false for zero-sized `T`.
    pub fn owns(&self, ptr: *const T) -> bool {
        self.core.contains(self.base(), ptr)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.core.config
    }

    pub fn source(&self) -> &S {
        self.block.deleter().source()
    }

    #[inline]
    fn base(&self) -> NonNull<T> {
        self.block.as_ptr().cast()
    }
}

impl<T, S: MemorySource> Drop for HeapPool<T, S> {
    fn drop(&mut self) {
        #[cfg(feature = "logging")]
        debug!(
            pool = self.core.config.label(),
            capacity = self.capacity(),
            allocated = self.allocated(),
            "releasing heap pool"
        );
    }
}

impl<T, S: MemorySource> ContainerAllocator for HeapPool<T, S> {
    type Value = T;

    #[inline]
    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        HeapPool::allocate(self, n)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        HeapPool::deallocate(self, ptr, n);
    }
}

impl<T, S: MemorySource> MemoryUsage for HeapPool<T, S> {
    fn used_memory(&self) -> usize {
        self.allocated() * size_of::<T>()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.remaining() * size_of::<T>())
    }
}

impl<T, S: MemorySource> StatisticsProvider for HeapPool<T, S> {
    fn statistics(&self) -> PoolStats {
        self.core.stats.snapshot()
    }

    fn reset_statistics(&self) {
        self.core.stats.reset();
    }

    fn statistics_enabled(&self) -> bool {
        self.core.stats.is_enabled()
    }
}

impl<T, S: MemorySource> fmt::Debug for HeapPool<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapPool")
            .field("name", &self.core.config.name)
            .field("capacity", &self.capacity())
            .field("allocated", &self.allocated())
            .finish_non_exhaustive()
    }
}
