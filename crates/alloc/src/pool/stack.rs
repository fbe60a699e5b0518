//! Inline bump pool

use core::cell::UnsafeCell;
use core::fmt;
use core::mem::MaybeUninit;
use core::ptr::NonNull;
use core::slice;

#[cfg(feature = "logging")]
use tracing::debug;

use super::{PoolConfig, PoolCore, PoolState, PoolStats, StatisticsProvider};
use crate::allocator::{ContainerAllocator, MemoryUsage};
use crate::error::AllocResult;

/// Bump pool with `N` inline slots
///
/// Same contract as [`HeapPool`](crate::HeapPool), without any dynamic
/// allocation: the slots are part of the pool value. `N == 0` and a byte size
/// past `isize::MAX` are rejected when `new` is instantiated.
///
/// Moving the pool moves its slots. Slices from
/// [`allocate_uninit`](Self::allocate_uninit) borrow the pool and so pin it;
/// raw pointers from [`allocate`](Self::allocate) do not survive a move.
///
/// # Examples
///
/// ```
/// use nebula_alloc::StackPool;
///
/// let pool = StackPool::<u8, 16>::new();
/// let buf = pool.allocate_uninit(4)?;
/// buf.fill(std::mem::MaybeUninit::new(7));
/// assert_eq!(pool.remaining(), 12);
/// # Ok::<(), nebula_alloc::AllocError>(())
/// ```
///
/// A pool without slots does not build:
///
/// ```compile_fail
/// use nebula_alloc::StackPool;
///
/// let pool = StackPool::<u8, 0>::new();
/// ```
///
/// Neither does one whose slots would not fit in `isize::MAX` bytes:
///
/// ```compile_fail
/// use nebula_alloc::StackPool;
///
/// let pool = StackPool::<u64, { isize::MAX as usize / 4 }>::new();
/// ```
pub struct StackPool<T, const N: usize> {
    slots: UnsafeCell<[MaybeUninit<T>; N]>,
    core: PoolCore,
}

impl<T, const N: usize> StackPool<T, N> {
    const VALID_CAPACITY: () = {
        assert!(N > 0, "StackPool needs at least one slot");
        assert!(
            size_of::<T>() == 0 || N <= isize::MAX as usize / size_of::<T>(),
            "StackPool byte size exceeds isize::MAX"
        );
    };

    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        let () = Self::VALID_CAPACITY;

        #[cfg(feature = "logging")]
        debug!(
            pool = config.label(),
            capacity = N,
            element_size = size_of::<T>(),
            "created stack pool"
        );

        Self {
            slots: UnsafeCell::new([const { MaybeUninit::uninit() }; N]),
            core: PoolCore::new(N, config),
        }
    }

    /// Hands out the next `count` contiguous slots
    ///
    /// Errors as [`HeapPool::allocate`](crate::HeapPool::allocate). The
    /// pointer is valid until the pool is moved or dropped.
    pub fn allocate(&self, count: usize) -> AllocResult<NonNull<T>> {
        // SAFETY: `slots` holds exactly `N` elements and sits in an
        // `UnsafeCell`, so writing through a shared borrow is allowed.
        unsafe { self.core.carve(self.base(), count) }
    }

    /// Like [`allocate`](Self::allocate), as a slice borrowed from the pool
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_uninit(&self, count: usize) -> AllocResult<&mut [MaybeUninit<T>]> {
        let ptr = self.allocate(count)?;
        // SAFETY: The range was just claimed and is never handed out again;
        // the borrow of `self` keeps the slots in place.
        Ok(unsafe { slice::from_raw_parts_mut(ptr.as_ptr().cast(), count) })
    }

    /// Does nothing: slots are reclaimed only when the pool goes away
    #[inline]
    pub fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        let _ = (ptr, count);
        self.core.stats.record_deallocate();
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
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

    /// Whether `ptr` points into this pool's slots
    ///
    /// Always false for zero-sized `T`.
    pub fn owns(&self, ptr: *const T) -> bool {
        self.core.contains(self.base(), ptr)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.core.config
    }

    #[inline]
    fn base(&self) -> NonNull<T> {
        NonNull::from(&self.slots).cast()
    }
}

impl<T, const N: usize> Default for StackPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> ContainerAllocator for StackPool<T, N> {
    type Value = T;

    #[inline]
    fn allocate(&self, n: usize) -> AllocResult<NonNull<T>> {
        StackPool::allocate(self, n)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        StackPool::deallocate(self, ptr, n);
    }
}

impl<T, const N: usize> MemoryUsage for StackPool<T, N> {
    fn used_memory(&self) -> usize {
        self.allocated() * size_of::<T>()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.remaining() * size_of::<T>())
    }
}

impl<T, const N: usize> StatisticsProvider for StackPool<T, N> {
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

impl<T, const N: usize> fmt::Debug for StackPool<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackPool")
            .field("name", &self.core.config.name)
            .field("capacity", &N)
            .field("allocated", &self.allocated())
            .finish_non_exhaustive()
    }
}
