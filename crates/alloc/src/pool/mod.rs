//! Bump pools
//!
//! A pool reserves storage for a fixed number of elements up front and serves
//! `allocate(k)` by handing out the next `k` slots. Nothing is ever reused:
//! `deallocate` is a no-op and the storage goes away with the pool.
//!
//! - [`HeapPool`] reserves one block from a [`MemorySource`](crate::MemorySource)
//!   at construction and releases it on drop.
//! - [`StackPool`] keeps its slots inline, with the capacity fixed by a const
//!   generic.
//!
//! Pools are single-threaded: the bump offset lives in a `Cell`, so a pool is
//! `Send` but never `Sync`.

use core::ptr::{self, NonNull};

#[cfg(feature = "logging")]
use tracing::trace;

use crate::error::AllocResult;

mod config;
mod cursor;
mod heap;
mod stack;
mod stats;

pub use config::PoolConfig;
pub use heap::HeapPool;
pub use stack::StackPool;
pub use stats::{PoolStats, StatisticsProvider};

use cursor::BumpCursor;
use stats::OptionalStats;

/// Lifecycle of a pool
///
/// A dropped pool is released; there is no value to observe it by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// At least one slot left
    Active,
    /// Every slot handed out
    Exhausted,
}

/// Bookkeeping shared by both pools: cursor, counters, config
#[derive(Debug)]
struct PoolCore {
    cursor: BumpCursor,
    stats: OptionalStats,
    config: PoolConfig,
}

impl PoolCore {
    fn new(capacity: usize, config: PoolConfig) -> Self {
        Self {
            cursor: BumpCursor::new(capacity),
            stats: OptionalStats::new(config.track_stats),
            config,
        }
    }

    /// Claims `count` slots of the storage starting at `base`
    ///
    /// # Safety
    /// `base` must point to storage for `cursor.capacity()` elements of `T`,
    /// valid for writes.
    unsafe fn carve<T>(&self, base: NonNull<T>, count: usize) -> AllocResult<NonNull<T>> {
        let offset = match self.cursor.claim(count) {
            Ok(offset) => offset,
            Err(error) => {
                self.stats.record_failure();
                return Err(error);
            }
        };
        self.stats.record_allocation(count);

        #[cfg(feature = "logging")]
        trace!(
            pool = self.config.label(),
            offset,
            count,
            remaining = self.cursor.remaining(),
            "bumped pool offset"
        );

        // SAFETY: `offset + count <= capacity`, so the range lies inside the
        // storage the caller vouched for.
        let ptr = unsafe { base.add(offset) };

        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: The claimed range is in bounds, writable, and not yet
            // visible to anyone else.
            unsafe { ptr::write_bytes(ptr.as_ptr(), pattern, count) };
        }

        Ok(ptr)
    }

    fn state(&self) -> PoolState {
        if self.cursor.remaining() == 0 {
            PoolState::Exhausted
        } else {
            PoolState::Active
        }
    }

    /// Whether `ptr` lies inside the `capacity` elements starting at `base`
    fn contains<T>(&self, base: NonNull<T>, ptr: *const T) -> bool {
        let start = base.as_ptr().addr();
        let end = start + self.cursor.capacity() * size_of::<T>();
        (start..end).contains(&ptr.addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocError;

    #[test]
    fn carve_applies_pattern_and_counts() {
        let mut storage = [0u16; 4];
        let base = NonNull::from(&mut storage).cast::<u16>();
        let core = PoolCore::new(4, PoolConfig::debug().with_alloc_pattern(Some(0xAB)));

        let ptr = unsafe { core.carve(base, 3) }.unwrap();
        assert_eq!(ptr, base);
        assert!(unsafe { core.carve(base, 2) }.is_err());
        assert_eq!(core.state(), PoolState::Active);

        let stats = core.stats.snapshot();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.failed_allocations, 1);

        assert_eq!(storage, [0xABAB, 0xABAB, 0xABAB, 0]);
    }

    #[test]
    fn exhaustion_changes_state() {
        let mut storage = [0u8; 2];
        let base = NonNull::from(&mut storage).cast::<u8>();
        let core = PoolCore::new(2, PoolConfig::production());

        unsafe { core.carve(base, 2) }.unwrap();
        assert_eq!(core.state(), PoolState::Exhausted);
        assert_eq!(
            unsafe { core.carve(base, 1) }.unwrap_err(),
            AllocError::capacity_exhausted(1, 0, 2)
        );
    }

    #[test]
    fn contains_checks_bounds() {
        let storage = [0u32; 3];
        let base = NonNull::from(&storage).cast::<u32>();
        let core = PoolCore::new(3, PoolConfig::production());

        assert!(core.contains(base, storage.as_ptr()));
        assert!(core.contains(base, storage.as_ptr().wrapping_add(2)));
        assert!(!core.contains(base, storage.as_ptr().wrapping_add(3)));
    }
}
