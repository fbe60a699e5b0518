//! # nebula-alloc
//!
//! Container allocators for Nebula: storage handed to generic containers
//! through a small allocator contract.
//!
//! - [`ReferenceAllocator`]: stateless, rebindable, forwards every request to
//!   a memory source (the system heap by default)
//! - [`HeapPool`]: one block reserved up front, served by bumping an offset
//! - [`StackPool`]: the same with the slots stored inline
//!
//! Containers program against [`ContainerAllocator`] and, when their nodes
//! differ from their elements, [`Rebind`].
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_alloc::prelude::*;
//!
//! // Storage straight from the system heap
//! let alloc = ReferenceAllocator::<u64>::new();
//! let ptr = alloc.allocate(3)?;
//! unsafe {
//!     ptr.write(7);
//!     assert_eq!(ptr.read(), 7);
//!     alloc.deallocate(ptr, 3);
//! }
//!
//! // A five-element pool: two requests fill it, a third is refused
//! let pool = HeapPool::<i32>::new(5)?;
//! pool.allocate(2)?;
//! pool.allocate(3)?;
//! assert_eq!(pool.state(), PoolState::Exhausted);
//! assert!(pool.allocate(1).is_err());
//! # Ok::<(), AllocError>(())
//! ```
//!
//! ## Memory sources
//!
//! Every allocator draws raw bytes from a [`MemorySource`]:
//! [`SystemMemory`] (the default), [`ArrayMemory`] for an embedded byte
//! array, or [`BudgetedMemory`] to cap what another source may hand out.
//!
//! ## Features
//!
//! - `logging` (default): structured `tracing` events for pool lifecycle,
//!   bumps and failures
//!
//! ## Threading
//!
//! Pools keep their offset in a `Cell`: they can move between threads but
//! cannot be shared. Use one pool per thread.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]
// Raw memory is this crate's whole job; every block carries a SAFETY comment
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

// Error types
pub mod error;

// Core modules
pub mod allocator;
pub mod deleter;
pub mod pool;
pub mod source;

pub use crate::allocator::{ContainerAllocator, MemoryUsage, Rebind, ReferenceAllocator};
pub use crate::deleter::{Deleter, RawBox, RawDelete};
pub use crate::error::{AllocError, AllocResult};
pub use crate::pool::{HeapPool, PoolConfig, PoolState, PoolStats, StackPool, StatisticsProvider};
pub use crate::source::{ArrayMemory, BudgetedMemory, MemorySource, SystemMemory};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::error::{AllocError, AllocResult};

    // Contract
    pub use crate::allocator::{ContainerAllocator, MemoryUsage, Rebind};

    // Allocators and pools
    pub use crate::allocator::ReferenceAllocator;
    pub use crate::pool::{HeapPool, PoolConfig, PoolState, StackPool, StatisticsProvider};

    // Sources
    pub use crate::source::{ArrayMemory, MemorySource, SystemMemory};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
